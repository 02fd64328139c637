use minicbm::prelude::*;
use minicbm::calibration::{set_records, SetRecord};
use rand::prelude::*;

use std::sync::atomic::{AtomicUsize, Ordering};


fn toy_sample(n_sample: usize) -> Sample {
    let rows = (0..n_sample)
        .map(|i| vec![(i % 4) as f64, ((i * 3) % 5) as f64])
        .collect::<Vec<_>>();
    let labels = (0..n_sample)
        .map(|i| {
            match (i + i / 7) % 4 {
                0 => vec![0],
                1 => vec![1, 2],
                2 => vec![0, 2],
                _ => vec![],
            }
        })
        .collect::<Vec<_>>();
    Sample::from_dense_rows(rows)
        .unwrap()
        .with_labels(labels, 3)
        .unwrap()
}


fn train(sample: &Sample) -> CBM {
    let config = TrainConfig {
        n_clusters: 2,
        n_iterations: 2,
        print_every: usize::MAX,
        ..TrainConfig::default()
    };
    Trainer::new(config).unwrap().run(sample, None).unwrap()
}


/// Wraps a predictor and counts the calls made on `rayon` pool threads.
struct CountingPredictor<'a> {
    inner: SubsetAccuracyPredictor<'a>,
    reduction: ReductionStrategy,
    calls: AtomicUsize,
    pooled: AtomicUsize,
}


impl<'a> CountingPredictor<'a> {
    fn new(cbm: &'a CBM, sample: &Sample, reduction: ReductionStrategy)
        -> Self
    {
        Self {
            inner: SubsetAccuracyPredictor::new(cbm, Candidates::support(sample)),
            reduction,
            calls: AtomicUsize::new(0),
            pooled: AtomicUsize::new(0),
        }
    }
}


impl PluginPredictor for CountingPredictor<'_> {
    fn name(&self) -> &str {
        "Counting"
    }


    fn reduction_strategy(&self) -> ReductionStrategy {
        self.reduction
    }


    fn predict_with_probability(&self, sample: &Sample, i: usize)
        -> (MultiLabel, f64)
    {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if rayon::current_thread_index().is_some() {
            self.pooled.fetch_add(1, Ordering::SeqCst);
        }
        self.inner.predict_with_probability(sample, i)
    }
}


/// Tests for isotonic regression.
#[cfg(test)]
pub mod isotonic {
    use super::*;

    #[test]
    fn the_fitted_map_is_monotone() {
        let mut rng = StdRng::seed_from_u64(1234);
        let xs = (0..200).map(|_| rng.gen::<f64>()).collect::<Vec<_>>();
        let ys = xs.iter()
            .map(|&x| if rng.gen::<f64>() < x { 1.0 } else { 0.0 })
            .collect::<Vec<_>>();

        let iso = IsotonicRegression::fit(&xs[..], &ys[..]).unwrap();
        let mut prev = f64::MIN;
        for k in 0..=100 {
            let y = iso.predict(k as f64 / 100.0);
            assert!(y >= prev - 1e-12);
            assert!((0.0..=1.0).contains(&y));
            prev = y;
        }
    }


    #[test]
    fn calibrated_inputs_are_kept() {
        let xs = (0..10).map(|k| 0.05 + 0.1 * k as f64).collect::<Vec<_>>();
        let iso = IsotonicRegression::fit(&xs[..], &xs[..]).unwrap();

        for &x in &xs {
            assert!((iso.predict(x) - x).abs() < 1e-12);
        }
        assert!((iso.predict(0.5) - 0.5).abs() < 1e-12);
        assert!((iso.predict(0.0) - 0.05).abs() < 1e-12);
        assert!((iso.predict(1.0) - 0.95).abs() < 1e-12);
    }


    #[test]
    fn violators_are_pooled() {
        let xs = [0.1, 0.2, 0.3, 0.4];
        let ys = [0.0, 1.0, 0.0, 1.0];
        let iso = IsotonicRegression::fit(&xs, &ys).unwrap();

        assert_eq!(iso.predict(0.1), 0.0);
        assert_eq!(iso.predict(0.2), 0.5);
        assert_eq!(iso.predict(0.3), 0.5);
        assert_eq!(iso.predict(0.4), 1.0);
    }


    #[test]
    fn unfitted_map_clamps() {
        let iso = IsotonicRegression::default();
        assert!(iso.is_empty());
        assert_eq!(iso.predict(0.3), 0.3);
        assert_eq!(iso.predict(1.7), 1.0);

        assert!(IsotonicRegression::fit(&[0.1, 0.2], &[1.0]).is_err());
    }
}


/// Tests for `BucketInfo`.
#[cfg(test)]
pub mod buckets {
    use super::*;

    fn records() -> Vec<(f64, bool)> {
        (0..97)
            .map(|i| ((i as f64 * 0.37) % 1.0, i % 3 != 0))
            .collect()
    }


    #[test]
    fn merging_halves_equals_one_pass() {
        let records = records();
        let whole = BucketInfo::accumulate(
            10, records.len(), ReductionStrategy::Sequential,
            |i, acc| acc.add(records[i].0, records[i].1),
        );

        let (left, right) = records.split_at(40);
        let mut a = BucketInfo::new(10);
        left.iter().for_each(|&(p, c)| a.add(p, c));
        let mut b = BucketInfo::new(10);
        right.iter().for_each(|&(p, c)| b.add(p, c));

        let merged = a.clone().merge(b.clone()).unwrap();
        assert_eq!(merged.counts(), whole.counts());
        assert_eq!(merged.corrects(), whole.corrects());
        for (x, y) in merged.sum_probs().iter().zip(whole.sum_probs()) {
            assert!((x - y).abs() < 1e-9);
        }

        let swapped = b.merge(a).unwrap();
        assert_eq!(swapped.counts(), merged.counts());
        assert_eq!(merged.total(), records.len() as u64);

        let parallel = BucketInfo::accumulate(
            10, records.len(), ReductionStrategy::Parallel,
            |i, acc| acc.add(records[i].0, records[i].1),
        );
        assert_eq!(parallel.counts(), whole.counts());
        assert_eq!(parallel.corrects(), whole.corrects());
    }


    #[test]
    fn certain_predictions_land_in_the_last_bucket() {
        let mut buckets = BucketInfo::new(10);
        buckets.add(1.0, true);
        buckets.add(0.0, false);
        assert_eq!(buckets.counts()[9], 1);
        assert_eq!(buckets.counts()[0], 1);
        assert_eq!(buckets.accuracies()[9], 1.0);
        assert_eq!(buckets.average_confidences()[9], 1.0);
    }


    #[test]
    fn table_lists_every_bucket() {
        let mut buckets = BucketInfo::new(5);
        buckets.add(0.5, true);
        let table = buckets.table("title");
        let lines = table.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 1 + 1 + 5);
        assert_eq!(lines[0], "title");
        assert!(lines[6].starts_with("[0.80, 1.00]"));
    }


    #[test]
    fn reliability_diagram_is_written() {
        let mut buckets = BucketInfo::default();
        for (p, c) in records() {
            buckets.add(p, c);
        }
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reliability.svg");
        buckets.draw_reliability_diagram(&path, "reliability").unwrap();
        assert!(path.exists());
    }
}


/// Tests for the set and label calibrators.
#[cfg(test)]
pub mod calibrators {
    use super::*;

    #[test]
    fn cardinality_maps_fall_back_for_unseen_sizes() {
        let records = (0..40)
            .map(|i| SetRecord {
                probability: (i % 10) as f64 / 10.0,
                cardinality: 1 + i % 2,
                correct: i % 10 >= 5,
            })
            .collect::<Vec<_>>();
        let calibrator = CardinalityCalibrator::fit_from_records(&records[..])
            .unwrap();

        assert_eq!(calibrator.cardinalities().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(calibrator.calibrate(0.9, 1), 1.0);
        assert_eq!(calibrator.calibrate(0.1, 2), 0.0);
        // No record of size 3: the pooled map applies.
        assert_eq!(calibrator.calibrate(0.8, 3), 1.0);
    }


    #[test]
    fn calibrators_survive_a_round_trip() {
        let sample = toy_sample(48);
        let cbm = train(&sample);
        let predictor = SubsetAccuracyPredictor::new(
            &cbm, Candidates::support(&sample),
        );

        let set_calibrator = CardinalityCalibrator::fit(&cbm, &predictor, &sample)
            .unwrap();
        let label_calibrator = LabelCalibrator::fit(
            &cbm, &sample, LabelCalibrationMode::PerLabel,
            ReductionStrategy::Parallel,
        ).unwrap();
        assert_eq!(label_calibrator.mode(), LabelCalibrationMode::PerLabel);

        let dir = tempfile::tempdir().unwrap();
        let set_path = dir.path().join("set_calibrator.json");
        let label_path = dir.path().join("label_calibrator.json");
        set_calibrator.save(&set_path).unwrap();
        label_calibrator.save(&label_path).unwrap();

        assert_eq!(CardinalityCalibrator::load(&set_path).unwrap(), set_calibrator);
        assert_eq!(LabelCalibrator::load(&label_path).unwrap(), label_calibrator);
    }


    #[test]
    fn calibrated_probabilities_stay_in_range() {
        let sample = toy_sample(48);
        let cbm = train(&sample);
        let predictor = SubsetAccuracyPredictor::new(
            &cbm, Candidates::support(&sample),
        );

        let set_calibrator = CardinalityCalibrator::fit(&cbm, &predictor, &sample)
            .unwrap();
        for record in set_records(&cbm, &predictor, &sample) {
            let p = set_calibrator.calibrate(record.probability, record.cardinality);
            assert!((0.0..=1.0).contains(&p));
        }

        let label_calibrator = LabelCalibrator::fit(
            &cbm, &sample, LabelCalibrationMode::Pooled,
            ReductionStrategy::Sequential,
        ).unwrap();
        let marginals = cbm.predict_class_probs(&sample, 0);
        let calibrated = label_calibrator.calibrate_all(&marginals[..]);
        assert_eq!(calibrated.len(), 3);
        assert!(calibrated.iter().all(|p| (0.0..=1.0).contains(p)));

        assert_eq!(
            "per_label".parse::<LabelCalibrationMode>().unwrap(),
            LabelCalibrationMode::PerLabel
        );
        assert!("both".parse::<LabelCalibrationMode>().is_err());
    }


    #[test]
    fn sequential_fits_stay_on_the_calling_thread() {
        let sample = toy_sample(40);
        let config = TrainConfig {
            n_clusters: 2,
            n_iterations: 2,
            print_every: usize::MAX,
            optimizer: OptimizerParams {
                reduction: ReductionStrategy::Sequential,
                ..OptimizerParams::default()
            },
            ..TrainConfig::default()
        };
        let cbm = Trainer::new(config).unwrap().run(&sample, None).unwrap();

        let predictor = CountingPredictor::new(
            &cbm, &sample, ReductionStrategy::Sequential,
        );
        CardinalityCalibrator::fit(&cbm, &predictor, &sample).unwrap();
        let predictions = predictor.predict_all(&sample);
        assert_eq!(predictions.len(), 40);
        assert_eq!(predictor.calls.load(Ordering::SeqCst), 80);
        assert_eq!(predictor.pooled.load(Ordering::SeqCst), 0);

        let predictor = CountingPredictor::new(
            &cbm, &sample, ReductionStrategy::Parallel,
        );
        let records = set_records(&cbm, &predictor, &sample);
        assert_eq!(records.len(), 40);
        assert_eq!(predictor.calls.load(Ordering::SeqCst), 40);
        assert!(predictor.pooled.load(Ordering::SeqCst) > 0);
    }


    #[test]
    fn label_maps_agree_across_strategies() {
        let sample = toy_sample(48);
        let cbm = train(&sample);
        let sequential = LabelCalibrator::fit(
            &cbm, &sample, LabelCalibrationMode::PerLabel,
            ReductionStrategy::Sequential,
        ).unwrap();
        let parallel = LabelCalibrator::fit(
            &cbm, &sample, LabelCalibrationMode::PerLabel,
            ReductionStrategy::Parallel,
        ).unwrap();
        assert_eq!(sequential, parallel);
    }


    #[test]
    fn report_covers_every_prediction() {
        let sample = toy_sample(48);
        let cbm = train(&sample);
        let predictor = InstanceF1Predictor::new(
            &cbm, Candidates::support(&sample),
        );
        let set_calibrator = CardinalityCalibrator::fit(&cbm, &predictor, &sample)
            .unwrap();
        let label_calibrator = LabelCalibrator::fit(
            &cbm, &sample, LabelCalibrationMode::Pooled,
            ReductionStrategy::Sequential,
        ).unwrap();

        let report = CalibrationReport::evaluate(
            &cbm,
            &predictor,
            &set_calibrator,
            &label_calibrator,
            &sample,
            10,
            ReductionStrategy::Parallel,
        ).unwrap();

        assert_eq!(report.raw_set.total(), 48);
        assert_eq!(report.calibrated_set.total(), 48);
        assert_eq!(report.raw_label.total(), 48 * 3);
        assert_eq!(report.calibrated_label.total(), 48 * 3);
        assert_eq!(
            report.raw_set.corrects().iter().sum::<u64>(),
            report.calibrated_set.corrects().iter().sum::<u64>(),
        );

        let text = report.to_string();
        assert!(text.contains("uncalibrated set probability"));
        assert!(text.contains("calibrated label probabilities"));
    }
}
