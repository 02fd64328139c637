use minicbm::prelude::*;
use minicbm::{loss, CacheState};


fn rows(n_sample: usize) -> Vec<Vec<f64>> {
    (0..n_sample)
        .map(|i| {
            vec![
                (i % 4) as f64,
                ((i * 7) % 5) as f64 * 0.5,
                if i % 2 == 0 { 1.0 } else { 0.0 },
            ]
        })
        .collect()
}


fn classes(n_sample: usize) -> Vec<usize> {
    (0..n_sample).map(|i| (i + i / 4) % 3).collect()
}


/// Tests for `WeightedLogLoss`.
#[cfg(test)]
pub mod weighted_log_loss {
    use super::*;

    #[test]
    fn gradient_matches_finite_differences() {
        let n_sample = 24;
        let sample = Sample::from_dense_rows(rows(n_sample)).unwrap();
        let targets = loss::one_hot(&classes(n_sample)[..], 3);
        let weights = (0..n_sample)
            .map(|i| 0.5 + 0.25 * (i % 3) as f64)
            .collect::<Vec<_>>();

        let mut model = LogisticRegression::new(3, 3);
        let mut objective = WeightedLogLoss::new(
            &mut model,
            &sample,
            &weights[..],
            &targets[..],
            Penalty::Gaussian { variance: 2.0 },
            ReductionStrategy::Sequential,
        ).unwrap();

        let n_params = objective.parameters().len();
        assert_eq!(n_params, 3 * 4);
        let theta = (0..n_params)
            .map(|p| 0.1 * ((p % 5) as f64 - 2.0))
            .collect::<Vec<_>>();
        objective.set_parameters(theta.clone()).unwrap();
        let gradient = objective.gradient().to_vec();

        let h = 1e-5;
        for p in 0..n_params {
            let mut plus = theta.clone();
            plus[p] += h;
            objective.set_parameters(plus).unwrap();
            let upper = objective.value();

            let mut minus = theta.clone();
            minus[p] -= h;
            objective.set_parameters(minus).unwrap();
            let lower = objective.value();

            let numeric = (upper - lower) / (2.0 * h);
            assert!(
                (numeric - gradient[p]).abs() < 1e-4 * (1.0 + gradient[p].abs()),
                "parameter {p}: numeric {numeric}, analytic {}", gradient[p],
            );
        }
    }


    #[test]
    fn zero_weight_instances_change_nothing() {
        let n_sample = 12;
        let small = Sample::from_dense_rows(rows(n_sample)).unwrap();
        let large = Sample::from_dense_rows(rows(n_sample + 1)).unwrap();

        let small_targets = loss::one_hot(&classes(n_sample)[..], 3);
        let large_targets = loss::one_hot(&classes(n_sample + 1)[..], 3);
        let small_weights = vec![1.0; n_sample];
        let mut large_weights = vec![1.0; n_sample];
        large_weights.push(0.0);

        let theta = (0..12).map(|p| 0.05 * p as f64).collect::<Vec<_>>();
        let penalty = Penalty::Gaussian { variance: 1.0 };

        let mut model_a = LogisticRegression::new(3, 3);
        let mut a = WeightedLogLoss::new(
            &mut model_a, &small, &small_weights[..], &small_targets[..],
            penalty, ReductionStrategy::Sequential,
        ).unwrap();
        a.set_parameters(theta.clone()).unwrap();

        let mut model_b = LogisticRegression::new(3, 3);
        let mut b = WeightedLogLoss::new(
            &mut model_b, &large, &large_weights[..], &large_targets[..],
            penalty, ReductionStrategy::Sequential,
        ).unwrap();
        b.set_parameters(theta).unwrap();

        assert_eq!(a.empirical_counts(), b.empirical_counts());
        assert_eq!(a.predicted_counts(), b.predicted_counts());
        assert!((a.value() - b.value()).abs() < 1e-12);

        let ga = a.gradient().to_vec();
        let gb = b.gradient().to_vec();
        for (x, y) in ga.iter().zip(&gb) {
            assert!((x - y).abs() < 1e-12);
        }
    }


    #[test]
    fn parallel_and_sequential_agree() {
        let n_sample = 30;
        let sample = Sample::from_dense_rows(rows(n_sample)).unwrap();
        let targets = loss::one_hot(&classes(n_sample)[..], 3);
        let weights = loss::uniform_weights(n_sample);
        let penalty = Penalty::ElasticNet { regularization: 0.1, l1_ratio: 0.5 };
        let theta = (0..12).map(|p| 0.1 - 0.02 * p as f64).collect::<Vec<_>>();

        let mut values = Vec::new();
        for reduction in [ReductionStrategy::Sequential, ReductionStrategy::Parallel] {
            let mut model = LogisticRegression::new(3, 3);
            let mut objective = WeightedLogLoss::new(
                &mut model, &sample, &weights[..], &targets[..],
                penalty, reduction,
            ).unwrap();
            objective.set_parameters(theta.clone()).unwrap();
            values.push(objective.value());
        }
        assert!((values[0] - values[1]).abs() < 1e-9);
    }


    #[test]
    fn cache_is_dropped_on_new_parameters() {
        let n_sample = 8;
        let sample = Sample::from_dense_rows(rows(n_sample)).unwrap();
        let targets = loss::one_hot(&classes(n_sample)[..], 3);
        let weights = loss::uniform_weights(n_sample);

        let mut model = LogisticRegression::new(3, 3);
        let mut objective = WeightedLogLoss::new(
            &mut model, &sample, &weights[..], &targets[..],
            Penalty::default(), ReductionStrategy::Sequential,
        ).unwrap();
        assert_eq!(objective.cache_state(), CacheState::Stale);

        let before = objective.value();
        assert_eq!(objective.cache_state(), CacheState::Valid);

        objective.set_parameters(vec![0.3; 12]).unwrap();
        assert_eq!(objective.cache_state(), CacheState::Stale);
        let after = objective.value();
        assert_ne!(before, after);
    }


    #[test]
    fn mismatched_shapes_are_rejected() {
        let sample = Sample::from_dense_rows(rows(4)).unwrap();
        let targets = loss::one_hot(&classes(4)[..], 3);
        let weights = loss::uniform_weights(3);

        let mut model = LogisticRegression::new(3, 3);
        let result = WeightedLogLoss::new(
            &mut model, &sample, &weights[..], &targets[..],
            Penalty::default(), ReductionStrategy::Sequential,
        );
        assert!(result.is_err());

        let weights = loss::uniform_weights(4);
        let mut wide = LogisticRegression::new(3, 5);
        let result = WeightedLogLoss::new(
            &mut wide, &sample, &weights[..], &targets[..],
            Penalty::default(), ReductionStrategy::Sequential,
        );
        assert!(result.is_err());
    }


    #[test]
    fn gradient_descent_decreases_the_objective() {
        let n_sample = 24;
        let sample = Sample::from_dense_rows(rows(n_sample)).unwrap();
        let targets = loss::one_hot(&classes(n_sample)[..], 3);
        let weights = loss::uniform_weights(n_sample);

        let mut model = LogisticRegression::new(3, 3);
        let mut objective = WeightedLogLoss::new(
            &mut model, &sample, &weights[..], &targets[..],
            Penalty::Gaussian { variance: 10.0 },
            ReductionStrategy::Sequential,
        ).unwrap();

        let initial = objective.value();
        let last = GradientDescent::new(50).minimize(&mut objective).unwrap();
        assert!(last < initial);
        assert!(last.is_finite());
    }
}
