use minicbm::prelude::*;
use minicbm::Error;


/// Four label-set patterns keyed by the first feature.
fn toy_sample(n_sample: usize) -> Sample {
    let rows = (0..n_sample)
        .map(|i| {
            vec![
                (i % 4) as f64,
                ((i * 5) % 7) as f64 * 0.25,
                if i % 3 == 0 { 1.0 } else { 0.0 },
            ]
        })
        .collect::<Vec<_>>();
    let labels = (0..n_sample)
        .map(|i| {
            match i % 4 {
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


fn all_label_sets(n_labels: usize) -> Vec<MultiLabel> {
    (0..1_usize << n_labels)
        .map(|mask| {
            let labels = (0..n_labels).filter(|l| mask & (1 << l) != 0);
            MultiLabel::from_labels(n_labels, labels)
        })
        .collect()
}


fn small_params(reduction: ReductionStrategy) -> OptimizerParams {
    let sub = SubProblemParams {
        n_iterations: 5,
        shrinkage: 0.3,
        n_leaves: 3,
        ..SubProblemParams::default()
    };
    OptimizerParams {
        multi_class: sub,
        binary: sub,
        reduction,
        ..OptimizerParams::default()
    }
}


fn trained(
    sample: &Sample,
    n_clusters: usize,
    kind: ClassifierType,
    policy: AllowEmptyPolicy,
) -> CBM
{
    let mut cbm = CBMBuilder::new(sample)
        .n_clusters(n_clusters)
        .multi_class_classifier_type(kind)
        .binary_classifier_type(kind)
        .allow_empty(policy)
        .build()
        .unwrap();
    {
        let params = small_params(ReductionStrategy::Parallel);
        let mut optimizer = CBMOptimizer::new(&mut cbm, sample, params)
            .unwrap();
        initialize(&mut optimizer, Initialization::Warm).unwrap();
        for _ in 0..3 {
            optimizer.iterate().unwrap();
        }
    }
    cbm
}


/// Tests for the mixture model and its EM optimizer.
#[cfg(test)]
pub mod mixture {
    use super::*;

    #[test]
    fn probabilities_over_every_set_sum_to_one() {
        let sample = toy_sample(40);
        let cbm = trained(
            &sample, 3, ClassifierType::Boosting, AllowEmptyPolicy::Allow,
        );

        for i in [0, 5, 17] {
            let total = all_label_sets(3).iter()
                .map(|y| cbm.probability_of_label_set(&sample, i, y))
                .sum::<f64>();
            assert!((total - 1.0).abs() < 1e-9, "instance {i}: {total}");

            let gate = cbm.predict_cluster_probs(&sample, i);
            assert!((gate.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        }
    }


    #[test]
    fn single_cluster_is_a_product_of_bernoullis() {
        let sample = toy_sample(40);
        let cbm = trained(
            &sample, 1, ClassifierType::Boosting, AllowEmptyPolicy::Allow,
        );

        for i in 0..4 {
            for y in all_label_sets(3) {
                let product = (0..3)
                    .map(|l| {
                        let p = cbm.binary_classifier(0, l)
                            .predict_class_probs(&sample, i)[1];
                        if y.matches(l) { p } else { 1.0 - p }
                    })
                    .product::<f64>();
                let p = cbm.probability_of_label_set(&sample, i, &y);
                assert!((p - product).abs() < 1e-9);
            }
        }
    }


    #[test]
    fn marginals_agree_with_set_probabilities() {
        let sample = toy_sample(40);
        let cbm = trained(
            &sample, 2, ClassifierType::LogisticRegression,
            AllowEmptyPolicy::Allow,
        );

        let i = 6;
        let marginals = cbm.predict_class_probs(&sample, i);
        for (l, marginal) in marginals.into_iter().enumerate() {
            let summed = all_label_sets(3).iter()
                .filter(|y| y.matches(l))
                .map(|y| cbm.probability_of_label_set(&sample, i, y))
                .sum::<f64>();
            assert!((marginal - summed).abs() < 1e-9);

            // Restricting to one label marginalizes the others.
            let single = MultiLabel::from_labels(3, [l]);
            let on = cbm.probability_of_label_set_on(&sample, i, &single, &[l]);
            assert!((on - summed).abs() < 1e-9);
        }
    }


    #[test]
    fn forbidden_empty_set_is_renormalized() {
        let sample = toy_sample(40);
        let cbm = trained(
            &sample, 2, ClassifierType::Boosting, AllowEmptyPolicy::Forbid,
        );
        assert!(!cbm.allow_empty());

        let i = 3;
        let empty = MultiLabel::new(3);
        assert_eq!(
            cbm.probability_of_label_set_with_constraint(&sample, i, &empty),
            0.0
        );
        let total = all_label_sets(3).iter()
            .map(|y| cbm.probability_of_label_set_with_constraint(&sample, i, y))
            .sum::<f64>();
        assert!((total - 1.0).abs() < 1e-9);
    }


    #[test]
    fn auto_policy_follows_the_training_sets() {
        let with_empty = toy_sample(8);
        let cbm = CBMBuilder::new(&with_empty).n_clusters(2).build().unwrap();
        assert!(cbm.allow_empty());

        let rows = vec![vec![1.0], vec![2.0]];
        let without_empty = Sample::from_dense_rows(rows)
            .unwrap()
            .with_labels(vec![vec![0], vec![1]], 2)
            .unwrap();
        let cbm = CBMBuilder::new(&without_empty).build().unwrap();
        assert!(!cbm.allow_empty());
    }


    #[test]
    fn em_records_a_finite_likelihood_per_iteration() {
        let sample = toy_sample(40);
        for kind in [ClassifierType::Boosting, ClassifierType::LogisticRegression] {
            let mut cbm = CBMBuilder::new(&sample)
                .n_clusters(3)
                .multi_class_classifier_type(kind)
                .binary_classifier_type(kind)
                .build()
                .unwrap();
            let params = small_params(ReductionStrategy::Sequential);
            let mut optimizer = CBMOptimizer::new(&mut cbm, &sample, params)
                .unwrap();
            initialize(&mut optimizer, Initialization::Random).unwrap();

            for _ in 0..4 {
                let nll = optimizer.iterate().unwrap();
                assert!(nll.is_finite() && nll >= 0.0);
            }
            assert_eq!(optimizer.history().len(), 4);
            assert_eq!(optimizer.last_value(), optimizer.history().last().copied());

            optimizer.e_step();
            for row in optimizer.responsibilities() {
                assert_eq!(row.len(), 3);
                assert!((row.iter().sum::<f64>() - 1.0).abs() < 1e-9);
                assert!(row.iter().all(|r| *r >= 0.0));
            }
        }
    }


    #[test]
    fn responsibilities_are_normalized_on_assignment() {
        let sample = toy_sample(4);
        let mut cbm = CBMBuilder::new(&sample).n_clusters(2).build().unwrap();
        let params = small_params(ReductionStrategy::Sequential);
        let mut optimizer = CBMOptimizer::new(&mut cbm, &sample, params)
            .unwrap();

        optimizer.set_responsibilities(vec![
            vec![3.0, 1.0],
            vec![0.0, 0.0],
            vec![0.0, 2.0],
            vec![1.0, 1.0],
        ]).unwrap();
        let rows = optimizer.responsibilities();
        assert_eq!(rows[0], vec![0.75, 0.25]);
        assert_eq!(rows[1], vec![0.5, 0.5]);
        assert_eq!(rows[2], vec![0.0, 1.0]);

        let negative = vec![vec![-1.0, 2.0]; 4];
        assert!(optimizer.set_responsibilities(negative).is_err());
        let short = vec![vec![1.0, 0.0]; 3];
        assert!(optimizer.set_responsibilities(short).is_err());
    }


    #[test]
    fn impossible_label_sets_get_uniform_responsibilities() {
        let sample = toy_sample(24);
        let cbm = trained(
            &sample, 2,
            ClassifierType::LogisticRegression,
            AllowEmptyPolicy::Allow,
        );

        // Rows 1 and 6 overflow every linear score,
        // so no cluster gives their label sets a finite likelihood.
        let broken = [1, 6];
        let rows = (0..24)
            .map(|i| {
                if broken.contains(&i) {
                    vec![f64::INFINITY; 3]
                } else {
                    vec![
                        (i % 4) as f64,
                        ((i * 5) % 7) as f64 * 0.25,
                        if i % 3 == 0 { 1.0 } else { 0.0 },
                    ]
                }
            })
            .collect::<Vec<_>>();
        let labels = sample.labels()
            .iter()
            .map(|y| y.labels().collect::<Vec<_>>())
            .collect::<Vec<_>>();
        let shifted = Sample::from_dense_rows(rows)
            .unwrap()
            .with_labels(labels, 3)
            .unwrap();

        for i in broken {
            let y = shifted.label(i);
            assert!(!(cbm.probability_of_label_set(&shifted, i, y) > 0.0));
        }

        let mut cbm = cbm;
        let params = small_params(ReductionStrategy::Sequential);
        let mut optimizer = CBMOptimizer::new(&mut cbm, &shifted, params)
            .unwrap();
        let n_degenerate = optimizer.e_step();
        assert_eq!(n_degenerate, broken.len());

        for (i, row) in optimizer.responsibilities().iter().enumerate() {
            if broken.contains(&i) {
                assert_eq!(row, &vec![0.5, 0.5]);
            } else {
                assert!(row.iter().all(|r| r.is_finite() && *r >= 0.0));
                assert!((row.iter().sum::<f64>() - 1.0).abs() < 1e-9);
            }
        }
    }


    #[test]
    fn save_and_load_give_identical_probabilities() {
        let sample = toy_sample(40);
        let cbm = trained(
            &sample, 2, ClassifierType::Boosting, AllowEmptyPolicy::Auto,
        );

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model");
        cbm.save(&path).unwrap();
        let loaded = CBM::load(&path).unwrap();

        assert_eq!(loaded, cbm);
        for i in 0..sample.shape().0 {
            let y = sample.label(i);
            assert_eq!(
                cbm.probability_of_label_set(&sample, i, y),
                loaded.probability_of_label_set(&sample, i, y),
            );
        }
    }


    #[test]
    fn invalid_configuration_is_rejected() {
        let sample = toy_sample(8);
        assert!(CBMBuilder::new(&sample).n_clusters(0).build().is_err());

        let unlabeled = Sample::from_dense_rows(vec![vec![1.0]; 3]).unwrap();
        assert!(CBMBuilder::new(&unlabeled).build().is_err());

        assert!(matches!(
            "svm".parse::<ClassifierType>(),
            Err(Error::UnknownClassifierType(_))
        ));
        assert!(matches!(
            "maybe".parse::<AllowEmptyPolicy>(),
            Err(Error::UnknownAllowEmpty(_))
        ));
        assert!(matches!(
            "later".parse::<ResumeMode>(),
            Err(Error::UnknownResumeMode(_))
        ));
        assert_eq!("lr".parse::<ClassifierType>().unwrap(),
                   ClassifierType::LogisticRegression);
        assert_eq!("auto".parse::<AllowEmptyPolicy>().unwrap(),
                   AllowEmptyPolicy::Auto);

        let json = r#"{ "allow_empty": "maybe" }"#;
        assert!(serde_json::from_str::<TrainConfig>(json).is_err());
        let json = r#"{ "multi_class_classifier_type": "lr", "n_clusters": 2 }"#;
        let config = serde_json::from_str::<TrainConfig>(json).unwrap();
        assert_eq!(config.n_clusters, 2);
        assert_eq!(config.multi_class_classifier_type,
                   ClassifierType::LogisticRegression);

        let mut params = OptimizerParams::default();
        params.binary.shrinkage = 1.5;
        let mut cbm = CBMBuilder::new(&sample).build().unwrap();
        assert!(CBMOptimizer::new(&mut cbm, &sample, params).is_err());
    }
}
