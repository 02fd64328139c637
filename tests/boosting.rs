use minicbm::prelude::*;
use minicbm::loss;


fn toy_sample(n_sample: usize) -> Sample {
    let rows = (0..n_sample)
        .map(|i| vec![(i % 3) as f64, (i % 7) as f64 * 0.1])
        .collect::<Vec<_>>();
    Sample::from_dense_rows(rows).unwrap()
}


/// Tests for `FunctionalBoost`.
#[cfg(test)]
pub mod functional_boost {
    use super::*;

    #[test]
    fn rounds_reduce_the_weighted_kl() {
        let n_sample = 30;
        let sample = toy_sample(n_sample);
        let classes = (0..n_sample).map(|i| i % 3).collect::<Vec<_>>();
        let targets = loss::one_hot(&classes[..], 3);
        let weights = loss::uniform_weights(n_sample);
        let tree = RegressionTreeBuilder::new(&sample)
            .max_leaves(3)
            .build();

        let mut baseline = BoostedClassifier::new(3);
        let kl_prior = FunctionalBoost::new(
                &mut baseline, &sample, &weights[..], &targets[..],
                ReductionStrategy::Sequential,
            )
            .unwrap()
            .n_iterations(0)
            .run(&tree);
        assert!(!baseline.has_trees());

        let mut model = BoostedClassifier::new(3);
        let kl_boosted = FunctionalBoost::new(
                &mut model, &sample, &weights[..], &targets[..],
                ReductionStrategy::Parallel,
            )
            .unwrap()
            .n_iterations(20)
            .shrinkage(0.5)
            .unwrap()
            .run(&tree);

        assert!(kl_boosted < kl_prior);
        assert_eq!(model.n_trees(), 20);

        let correct = (0..n_sample)
            .filter(|&i| model.predict(&sample, i) == classes[i])
            .count();
        assert_eq!(correct, n_sample);
    }


    #[test]
    fn intercepts_follow_the_weighted_priors() {
        let n_sample = 10;
        let sample = toy_sample(n_sample);
        // 3 of 10 instances in class 1.
        let classes = (0..n_sample)
            .map(|i| if i < 3 { 1 } else { 0 })
            .collect::<Vec<_>>();
        let targets = loss::one_hot(&classes[..], 2);
        let weights = loss::uniform_weights(n_sample);
        let tree = RegressionTreeBuilder::new(&sample).build();

        let mut model = BoostedClassifier::new(2);
        FunctionalBoost::new(
                &mut model, &sample, &weights[..], &targets[..],
                ReductionStrategy::Sequential,
            )
            .unwrap()
            .n_iterations(0)
            .run(&tree);

        let intercepts = model.intercepts();
        assert!((intercepts[0] - 0.7_f64.ln()).abs() < 1e-12);
        assert!((intercepts[1] - 0.3_f64.ln()).abs() < 1e-12);

        let probs = model.predict_class_probs(&sample, 0);
        assert!((probs[1] - 0.3).abs() < 1e-12);
    }


    #[test]
    fn priors_wait_for_positive_weight() {
        let n_sample = 10;
        let sample = toy_sample(n_sample);
        let classes = (0..n_sample)
            .map(|i| if i < 3 { 1 } else { 0 })
            .collect::<Vec<_>>();
        let targets = loss::one_hot(&classes[..], 2);
        let tree = RegressionTreeBuilder::new(&sample).build();

        let mut model = BoostedClassifier::new(2);
        let empty = vec![0.0; n_sample];
        let kl = FunctionalBoost::new(
                &mut model, &sample, &empty[..], &targets[..],
                ReductionStrategy::Sequential,
            )
            .unwrap()
            .n_iterations(2)
            .run(&tree);
        assert_eq!(kl, 0.0);
        assert!(model.has_trees());
        assert!(!model.has_prior());
        assert_eq!(model.intercepts(), &[0.0, 0.0]);

        let weights = loss::uniform_weights(n_sample);
        FunctionalBoost::new(
                &mut model, &sample, &weights[..], &targets[..],
                ReductionStrategy::Sequential,
            )
            .unwrap()
            .n_iterations(0)
            .run(&tree);
        assert!(model.has_prior());
        let intercepts = model.intercepts();
        assert!((intercepts[0] - 0.7_f64.ln()).abs() < 1e-12);
        assert!((intercepts[1] - 0.3_f64.ln()).abs() < 1e-12);
    }


    #[test]
    fn invalid_shrinkage_is_rejected() {
        let sample = toy_sample(4);
        let targets = loss::one_hot(&[0, 1, 0, 1], 2);
        let weights = loss::uniform_weights(4);
        let mut model = BoostedClassifier::new(2);
        let result = FunctionalBoost::new(
                &mut model, &sample, &weights[..], &targets[..],
                ReductionStrategy::Sequential,
            )
            .unwrap()
            .shrinkage(0.0);
        assert!(result.is_err());
    }
}
