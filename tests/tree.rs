use minicbm::prelude::*;
use minicbm::GradientHessian;


/// Tests for the regression tree weak learner.
#[cfg(test)]
pub mod regression_tree {
    use super::*;

    fn step_sample() -> Sample {
        let rows = (0..20).map(|i| vec![i as f64]).collect::<Vec<_>>();
        Sample::from_dense_rows(rows).unwrap()
    }


    #[test]
    fn two_leaves_fit_a_step() {
        let sample = step_sample();
        // A Newton step toward +1 on the right half, -1 on the left.
        let gh = (0..20)
            .map(|i| {
                let target = if i >= 10 { 1.0 } else { -1.0 };
                GradientHessian::new(-target, 1.0)
            })
            .collect::<Vec<_>>();

        let tree = RegressionTreeBuilder::new(&sample)
            .max_leaves(2)
            .lambda_l2(0.0)
            .build();
        let h = tree.produce(&sample, &gh[..]);

        assert_eq!(h.n_leaves(), 2);
        for i in 0..20 {
            let expected = if i >= 10 { 1.0 } else { -1.0 };
            assert!((h.predict(&sample, i) - expected).abs() < 1e-9);
        }
    }


    #[test]
    fn regularization_shrinks_leaf_values() {
        let sample = step_sample();
        let gh = (0..20)
            .map(|_| GradientHessian::new(-1.0, 1.0))
            .collect::<Vec<_>>();

        let tree = RegressionTreeBuilder::new(&sample)
            .max_leaves(1)
            .lambda_l2(20.0)
            .build();
        let h = tree.produce(&sample, &gh[..]);

        // -G / (H + lambda) = 20 / 40
        assert_eq!(h.n_leaves(), 1);
        assert!((h.predict(&sample, 3) - 0.5).abs() < 1e-9);
    }


    #[test]
    fn zero_weight_rows_are_ignored() {
        let sample = step_sample();
        let gh = (0..20)
            .map(|i| {
                if i < 5 {
                    GradientHessian::default()
                } else {
                    GradientHessian::new(-2.0, 1.0)
                }
            })
            .collect::<Vec<_>>();

        let tree = RegressionTreeBuilder::new(&sample)
            .max_leaves(1)
            .lambda_l2(0.0)
            .build();
        let h = tree.produce(&sample, &gh[..]);
        assert!((h.predict(&sample, 0) - 2.0).abs() < 1e-9);
    }


    #[test]
    fn split_search_ignores_the_strategy() {
        let rows = (0..30)
            .map(|i| vec![(i % 7) as f64, (i / 3) as f64, ((i * 5) % 11) as f64])
            .collect::<Vec<_>>();
        let sample = Sample::from_dense_rows(rows).unwrap();
        let gh = (0..30)
            .map(|i| GradientHessian::new(((i * 13) % 9) as f64 - 4.0, 1.0))
            .collect::<Vec<_>>();

        let predictions = [
            ReductionStrategy::Sequential,
            ReductionStrategy::Parallel,
        ].map(|reduction| {
            let tree = RegressionTreeBuilder::new(&sample)
                .max_leaves(6)
                .lambda_l2(0.5)
                .reduction(reduction)
                .build();
            tree.produce(&sample, &gh[..]).predict_all(&sample)
        });
        assert_eq!(predictions[0], predictions[1]);
    }
}
