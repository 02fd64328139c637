use minicbm::prelude::*;
use minicbm::{Error, Feature};
use polars::df;
use polars::prelude::NamedFrom;


/// Tests for `Sample`.
#[cfg(test)]
pub mod sample_construction {
    use super::*;

    #[test]
    fn sparse_rows_are_sorted_and_indexed_by_column() {
        let rows = vec![
            vec![(2, 3.0), (0, 1.0)],
            vec![(1, 0.0), (1, 0.0)],
            vec![(1, -2.0)],
        ];
        // Zero entries are dropped before the duplicate check.
        let sample = Sample::from_sparse_rows(rows, 3).unwrap();

        assert_eq!(sample.shape(), (3, 3));
        assert_eq!(sample.row(0), &[(0, 1.0), (2, 3.0)]);
        assert!(sample.row(1).is_empty());
        assert_eq!(sample.value(2, 1), -2.0);
        assert_eq!(sample.value(2, 0), 0.0);
        assert_eq!(sample.value(0, 1), 0.0);

        let column = sample.feature(2);
        assert!(column.is_sparse());
        assert_eq!(column[0], 3.0);
        assert_eq!(column[1], 0.0);
    }


    #[test]
    fn malformed_rows_are_rejected() {
        let duplicated = vec![vec![(0, 1.0), (0, 2.0)]];
        assert!(matches!(
            Sample::from_sparse_rows(duplicated, 2),
            Err(Error::ShapeMismatch(_))
        ));

        let out_of_range = vec![vec![(5, 1.0)]];
        assert!(Sample::from_sparse_rows(out_of_range, 2).is_err());

        let ragged = vec![vec![1.0, 2.0], vec![1.0]];
        assert!(Sample::from_dense_rows(ragged).is_err());
    }


    #[test]
    fn dense_rows_keep_nonzeroes() {
        let sample = Sample::from_dense_rows(vec![
            vec![0.0, 1.5],
            vec![2.0, 0.0],
        ]).unwrap();

        assert_eq!(sample.row(0), &[(1, 1.5)]);
        assert_eq!(sample.row(1), &[(0, 2.0)]);
        assert!(matches!(sample.feature(0), Feature::Dense(_)));
    }


    #[test]
    fn label_sets_are_distinct_in_order() {
        let sample = Sample::from_dense_rows(vec![vec![1.0]; 4])
            .unwrap()
            .with_labels(vec![vec![1], vec![], vec![1], vec![0, 2]], 3)
            .unwrap();

        let sets = sample.label_sets();
        assert_eq!(sets.len(), 3);
        assert_eq!(sets[0], MultiLabel::from_labels(3, [1]));
        assert!(sets[1].is_empty());
        assert_eq!(sets[2].to_string(), "{0, 2}");
        assert!(sample.contains_empty_label_set());
        assert_eq!(sample.label(3).cardinality(), 2);
    }


    #[test]
    fn labels_out_of_range_are_rejected() {
        let sample = Sample::from_dense_rows(vec![vec![1.0]; 2]).unwrap();
        assert!(sample.clone().with_labels(vec![vec![3], vec![]], 3).is_err());
        assert!(sample.with_labels(vec![vec![0]], 3).is_err());
    }


    #[test]
    fn dataframe_columns_become_dense_features() {
        let df = df!(
            "x" => &[1.0, 0.0, 2.5],
            "z" => &[0_i64, 3, 0]
        ).unwrap();
        let sample = Sample::from_dataframe(&df).unwrap();

        assert_eq!(sample.shape(), (3, 2));
        assert_eq!(sample.row(1), &[(1, 3.0)]);
        assert_eq!(sample.value(2, 0), 2.5);
        assert_eq!(sample.feature(1).name(), "z");
    }
}
