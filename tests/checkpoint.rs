use minicbm::prelude::*;
use minicbm::Error;

use std::fs;


fn toy_sample(n_sample: usize) -> Sample {
    let rows = (0..n_sample)
        .map(|i| vec![(i % 4, 1.0 + (i % 4) as f64), (4, (i % 3) as f64)])
        .collect::<Vec<_>>();
    let labels = (0..n_sample)
        .map(|i| {
            match i % 4 {
                0 => vec![0],
                1 => vec![1, 2],
                2 => vec![0, 2],
                _ => vec![2],
            }
        })
        .collect::<Vec<_>>();
    Sample::from_sparse_rows(rows, 5)
        .unwrap()
        .with_labels(labels, 3)
        .unwrap()
}


fn config(dir: &std::path::Path, n_iterations: usize, resume: ResumeMode)
    -> TrainConfig
{
    TrainConfig {
        n_clusters: 2,
        n_iterations,
        resume,
        output_dir: Some(dir.to_path_buf()),
        print_every: usize::MAX,
        ..TrainConfig::default()
    }
}


/// Tests for checkpoints and resumed training.
#[cfg(test)]
pub mod checkpoints {
    use super::*;

    #[test]
    fn every_iteration_is_saved() {
        let sample = toy_sample(24);
        let dir = tempfile::tempdir().unwrap();
        let trainer = Trainer::new(config(dir.path(), 2, ResumeMode::Fresh))
            .unwrap();
        let cbm = trainer.run(&sample, Some(&sample)).unwrap();

        let model_dir = dir.path().join("model");
        assert!(model_dir.join("iter.1.model").exists());
        assert!(model_dir.join("iter.2.model").exists());
        assert!(model_dir.join("model").exists());

        let checkpoints = trainer.checkpoints().unwrap().unwrap();
        assert_eq!(checkpoints.iterations().unwrap(), vec![1, 2]);

        let (iteration, latest) = checkpoints.latest().unwrap().unwrap();
        assert_eq!(iteration, 2);
        assert_eq!(latest, cbm);
        assert_eq!(CBM::load(checkpoints.final_path()).unwrap(), cbm);
    }


    #[test]
    fn latest_is_the_highest_iteration() {
        let sample = toy_sample(8);
        let cbm = CBMBuilder::new(&sample).n_clusters(2).build().unwrap();

        let dir = tempfile::tempdir().unwrap();
        let checkpoints = Checkpoints::new(dir.path()).unwrap();
        assert!(checkpoints.latest().unwrap().is_none());

        for iteration in [2, 10, 9] {
            checkpoints.save(&cbm, iteration).unwrap();
        }
        fs::write(dir.path().join("iter.x.model"), "not a model").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();

        assert_eq!(checkpoints.iterations().unwrap(), vec![2, 9, 10]);
        let (iteration, _) = checkpoints.latest().unwrap().unwrap();
        assert_eq!(iteration, 10);
    }


    #[test]
    fn resuming_without_a_checkpoint_fails() {
        let sample = toy_sample(8);
        let dir = tempfile::tempdir().unwrap();
        let trainer = Trainer::new(config(dir.path(), 2, ResumeMode::Resume))
            .unwrap();
        assert!(matches!(
            trainer.run(&sample, None),
            Err(Error::MissingCheckpoint(_))
        ));
    }


    #[test]
    fn auto_resume_continues_the_run() {
        let sample = toy_sample(24);
        let dir = tempfile::tempdir().unwrap();

        // Nothing to resume from yet: starts fresh.
        Trainer::new(config(dir.path(), 1, ResumeMode::Auto))
            .unwrap()
            .run(&sample, None)
            .unwrap();
        let model_dir = dir.path().join("model");
        assert!(model_dir.join("iter.1.model").exists());
        assert!(!model_dir.join("iter.2.model").exists());

        Trainer::new(config(dir.path(), 3, ResumeMode::Auto))
            .unwrap()
            .run(&sample, None)
            .unwrap();
        assert!(model_dir.join("iter.2.model").exists());
        assert!(model_dir.join("iter.3.model").exists());
    }


    #[test]
    fn the_csv_log_has_one_row_per_iteration() {
        let sample = toy_sample(24);
        let dir = tempfile::tempdir().unwrap();
        let log_file = dir.path().join("log.csv");
        let config = TrainConfig {
            log_file: Some(log_file.clone()),
            output_dir: None,
            ..config(dir.path(), 3, ResumeMode::Fresh)
        };
        Trainer::new(config).unwrap().run(&sample, Some(&sample)).unwrap();

        let text = fs::read_to_string(&log_file).unwrap();
        let lines = text.lines().collect::<Vec<_>>();
        assert_eq!(lines[0], "Iteration,Loss,TrainSubsetAcc,TestSubsetAcc,Time");
        assert_eq!(lines.len(), 1 + 3);
        assert!(lines[1].starts_with("1,"));
        assert_eq!(lines[3].split(',').count(), 5);
        assert!(!dir.path().join("model").exists());
    }
}
