use serde::{Serialize, Deserialize};
use tracing::info;

use crate::{
    Error,
    Result,
    Sample,
    ClassifierType,
    MLMeasures,
};
use crate::predictor::{
    Candidates,
    InstanceF1Predictor,
    PluginPredictor,
    SubsetAccuracyPredictor,
};
use crate::common::ReductionStrategy;
use crate::research::{IterationRecord, TrainingLogger};
use super::{
    checkpoint::Checkpoints,
    config::{AllowEmptyPolicy, Initialization, ResumeMode},
    builder::CBMBuilder,
    initializer::initialize,
    model::CBM,
    optimizer::{CBMOptimizer, OptimizerParams},
};

use std::path::PathBuf;
use std::time::Instant;


/// Subdirectory of `output_dir` that holds the model files.
const MODEL_DIR: &str = "model";


/// Everything a training run needs besides the data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    /// Number of clusters.
    pub n_clusters: usize,
    /// Family of the gate.
    pub multi_class_classifier_type: ClassifierType,
    /// Family of the per-label scorers.
    pub binary_classifier_type: ClassifierType,
    /// Allow-empty policy.
    pub allow_empty: AllowEmptyPolicy,
    /// Initialization of a fresh model.
    pub initialization: Initialization,
    /// Whether to resume from the latest checkpoint.
    pub resume: ResumeMode,
    /// Total number of EM iterations, including resumed ones.
    pub n_iterations: usize,
    /// Hyperparameters of the EM optimizer.
    pub optimizer: OptimizerParams,
    /// Model files go to `output_dir/model`.
    /// Nothing is written if `None`.
    pub output_dir: Option<PathBuf>,
    /// CSV file of the per-iteration log.
    pub log_file: Option<PathBuf>,
    /// Console log interval; `usize::MAX` silences the console.
    pub print_every: usize,
}


impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            n_clusters: 4,
            multi_class_classifier_type: ClassifierType::Boosting,
            binary_classifier_type: ClassifierType::Boosting,
            allow_empty: AllowEmptyPolicy::Auto,
            initialization: Initialization::Warm,
            resume: ResumeMode::Fresh,
            n_iterations: 10,
            optimizer: OptimizerParams::default(),
            output_dir: None,
            log_file: None,
            print_every: 1,
        }
    }
}


impl TrainConfig {
    /// Check the values of `self`.
    pub fn validate(&self) -> Result<()> {
        if self.n_clusters == 0 {
            return Err(Error::invalid("n_clusters", "must be positive"));
        }
        self.optimizer.validate()
    }
}


/// Drives EM training:
/// resume or build, initialize, iterate, log, checkpoint.
///
/// # Example
/// ```no_run
/// use minicbm::prelude::*;
///
/// # let train: Sample = unimplemented!();
/// # let test: Sample = unimplemented!();
/// let config = TrainConfig {
///     n_clusters: 8,
///     n_iterations: 20,
///     output_dir: Some("output".into()),
///     resume: ResumeMode::Auto,
///     ..TrainConfig::default()
/// };
/// let cbm = Trainer::new(config)
///     .unwrap()
///     .run(&train, Some(&test))
///     .unwrap();
/// ```
pub struct Trainer {
    config: TrainConfig,
}


impl Trainer {
    /// Construct a new trainer. Fails on invalid configuration values.
    pub fn new(config: TrainConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }


    /// Returns the configuration.
    #[inline]
    pub fn config(&self) -> &TrainConfig {
        &self.config
    }


    /// Returns the checkpoint store, if an output directory is set.
    pub fn checkpoints(&self) -> Result<Option<Checkpoints>> {
        self.config.output_dir.as_ref()
            .map(|dir| Checkpoints::new(dir.join(MODEL_DIR)))
            .transpose()
    }


    /// Loads the latest checkpoint according to the resume mode.
    fn resume(&self, checkpoints: Option<&Checkpoints>)
        -> Result<Option<(usize, CBM)>>
    {
        match self.config.resume {
            ResumeMode::Fresh => Ok(None),
            ResumeMode::Auto => match checkpoints {
                Some(checkpoints) => checkpoints.latest(),
                None => Ok(None),
            },
            ResumeMode::Resume => {
                let checkpoints = checkpoints.ok_or_else(|| {
                    Error::MissingCheckpoint(PathBuf::from(MODEL_DIR))
                })?;
                let latest = checkpoints.latest()?.ok_or_else(|| {
                    Error::MissingCheckpoint(checkpoints.dir().to_path_buf())
                })?;
                Ok(Some(latest))
            },
        }
    }


    /// Trains on `train` and returns the model.
    /// Subset accuracy on `test`, if given, is logged every iteration.
    pub fn run(&self, train: &Sample, test: Option<&Sample>) -> Result<CBM> {
        let config = &self.config;
        let checkpoints = self.checkpoints()?;

        let (completed, mut cbm, fresh) = match self.resume(checkpoints.as_ref())? {
            Some((completed, cbm)) => {
                info!("resuming with {completed} iterations completed");
                (completed, cbm, false)
            },
            None => {
                let cbm = CBMBuilder::new(train)
                    .n_clusters(config.n_clusters)
                    .multi_class_classifier_type(config.multi_class_classifier_type)
                    .binary_classifier_type(config.binary_classifier_type)
                    .allow_empty(config.allow_empty)
                    .build()?;
                (0, cbm, true)
            },
        };

        let mut logger = TrainingLogger::new().print_every(config.print_every);
        if let Some(path) = config.log_file.as_ref() {
            logger = logger.csv(path)?;
        }
        logger.print_stats("Conditional Bernoulli Mixture", &self.info(&cbm));

        let candidates = Candidates::support(train);
        let mut last = None;
        {
            let mut optimizer = CBMOptimizer::new(
                &mut cbm, train, config.optimizer.clone(),
            )?;
            if fresh {
                info!("start initialization ({})", config.initialization);
                initialize(&mut optimizer, config.initialization)?;
                info!("finish initialization");
            }

            logger.print_log_header();
            for iteration in (completed + 1)..=config.n_iterations {
                let now = Instant::now();
                let loss = optimizer.iterate()?;
                let millis = now.elapsed().as_millis();

                let model = optimizer.model();
                let reduction = config.optimizer.reduction;
                let train_accuracy = evaluate(
                    model, &candidates, train, reduction,
                )?.subset_accuracy;
                let test_accuracy = test
                    .map(|test| evaluate(model, &candidates, test, reduction))
                    .transpose()?
                    .map(|m| m.subset_accuracy);

                let record = IterationRecord {
                    iteration, loss, train_accuracy, test_accuracy, millis,
                };
                logger.log(&record)?;
                last = Some(record);

                if let Some(checkpoints) = checkpoints.as_ref() {
                    checkpoints.save(model, iteration)?;
                }
            }
        }
        logger.finish(last.as_ref())?;

        if let Some(checkpoints) = checkpoints.as_ref() {
            checkpoints.save_final(&cbm)?;
        }
        Ok(cbm)
    }


    fn info(&self, cbm: &CBM) -> Vec<(&'static str, String)> {
        let config = cbm.config();
        Vec::from([
            ("# of clusters", format!("{}", config.n_clusters)),
            ("# of labels", format!("{}", config.n_labels)),
            ("# of features", format!("{}", config.n_features)),
            ("Gate", format!("{}", config.multi_class_classifier_type)),
            ("Binary", format!("{}", config.binary_classifier_type)),
            ("Allow empty", format!("{}", config.allow_empty)),
            ("EM iterations", format!("{}", self.config.n_iterations)),
        ])
    }
}


/// Measures of both plugin predictors on `sample`.
/// Returns the subset-accuracy predictor's measures.
fn evaluate(
    cbm: &CBM,
    candidates: &Candidates,
    sample: &Sample,
    reduction: ReductionStrategy,
) -> Result<MLMeasures>
{
    let subset = SubsetAccuracyPredictor::new(cbm, candidates.clone())
        .reduction(reduction);
    let subset_measures = MLMeasures::evaluate(&subset, sample)?;
    info!("{}: {subset_measures}", subset.name());

    let f1 = InstanceF1Predictor::new(cbm, candidates.clone())
        .reduction(reduction);
    let f1_measures = MLMeasures::evaluate(&f1, sample)?;
    info!("{}: {f1_measures}", f1.name());

    Ok(subset_measures)
}
