use tracing::{debug, info};

use crate::Result;
use super::model::CBM;

use std::fs;
use std::path::{Path, PathBuf};


const PREFIX: &str = "iter.";
const SUFFIX: &str = ".model";
const FINAL: &str = "model";


/// Per-iteration model files in one directory.
///
/// The model after EM iteration `i` is stored as `iter.{i}.model`
/// and the final model as `model`.
#[derive(Clone, Debug)]
pub struct Checkpoints {
    dir: PathBuf,
}


impl Checkpoints {
    /// Use `dir` as the checkpoint directory, creating it if needed.
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }


    /// Returns the checkpoint directory.
    #[inline]
    pub fn dir(&self) -> &Path {
        &self.dir
    }


    /// Returns the path of the checkpoint of iteration `iteration`.
    pub fn path_for(&self, iteration: usize) -> PathBuf {
        self.dir.join(format!("{PREFIX}{iteration}{SUFFIX}"))
    }


    /// Returns the path of the final model.
    pub fn final_path(&self) -> PathBuf {
        self.dir.join(FINAL)
    }


    /// Writes the model after iteration `iteration`.
    pub fn save(&self, cbm: &CBM, iteration: usize) -> Result<PathBuf> {
        let path = self.path_for(iteration);
        cbm.save(&path)?;
        debug!("wrote checkpoint {}", path.display());
        Ok(path)
    }


    /// Writes the final model.
    pub fn save_final(&self, cbm: &CBM) -> Result<PathBuf> {
        let path = self.final_path();
        cbm.save(&path)?;
        info!("wrote the final model to {}", path.display());
        Ok(path)
    }


    /// Returns the completed iterations that have a checkpoint,
    /// in increasing order.
    pub fn iterations(&self) -> Result<Vec<usize>> {
        let mut iterations = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let iteration = name.to_str()
                .and_then(|s| s.strip_prefix(PREFIX))
                .and_then(|s| s.strip_suffix(SUFFIX))
                .and_then(|s| s.parse::<usize>().ok());
            if let Some(iteration) = iteration {
                iterations.push(iteration);
            }
        }
        iterations.sort_unstable();
        Ok(iterations)
    }


    /// Loads the checkpoint of the highest completed iteration,
    /// or returns `None` if the directory has none.
    pub fn latest(&self) -> Result<Option<(usize, CBM)>> {
        let Some(iteration) = self.iterations()?.last().copied() else {
            return Ok(None);
        };
        let cbm = CBM::load(self.path_for(iteration))?;
        info!("loaded the checkpoint of iteration {iteration}");
        Ok(Some((iteration, cbm)))
    }
}
