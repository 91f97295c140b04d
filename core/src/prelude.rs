use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::moments::dataset::Dataset;
use crate::moments::raw::RawMoments;

/// Common error type for the fusion pipeline.
#[derive(thiserror::Error, Debug)]
pub enum ResampleError {
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("no moment files discovered for {0}")]
    NoInputData(String),
    #[error("structural defect in merged dataset: {0}")]
    Structural(String),
    #[error("moment file {path}: {reason}")]
    FileRead { path: PathBuf, reason: String },
}

pub type ResampleResult<T> = Result<T, ResampleError>;

/// Per-variable directive handed to the writer alongside the dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariableEncoding {
    pub compress: bool,
}

impl Default for VariableEncoding {
    fn default() -> Self {
        Self { compress: true }
    }
}

/// Reads one instrument file into its native coordinates and variables.
///
/// A failed read is recoverable: the merge step logs it and continues with
/// the remaining files of the day.
pub trait MomentReader {
    fn read(&self, path: &Path) -> ResampleResult<RawMoments>;
}

/// Persists a finalized dataset together with per-variable encodings.
pub trait MomentWriter {
    /// File suffix the writer produces, used to build the output path.
    fn extension(&self) -> &str;

    fn write(
        &self,
        path: &Path,
        dataset: &Dataset,
        encodings: &BTreeMap<String, VariableEncoding>,
    ) -> ResampleResult<()>;
}
