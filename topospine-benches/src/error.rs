//! Benchmark setup error type.

use crate::source::SyntheticError;
use topospine_core::{SampleSetError, TopoSpineError};

/// Errors that may occur during benchmark setup.
#[derive(Debug, thiserror::Error)]
pub enum BenchSetupError {
    /// Synthetic field generation failed.
    #[error("synthetic field generation failed: {0}")]
    Synthetic(#[from] SyntheticError),
    /// The generated samples were rejected.
    #[error("sample set construction failed: {0}")]
    SampleSet(#[from] SampleSetError),
    /// Pipeline configuration or execution failed.
    #[error("pipeline failed: {0}")]
    Pipeline(#[from] TopoSpineError),
}
