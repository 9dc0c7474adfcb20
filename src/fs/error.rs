use std::{io, path::PathBuf};

use thiserror::Error;

/// Error type for loading benchmark inputs and configuration from disk
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file could not be read
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The bytes are not a readable `.npy` array of `f32`
    #[error("invalid npy data: {0}")]
    Npy(#[source] io::Error),

    /// The file is a well-formed `.npy` array, but not of `f32`
    #[error("unsupported npy dtype: {0}")]
    DType(#[from] npyz::DTypeError),

    /// The array has a shape that cannot be used as a source buffer
    #[error("unsupported array shape {0:?}")]
    Shape(Vec<u64>),

    /// The probe configuration is not valid JSON for `AlignmentProbe`
    #[error("invalid probe configuration: {0}")]
    Json(#[from] serde_json::Error),
}
