//! Error types for the code generator.

use ppd_common::config::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

/// Error types for a generator run.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// Loading or validating the configuration failed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Writing an output file failed.
    #[error("Failed to write {path:?}: {source}")]
    Output {
        /// File being written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Serializing the build manifest failed.
    #[error("Failed to serialize manifest: {0}")]
    Manifest(#[from] serde_json::Error),
}
