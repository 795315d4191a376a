//! Error types for Repoident

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for Repoident operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for Repoident operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Remote URL does not match the accepted grammar
    #[error("Unable to parse remote URL: '{url}'")]
    UrlParse {
        /// The offending input
        url: String,
    },

    /// Repository root, HEAD file, or remote configuration was not found
    #[error("{0}")]
    NotFound(String),

    /// The matched remote section carries more than one url entry
    #[error("Remote '{remote}' has more than one url entry in {}", .path.display())]
    AmbiguousConfig {
        /// Name of the requested remote
        remote: String,
        /// Path of the configuration file that was scanned
        path: PathBuf,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
