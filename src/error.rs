//! Error types for tgmark operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the pipeline and its configuration layer.
///
/// Formatting itself never fails: malformed trees and unterminated code
/// blocks are absorbed where they occur.
#[derive(Error, Debug)]
pub enum Error {
    #[error("chunk limit {limit} is too small, must be at least {minimum}")]
    ChunkLimitTooSmall { limit: usize, minimum: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config {}: {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
