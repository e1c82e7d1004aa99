//! Crate-level error type.

use crate::config::ConfigError;
use crate::linkage::LinkageError;
use crate::parser::ParsingError;
use thiserror::Error;

/// Any error raised by this crate.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid merge events: {0}")]
    Linkage(#[from] LinkageError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("newick parsing failed: {0}")]
    Parsing(#[from] ParsingError),
}

/// Result alias using the crate [Error].
pub type Result<T> = std::result::Result<T, Error>;
