//! Error handling for sttfs.
//! Defines the error type and result alias used by every stage of the pipeline.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while tokenizing, parsing or generating a file system tree.
///
/// Lex and parse errors abort the pipeline before anything touches the disk.
/// Generation errors abort a run midway; whatever was created so far stays.
#[derive(Error, Debug)]
pub enum Error {
    /// Represents errors that occur during file system operations
    #[error("IO error: {0}.")]
    IoError(#[from] io::Error),

    /// Unterminated string literal or placeholder in the source text
    #[error("Lex error: {message} at line {line}, column {column}.")]
    LexError {
        message: String,
        line: usize,
        column: usize,
    },

    /// Unexpected or missing token while building the syntax tree
    #[error("Parse error: {message} at line {line}, column {column}.")]
    ParseError {
        message: String,
        line: usize,
        column: usize,
    },

    /// A directory or file could not be created or written
    #[error("Generation error: {message} '{}': {source}.", path.display())]
    GenerationError {
        message: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// File content cannot be represented in the requested encoding
    #[error("Encoding error: {0}.")]
    EncodingError(String),

    /// Represents errors that occur during configuration parsing or processing
    #[error("Configuration error: {0}.")]
    ConfigError(String),

    /// The syntax tree could not be serialized
    #[error("Export error: {0}.")]
    ExportError(#[from] serde_json::Error),
}

impl Error {
    /// Wraps a filesystem failure for `path` as a [`Error::GenerationError`].
    pub fn generation<P: Into<PathBuf>>(message: &str, path: P, source: io::Error) -> Self {
        Error::GenerationError {
            message: message.to_string(),
            path: path.into(),
            source,
        }
    }
}

/// Convenience type alias for Results with [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;
