//! Error types for ferrconf.

use thiserror::Error;

/// Main error type for ferrconf operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration text could not be parsed
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// A tree handed to the diff engine or builder is malformed
    #[error("Structural error: {0}")]
    Structural(#[from] StructuralError),

    /// Invalid regex pattern
    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Indentation parser errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A tab was found in the leading indentation of a line
    #[error("Tab in indentation at line {line}: '{content}'")]
    IndentTab { line: usize, content: String },
}

/// Errors raised when a tree cannot be compared or reduced.
///
/// These are never downgraded to an empty result: an empty diff must always
/// mean "already satisfied", not "comparison failed".
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructuralError {
    /// A node carries no command text
    #[error("Empty command at '{path}'")]
    EmptyCommand { path: String },

    /// Command text is not a single trimmed line
    #[error("Malformed command '{text}' at '{path}'")]
    MalformedCommand { path: String, text: String },

    /// A child is not indented deeper than its parent
    #[error("Child at depth {child_depth} is not nested under parent at depth {parent_depth} ('{path}')")]
    UnindentedChild {
        path: String,
        parent_depth: usize,
        child_depth: usize,
    },
}

/// Result type alias using ferrconf's Error.
pub type Result<T> = std::result::Result<T, Error>;
