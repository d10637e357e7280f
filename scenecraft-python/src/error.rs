//! Error types for the safety validator

use thiserror::Error;

use crate::parser::SyntaxIssue;

/// Reasons a script is refused before execution
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnsafeCodeError {
    /// The script does not parse
    #[error("Generated code is not valid Python ({0}).")]
    SyntaxInvalid(SyntaxIssue),

    /// The safety policy denied a construct
    #[error("{reason}")]
    Denied {
        /// Human-readable reason naming the offending module or call
        reason: String,
        /// 1-based line of the offending construct
        line: usize,
    },

    /// The parser could not be initialized; treated as a rejection
    #[error("Python parser unavailable: {0}")]
    ParserUnavailable(String),
}

impl UnsafeCodeError {
    /// Check if this rejection came from a syntax error
    pub fn is_syntax_error(&self) -> bool {
        matches!(self, Self::SyntaxInvalid(_))
    }
}
