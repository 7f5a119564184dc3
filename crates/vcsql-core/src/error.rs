//! Translation errors

use thiserror::Error;
use vcsql_ast::ParseError;

#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("Malformed statement at line {line}: {reason}")]
    MalformedStatement { line: usize, reason: String },

    #[error("Unbalanced scope: {0}")]
    UnbalancedScope(String),

    #[error("Unknown message direction '{0}' (expected in, out, all or no)")]
    UnknownDirection(String),

    #[error("Expression references no table: {0}")]
    UnresolvedTableReference(String),

    #[error("Table '{0}' is referenced before it is created")]
    UnknownTable(String),

    #[error("Table '{0}' is written more than once in a superstep")]
    TableRedefined(String),

    #[error("Table '{0}' is reserved and cannot be assigned or used as a condition")]
    ReservedTable(String),

    #[error("Missing option: {0}")]
    MissingOption(String),

    #[error("Invalid option {key}: {reason}")]
    InvalidOption { key: String, reason: String },

    #[error("Parse error: {0}")]
    Parse(ParseError),
}

impl From<ParseError> for TranslateError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::MalformedStatement { line, reason } => {
                TranslateError::MalformedStatement { line, reason }
            }
            other => TranslateError::Parse(other),
        }
    }
}
