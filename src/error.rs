use thiserror::Error;

use crate::features::Layout;

/// Malformed expression text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at position {position}")]
pub struct ParseError {
    pub message: String,
    /// Character offset into the input.
    pub position: usize,
}

impl ParseError {
    pub fn new(message: impl Into<String>, position: usize) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

#[derive(Debug, Error)]
pub enum ProverError {
    #[error("failed to parse expression {which}: {source}")]
    Parse {
        /// 1 or 2.
        which: usize,
        #[source]
        source: ParseError,
    },

    #[error("no pairwise policy was supplied")]
    PolicyUnavailable,

    #[error("max iterations must be between 1 and {max}, got {value}")]
    InvalidIterations { value: usize, max: usize },

    #[error("unknown strategy '{0}'")]
    InvalidStrategy(String),

    #[error("invalid policy model: {0}")]
    PolicyModel(String),

    #[error("the {role} policy reads {found} features, but is fed {expected} features")]
    PolicyLayout {
        role: &'static str,
        expected: Layout,
        found: Layout,
    },

    #[error("the expressions have {count} distinct variables, at most {max} are supported")]
    TooManyVariables { count: usize, max: usize },
}

impl From<serde_json::Error> for ProverError {
    fn from(e: serde_json::Error) -> Self {
        ProverError::PolicyModel(e.to_string())
    }
}
