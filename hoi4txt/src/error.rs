//! Parse failures, each pointing at a token index.

use crate::{Operator, TxtToken};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// The file ended before the `{` at `opened_at` was closed.
    UnclosedBlock { opened_at: usize },
    /// A scalar was needed at `position`.
    ExpectedValue { position: usize, found: TxtToken },
    /// An operator with no key in front of it, e.g. `{ = 1 }`.
    OperatorWithoutKey { position: usize, operator: Operator },
    /// `key =` followed by `}`, another operator, or the end of the file.
    MissingValue { position: usize, key: String },
    /// The game stops reading at a `}` that closes nothing. `remaining` tokens
    /// after it were ignored.
    StrayClosingBrace { position: usize, remaining: usize },
    /// Only produced when rendering a hand-built tree.
    MalformedAssignment,
    EmptyInput,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::UnclosedBlock { opened_at } => {
                write!(f, "block opened at token {} is never closed", opened_at)
            }
            ParseError::ExpectedValue { position, found } => {
                write!(f, "expected a value at token {}, found {:?}", position, found)
            }
            ParseError::OperatorWithoutKey { position, operator } => write!(
                f,
                "'{}' at token {} has no key before it",
                operator.as_str(),
                position
            ),
            ParseError::MissingValue { position, key } => {
                write!(f, "'{}' has no value at token {}", key, position)
            }
            ParseError::StrayClosingBrace {
                position,
                remaining,
            } => write!(
                f,
                "stray '}}' at token {}, {} tokens after it ignored",
                position, remaining
            ),
            ParseError::MalformedAssignment => {
                write!(f, "assignment node needs a scalar key and a value")
            }
            ParseError::EmptyInput => write!(f, "nothing to parse"),
        }
    }
}

impl std::error::Error for ParseError {}
