use crate::util::mapper::Position;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while turning TOML text into a [`Table`](crate::Table).
///
/// Every error is fatal for the call that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The text could not be split into tokens.
    #[error("{message} at {position}")]
    Lex { message: String, position: Position },
    /// The tokens do not follow the TOML grammar.
    #[error("{message} at {position}")]
    Parse { message: String, position: Position },
    /// The document is well formed but breaks TOML key/table rules,
    /// or a value cannot be decoded.
    #[error("{message} at {position}")]
    Semantic { message: String, position: Position },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ErrorKind {
    Lex,
    Parse,
    Semantic,
}

impl Error {
    pub fn lex(message: impl Into<String>, position: Position) -> Self {
        Error::Lex {
            message: message.into(),
            position,
        }
    }

    pub fn parse(message: impl Into<String>, position: Position) -> Self {
        Error::Parse {
            message: message.into(),
            position,
        }
    }

    pub fn semantic(message: impl Into<String>, position: Position) -> Self {
        Error::Semantic {
            message: message.into(),
            position,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Lex { .. } => ErrorKind::Lex,
            Error::Parse { .. } => ErrorKind::Parse,
            Error::Semantic { .. } => ErrorKind::Semantic,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Error::Lex { message, .. }
            | Error::Parse { message, .. }
            | Error::Semantic { message, .. } => message,
        }
    }

    pub fn position(&self) -> Position {
        match self {
            Error::Lex { position, .. }
            | Error::Parse { position, .. }
            | Error::Semantic { position, .. } => *position,
        }
    }

    pub fn to_error_object(&self) -> ErrorObject {
        ErrorObject {
            kind: self.kind(),
            message: self.message().to_string(),
            position: self.position(),
        }
    }
}

/// Flat, serializable view of an [`Error`] for diagnostics tooling.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ErrorObject {
    pub kind: ErrorKind,
    pub message: String,
    pub position: Position,
}
