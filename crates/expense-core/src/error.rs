use std::fmt::Display;

use thiserror::Error;

use crate::verify::IntegrityViolation;

/// Rejected transaction input. Nothing is staged when one of these is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("user id must not be empty")]
    EmptyUserId,
    #[error("amount must be a non-negative number, got {0}")]
    InvalidAmount(f64),
    #[error("unknown category `{0}` (expected one of Food, Transportation, Entertainment, Others)")]
    UnknownCategory(String),
    #[error("invalid date `{0}`, expected YYYY-MM-DD")]
    InvalidDate(String),
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("invalid transaction: {0}")]
    Validation(#[from] ValidationError),

    #[error("failed to persist ledger at {location}: {source}")]
    Persistence {
        location: String,
        #[source]
        source: std::io::Error,
    },

    /// The stored document could not be decoded into a chain. The location
    /// stays unusable until the file is repaired by hand.
    #[error("corrupt ledger at {location}: {reason}")]
    CorruptLedger { location: String, reason: String },

    #[error(transparent)]
    Integrity(#[from] IntegrityViolation),

    #[error("invalid block: {0}")]
    InvalidBlock(String),

    #[error("failed to encode block content: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl LedgerError {
    pub fn persistence(location: impl Display, source: std::io::Error) -> Self {
        LedgerError::Persistence {
            location: location.to_string(),
            source,
        }
    }

    pub fn corrupt(location: impl Display, reason: impl Display) -> Self {
        LedgerError::CorruptLedger {
            location: location.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T, E = LedgerError> = std::result::Result<T, E>;
