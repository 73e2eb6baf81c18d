//! Errors raised by the ledger engine and the storage layer.
//!
//! Every error maps onto one of four [`ErrorKind`]s, independent of the transport that
//! surfaces it:
//!
//! - [`NotFound`] a household, member or expense index does not exist.
//! - [`Validation`] a request field is missing, empty or malformed.
//! - [`Conflict`] a household with the same name already exists.
//! - [`Internal`] an invariant broke or the store failed. Never caused by user input.
//!
//!  [`NotFound`]: ErrorKind::NotFound
//!  [`Validation`]: ErrorKind::Validation
//!  [`Conflict`]: ErrorKind::Conflict
//!  [`Internal`]: ErrorKind::Internal
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Validation,
    Conflict,
    Internal,
}

impl ErrorKind {
    /// Status code a HTTP shell should answer with.
    pub fn http_status(self) -> u16 {
        match self {
            ErrorKind::NotFound => 404,
            ErrorKind::Validation => 400,
            ErrorKind::Conflict => 409,
            ErrorKind::Internal => 500,
        }
    }

    /// Process exit code used by the command line shell.
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorKind::Internal => 1,
            ErrorKind::Validation => 2,
            ErrorKind::Conflict => 3,
            ErrorKind::NotFound => 4,
        }
    }
}

/// Engine errors. All of them except [`LedgerError::InvariantViolation`] are detected before
/// any state is touched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Household '{0}' not found")]
    HouseholdNotFound(String),
    #[error("Member '{0}' not found in household")]
    MemberNotFound(String),
    #[error("Expense {0} not found")]
    ExpenseNotFound(usize),
    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },
    #[error("Household '{0}' already exists")]
    HouseholdExists(String),
    #[error("Invariant violated: {0}")]
    InvariantViolation(String),
}

impl LedgerError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        LedgerError::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::HouseholdNotFound(_)
            | LedgerError::MemberNotFound(_)
            | LedgerError::ExpenseNotFound(_) => ErrorKind::NotFound,
            LedgerError::Validation { .. } => ErrorKind::Validation,
            LedgerError::HouseholdExists(_) => ErrorKind::Conflict,
            LedgerError::InvariantViolation(_) => ErrorKind::Internal,
        }
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("io error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode households: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("store lock poisoned")]
    Poisoned,
}

/// Error returned by [`crate::HouseholdService`] operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Ledger(e) => e.kind(),
            Error::Store(_) => ErrorKind::Internal,
        }
    }

    /// Message that is safe to show to a caller. Internal failures are reduced to a generic
    /// text; log the error itself for the details.
    pub fn public_message(&self) -> String {
        match self.kind() {
            ErrorKind::Internal => String::from("An internal error occurred"),
            _ => self.to_string(),
        }
    }

    /// The engine error, if this is not a storage failure.
    pub fn as_ledger(&self) -> Option<&LedgerError> {
        match self {
            Error::Ledger(e) => Some(e),
            Error::Store(_) => None,
        }
    }
}
