//! Lending domain errors

use thiserror::Error;

use core_kernel::{CoreError, MoneyError, PortError, TemporalError};

/// Errors returned by the loan accounting engine
///
/// Every failure reaches the caller; the engine never retries, since
/// replaying a payment blindly would post it twice.
#[derive(Debug, Error)]
pub enum LendingError {
    /// Rejected before any write: bad amount, rate, date or user id
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Referenced loan account or party does not exist
    #[error("Not found: {entity} with id {id}")]
    NotFound {
        entity: &'static str,
        id: String,
    },

    /// The operation is not allowed in the loan's current state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The ledger store failed or rejected the commit
    #[error("Persistence failure: {0}")]
    Persistence(#[source] PortError),

    /// The party directory failed for a reason other than "not found"
    #[error("Party directory failure: {0}")]
    Directory(#[source] PortError),
}

impl LendingError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        LendingError::InvalidArgument(message.into())
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        LendingError::InvalidState(message.into())
    }

    pub fn loan_not_found(id: impl std::fmt::Display) -> Self {
        LendingError::NotFound {
            entity: "LoanAccount",
            id: id.to_string(),
        }
    }

    pub fn party_not_found(id: impl std::fmt::Display) -> Self {
        LendingError::NotFound {
            entity: "Party",
            id: id.to_string(),
        }
    }

    /// Maps a party directory failure, keeping "not found" as `NotFound`
    pub fn from_directory(error: PortError, party_id: impl std::fmt::Display) -> Self {
        if error.is_not_found() {
            Self::party_not_found(party_id)
        } else {
            LendingError::Directory(error)
        }
    }
}

/// An overflow comes from balances the loan already holds, not from the
/// caller's input
impl From<MoneyError> for LendingError {
    fn from(error: MoneyError) -> Self {
        match error {
            MoneyError::Overflow => LendingError::InvalidState(error.to_string()),
            MoneyError::InvalidAmount(_) | MoneyError::InvalidRate(_) => {
                LendingError::InvalidArgument(error.to_string())
            }
        }
    }
}

impl From<TemporalError> for LendingError {
    fn from(error: TemporalError) -> Self {
        LendingError::InvalidArgument(error.to_string())
    }
}

impl From<CoreError> for LendingError {
    fn from(error: CoreError) -> Self {
        LendingError::InvalidArgument(error.to_string())
    }
}

impl From<PortError> for LendingError {
    fn from(error: PortError) -> Self {
        LendingError::Persistence(error)
    }
}
