use crate::advisor::AdvisorError;
use crate::constants::ADVISOR_FAILURE_MESSAGE;
use crate::ledger::LedgerError;
use medichain_types::{IdentifierError, TextError};

#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Identifier(#[from] IdentifierError),
    #[error("{field} cannot be empty")]
    EmptyField {
        field: &'static str,
        #[source]
        source: TextError,
    },
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
    #[error("health advisor error: {0}")]
    Advisor(#[from] AdvisorError),
    #[error("store item {0} not found")]
    StoreItemNotFound(u64),
    #[error("Insufficient health coins (required {required}, available {available})")]
    InsufficientHealthCoins { required: u64, available: u64 },
}

/// Coarse classification of a [`PortalError`], used by the API layers to pick a status code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    NotFound,
    PermissionDenied,
    Conflict,
    Internal,
}

impl PortalError {
    pub(crate) fn empty(field: &'static str) -> impl FnOnce(TextError) -> Self {
        move |source| PortalError::EmptyField { field, source }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            PortalError::InvalidInput(_)
            | PortalError::Identifier(_)
            | PortalError::EmptyField { .. } => ErrorKind::InvalidInput,
            PortalError::Ledger(e) => e.kind(),
            PortalError::Advisor(AdvisorError::InvalidRequest(_)) => ErrorKind::InvalidInput,
            PortalError::Advisor(_) => ErrorKind::Internal,
            PortalError::StoreItemNotFound(_) => ErrorKind::NotFound,
            PortalError::InsufficientHealthCoins { .. } => ErrorKind::Conflict,
        }
    }

    /// The message shown to portal users.
    ///
    /// Internal failures collapse to a generic message; the detailed error is only logged.
    pub fn user_message(&self) -> String {
        match self {
            PortalError::Identifier(e) => e.to_string(),
            PortalError::Advisor(AdvisorError::InvalidRequest(msg)) => msg.clone(),
            PortalError::Advisor(_) => ADVISOR_FAILURE_MESSAGE.to_string(),
            PortalError::InsufficientHealthCoins { .. }
            | PortalError::Ledger(LedgerError::InsufficientHealthCoins { .. }) => {
                "Insufficient health coins".to_string()
            }
            PortalError::Ledger(LedgerError::Unavailable(_)) => {
                "The ledger is currently unavailable".to_string()
            }
            PortalError::Ledger(e) => e.to_string(),
            other => other.to_string(),
        }
    }
}

pub type PortalResult<T> = std::result::Result<T, PortalError>;
