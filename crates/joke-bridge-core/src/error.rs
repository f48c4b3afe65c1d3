use thiserror::Error;

use crate::ports::PortError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    #[error("wallet provider unavailable: {0}")]
    ProviderUnavailable(String),
    #[error("request rejected in wallet")]
    UserRejected,
    #[error("wallet not connected")]
    NotConnected,
    #[error("cannot switch wallet to chain {required}: {reason}")]
    Unswitchable { required: u64, reason: String },
    #[error("transaction failed: {0}")]
    TransactionFailed(String),
    #[error("bridge is not armed; mint a token first")]
    NotArmed,
    #[error("no complete joke to mint")]
    NoJoke,
    #[error("joke source failed: {0}")]
    JokeUnavailable(String),
    #[error("contract binding failed: {0}")]
    Binding(String),
}

impl FlowError {
    /// Conversion used at the boundary of transaction-submitting actions.
    pub fn from_tx_port(err: PortError) -> Self {
        match err {
            PortError::UserRejected => Self::UserRejected,
            PortError::NotFound(reason) | PortError::Policy(reason) => {
                Self::ProviderUnavailable(reason)
            }
            other => Self::TransactionFailed(other.to_string()),
        }
    }

    /// Conversion used while establishing a connection.
    pub fn from_connect_port(err: PortError) -> Self {
        match err {
            PortError::UserRejected => Self::UserRejected,
            PortError::NotFound(reason) | PortError::Policy(reason) => {
                Self::ProviderUnavailable(reason)
            }
            other => Self::ProviderUnavailable(other.to_string()),
        }
    }

    pub fn is_user_rejection(&self) -> bool {
        matches!(self, Self::UserRejected)
    }
}
