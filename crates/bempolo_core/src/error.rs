//! crates/bempolo_core/src/error.rs
//!
//! Error taxonomy of the purchase and simulator flows.

use crate::ports::{PortError, WalletError};

/// Failures of the payment step.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaymentError {
    #[error("MetaMask not detected. Please install MetaMask.")]
    ProviderUnavailable,
    #[error("User rejected the request.")]
    UserRejected,
    #[error("No accounts found")]
    NoAccounts,
    #[error("Failed to switch network: {0}")]
    ChainSwitchFailed(String),
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),
}

impl PaymentError {
    /// Whether the failure ends the session. A missing provider leaves the
    /// user on the payment screen.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PaymentError::ProviderUnavailable)
    }
}

impl From<WalletError> for PaymentError {
    fn from(err: WalletError) -> Self {
        match err {
            WalletError::NoProvider => PaymentError::ProviderUnavailable,
            WalletError::UserRejected => PaymentError::UserRejected,
            other => PaymentError::TransactionFailed(other.to_string()),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error(transparent)]
    Payment(#[from] PaymentError),
    /// Recovered locally: the flow proceeds as if delivery succeeded.
    #[error("Download link delivery failed: {0}")]
    DeliveryFailed(#[from] PortError),
    #[error("Please enter your email address.")]
    EmptyEmail,
    #[error("Cannot {action} while in {state}")]
    InvalidTransition { action: &'static str, state: String },
    #[error("Payment mode cannot change once payment has started")]
    ModeLocked,
    #[error("Session is closed")]
    SessionClosed,
}

/// A convenience type alias for `Result<T, FlowError>`.
pub type FlowResult<T> = Result<T, FlowError>;
