//! crates/bempolo_core/src/ports.rs
//!
//! Defines the service contracts (traits) the flows consume.
//! These traits form the boundary of the core: the browser's injected wallet,
//! the email-delivery endpoint, toast display and page routing are all reached
//! through them, so the flows can be driven by fakes in tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{Destination, DownloadRequest, Notification};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for non-wallet port operations.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Unexpected response status: {0}")]
    Status(u16),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Wallet Provider
//=========================================================================================

/// EIP-1193 code for a request the user declined.
pub const USER_REJECTED_CODE: i64 = 4001;
/// EIP-3326 code for a chain the wallet does not know about.
pub const UNRECOGNIZED_CHAIN_CODE: i64 = 4902;

/// Failures reported by a wallet provider.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WalletError {
    #[error("No wallet provider is available")]
    NoProvider,
    #[error("User rejected the request")]
    UserRejected,
    #[error("Unrecognized chain (code {0})")]
    UnrecognizedChain(i64),
    #[error("Insufficient funds for transfer")]
    InsufficientFunds,
    #[error("Wallet error {code}: {message}")]
    Rpc { code: i64, message: String },
}

impl WalletError {
    /// Maps an EIP-1193 provider error onto the wallet taxonomy.
    pub fn from_rpc(code: i64, message: impl Into<String>) -> Self {
        let message = message.into();
        match code {
            USER_REJECTED_CODE => WalletError::UserRejected,
            UNRECOGNIZED_CHAIN_CODE => WalletError::UnrecognizedChain(code),
            _ if message.to_lowercase().contains("insufficient funds") => {
                WalletError::InsufficientFunds
            }
            _ => WalletError::Rpc { code, message },
        }
    }
}

pub type WalletResult<T> = Result<T, WalletError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// Parameters of `wallet_addEthereumChain`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainDefinition {
    pub chain_id: String,
    pub chain_name: String,
    pub native_currency: NativeCurrency,
    pub rpc_urls: Vec<String>,
    pub block_explorer_urls: Vec<String>,
}

/// Parameters of `eth_sendTransaction`. Gas is a hex quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub from: String,
    pub to: String,
    pub data: String,
    pub gas: String,
}

/// The browser-injected wallet, passed to the flow explicitly.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Asks the user to expose their accounts.
    async fn request_accounts(&self) -> WalletResult<Vec<String>>;

    async fn switch_chain(&self, chain_id: &str) -> WalletResult<()>;

    async fn add_chain(&self, definition: &ChainDefinition) -> WalletResult<()>;

    /// Submits a transaction and returns its hash.
    async fn send_transaction(&self, request: &TransactionRequest) -> WalletResult<String>;
}

//=========================================================================================
// Other Service Ports
//=========================================================================================

#[async_trait]
pub trait DeliveryService: Send + Sync {
    /// Asks the delivery endpoint to email a download link.
    async fn send_download_link(&self, request: &DownloadRequest) -> PortResult<()>;
}

/// Fire-and-forget toast display. Not queryable.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Page routing owned by the surrounding surface.
pub trait Navigator: Send + Sync {
    fn navigate(&self, destination: Destination);
}
