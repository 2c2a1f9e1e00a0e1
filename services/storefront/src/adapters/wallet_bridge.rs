//! services/storefront/src/adapters/wallet_bridge.rs
//!
//! This module contains the adapter for the browser's injected wallet.
//! It implements the `WalletProvider` port from the `core` crate by relaying
//! each EIP-1193 request over the connection's WebSocket and waiting for the
//! matching `wallet_response`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use bempolo_core::ports::{
    ChainDefinition, TransactionRequest, WalletError, WalletProvider, WalletResult,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::web::protocol::{ServerMessage, WalletRpcError};

/// JSON-RPC "internal error", used when the wallet's answer cannot be parsed.
const INTERNAL_ERROR_CODE: i64 = -32603;

type Reply = Result<Value, WalletRpcError>;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// Relays wallet requests to the browser. One bridge per connection.
pub struct WalletBridge {
    outbound: UnboundedSender<ServerMessage>,
    pending: Mutex<HashMap<u64, oneshot::Sender<Reply>>>,
    next_id: AtomicU64,
}

impl WalletBridge {
    /// Creates a new `WalletBridge` writing requests to `outbound`.
    pub fn new(outbound: UnboundedSender<ServerMessage>) -> Self {
        Self {
            outbound,
            pending: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Hands a `wallet_response` to the request waiting for it.
    /// Returns `false` when no request with that id is pending.
    pub fn resolve(&self, id: u64, result: Option<Value>, error: Option<WalletRpcError>) -> bool {
        let waiter = match self.pending.lock() {
            Ok(mut pending) => pending.remove(&id),
            Err(_) => return false,
        };
        let Some(waiter) = waiter else {
            warn!("Wallet response {} does not match a pending request", id);
            return false;
        };
        let reply = match error {
            Some(error) => Err(error),
            None => Ok(result.unwrap_or(Value::Null)),
        };
        if waiter.send(reply).is_err() {
            debug!("Wallet request {} was abandoned before its response arrived", id);
        }
        true
    }

    /// Fails every pending request, e.g. when the connection drops.
    pub fn disconnect(&self) {
        if let Ok(mut pending) = self.pending.lock() {
            pending.clear();
        }
    }

    pub fn pending_requests(&self) -> usize {
        self.pending.lock().map(|p| p.len()).unwrap_or(0)
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> WalletResult<T> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        self.pending
            .lock()
            .map_err(|_| WalletError::NoProvider)?
            .insert(id, tx);
        let _pending = PendingGuard { bridge: self, id };

        let request = ServerMessage::WalletRequest {
            id,
            method: method.to_string(),
            params,
        };
        if self.outbound.send(request).is_err() {
            return Err(WalletError::NoProvider);
        }
        debug!("Wallet request {} ({}) sent to browser", id, method);

        let reply = rx.await.map_err(|_| WalletError::NoProvider)?;
        let value = reply.map_err(|e| WalletError::from_rpc(e.code, e.message))?;
        serde_json::from_value(value).map_err(|e| WalletError::Rpc {
            code: INTERNAL_ERROR_CODE,
            message: format!("Unexpected {} result: {}", method, e),
        })
    }

    fn forget(&self, id: u64) {
        if let Ok(mut pending) = self.pending.lock() {
            pending.remove(&id);
        }
    }
}

/// Removes a request from the pending map however its call ends, including
/// when the caller stops waiting.
struct PendingGuard<'a> {
    bridge: &'a WalletBridge,
    id: u64,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.bridge.forget(self.id);
    }
}

//=========================================================================================
// `WalletProvider` Trait Implementation
//=========================================================================================

#[async_trait]
impl WalletProvider for WalletBridge {
    async fn request_accounts(&self) -> WalletResult<Vec<String>> {
        self.call("eth_requestAccounts", json!([])).await
    }

    async fn switch_chain(&self, chain_id: &str) -> WalletResult<()> {
        self.call::<Value>("wallet_switchEthereumChain", json!([{ "chainId": chain_id }]))
            .await
            .map(|_| ())
    }

    async fn add_chain(&self, definition: &ChainDefinition) -> WalletResult<()> {
        self.call::<Value>("wallet_addEthereumChain", json!([definition]))
            .await
            .map(|_| ())
    }

    async fn send_transaction(&self, request: &TransactionRequest) -> WalletResult<String> {
        self.call("eth_sendTransaction", json!([request])).await
    }
}
