//! services/storefront/src/web/protocol.rs
//!
//! Defines the WebSocket message protocol between the browser storefront and
//! the service. The browser renders whatever the service reports and relays
//! wallet requests to its injected provider.

use bempolo_core::{
    Destination, NotificationLevel, PriceQuote, Product, PurchaseReceipt, PurchaseSnapshot,
    SimulationSnapshot, SimulatorEvent,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

//=========================================================================================
// Messages Sent FROM the Client (Browser) TO the Server
//=========================================================================================

/// An EIP-1193 error as reported by the browser's wallet.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct WalletRpcError {
    pub code: i64,
    pub message: String,
}

/// Represents the structured text messages a client can send to the server.
#[derive(Deserialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Opens the payment flow for a product. This must be the first message sent
    /// on the connection.
    Init {
        product_id: u32,
        /// Whether the page detected an injected wallet.
        #[serde(default)]
        wallet_available: bool,
        #[serde(default)]
        demo_mode: bool,
    },

    /// Toggles demo mode before payment starts.
    SetDemoMode { enabled: bool },

    SubmitPayment,

    SubmitEmail { email: String },

    /// Leaves the confirmation screen.
    Finish,

    /// Dismisses the payment modal.
    Close,

    /// The wallet's answer to a `wallet_request`. Exactly one of `result` and
    /// `error` is expected.
    WalletResponse {
        id: u64,
        #[serde(default)]
        result: Option<Value>,
        #[serde(default)]
        error: Option<WalletRpcError>,
    },

    SimulatorOpen,
    SimulatorConnect,
    SimulatorSwitchNetwork,
    SimulatorConfirm,
    SimulatorComplete,
    SimulatorCancel,
}

//=========================================================================================
// Messages Sent FROM the Server TO the Client (Browser)
//=========================================================================================

/// Represents the structured text messages the server can send to the client.
#[derive(Serialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Confirms the purchase session was opened.
    SessionInitialized {
        session_id: Uuid,
        product: Product,
        quote: PriceQuote,
    },

    /// The purchase session after a change.
    PurchaseState { snapshot: PurchaseSnapshot },

    /// A toast to show.
    Notification {
        level: NotificationLevel,
        message: String,
    },

    /// A view the page should navigate to.
    Navigate { destination: Destination },

    /// A request to forward to the injected wallet (`window.ethereum.request`).
    WalletRequest {
        id: u64,
        method: String,
        params: Value,
    },

    /// Issued by `finish`.
    Receipt { receipt: PurchaseReceipt },

    SimulatorState { snapshot: SimulationSnapshot },

    SimulatorEvent { event: SimulatorEvent },

    /// Reports an error with the last client message.
    Error { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_init_with_defaults() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"init","product_id":3}"#).unwrap();
        match msg {
            ClientMessage::Init {
                product_id,
                wallet_available,
                demo_mode,
            } => {
                assert_eq!(product_id, 3);
                assert!(!wallet_available);
                assert!(!demo_mode);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn parses_wallet_error_response() {
        let msg: ClientMessage = serde_json::from_str(
            r#"{"type":"wallet_response","id":7,"error":{"code":4001,"message":"User rejected"}}"#,
        )
        .unwrap();
        match msg {
            ClientMessage::WalletResponse { id, result, error } => {
                assert_eq!(id, 7);
                assert!(result.is_none());
                assert_eq!(error.unwrap().code, 4001);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn parses_unit_commands() {
        for (raw, expected) in [
            ("submit_payment", "SubmitPayment"),
            ("simulator_switch_network", "SimulatorSwitchNetwork"),
            ("finish", "Finish"),
        ] {
            let msg: ClientMessage =
                serde_json::from_value(json!({ "type": raw })).unwrap();
            assert_eq!(format!("{msg:?}"), expected);
        }
    }

    #[test]
    fn serializes_wallet_request() {
        let msg = ServerMessage::WalletRequest {
            id: 1,
            method: "eth_requestAccounts".to_string(),
            params: json!([]),
        };
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({"type": "wallet_request", "id": 1, "method": "eth_requestAccounts", "params": []})
        );
    }

    #[test]
    fn serializes_navigation() {
        let msg = ServerMessage::Navigate {
            destination: Destination::ThankYou,
        };
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({"type": "navigate", "destination": "thank_you"})
        );
    }
}
