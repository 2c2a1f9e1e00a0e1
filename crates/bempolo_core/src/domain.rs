//! crates/bempolo_core/src/domain.rs
//!
//! Defines the pure, core data structures for the storefront.
//! These structs are independent of any transport or wire format; the serde
//! derives only describe how snapshots look when a surface chooses to send them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A catalog entry. Prices are in the display currency (BEMP).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: u32,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub image: String,
}

//=========================================================================================
// Purchase Flow
//=========================================================================================

/// How the payment step is carried out. Chosen before payment begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMode {
    /// Timer-based simulation that always succeeds.
    Demo,
    /// Real interaction with the injected wallet provider.
    Live,
}

/// The visible step of a purchase session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", content = "mode", rename_all = "snake_case")]
pub enum PurchaseStep {
    Payment(PaymentMode),
    Email,
    Confirmation,
}

/// Lifecycle of a session, independent of the step it stopped at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Active,
    /// `finish()` was called from `Confirmation`.
    Completed,
    /// A hard payment failure ended the session.
    Abandoned,
    /// Closed by the user before completion.
    Dismissed,
}

impl SessionStatus {
    pub fn is_active(self) -> bool {
        self == SessionStatus::Active
    }
}

/// A point-in-time view of a purchase session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurchaseSnapshot {
    pub session_id: Uuid,
    pub product_id: u32,
    pub step: PurchaseStep,
    pub status: SessionStatus,
    pub email: String,
    pub is_processing: bool,
    pub transaction_hash: Option<String>,
}

/// What the caller receives when a purchase finishes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurchaseReceipt {
    pub session_id: Uuid,
    pub product_id: u32,
    pub product_name: String,
    pub email: String,
    /// Settlement amount in USDT, 3 decimals.
    pub amount: String,
    pub transaction_hash: Option<String>,
    pub completed_at: DateTime<Utc>,
}

//=========================================================================================
// Wallet Simulator
//=========================================================================================

/// Steps of the scripted wallet popup, in visiting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimStep {
    Connect,
    NetworkSwitch,
    TransactionConfirm,
    Processing,
    Success,
}

impl SimStep {
    pub fn is_terminal(self) -> bool {
        self == SimStep::Success
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationStatus {
    Active,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationSnapshot {
    pub step: SimStep,
    pub status: SimulationStatus,
    pub is_processing: bool,
    /// Empty until the confirm step runs.
    pub transaction_hash: String,
    /// Price plus simulated gas, 2 decimals.
    pub total: String,
}

/// Signals the simulator sends to whoever opened it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SimulatorEvent {
    StepChanged { step: SimStep },
    Completed { transaction_hash: String },
    Closed { completed: bool },
}

//=========================================================================================
// Outbound signals
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Success,
    /// Soft failure: reported, but the flow keeps going.
    Warning,
    Error,
}

/// A transient user-facing message (a toast, in the browser).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }
}

/// Views the flow asks the surrounding router to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Destination {
    Error,
    ThankYou,
}

/// The body of a download-link delivery request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadRequest {
    pub email: String,
    pub product_id: u32,
    pub product_name: String,
}
