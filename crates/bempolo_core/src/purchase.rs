//! crates/bempolo_core/src/purchase.rs
//!
//! The purchase flow controller: `Payment -> Email -> Confirmation`.
//!
//! The payment step runs either as a timed demo or against the injected wallet
//! provider. A failed payment ends the session and sends the user to the error
//! view; a failed email delivery does not, because by then the user has paid.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tokio::sync::Mutex;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::chain::{polygon_chain_definition, usdt_transfer, POLYGON_CHAIN_ID};
use crate::domain::{
    Destination, DownloadRequest, Notification, PaymentMode, Product, PurchaseReceipt,
    PurchaseSnapshot, PurchaseStep, SessionStatus,
};
use crate::error::{FlowError, FlowResult, PaymentError};
use crate::ports::{DeliveryService, Navigator, NotificationSink, WalletError, WalletProvider};
use crate::pricing::{format_settlement, minor_units};
use crate::timer::SessionClock;

#[derive(Debug, Clone)]
pub struct FlowSettings {
    /// How long the demo payment pretends to take.
    pub demo_delay: Duration,
    /// Mode a new session starts in.
    pub initial_mode: PaymentMode,
}

impl Default for FlowSettings {
    fn default() -> Self {
        Self {
            demo_delay: Duration::from_millis(2500),
            initial_mode: PaymentMode::Live,
        }
    }
}

/// The external collaborators of one purchase session.
#[derive(Clone)]
pub struct FlowPorts {
    /// `None` when the browser has no injected wallet.
    pub wallet: Option<Arc<dyn WalletProvider>>,
    pub delivery: Arc<dyn DeliveryService>,
    pub notifier: Arc<dyn NotificationSink>,
    pub navigator: Arc<dyn Navigator>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    /// Payment went through; the session is now at `Email`.
    Paid { transaction_hash: Option<String> },
    /// A payment is already being processed.
    Ignored,
    /// The session was closed while the payment was pending.
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    /// Delivery failed but the flow moved on to `Confirmation` anyway.
    SoftFailure,
    Ignored,
    Cancelled,
}

struct PurchaseSession {
    product: Arc<Product>,
    step: PurchaseStep,
    status: SessionStatus,
    email: String,
    is_processing: bool,
    transaction_hash: Option<String>,
    clock: SessionClock,
}

impl PurchaseSession {
    fn ensure_active(&self) -> FlowResult<()> {
        if !self.status.is_active() {
            return Err(FlowError::SessionClosed);
        }
        Ok(())
    }

    fn invalid(&self, action: &'static str) -> FlowError {
        FlowError::InvalidTransition {
            action,
            state: format!("{:?}", self.step),
        }
    }
}

/// One purchase session. Cloning yields another handle to the same session,
/// so a surface can close it while a payment is pending.
#[derive(Clone)]
pub struct PurchaseFlow {
    id: Uuid,
    created_at: DateTime<Utc>,
    settings: FlowSettings,
    ports: FlowPorts,
    session: Arc<Mutex<PurchaseSession>>,
}

impl PurchaseFlow {
    pub fn open(product: Arc<Product>, ports: FlowPorts, settings: FlowSettings) -> Self {
        let id = Uuid::new_v4();
        info!("Purchase session {} opened for product {}", id, product.id);
        let session = PurchaseSession {
            product,
            step: PurchaseStep::Payment(settings.initial_mode),
            status: SessionStatus::Active,
            email: String::new(),
            is_processing: false,
            transaction_hash: None,
            clock: SessionClock::new(),
        };
        Self {
            id,
            created_at: Utc::now(),
            settings,
            ports,
            session: Arc::new(Mutex::new(session)),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub async fn snapshot(&self) -> PurchaseSnapshot {
        let session = self.session.lock().await;
        PurchaseSnapshot {
            session_id: self.id,
            product_id: session.product.id,
            step: session.step,
            status: session.status,
            email: session.email.clone(),
            is_processing: session.is_processing,
            transaction_hash: session.transaction_hash.clone(),
        }
    }

    /// Chooses between the demo and live payment paths. Only allowed before
    /// payment has started.
    pub async fn set_demo_mode(&self, enabled: bool) -> FlowResult<()> {
        let mut session = self.session.lock().await;
        session.ensure_active()?;
        if session.is_processing || !matches!(session.step, PurchaseStep::Payment(_)) {
            return Err(FlowError::ModeLocked);
        }
        let mode = if enabled { PaymentMode::Demo } else { PaymentMode::Live };
        session.step = PurchaseStep::Payment(mode);
        info!("Purchase session {} switched to {:?} payment", self.id, mode);
        Ok(())
    }

    //=====================================================================================
    // Payment
    //=====================================================================================

    pub async fn submit_payment(&self) -> FlowResult<PaymentOutcome> {
        let (ticket, mode, price) = {
            let mut session = self.session.lock().await;
            session.ensure_active()?;
            if session.is_processing {
                return Ok(PaymentOutcome::Ignored);
            }
            let mode = match session.step {
                PurchaseStep::Payment(mode) => mode,
                _ => return Err(session.invalid("submit payment")),
            };
            if mode == PaymentMode::Live && self.ports.wallet.is_none() {
                let err = PaymentError::ProviderUnavailable;
                warn!("Purchase session {}: {}", self.id, err);
                self.ports.notifier.notify(Notification::error(err.to_string()));
                return Err(err.into());
            }
            session.is_processing = true;
            (session.clock.ticket(), mode, session.product.price)
        };

        info!("Purchase session {} submitting {:?} payment", self.id, mode);
        let pending = async {
            match (mode, self.ports.wallet.as_deref()) {
                (PaymentMode::Live, Some(wallet)) => live_payment(wallet, price).await,
                _ => {
                    tokio::time::sleep(self.settings.demo_delay).await;
                    Ok(None)
                }
            }
        };
        let result = ticket.run(pending).await;

        let mut session = self.session.lock().await;
        let Some(result) = result.filter(|_| session.clock.accepts(&ticket)) else {
            info!("Purchase session {} closed during payment", self.id);
            return Ok(PaymentOutcome::Cancelled);
        };
        session.is_processing = false;

        match result {
            Ok(transaction_hash) => {
                session.step = PurchaseStep::Email;
                session.transaction_hash = transaction_hash.clone();
                let message = match mode {
                    PaymentMode::Demo => "Demo payment successful! Please provide your email.",
                    PaymentMode::Live => "Payment successful! Please provide your email.",
                };
                info!("Purchase session {} paid ({:?})", self.id, transaction_hash);
                self.ports.notifier.notify(Notification::success(message));
                Ok(PaymentOutcome::Paid { transaction_hash })
            }
            Err(err) => {
                error!("Purchase session {} payment failed: {}", self.id, err);
                session.status = SessionStatus::Abandoned;
                session.clock.shutdown();
                self.ports.notifier.notify(Notification::error(err.to_string()));
                self.ports.navigator.navigate(Destination::Error);
                Err(err.into())
            }
        }
    }

    //=====================================================================================
    // Email
    //=====================================================================================

    pub async fn submit_email(&self, address: &str) -> FlowResult<DeliveryOutcome> {
        let (ticket, request) = {
            let mut session = self.session.lock().await;
            session.ensure_active()?;
            if session.is_processing {
                return Ok(DeliveryOutcome::Ignored);
            }
            if session.step != PurchaseStep::Email {
                return Err(session.invalid("submit email"));
            }
            let email = address.trim();
            if email.is_empty() {
                self.ports
                    .notifier
                    .notify(Notification::error(FlowError::EmptyEmail.to_string()));
                return Err(FlowError::EmptyEmail);
            }
            session.email = email.to_string();
            session.is_processing = true;
            let request = DownloadRequest {
                email: session.email.clone(),
                product_id: session.product.id,
                product_name: session.product.name.clone(),
            };
            (session.clock.ticket(), request)
        };

        let result = ticket
            .run(self.ports.delivery.send_download_link(&request))
            .await;

        let mut session = self.session.lock().await;
        let Some(result) = result.filter(|_| session.clock.accepts(&ticket)) else {
            info!("Purchase session {} closed during delivery", self.id);
            return Ok(DeliveryOutcome::Cancelled);
        };
        session.is_processing = false;
        session.step = PurchaseStep::Confirmation;

        match result {
            Ok(()) => {
                info!("Download link for product {} sent", request.product_id);
                self.ports
                    .notifier
                    .notify(Notification::success("Download link sent to your email!"));
                Ok(DeliveryOutcome::Delivered)
            }
            Err(err) => {
                let err = FlowError::DeliveryFailed(err);
                warn!("Purchase session {}: {}; continuing", self.id, err);
                self.ports
                    .notifier
                    .notify(Notification::warning("Download link sent! (Demo mode)"));
                Ok(DeliveryOutcome::SoftFailure)
            }
        }
    }

    //=====================================================================================
    // Confirmation and teardown
    //=====================================================================================

    /// Completes the purchase and closes the session.
    pub async fn finish(&self) -> FlowResult<PurchaseReceipt> {
        let mut session = self.session.lock().await;
        session.ensure_active()?;
        if session.step != PurchaseStep::Confirmation {
            return Err(session.invalid("finish"));
        }
        session.status = SessionStatus::Completed;
        session.clock.shutdown();

        let receipt = PurchaseReceipt {
            session_id: self.id,
            product_id: session.product.id,
            product_name: session.product.name.clone(),
            email: session.email.clone(),
            amount: format_settlement(session.product.price),
            transaction_hash: session.transaction_hash.clone(),
            completed_at: Utc::now(),
        };
        info!("Purchase session {} completed", self.id);
        self.ports.navigator.navigate(Destination::ThankYou);
        Ok(receipt)
    }

    /// Dismisses the session. Pending timers and calls are discarded.
    pub async fn close(&self) {
        let mut session = self.session.lock().await;
        if !session.status.is_active() {
            return;
        }
        session.status = SessionStatus::Dismissed;
        session.is_processing = false;
        session.clock.shutdown();
        info!("Purchase session {} dismissed at {:?}", self.id, session.step);
    }
}

/// The live payment sequence against the injected wallet.
async fn live_payment(
    wallet: &dyn WalletProvider,
    price: Decimal,
) -> Result<Option<String>, PaymentError> {
    let accounts = wallet.request_accounts().await?;
    let from = accounts.into_iter().next().ok_or(PaymentError::NoAccounts)?;

    match wallet.switch_chain(POLYGON_CHAIN_ID).await {
        Ok(()) => {}
        Err(WalletError::UnrecognizedChain(code)) => {
            info!("Wallet does not know chain {} (code {}), registering it", POLYGON_CHAIN_ID, code);
            // A failed registration does not stop the payment; the transfer may
            // then be sent on whatever network the wallet is on.
            if let Err(err) = wallet.add_chain(&polygon_chain_definition()).await {
                warn!("Chain registration failed, proceeding anyway: {}", err);
            }
        }
        Err(err) => return Err(PaymentError::ChainSwitchFailed(err.to_string())),
    }

    let amount = minor_units(price)
        .ok_or_else(|| PaymentError::TransactionFailed(format!("invalid amount for price {price}")))?;
    let request =
        usdt_transfer(&from, amount).map_err(|e| PaymentError::TransactionFailed(e.to_string()))?;
    let transaction_hash = wallet.send_transaction(&request).await?;
    Ok(Some(transaction_hash))
}
