//! services/storefront/src/web/state.rs
//!
//! Defines the service's shared and session-specific states.

use crate::adapters::{OutboundNavigator, OutboundNotifier, WalletBridge};
use crate::config::Config;
use crate::web::protocol::ServerMessage;
use bempolo_core::ports::{DeliveryService, WalletProvider};
use bempolo_core::{
    Catalog, FlowPorts, FlowSettings, Product, PurchaseFlow, SimulatorSettings, WalletSimulator,
};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::info;

//=========================================================================================
// AppState (Shared Across All Connections)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub config: Arc<Config>,
    pub delivery: Arc<dyn DeliveryService>,
    pub flow_settings: FlowSettings,
    pub simulator_settings: SimulatorSettings,
}

//=========================================================================================
// SessionState (Specific to One WebSocket Connection)
//=========================================================================================

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Unknown product {0}")]
    UnknownProduct(u32),
    #[error("Payment mode cannot change once payment has started")]
    ModeLocked,
}

/// The state for a single, active WebSocket connection.
pub struct SessionState {
    pub product: Arc<Product>,
    pub flow: PurchaseFlow,
    /// Present when the browser reported an injected wallet.
    pub wallet: Option<Arc<WalletBridge>>,
    pub simulator: Option<WalletSimulator>,
    /// Forwards simulator events to the client.
    pub simulator_task: Option<JoinHandle<()>>,
    pub outbound: UnboundedSender<ServerMessage>,
}

impl SessionState {
    /// Opens a purchase flow for `product_id`, wiring its ports to this connection.
    pub async fn new(
        app_state: &AppState,
        product_id: u32,
        wallet_available: bool,
        demo_mode: bool,
        outbound: UnboundedSender<ServerMessage>,
    ) -> Result<Self, SessionError> {
        let product = app_state
            .catalog
            .get(product_id)
            .ok_or(SessionError::UnknownProduct(product_id))?;

        let wallet = wallet_available.then(|| Arc::new(WalletBridge::new(outbound.clone())));
        let ports = FlowPorts {
            wallet: wallet.clone().map(|w| w as Arc<dyn WalletProvider>),
            delivery: app_state.delivery.clone(),
            notifier: Arc::new(OutboundNotifier::new(outbound.clone())),
            navigator: Arc::new(OutboundNavigator::new(outbound.clone())),
        };

        let flow = PurchaseFlow::open(product.clone(), ports, app_state.flow_settings.clone());
        info!("Purchase session {} opened at {}", flow.id(), flow.created_at());
        if demo_mode {
            flow.set_demo_mode(true)
                .await
                .map_err(|_| SessionError::ModeLocked)?;
        }

        Ok(Self {
            product,
            flow,
            wallet,
            simulator: None,
            simulator_task: None,
            outbound,
        })
    }

    /// Queues a message for the client. A closed connection is ignored.
    pub fn send(&self, message: ServerMessage) {
        let _ = self.outbound.send(message);
    }

    pub async fn send_purchase_state(&self) {
        let snapshot = self.flow.snapshot().await;
        self.send(ServerMessage::PurchaseState { snapshot });
    }

    /// Tears down everything the connection owns.
    pub async fn shutdown(&mut self) {
        self.flow.close().await;
        if let Some(simulator) = self.simulator.take() {
            let _ = simulator.cancel().await;
        }
        if let Some(task) = self.simulator_task.take() {
            task.abort();
        }
        if let Some(wallet) = &self.wallet {
            wallet.disconnect();
        }
        info!("Session {} shut down", self.flow.id());
    }
}
