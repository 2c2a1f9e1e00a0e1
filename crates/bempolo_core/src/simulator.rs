//! crates/bempolo_core/src/simulator.rs
//!
//! A scripted wallet popup used to demonstrate the payment UX without a real
//! wallet. The script is linear and never fails:
//! `Connect -> NetworkSwitch -> TransactionConfirm -> Processing -> Success`.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info};

use crate::chain::generate_transaction_hash;
use crate::domain::{Product, SimStep, SimulationSnapshot, SimulationStatus, SimulatorEvent};
use crate::error::{FlowError, FlowResult};
use crate::pricing::simulated_total;
use crate::timer::SessionClock;

/// Scripted latencies of the popup.
#[derive(Debug, Clone)]
pub struct SimulatorSettings {
    pub connect_delay: Duration,
    pub switch_delay: Duration,
    pub confirm_delay: Duration,
}

impl Default for SimulatorSettings {
    fn default() -> Self {
        Self {
            connect_delay: Duration::from_millis(1500),
            switch_delay: Duration::from_millis(2000),
            confirm_delay: Duration::from_millis(3000),
        }
    }
}

/// Result of asking the simulator to advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheduled {
    /// The transition started; the step changes when its timer fires.
    Started,
    /// A transition is already in progress.
    Ignored,
}

#[derive(Debug)]
struct SimulationSession {
    step: SimStep,
    status: SimulationStatus,
    is_processing: bool,
    transaction_hash: String,
    clock: SessionClock,
}

impl SimulationSession {
    fn new() -> Self {
        Self {
            step: SimStep::Connect,
            status: SimulationStatus::Active,
            is_processing: false,
            transaction_hash: String::new(),
            clock: SessionClock::new(),
        }
    }

    fn ensure_active(&self) -> FlowResult<()> {
        if self.status != SimulationStatus::Active {
            return Err(FlowError::SessionClosed);
        }
        Ok(())
    }

    fn ensure_step(&self, action: &'static str, expected: SimStep) -> FlowResult<()> {
        if self.step != expected {
            return Err(FlowError::InvalidTransition {
                action,
                state: format!("{:?}", self.step),
            });
        }
        Ok(())
    }
}

/// One simulator popup. Cloning yields another handle to the same session.
#[derive(Clone)]
pub struct WalletSimulator {
    product: Arc<Product>,
    settings: SimulatorSettings,
    session: Arc<Mutex<SimulationSession>>,
    events: mpsc::UnboundedSender<SimulatorEvent>,
}

impl WalletSimulator {
    /// Opens the popup at `Connect`. Events are delivered on the returned receiver.
    pub fn open(
        product: Arc<Product>,
        settings: SimulatorSettings,
    ) -> (Self, mpsc::UnboundedReceiver<SimulatorEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        info!("Wallet simulator opened for product {}", product.id);
        let _ = events.send(SimulatorEvent::StepChanged {
            step: SimStep::Connect,
        });
        let simulator = Self {
            product,
            settings,
            session: Arc::new(Mutex::new(SimulationSession::new())),
            events,
        };
        (simulator, receiver)
    }

    pub fn product(&self) -> &Arc<Product> {
        &self.product
    }

    pub async fn snapshot(&self) -> SimulationSnapshot {
        let session = self.session.lock().await;
        SimulationSnapshot {
            step: session.step,
            status: session.status,
            is_processing: session.is_processing,
            transaction_hash: session.transaction_hash.clone(),
            total: simulated_total(self.product.price),
        }
    }

    /// Starts over at `Connect`, discarding any pending timer.
    pub async fn reopen(&self) {
        let mut session = self.session.lock().await;
        session.clock.reset();
        session.step = SimStep::Connect;
        session.status = SimulationStatus::Active;
        session.is_processing = false;
        session.transaction_hash.clear();
        info!("Wallet simulator reopened at generation {}", session.clock.generation());
        let _ = self.events.send(SimulatorEvent::StepChanged {
            step: SimStep::Connect,
        });
    }

    pub async fn connect(&self) -> FlowResult<Scheduled> {
        self.advance("connect", SimStep::Connect, SimStep::NetworkSwitch, self.settings.connect_delay)
            .await
    }

    pub async fn switch_network(&self) -> FlowResult<Scheduled> {
        self.advance(
            "switch network",
            SimStep::NetworkSwitch,
            SimStep::TransactionConfirm,
            self.settings.switch_delay,
        )
        .await
    }

    /// Moves to `Processing` right away with a fresh transaction hash, then to
    /// `Success` once the confirmation delay elapses.
    pub async fn confirm(&self) -> FlowResult<Scheduled> {
        let mut session = self.session.lock().await;
        session.ensure_active()?;
        if session.is_processing {
            return Ok(Scheduled::Ignored);
        }
        session.ensure_step("confirm", SimStep::TransactionConfirm)?;

        session.is_processing = true;
        session.step = SimStep::Processing;
        session.transaction_hash = generate_transaction_hash();
        info!("Simulated transaction {} submitted", session.transaction_hash);
        let _ = self.events.send(SimulatorEvent::StepChanged {
            step: SimStep::Processing,
        });

        self.schedule(&mut session, self.settings.confirm_delay, SimStep::Success);
        Ok(Scheduled::Started)
    }

    /// Hands the result to the caller and closes the popup. Only valid at `Success`.
    pub async fn complete(&self) -> FlowResult<String> {
        let mut session = self.session.lock().await;
        session.ensure_active()?;
        session.ensure_step("complete", SimStep::Success)?;

        session.status = SimulationStatus::Completed;
        session.clock.shutdown();
        let transaction_hash = session.transaction_hash.clone();
        info!("Wallet simulator completed with {}", transaction_hash);
        let _ = self.events.send(SimulatorEvent::Completed {
            transaction_hash: transaction_hash.clone(),
        });
        let _ = self.events.send(SimulatorEvent::Closed { completed: true });
        Ok(transaction_hash)
    }

    /// Dismisses the popup from any non-terminal step.
    pub async fn cancel(&self) -> FlowResult<()> {
        let mut session = self.session.lock().await;
        session.ensure_active()?;
        if session.step.is_terminal() {
            return Err(FlowError::InvalidTransition {
                action: "cancel",
                state: format!("{:?}", session.step),
            });
        }

        session.clock.shutdown();
        session.status = SimulationStatus::Cancelled;
        session.is_processing = false;
        info!("Wallet simulator cancelled at {:?}", session.step);
        let _ = self.events.send(SimulatorEvent::Closed { completed: false });
        Ok(())
    }

    async fn advance(
        &self,
        action: &'static str,
        from: SimStep,
        to: SimStep,
        delay: Duration,
    ) -> FlowResult<Scheduled> {
        let mut session = self.session.lock().await;
        session.ensure_active()?;
        if session.is_processing {
            return Ok(Scheduled::Ignored);
        }
        session.ensure_step(action, from)?;

        session.is_processing = true;
        debug!("Simulator {} started, {:?} until {:?}", action, delay, to);
        self.schedule(&mut session, delay, to);
        Ok(Scheduled::Started)
    }

    /// Spawns the timer that completes the current transition.
    fn schedule(&self, session: &mut SimulationSession, delay: Duration, to: SimStep) {
        let ticket = session.clock.ticket();
        let state = Arc::clone(&self.session);
        let events = self.events.clone();

        let handle = tokio::spawn(async move {
            if !ticket.sleep(delay).await {
                return;
            }
            let mut session = state.lock().await;
            if !session.clock.accepts(&ticket) {
                debug!("Dropping stale simulator timer (generation {})", ticket.generation());
                return;
            }
            session.is_processing = false;
            session.step = to;
            info!("Wallet simulator moved to {:?}", to);
            let _ = events.send(SimulatorEvent::StepChanged { step: to });
        });
        session.clock.track(handle);
    }
}
