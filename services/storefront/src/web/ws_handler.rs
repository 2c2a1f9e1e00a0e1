//! services/storefront/src/web/ws_handler.rs
//!
//! This is the main entry point and control loop for a WebSocket connection.
//! Each connection drives one purchase session and, on request, one wallet
//! simulator. Long-running operations are spawned so the loop keeps reading
//! and can deliver `wallet_response` messages while a payment is in flight.

use crate::web::{
    protocol::{ClientMessage, ServerMessage},
    state::{AppState, SessionState},
};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use bempolo_core::{FlowError, FlowResult, PriceQuote, WalletSimulator};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// The handler for upgrading HTTP requests to WebSocket connections.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<Arc<AppState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, app_state))
}

async fn handle_socket(socket: WebSocket, app_state: Arc<AppState>) {
    info!("New WebSocket connection established");

    let (mut sender, mut receiver) = socket.split();
    let (outbound, mut outbound_rx) = mpsc::unbounded_channel::<ServerMessage>();

    // Every message to the client goes through this single writer.
    let writer = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            let json = match serde_json::to_string(&message) {
                Ok(json) => json,
                Err(e) => {
                    error!("Failed to serialize {:?}: {}", message, e);
                    continue;
                }
            };
            if sender.send(Message::Text(json.into())).await.is_err() {
                debug!("Client went away; stopping writer");
                break;
            }
        }
    });

    // --- 1. Initialization Phase ---
    let mut session = match receiver.next().await {
        Some(Ok(Message::Text(init_json))) => {
            match serde_json::from_str::<ClientMessage>(&init_json) {
                Ok(ClientMessage::Init {
                    product_id,
                    wallet_available,
                    demo_mode,
                }) => {
                    info!(
                        "Initializing purchase of product {} (wallet: {}, demo: {})",
                        product_id, wallet_available, demo_mode
                    );
                    match SessionState::new(
                        &app_state,
                        product_id,
                        wallet_available,
                        demo_mode,
                        outbound.clone(),
                    )
                    .await
                    {
                        Ok(session) => session,
                        Err(e) => {
                            error!("Failed to initialize session: {}", e);
                            let _ = outbound.send(ServerMessage::Error {
                                message: e.to_string(),
                            });
                            drop(outbound);
                            let _ = writer.await;
                            return;
                        }
                    }
                }
                _ => {
                    error!("First message was not a valid Init message.");
                    let _ = outbound.send(ServerMessage::Error {
                        message: "The first message must be 'init'.".to_string(),
                    });
                    drop(outbound);
                    let _ = writer.await;
                    return;
                }
            }
        }
        _ => {
            error!("Client disconnected before sending Init message.");
            writer.abort();
            return;
        }
    };
    drop(outbound);

    session.send(ServerMessage::SessionInitialized {
        session_id: session.flow.id(),
        product: session.product.as_ref().clone(),
        quote: PriceQuote::for_price(session.product.price),
    });
    session.send_purchase_state().await;

    // --- 2. Main Message Loop ---
    let mut tasks: Vec<JoinHandle<()>> = Vec::new();
    loop {
        match receiver.next().await {
            Some(Ok(Message::Text(text))) => {
                tasks.retain(|task| !task.is_finished());
                let keep_open =
                    handle_text_message(&text, &app_state, &mut session, &mut tasks).await;
                if !keep_open {
                    break;
                }
            }
            Some(Ok(Message::Close(_))) => {
                info!("Client sent close message.");
                break;
            }
            Some(Ok(_)) => {}
            Some(Err(e)) => {
                warn!("WebSocket error: {}", e);
                break;
            }
            None => {
                info!("Client disconnected.");
                break;
            }
        }
    }

    // --- 3. Cleanup ---
    session.shutdown().await;
    for task in tasks {
        task.abort();
    }
    drop(session);
    let _ = writer.await;
    info!("WebSocket connection closed.");
}

/// Dispatches one client message after the session is initialized. Replies go
/// to `session.outbound`; spawned payment and email tasks are pushed to `tasks`.
/// Returns `false` when the connection should close.
pub async fn handle_text_message(
    text: &str,
    app_state: &AppState,
    session: &mut SessionState,
    tasks: &mut Vec<JoinHandle<()>>,
) -> bool {
    let client_msg = match serde_json::from_str::<ClientMessage>(text) {
        Ok(msg) => msg,
        Err(e) => {
            warn!("Failed to deserialize client message: {}", e);
            session.send(ServerMessage::Error {
                message: format!("Invalid message: {}", e),
            });
            return true;
        }
    };

    match client_msg {
        ClientMessage::Init { .. } => {
            session.send(ServerMessage::Error {
                message: "Session is already initialized.".to_string(),
            });
        }
        ClientMessage::SetDemoMode { enabled } => {
            if let Err(e) = session.flow.set_demo_mode(enabled).await {
                report(&session.outbound, &e);
            }
            session.send_purchase_state().await;
        }
        ClientMessage::SubmitPayment => {
            let flow = session.flow.clone();
            let outbound = session.outbound.clone();
            tasks.push(tokio::spawn(async move {
                match flow.submit_payment().await {
                    Ok(outcome) => debug!("Payment outcome: {:?}", outcome),
                    Err(e) => report(&outbound, &e),
                }
                let snapshot = flow.snapshot().await;
                let _ = outbound.send(ServerMessage::PurchaseState { snapshot });
            }));
        }
        ClientMessage::SubmitEmail { email } => {
            let flow = session.flow.clone();
            let outbound = session.outbound.clone();
            tasks.push(tokio::spawn(async move {
                match flow.submit_email(&email).await {
                    Ok(outcome) => debug!("Delivery outcome: {:?}", outcome),
                    Err(e) => report(&outbound, &e),
                }
                let snapshot = flow.snapshot().await;
                let _ = outbound.send(ServerMessage::PurchaseState { snapshot });
            }));
        }
        ClientMessage::Finish => {
            match session.flow.finish().await {
                Ok(receipt) => session.send(ServerMessage::Receipt { receipt }),
                Err(e) => report(&session.outbound, &e),
            }
            session.send_purchase_state().await;
        }
        ClientMessage::Close => {
            session.flow.close().await;
            session.send_purchase_state().await;
            return false;
        }
        ClientMessage::WalletResponse { id, result, error } => match &session.wallet {
            Some(wallet) => {
                wallet.resolve(id, result, error);
            }
            None => warn!("Wallet response {} received without a wallet bridge", id),
        },
        ClientMessage::SimulatorOpen => open_simulator(app_state, session).await,
        ClientMessage::SimulatorConnect => {
            simulator_step(session, |sim| async move { sim.connect().await.map(|_| ()) }).await
        }
        ClientMessage::SimulatorSwitchNetwork => {
            simulator_step(session, |sim| async move {
                sim.switch_network().await.map(|_| ())
            })
            .await
        }
        ClientMessage::SimulatorConfirm => {
            simulator_step(session, |sim| async move { sim.confirm().await.map(|_| ()) }).await
        }
        ClientMessage::SimulatorComplete => {
            simulator_step(session, |sim| async move { sim.complete().await.map(|_| ()) }).await
        }
        ClientMessage::SimulatorCancel => {
            simulator_step(session, |sim| async move { sim.cancel().await }).await
        }
    }
    true
}

/// Sends an `error` message unless the flow already notified the user.
fn report(outbound: &UnboundedSender<ServerMessage>, err: &FlowError) {
    match err {
        FlowError::Payment(e) if e.is_terminal() => {
            debug!("Payment failed and the session was abandoned: {}", e)
        }
        FlowError::Payment(_) | FlowError::EmptyEmail => {
            debug!("Flow error already surfaced to the user: {}", err)
        }
        _ => {
            warn!("Rejected client action: {}", err);
            let _ = outbound.send(ServerMessage::Error {
                message: err.to_string(),
            });
        }
    }
}

//=========================================================================================
// Wallet Simulator
//=========================================================================================

async fn open_simulator(app_state: &AppState, session: &mut SessionState) {
    if let Some(simulator) = &session.simulator {
        debug!("Reopening simulator for product {}", simulator.product().id);
        simulator.reopen().await;
        return;
    }

    let (simulator, mut events) =
        WalletSimulator::open(session.product.clone(), app_state.simulator_settings.clone());
    let forwarder = {
        let simulator = simulator.clone();
        let outbound = session.outbound.clone();
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                if outbound.send(ServerMessage::SimulatorEvent { event }).is_err() {
                    break;
                }
                let snapshot = simulator.snapshot().await;
                let _ = outbound.send(ServerMessage::SimulatorState { snapshot });
            }
        })
    };
    session.simulator = Some(simulator);
    session.simulator_task = Some(forwarder);
}

async fn simulator_step<F, Fut>(session: &SessionState, action: F)
where
    F: FnOnce(WalletSimulator) -> Fut,
    Fut: std::future::Future<Output = FlowResult<()>>,
{
    let Some(simulator) = session.simulator.clone() else {
        session.send(ServerMessage::Error {
            message: "The wallet simulator is not open.".to_string(),
        });
        return;
    };
    match action(simulator.clone()).await {
        Ok(()) => {
            let snapshot = simulator.snapshot().await;
            session.send(ServerMessage::SimulatorState { snapshot });
        }
        Err(e) => report(&session.outbound, &e),
    }
}
