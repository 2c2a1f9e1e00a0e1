mod common;

use std::sync::Arc;

use bempolo_core::{Destination, NotificationLevel, SessionStatus, SimStep, SimulatorEvent};
use serde_json::json;
use storefront_lib::web::protocol::ServerMessage;
use storefront_lib::web::state::{AppState, SessionState};
use storefront_lib::web::ws_handler::handle_text_message;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

struct Connection {
    state: Arc<AppState>,
    session: SessionState,
    rx: mpsc::UnboundedReceiver<ServerMessage>,
    tasks: Vec<JoinHandle<()>>,
}

impl Connection {
    async fn open(wallet_available: bool) -> Self {
        let state = common::app_state(Arc::default());
        let (tx, rx) = mpsc::unbounded_channel();
        let session = SessionState::new(&state, 1, wallet_available, false, tx)
            .await
            .unwrap();
        Self {
            state,
            session,
            rx,
            tasks: Vec::new(),
        }
    }

    async fn send(&mut self, text: &str) -> bool {
        handle_text_message(text, &self.state, &mut self.session, &mut self.tasks).await
    }

    async fn finish_tasks(&mut self) {
        for task in self.tasks.drain(..) {
            task.await.unwrap();
        }
    }

    fn drain(&mut self) -> Vec<ServerMessage> {
        std::iter::from_fn(|| self.rx.try_recv().ok()).collect()
    }
}

#[tokio::test]
async fn failed_live_payment_is_surfaced_once() {
    let mut conn = Connection::open(true).await;
    assert!(conn.send(r#"{"type":"submit_payment"}"#).await);

    let Some(ServerMessage::WalletRequest { id, method, .. }) = conn.rx.recv().await else {
        panic!("expected a wallet request");
    };
    assert_eq!(method, "eth_requestAccounts");
    let response = json!({
        "type": "wallet_response",
        "id": id,
        "error": { "code": 4001, "message": "User rejected the request." }
    });
    assert!(conn.send(&response.to_string()).await);
    conn.finish_tasks().await;

    let messages = conn.drain();
    assert!(messages.iter().any(|m| matches!(
        m,
        ServerMessage::Notification {
            level: NotificationLevel::Error,
            ..
        }
    )));
    assert!(messages.iter().any(|m| matches!(
        m,
        ServerMessage::Navigate {
            destination: Destination::Error
        }
    )));
    assert!(!messages
        .iter()
        .any(|m| matches!(m, ServerMessage::Error { .. })));
    match messages.last() {
        Some(ServerMessage::PurchaseState { snapshot }) => {
            assert_eq!(snapshot.status, SessionStatus::Abandoned);
            assert!(!snapshot.is_processing);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn rejected_action_gets_an_error_reply() {
    let mut conn = Connection::open(false).await;
    assert!(conn.send(r#"{"type":"finish"}"#).await);

    let messages = conn.drain();
    assert!(matches!(messages[0], ServerMessage::Error { .. }));
    assert!(matches!(messages[1], ServerMessage::PurchaseState { .. }));
}

#[tokio::test(start_paused = true)]
async fn simulator_events_are_forwarded_with_state() {
    let mut conn = Connection::open(false).await;
    assert!(conn.send(r#"{"type":"simulator_open"}"#).await);
    assert!(conn.send(r#"{"type":"simulator_connect"}"#).await);

    loop {
        match conn.rx.recv().await {
            Some(ServerMessage::SimulatorEvent { event }) => {
                if event
                    == (SimulatorEvent::StepChanged {
                        step: SimStep::NetworkSwitch,
                    })
                {
                    assert_eq!(
                        serde_json::to_value(&event).unwrap(),
                        json!({ "event": "step_changed", "step": "network_switch" })
                    );
                    break;
                }
            }
            Some(_) => {}
            None => panic!("connection closed before the simulator advanced"),
        }
    }

    match conn.rx.recv().await {
        Some(ServerMessage::SimulatorState { snapshot }) => {
            assert_eq!(snapshot.step, SimStep::NetworkSwitch);
            assert!(!snapshot.is_processing);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn simulator_commands_need_an_open_simulator() {
    let mut conn = Connection::open(false).await;
    assert!(conn.send(r#"{"type":"simulator_confirm"}"#).await);
    assert!(matches!(
        conn.drain().as_slice(),
        [ServerMessage::Error { .. }]
    ));
}

#[tokio::test]
async fn close_ends_the_connection() {
    let mut conn = Connection::open(false).await;
    assert!(!conn.send(r#"{"type":"close"}"#).await);

    assert_eq!(
        conn.session.flow.snapshot().await.status,
        SessionStatus::Dismissed
    );
    match conn.drain().as_slice() {
        [ServerMessage::PurchaseState { snapshot }] => {
            assert_eq!(snapshot.status, SessionStatus::Dismissed)
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn malformed_and_repeated_init_messages_get_errors() {
    let mut conn = Connection::open(false).await;
    assert!(conn.send("{not json").await);
    assert!(conn.send(r#"{"type":"init","product_id":1}"#).await);

    let messages = conn.drain();
    assert_eq!(messages.len(), 2);
    assert!(messages
        .iter()
        .all(|m| matches!(m, ServerMessage::Error { .. })));
}
