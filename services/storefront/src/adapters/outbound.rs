//! services/storefront/src/adapters/outbound.rs
//!
//! Notification and navigation ports backed by a connection's outbound queue.
//! The browser shows the toast or changes route when the message arrives.

use bempolo_core::ports::{Navigator, NotificationSink};
use bempolo_core::{Destination, Notification};
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use crate::web::protocol::ServerMessage;

#[derive(Clone)]
pub struct OutboundNotifier {
    outbound: UnboundedSender<ServerMessage>,
}

impl OutboundNotifier {
    pub fn new(outbound: UnboundedSender<ServerMessage>) -> Self {
        Self { outbound }
    }
}

impl NotificationSink for OutboundNotifier {
    fn notify(&self, notification: Notification) {
        let message = ServerMessage::Notification {
            level: notification.level,
            message: notification.message,
        };
        if self.outbound.send(message).is_err() {
            debug!("Dropping notification for a closed connection");
        }
    }
}

#[derive(Clone)]
pub struct OutboundNavigator {
    outbound: UnboundedSender<ServerMessage>,
}

impl OutboundNavigator {
    pub fn new(outbound: UnboundedSender<ServerMessage>) -> Self {
        Self { outbound }
    }
}

impl Navigator for OutboundNavigator {
    fn navigate(&self, destination: Destination) {
        if self
            .outbound
            .send(ServerMessage::Navigate { destination })
            .is_err()
        {
            debug!("Dropping navigation to {:?} for a closed connection", destination);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bempolo_core::NotificationLevel;
    use tokio::sync::mpsc;

    #[test]
    fn forwards_notifications_and_navigation() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        OutboundNotifier::new(tx.clone()).notify(Notification::warning("careful"));
        OutboundNavigator::new(tx).navigate(Destination::Error);

        match rx.try_recv().unwrap() {
            ServerMessage::Notification { level, message } => {
                assert_eq!(level, NotificationLevel::Warning);
                assert_eq!(message, "careful");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            rx.try_recv().unwrap(),
            ServerMessage::Navigate {
                destination: Destination::Error
            }
        ));
    }

    #[test]
    fn closed_connection_is_not_an_error() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        OutboundNotifier::new(tx).notify(Notification::success("gone"));
    }
}
