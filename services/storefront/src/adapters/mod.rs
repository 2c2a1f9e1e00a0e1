pub mod delivery;
pub mod outbound;
pub mod wallet_bridge;

pub use delivery::HttpDeliveryAdapter;
pub use outbound::{OutboundNavigator, OutboundNotifier};
pub use wallet_bridge::WalletBridge;
