#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bempolo_core::{
    ChainDefinition, DeliveryService, Destination, DownloadRequest, FlowPorts, Notification,
    NotificationLevel, Navigator, NotificationSink, PortError, PortResult, Product,
    TransactionRequest, WalletError, WalletProvider, WalletResult,
};
use rust_decimal_macros::dec;

pub const ACCOUNT: &str = "0x742d35Cc6634C0532925a3b844Bc454e4438f44e";
pub const TX_HASH: &str = "0x5c504ed432cb51138bcf09aa5e8a410dd4a1e204ef84bfed1be16dfba1b22060";

pub fn cyber_bempolo() -> Arc<Product> {
    Arc::new(Product {
        id: 1,
        name: "Cyber Bempolo".to_string(),
        description: "Digital gnome hacking the blockchain".to_string(),
        price: dec!(300),
        image: "/assets/bempolo-cyber.jpg".to_string(),
    })
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub notifications: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn levels(&self) -> Vec<NotificationLevel> {
        self.notifications.lock().unwrap().iter().map(|n| n.level).collect()
    }

    pub fn last(&self) -> Option<Notification> {
        self.notifications.lock().unwrap().last().cloned()
    }
}

impl NotificationSink for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.notifications.lock().unwrap().push(notification);
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    pub destinations: Mutex<Vec<Destination>>,
}

impl RecordingNavigator {
    pub fn visited(&self) -> Vec<Destination> {
        self.destinations.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, destination: Destination) {
        self.destinations.lock().unwrap().push(destination);
    }
}

pub struct FakeDelivery {
    pub fail: bool,
    /// Never answers.
    pub hang: bool,
    pub requests: Mutex<Vec<DownloadRequest>>,
}

impl FakeDelivery {
    pub fn ok() -> Self {
        Self {
            fail: false,
            hang: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn hanging() -> Self {
        Self {
            hang: true,
            ..Self::ok()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            hang: false,
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl DeliveryService for FakeDelivery {
    async fn send_download_link(&self, request: &DownloadRequest) -> PortResult<()> {
        self.requests.lock().unwrap().push(request.clone());
        if self.hang {
            std::future::pending::<()>().await;
        }
        if self.fail {
            return Err(PortError::Status(404));
        }
        Ok(())
    }
}

/// A wallet whose answers are fixed up front. Records every call.
pub struct ScriptedWallet {
    pub accounts: WalletResult<Vec<String>>,
    pub switch: WalletResult<()>,
    pub add: WalletResult<()>,
    pub send: WalletResult<String>,
    /// Never answers `eth_sendTransaction`.
    pub hang_on_send: bool,
    pub calls: Mutex<Vec<String>>,
    pub sent: Mutex<Vec<TransactionRequest>>,
}

impl ScriptedWallet {
    pub fn happy() -> Self {
        Self {
            accounts: Ok(vec![ACCOUNT.to_string()]),
            switch: Ok(()),
            add: Ok(()),
            send: Ok(TX_HASH.to_string()),
            hang_on_send: false,
            calls: Mutex::new(Vec::new()),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }
}

#[async_trait]
impl WalletProvider for ScriptedWallet {
    async fn request_accounts(&self) -> WalletResult<Vec<String>> {
        self.record("eth_requestAccounts");
        self.accounts.clone()
    }

    async fn switch_chain(&self, _chain_id: &str) -> WalletResult<()> {
        self.record("wallet_switchEthereumChain");
        self.switch.clone()
    }

    async fn add_chain(&self, _definition: &ChainDefinition) -> WalletResult<()> {
        self.record("wallet_addEthereumChain");
        self.add.clone()
    }

    async fn send_transaction(&self, request: &TransactionRequest) -> WalletResult<String> {
        self.record("eth_sendTransaction");
        self.sent.lock().unwrap().push(request.clone());
        if self.hang_on_send {
            std::future::pending::<()>().await;
        }
        self.send.clone()
    }
}

pub struct Harness {
    pub notifier: Arc<RecordingNotifier>,
    pub navigator: Arc<RecordingNavigator>,
    pub delivery: Arc<FakeDelivery>,
    pub wallet: Option<Arc<ScriptedWallet>>,
}

impl Harness {
    pub fn new(wallet: Option<ScriptedWallet>, delivery: FakeDelivery) -> Self {
        Self {
            notifier: Arc::new(RecordingNotifier::default()),
            navigator: Arc::new(RecordingNavigator::default()),
            delivery: Arc::new(delivery),
            wallet: wallet.map(Arc::new),
        }
    }

    pub fn ports(&self) -> FlowPorts {
        FlowPorts {
            wallet: self
                .wallet
                .clone()
                .map(|w| w as Arc<dyn WalletProvider>),
            delivery: self.delivery.clone(),
            notifier: self.notifier.clone(),
            navigator: self.navigator.clone(),
        }
    }
}

pub fn unrecognized_chain() -> WalletError {
    WalletError::UnrecognizedChain(4902)
}
