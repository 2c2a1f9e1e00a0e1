pub mod catalog;
pub mod chain;
pub mod domain;
pub mod error;
pub mod ports;
pub mod pricing;
pub mod purchase;
pub mod simulator;
pub mod timer;

pub use catalog::{Catalog, CatalogError};
pub use domain::{
    Destination, DownloadRequest, Notification, NotificationLevel, PaymentMode, Product,
    PurchaseReceipt, PurchaseSnapshot, PurchaseStep, SessionStatus, SimStep, SimulationSnapshot,
    SimulationStatus, SimulatorEvent,
};
pub use error::{FlowError, FlowResult, PaymentError};
pub use ports::{
    ChainDefinition, DeliveryService, Navigator, NotificationSink, PortError, PortResult,
    TransactionRequest, WalletError, WalletProvider, WalletResult,
};
pub use pricing::PriceQuote;
pub use purchase::{DeliveryOutcome, FlowPorts, FlowSettings, PaymentOutcome, PurchaseFlow};
pub use simulator::{Scheduled, SimulatorSettings, WalletSimulator};
