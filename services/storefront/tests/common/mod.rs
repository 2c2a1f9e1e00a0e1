#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bempolo_core::{
    Catalog, DeliveryService, DownloadRequest, FlowSettings, PortResult, SimulatorSettings,
};
use storefront_lib::config::Config;
use storefront_lib::web::state::AppState;

#[derive(Default)]
pub struct FakeDelivery {
    pub requests: Mutex<Vec<DownloadRequest>>,
}

#[async_trait]
impl DeliveryService for FakeDelivery {
    async fn send_download_link(&self, request: &DownloadRequest) -> PortResult<()> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(())
    }
}

pub fn config() -> Config {
    Config::from_lookup(|key| match key {
        "CORS_ORIGIN" => Some("http://localhost:5173".to_string()),
        _ => None,
    })
    .unwrap()
}

pub fn app_state(delivery: Arc<FakeDelivery>) -> Arc<AppState> {
    Arc::new(AppState {
        catalog: Arc::new(Catalog::default()),
        config: Arc::new(config()),
        delivery,
        flow_settings: FlowSettings {
            demo_delay: Duration::from_millis(10),
            ..FlowSettings::default()
        },
        simulator_settings: SimulatorSettings::default(),
    })
}
