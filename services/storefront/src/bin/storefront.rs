//! services/storefront/src/bin/storefront.rs

use bempolo_core::{Catalog, FlowSettings, SimulatorSettings};
use std::sync::Arc;
use storefront_lib::{
    adapters::HttpDeliveryAdapter,
    config::Config,
    error::ApiError,
    web::{self, state::AppState},
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Load the Catalog ---
    let catalog = match &config.catalog_path {
        Some(path) => {
            info!("Loading catalog from {}", path.display());
            let json = tokio::fs::read_to_string(path).await?;
            Catalog::from_json(&json)?
        }
        None => Catalog::default(),
    };
    info!("Catalog ready with {} products", catalog.len());

    // --- 3. Initialize Service Adapters ---
    let delivery = Arc::new(HttpDeliveryAdapter::new(
        reqwest::Client::new(),
        config.delivery_url.clone(),
    ));

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        catalog: Arc::new(catalog),
        config: config.clone(),
        delivery,
        flow_settings: FlowSettings {
            demo_delay: config.demo_delay,
            ..FlowSettings::default()
        },
        simulator_settings: SimulatorSettings::default(),
    });

    // --- 5. Create the Web Router ---
    let app = web::router(app_state)?;

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
