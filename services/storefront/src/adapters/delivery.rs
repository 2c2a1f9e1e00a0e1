//! services/storefront/src/adapters/delivery.rs
//!
//! This module contains the adapter for the download-link delivery endpoint.
//! It implements the `DeliveryService` port from the `core` crate.

use async_trait::async_trait;
use bempolo_core::ports::{DeliveryService, PortError, PortResult};
use bempolo_core::DownloadRequest;
use tracing::info;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that posts `{email, productId, productName}` to an HTTP endpoint.
#[derive(Clone)]
pub struct HttpDeliveryAdapter {
    client: reqwest::Client,
    url: String,
}

impl HttpDeliveryAdapter {
    /// Creates a new `HttpDeliveryAdapter`.
    pub fn new(client: reqwest::Client, url: String) -> Self {
        Self { client, url }
    }
}

//=========================================================================================
// `DeliveryService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DeliveryService for HttpDeliveryAdapter {
    async fn send_download_link(&self, request: &DownloadRequest) -> PortResult<()> {
        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|e: reqwest::Error| PortError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PortError::Status(status.as_u16()));
        }

        info!("Delivery endpoint accepted request for product {}", request.product_id);
        Ok(())
    }
}
