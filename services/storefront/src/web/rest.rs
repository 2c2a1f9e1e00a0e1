//! services/storefront/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use bempolo_core::{PriceQuote, Product};
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;
use utoipa::{OpenApi, ToSchema};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        list_products_handler,
        get_product_handler,
        health_handler,
    ),
    components(
        schemas(ProductResponse, HealthResponse)
    ),
    tags(
        (name = "Bempolo Storefront API", description = "Catalog endpoints for the digital goods storefront.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response Structs
//=========================================================================================

/// A catalog entry together with its payment quote.
#[derive(Serialize, ToSchema, Debug, PartialEq)]
pub struct ProductResponse {
    id: u32,
    name: String,
    description: String,
    /// Price in BEMP.
    price: Decimal,
    image: String,
    /// Amount charged in USDT, three decimals.
    settlement_amount: String,
    /// The same amount in the token's 6-decimal base units, when representable.
    #[schema(value_type = Option<String>)]
    settlement_minor_units: Option<String>,
}

impl From<&Product> for ProductResponse {
    fn from(product: &Product) -> Self {
        let quote = PriceQuote::for_price(product.price);
        Self {
            id: product.id,
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            image: product.image.clone(),
            settlement_amount: quote.settlement_amount,
            settlement_minor_units: quote.minor_units.map(|units| units.to_string()),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    status: &'static str,
    products: usize,
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// List every product in the catalog.
#[utoipa::path(
    get,
    path = "/products",
    responses(
        (status = 200, description = "The full catalog", body = [ProductResponse])
    )
)]
pub async fn list_products_handler(
    State(app_state): State<Arc<AppState>>,
) -> Json<Vec<ProductResponse>> {
    let products = app_state
        .catalog
        .products()
        .iter()
        .map(|product| ProductResponse::from(product.as_ref()))
        .collect();
    Json(products)
}

/// Fetch a single product.
#[utoipa::path(
    get,
    path = "/products/{id}",
    responses(
        (status = 200, description = "The product", body = ProductResponse),
        (status = 404, description = "No product with this id")
    ),
    params(
        ("id" = u32, Path, description = "The product id.")
    )
)]
pub async fn get_product_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<u32>,
) -> Result<Json<ProductResponse>, (StatusCode, String)> {
    match app_state.catalog.get(id) {
        Some(product) => Ok(Json(ProductResponse::from(product.as_ref()))),
        None => {
            debug!("Product {} requested but not in catalog", id);
            Err((StatusCode::NOT_FOUND, format!("Product {} not found", id)))
        }
    }
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "The service is up", body = HealthResponse)
    )
)]
pub async fn health_handler(State(app_state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        products: app_state.catalog.len(),
    })
}
