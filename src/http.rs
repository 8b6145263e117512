//! HTTP server implementation
//!
//! Provides a JSON gateway onto the same order store and product catalogue
//! the gRPC services use.

use crate::{error::Result, Order, OrderError, OrderStore, Product, ProductCatalog};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use axum_macros::debug_handler;
use serde::{Deserialize, Serialize};
use tokio_stream::StreamExt;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

/// State shared by every HTTP handler
#[derive(Clone)]
pub struct AppState {
    pub orders: OrderStore,
    pub products: ProductCatalog,
}

/// Creates a new HTTP router with all routes configured
///
/// The router includes:
/// - GET /healthz - Health check endpoint
/// - POST /orders - Add or replace an order
/// - PUT /orders - Replace a batch of orders
/// - GET /orders?q= - Search orders by item name
/// - GET /orders/{id} - Get an order
/// - POST /products - Register a product
/// - GET /products/{id} - Get a product
pub fn create_router(orders: OrderStore, products: ProductCatalog) -> Router {
    Router::new()
        .route("/healthz", get(healthcheck))
        .route(
            "/orders",
            get(search_orders).post(add_order).put(update_orders),
        )
        .route("/orders/{id}", get(get_order))
        .route("/products", post(add_product))
        .route("/products/{id}", get(get_product))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { orders, products })
}

/// Query string for order search
#[derive(Debug, Deserialize, Serialize)]
pub struct SearchParams {
    /// Substring matched against item names
    #[serde(default)]
    pub q: String,
}

/// Response for operations returning a single identifier
#[derive(Debug, Serialize, Deserialize)]
pub struct IdResponse {
    pub id: String,
}

/// Response for batch updates
#[derive(Debug, Serialize, Deserialize)]
pub struct IdListResponse {
    pub ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub message: String,
}

/// Health check endpoint
#[debug_handler]
async fn healthcheck(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let healthy = state.orders.health_check().await?;

    if healthy {
        Ok((
            StatusCode::OK,
            Json(SuccessResponse {
                message: "OK".to_string(),
            }),
        ))
    } else {
        Err(OrderError::Internal("Health check failed".to_string()))
    }
}

#[debug_handler]
async fn add_order(
    State(state): State<AppState>,
    Json(order): Json<Order>,
) -> Result<impl IntoResponse> {
    tracing::info!("AddOrder {}", order.id);

    let id = state.orders.put(order).await?;

    Ok((StatusCode::OK, Json(IdResponse { id })))
}

#[debug_handler]
async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    tracing::info!("GetOrder {}", id);

    let order = state.orders.get(&id).await?;

    Ok((StatusCode::OK, Json(order)))
}

/// Search orders; matches are returned as one JSON array
#[debug_handler]
async fn search_orders(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse> {
    tracing::info!("SearchOrders {:?}", params.q);

    let orders: Vec<Order> = state.orders.search(&params.q).await.collect().await;

    Ok((StatusCode::OK, Json(orders)))
}

/// Replace a batch of orders, returning their ids in request order
///
/// Orders before the first invalid one stay applied.
#[debug_handler]
async fn update_orders(
    State(state): State<AppState>,
    Json(orders): Json<Vec<Order>>,
) -> Result<impl IntoResponse> {
    tracing::info!("UpdateOrders ({} orders)", orders.len());

    let mut ids = Vec::with_capacity(orders.len());
    for order in orders {
        ids.push(state.orders.put(order).await?);
    }

    Ok((StatusCode::OK, Json(IdListResponse { ids })))
}

#[debug_handler]
async fn add_product(
    State(state): State<AppState>,
    Json(product): Json<Product>,
) -> Result<impl IntoResponse> {
    tracing::info!("AddProduct {}", product.name);

    let id = state.products.add(product).await;

    Ok((StatusCode::CREATED, Json(IdResponse { id })))
}

#[debug_handler]
async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    tracing::info!("GetProduct {}", id);

    let product = state.products.get(&id).await?;

    Ok((StatusCode::OK, Json(product)))
}
