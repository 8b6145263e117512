//! # OrderMgmt
//!
//! An order and product management service exposing every gRPC call shape
//! (unary, server-streaming, client-streaming and bidirectional) plus an HTTP
//! gateway onto the same in-memory store.
//!
//! ## Features
//!
//! - **Order RPCs**: add, get, search (server stream), batch update (client
//!   stream) and shipment processing (bidirectional stream)
//! - **Shipment Aggregation**: orders are grouped by destination and flushed
//!   back to the caller every `batch_size` orders
//! - **Product RPCs**: add with server-generated ids, get
//! - **HTTP Gateway**: JSON REST endpoints over the same data
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ordermgmt::{create_order_service, OrderStore, ServiceConfig};
//! use tokio_util::sync::CancellationToken;
//! use tonic::transport::Server;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = OrderStore::seeded();
//!     let service = create_order_service(store, ServiceConfig::default(), CancellationToken::new());
//!
//!     Server::builder()
//!         .add_service(service)
//!         .serve("0.0.0.0:50051".parse()?)
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod grpc;
pub mod http;
pub mod model;
pub mod product;
pub mod session;
pub mod shipment;
pub mod store;

pub use config::ServiceConfig;
pub use error::{OrderError, Result};
pub use model::{CombinedShipment, Order, Product};
pub use product::ProductCatalog;
pub use session::{MissingOrderPolicy, OrderProcessor, SessionSummary};
pub use shipment::ShipmentAggregator;
pub use store::OrderStore;

// Re-export commonly used types
pub use axum::Router;
pub use tokio_util::sync::CancellationToken;

/// Creates an HTTP server with all routes configured
///
/// # Example
///
/// ```rust,no_run
/// use ordermgmt::{create_http_server, OrderStore, ProductCatalog};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let app = create_http_server(OrderStore::seeded(), ProductCatalog::new());
///     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
///     axum::serve(listener, app).await?;
///     Ok(())
/// }
/// ```
pub fn create_http_server(orders: OrderStore, products: ProductCatalog) -> Router {
    http::create_router(orders, products)
}

/// Creates the OrderManagement gRPC service
///
/// Live ProcessOrders sessions end when `shutdown` is cancelled.
pub fn create_order_service(
    store: OrderStore,
    config: ServiceConfig,
    shutdown: CancellationToken,
) -> grpc::OrderManagementServer<grpc::OrderManagementService> {
    grpc::create_order_service(store, config, shutdown)
}

/// Creates the ProductInfo gRPC service
pub fn create_product_service(
    catalog: ProductCatalog,
) -> grpc::ProductInfoServer<grpc::ProductInfoService> {
    grpc::create_product_service(catalog)
}

/// Default HTTP port
pub const DEFAULT_HTTP_PORT: u16 = 3000;

/// Default gRPC port
pub const DEFAULT_GRPC_PORT: u16 = 50051;

/// Default capacity of streaming response channels
pub const DEFAULT_STREAM_BUFFER_SIZE: usize = 128;
