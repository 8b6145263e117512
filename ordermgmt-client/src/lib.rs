//! # OrderMgmt Client
//!
//! A client library for the OrderMgmt gRPC services.
//!
//! ## Usage
//!
//! Add to your `Cargo.toml`:
//!
//! ```toml
//! ordermgmt-client = { path = "../ordermgmt-client" }
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use ordermgmt_client::{connect_orders, generated::OrderId};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut client = connect_orders("http://127.0.0.1:50051").await?;
//!     let order = client.get_order(OrderId { id: "102".into() }).await?;
//!     println!("{:?}", order.into_inner());
//!     Ok(())
//! }
//! ```

use tonic::transport::Channel;
use tonic::Streaming;

pub mod generated {
    tonic::include_proto!("ecommerce");
}

pub use generated::order_management_client::OrderManagementClient;
pub use generated::product_info_client::ProductInfoClient;

/// Connect to an OrderManagement gRPC server
///
/// # Arguments
///
/// * `endpoint` - The server endpoint (e.g., "http://127.0.0.1:50051")
pub async fn connect_orders(
    endpoint: impl AsRef<str>,
) -> Result<OrderManagementClient<Channel>, tonic::transport::Error> {
    OrderManagementClient::connect(endpoint.as_ref().to_string()).await
}

/// Connect to a ProductInfo gRPC server
pub async fn connect_products(
    endpoint: impl AsRef<str>,
) -> Result<ProductInfoClient<Channel>, tonic::transport::Error> {
    ProductInfoClient::connect(endpoint.as_ref().to_string()).await
}

/// Open a ProcessOrders session sending `ids` and closing the input after
/// the last one
///
/// Returns the stream of combined shipments produced by the server.
pub async fn process_orders<I, S>(
    client: &mut OrderManagementClient<Channel>,
    ids: I,
) -> Result<Streaming<generated::CombinedShipment>, tonic::Status>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let requests: Vec<generated::OrderId> = ids
        .into_iter()
        .map(|id| generated::OrderId { id: id.into() })
        .collect();

    let response = client
        .process_orders(tokio_stream::iter(requests))
        .await?;
    Ok(response.into_inner())
}
