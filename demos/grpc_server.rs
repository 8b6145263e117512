//! Simple gRPC server example
//!
//! Run with: cargo run --example grpc_server
//!
//! This example serves both gRPC services over a store seeded with sample
//! orders.

use ordermgmt::{
    create_order_service, create_product_service, CancellationToken, OrderStore,
    ProductCatalog, ServiceConfig,
};
use tonic::transport::Server;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let store = OrderStore::seeded();
    let shutdown = CancellationToken::new();

    // Create gRPC services
    let order_service = create_order_service(store, ServiceConfig::default(), shutdown.clone());
    let product_service = create_product_service(ProductCatalog::new());
    let reflection_service = ordermgmt::grpc::create_reflection_service()?;

    // Start server
    let addr = "0.0.0.0:50051".parse()?;
    println!("gRPC server listening on {}", addr);
    println!("Try: cargo run --example order_client");

    Server::builder()
        .add_service(reflection_service)
        .add_service(order_service)
        .add_service(product_service)
        .serve_with_shutdown(addr, async move {
            let _ = tokio::signal::ctrl_c().await;
            shutdown.cancel();
        })
        .await?;

    Ok(())
}
