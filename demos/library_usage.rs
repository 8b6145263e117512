//! Library usage example
//!
//! Run with: cargo run --example library_usage
//!
//! This example drives the order store and a ProcessOrders session directly,
//! without any network transport.

use ordermgmt::{CancellationToken, Order, OrderProcessor, OrderStore};
use tokio::sync::mpsc;
use tokio_stream::StreamExt;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    println!("OrderMgmt Library Usage Example\n");

    let store = OrderStore::seeded();
    println!("✓ Seeded store with {} orders", store.len().await);

    // Add an order
    store
        .put(Order {
            id: "101".to_string(),
            items: vec!["iPhone XS".to_string(), "Mac Book Pro".to_string()],
            destination: "San Jose, CA".to_string(),
            price: 2299.0,
            ..Default::default()
        })
        .await?;
    println!("✓ Added order 101");

    // Get it back
    let order = store.get("101").await?;
    println!("✓ Get 101 -> {:?}", order.items);

    // Search by item name
    let found: Vec<String> = store.search("Google").await.map(|o| o.id).collect().await;
    println!("✓ Orders with a Google item: {:?}", found);

    // Run a processing session over four ids
    let processor = OrderProcessor::new(store.clone());
    let (tx, mut rx) = mpsc::channel(16);
    let inbound = tokio_stream::iter(["102", "103", "104", "101"].map(|id| Ok(id.to_string())));

    let session = tokio::spawn(async move {
        processor
            .run(inbound, tx, CancellationToken::new())
            .await
    });

    while let Some(shipment) = rx.recv().await {
        let shipment = shipment?;
        println!(
            "✓ Combined shipment {} [{}]: {:?}",
            shipment.id,
            shipment.status,
            shipment.order_ids()
        );
    }

    let summary = session.await??;
    println!(
        "✓ Session closed: {} admitted, {} shipments",
        summary.admitted, summary.shipments
    );

    // Unknown ids are reported, not silently bucketed
    match store.get("999").await {
        Ok(_) => println!("✗ Order 999 should not exist!"),
        Err(e) => println!("✓ Lookup of 999 failed as expected: {}", e),
    }

    println!("\n✅ All operations completed successfully!");

    Ok(())
}
