//! Order client example
//!
//! Run with: cargo run --example order_client
//!
//! Replays a full client session against a running server (see the
//! `grpc_server` example): add, get, search, batch update, then a
//! bidirectional ProcessOrders session whose shipments are read concurrently
//! with the ids being sent.

use ordermgmt_client::generated::{Order, OrderId, Product, ProductId, SearchRequest};
use ordermgmt_client::{connect_orders, connect_products};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;

const ENDPOINT: &str = "http://127.0.0.1:50051";

fn order(id: &str, items: &[&str], destination: &str, price: f32) -> Order {
    Order {
        id: id.to_string(),
        items: items.iter().map(|s| s.to_string()).collect(),
        description: String::new(),
        price,
        destination: destination.to_string(),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let mut client = connect_orders(ENDPOINT).await?;

    // Unary: add then get
    let id = client
        .add_order(order(
            "101",
            &["iPhone XS", "Mac Book Pro"],
            "San Jose, CA",
            2299.0,
        ))
        .await?
        .into_inner();
    println!("[AddOrder] {}", id.id);

    let fetched = client.get_order(id).await?.into_inner();
    println!("[GetOrder] {:?}", fetched);

    // Server streaming: search
    let mut matches = client
        .search_orders(SearchRequest {
            query: "Google".to_string(),
        })
        .await?
        .into_inner();
    while let Some(found) = matches.next().await {
        println!("[SearchOrders] {}", found?.id);
    }

    // Client streaming: update
    let updates = vec![
        order(
            "102",
            &["Google Pixel 3A", "Google Pixel Book"],
            "Mountain View, CA",
            1100.0,
        ),
        order(
            "103",
            &["Apple Watch S4", "Mac Book Pro", "iPad Pro"],
            "San Jose, CA",
            2800.0,
        ),
        order(
            "104",
            &["Google Home Mini", "Google Nest Hub", "iPad Mini"],
            "Mountain View, CA",
            2200.0,
        ),
    ];
    let updated = client
        .update_orders(tokio_stream::iter(updates))
        .await?
        .into_inner();
    println!("[UpdateOrders] {:?}", updated.ids);

    // Bidirectional streaming: send ids while reading shipments
    let (tx, rx) = mpsc::channel(4);
    let mut shipments = client
        .process_orders(ReceiverStream::new(rx))
        .await?
        .into_inner();

    let reader = tokio::spawn(async move {
        while let Some(shipment) = shipments.next().await {
            match shipment {
                Ok(shipment) => {
                    let ids: Vec<_> = shipment.orders.iter().map(|o| o.id.as_str()).collect();
                    println!("[ProcessOrders] {} -> {:?}", shipment.id, ids);
                }
                Err(status) => {
                    println!("[ProcessOrders] error: {}", status);
                    break;
                }
            }
        }
    });

    for id in ["102", "103", "104", "101"] {
        tx.send(OrderId { id: id.to_string() }).await?;
    }
    // Closing the sender ends the input stream
    drop(tx);
    reader.await?;

    // Product service
    let mut products = connect_products(ENDPOINT).await?;
    let product_id = products
        .add_product(Product {
            name: "Apple iPhone 14 Plus".to_string(),
            description: "Big and bigger.".to_string(),
            price: 899.0,
            ..Default::default()
        })
        .await?
        .into_inner();
    println!("[AddProduct] {}", product_id.value);

    let product = products
        .get_product(ProductId {
            value: product_id.value,
        })
        .await?
        .into_inner();
    println!("[GetProduct] {:?}", product);

    Ok(())
}
