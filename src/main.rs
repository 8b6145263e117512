//! OrderMgmt Server
//!
//! Order and product management server with gRPC and HTTP support.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -- --mode=http|grpc|dual
//! ```
//!
//! ## Environment Variables
//!
//! - `MODE`: Which server(s) to start (default: "grpc")
//! - `GRPC_PORT`: gRPC server port (default: 50051)
//! - `HTTP_PORT`: HTTP server port (default: 3000)
//! - `ORDER_BATCH_SIZE`: Orders per ProcessOrders flush (default: 3)
//! - `STREAM_BUFFER_SIZE`: Streaming response buffer (default: 128)
//! - `MISSING_ORDER_POLICY`: "abort" or "skip" (default: "abort")
//! - `SEED_SAMPLE_DATA`: Load sample orders at startup (default: true)
//! - `RUST_LOG`: Logging level (default: "ordermgmt=info,tower_http=info")

use clap::Parser;
use ordermgmt::config::{CliArgs, Mode, ServerConfig, ServiceConfig};
use ordermgmt::grpc::{
    create_reflection_service, OrderManagementServer, OrderManagementService, ProductInfoServer,
    ProductInfoService,
};
use ordermgmt::{
    create_http_server, create_order_service, create_product_service, CancellationToken,
    OrderStore, ProductCatalog,
};
use std::net::{Ipv4Addr, SocketAddr};
use tokio::signal;
use tonic::transport::Server;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

async fn run_http(
    orders: OrderStore,
    products: ProductCatalog,
    port: u16,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
    tracing::info!("Starting HTTP server on {}", addr);

    let app = create_http_server(orders, products);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    Ok(())
}

async fn run_grpc(
    orders: OrderStore,
    products: ProductCatalog,
    port: u16,
    config: ServiceConfig,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
    tracing::info!("Starting gRPC server on {}", addr);

    let (health_reporter, health_service) = tonic_health::server::health_reporter();
    health_reporter
        .set_serving::<OrderManagementServer<OrderManagementService>>()
        .await;
    health_reporter
        .set_serving::<ProductInfoServer<ProductInfoService>>()
        .await;

    let order_service = create_order_service(orders, config, shutdown.clone());
    let product_service = create_product_service(products);
    let reflection_service = create_reflection_service()?;

    // Logs method and latency for every call
    let trace_layer = TraceLayer::new_for_grpc()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Server::builder()
        .layer(trace_layer)
        .add_service(health_service)
        .add_service(reflection_service)
        .add_service(order_service)
        .add_service(product_service)
        .serve_with_shutdown(addr, async move {
            shutdown.cancelled().await;
            health_reporter
                .set_not_serving::<OrderManagementServer<OrderManagementService>>()
                .await;
            health_reporter
                .set_not_serving::<ProductInfoServer<ProductInfoService>>()
                .await;
        })
        .await?;

    Ok(())
}

async fn run_dual(
    orders: OrderStore,
    products: ProductCatalog,
    config: ServerConfig,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let http_handle = tokio::spawn(run_http(
        orders.clone(),
        products.clone(),
        config.http_port,
        shutdown.clone(),
    ));

    let grpc_handle = tokio::spawn(run_grpc(
        orders,
        products,
        config.grpc_port,
        config.service,
        shutdown,
    ));

    tokio::try_join!(async { http_handle.await? }, async { grpc_handle.await? })?;

    Ok(())
}

/// Cancels `shutdown` on Ctrl+C or SIGTERM
async fn watch_signals(shutdown: CancellationToken) {
    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        res = signal::ctrl_c() => {
            if let Err(e) = res {
                tracing::error!("Failed to listen for Ctrl+C: {}", e);
                return;
            }
            tracing::info!("Received Ctrl+C signal");
        }
        () = terminate => tracing::info!("Received SIGTERM signal"),
    }

    tracing::info!("Shutdown signal received, terminating gracefully...");
    shutdown.cancel();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ordermgmt=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse command line arguments and environment
    let config = ServerConfig::try_from(CliArgs::parse())?;

    tracing::info!("Starting OrderMgmt server in {:?} mode", config.mode);
    tracing::debug!("Configuration: {:#?}", config);

    let orders = if config.seed {
        OrderStore::seeded()
    } else {
        OrderStore::new()
    };
    let products = ProductCatalog::new();

    let shutdown = CancellationToken::new();
    tokio::spawn(watch_signals(shutdown.clone()));

    // Start servers based on mode
    match config.mode {
        Mode::Http => {
            run_http(orders, products, config.http_port, shutdown).await?;
        }
        Mode::Grpc => {
            run_grpc(orders, products, config.grpc_port, config.service, shutdown).await?;
        }
        Mode::Dual => {
            tracing::info!("HTTP: http://localhost:{}", config.http_port);
            tracing::info!("gRPC: localhost:{}", config.grpc_port);
            run_dual(orders, products, config, shutdown).await?;
        }
    }

    tracing::info!("Server shut down");
    Ok(())
}
