//! gRPC server implementation
//!
//! Provides the OrderManagement and ProductInfo services.

use crate::config::ServiceConfig;
use crate::model::{CombinedShipment, Order, Product};
use crate::session::{OrderProcessor, SessionSummary};
use crate::{OrderError, OrderStore, ProductCatalog};
use futures::StreamExt;
use std::pin::Pin;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::Stream;
use tokio_util::sync::CancellationToken;
use tonic::{Request, Response, Status, Streaming};
use tracing::Instrument;

// Include generated protobuf code
pub mod ecommerce {
    tonic::include_proto!("ecommerce");
}

pub const ORDERMGMT_FILE_DESCRIPTOR_SET: &[u8] =
    tonic::include_file_descriptor_set!("ordermgmt_descriptor");

pub use ecommerce::order_management_server::{self, OrderManagementServer};
pub use ecommerce::product_info_server::{self, ProductInfoServer};

impl From<Order> for ecommerce::Order {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            items: order.items,
            description: order.description,
            price: order.price,
            destination: order.destination,
        }
    }
}

impl From<ecommerce::Order> for Order {
    fn from(order: ecommerce::Order) -> Self {
        Self {
            id: order.id,
            items: order.items,
            description: order.description,
            price: order.price,
            destination: order.destination,
        }
    }
}

impl From<CombinedShipment> for ecommerce::CombinedShipment {
    fn from(shipment: CombinedShipment) -> Self {
        Self {
            id: shipment.id,
            status: shipment.status,
            orders: shipment.orders.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<Product> for ecommerce::Product {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            price: product.price,
        }
    }
}

impl From<ecommerce::Product> for Product {
    fn from(product: ecommerce::Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            price: product.price,
        }
    }
}

/// gRPC order service implementation
#[derive(Clone)]
pub struct OrderManagementService {
    store: OrderStore,
    config: ServiceConfig,
    shutdown: CancellationToken,
}

impl OrderManagementService {
    /// Create a new gRPC service
    pub fn new(store: OrderStore, config: ServiceConfig) -> Self {
        Self::with_shutdown(store, config, CancellationToken::new())
    }

    /// Create a service whose sessions end when `shutdown` is cancelled
    pub fn with_shutdown(
        store: OrderStore,
        config: ServiceConfig,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            store,
            config,
            shutdown,
        }
    }

    fn processor(&self) -> OrderProcessor {
        OrderProcessor::new(self.store.clone())
            .with_batch_size(self.config.batch_size)
            .with_missing_order_policy(self.config.missing_order_policy)
    }
}

#[tonic::async_trait]
impl ecommerce::order_management_server::OrderManagement for OrderManagementService {
    async fn add_order(
        &self,
        request: Request<ecommerce::Order>,
    ) -> Result<Response<ecommerce::OrderId>, Status> {
        let order = Order::from(request.into_inner());
        tracing::info!("gRPC AddOrder {}", order.id);

        let id = self.store.put(order).await.map_err(Status::from)?;

        Ok(Response::new(ecommerce::OrderId { id }))
    }

    async fn get_order(
        &self,
        request: Request<ecommerce::OrderId>,
    ) -> Result<Response<ecommerce::Order>, Status> {
        let req = request.into_inner();
        tracing::info!("gRPC GetOrder {}", req.id);

        let order = self.store.get(&req.id).await.map_err(Status::from)?;

        Ok(Response::new(order.into()))
    }

    type SearchOrdersStream = ReceiverStream<Result<ecommerce::Order, Status>>;

    async fn search_orders(
        &self,
        request: Request<ecommerce::SearchRequest>,
    ) -> Result<Response<Self::SearchOrdersStream>, Status> {
        let req = request.into_inner();
        tracing::info!("gRPC SearchOrders {:?}", req.query);

        let mut matches = self.store.search(&req.query).await;

        // Create a channel for streaming responses
        let (tx, rx) = tokio::sync::mpsc::channel(self.config.stream_buffer_size);

        // Spawn a task to send matches as they are found
        tokio::spawn(async move {
            while let Some(order) = matches.next().await {
                tracing::debug!("SearchOrders found {}", order.id);
                if tx.send(Ok(order.into())).await.is_err() {
                    // Client disconnected
                    break;
                }
            }
        });

        Ok(Response::new(ReceiverStream::new(rx)))
    }

    async fn update_orders(
        &self,
        request: Request<Streaming<ecommerce::Order>>,
    ) -> Result<Response<ecommerce::OrderIdList>, Status> {
        tracing::info!("gRPC UpdateOrders");
        let mut stream = request.into_inner();

        let mut ids = Vec::new();
        while let Some(order) = stream.next().await {
            let id = self.store.put(Order::from(order?)).await.map_err(Status::from)?;
            tracing::info!("Order {} updated", id);
            ids.push(id);
        }

        Ok(Response::new(ecommerce::OrderIdList { ids }))
    }

    type ProcessOrdersStream =
        Pin<Box<dyn Stream<Item = Result<ecommerce::CombinedShipment, Status>> + Send>>;

    async fn process_orders(
        &self,
        request: Request<Streaming<ecommerce::OrderId>>,
    ) -> Result<Response<Self::ProcessOrdersStream>, Status> {
        tracing::info!("gRPC ProcessOrders");

        let inbound = request
            .into_inner()
            .map(|item| item.map(|order_id| order_id.id).map_err(OrderError::from));

        let (tx, rx) = tokio::sync::mpsc::channel(self.config.stream_buffer_size);
        let processor = self.processor();
        let cancel = self.shutdown.child_token();

        let fut = async move {
            match processor.run(inbound, tx.clone(), cancel.clone()).await {
                Ok(SessionSummary {
                    admitted,
                    skipped,
                    shipments,
                    cancelled,
                }) => {
                    tracing::info!(
                        admitted,
                        skipped,
                        shipments,
                        cancelled,
                        "ProcessOrders session closed"
                    );
                    // A truncated session must not look like a completed one.
                    if cancel.is_cancelled() && !tx.is_closed() {
                        let shutting_down =
                            OrderError::Unavailable("server shutting down".to_string());
                        let _ = tx.try_send(Err(shutting_down));
                    }
                }
                Err(e) => {
                    tracing::warn!("ProcessOrders session failed: {}", e);
                    // Best effort; the client may already be gone.
                    let _ = tx.send(Err(e)).await;
                }
            }
        };
        tokio::spawn(fut.instrument(tracing::info_span!("process_orders")));

        let stream = ReceiverStream::new(rx).map(|item| {
            item.map(ecommerce::CombinedShipment::from)
                .map_err(Status::from)
        });

        Ok(Response::new(Box::pin(stream)))
    }
}

/// gRPC product service implementation
#[derive(Clone)]
pub struct ProductInfoService {
    catalog: ProductCatalog,
}

impl ProductInfoService {
    pub fn new(catalog: ProductCatalog) -> Self {
        Self { catalog }
    }
}

#[tonic::async_trait]
impl ecommerce::product_info_server::ProductInfo for ProductInfoService {
    async fn add_product(
        &self,
        request: Request<ecommerce::Product>,
    ) -> Result<Response<ecommerce::ProductId>, Status> {
        let product = Product::from(request.into_inner());
        tracing::info!("gRPC AddProduct {}", product.name);

        let value = self.catalog.add(product).await;

        Ok(Response::new(ecommerce::ProductId { value }))
    }

    async fn get_product(
        &self,
        request: Request<ecommerce::ProductId>,
    ) -> Result<Response<ecommerce::Product>, Status> {
        let req = request.into_inner();
        tracing::info!("gRPC GetProduct {}", req.value);

        let product = self.catalog.get(&req.value).await.map_err(Status::from)?;

        Ok(Response::new(product.into()))
    }
}

/// Create the order gRPC service from a store
pub fn create_order_service(
    store: OrderStore,
    config: ServiceConfig,
    shutdown: CancellationToken,
) -> OrderManagementServer<OrderManagementService> {
    OrderManagementServer::new(OrderManagementService::with_shutdown(
        store, config, shutdown,
    ))
}

/// Create the product gRPC service from a catalogue
pub fn create_product_service(catalog: ProductCatalog) -> ProductInfoServer<ProductInfoService> {
    ProductInfoServer::new(ProductInfoService::new(catalog))
}

/// Create a gRPC reflection service for both APIs
pub fn create_reflection_service() -> std::result::Result<
    tonic_reflection::server::v1::ServerReflectionServer<
        impl tonic_reflection::server::v1::ServerReflection,
    >,
    tonic_reflection::server::Error,
> {
    tonic_reflection::server::Builder::configure()
        .register_encoded_file_descriptor_set(ORDERMGMT_FILE_DESCRIPTOR_SET)
        .build_v1()
}
