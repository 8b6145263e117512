//! Core order store
//!
//! Provides the shared, in-memory mapping from order identifier to order that
//! every RPC handler reads from and writes to.

use crate::error::{OrderError, Result};
use crate::model::{sample_orders, Order};
use std::collections::HashMap;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_stream::{Stream, StreamExt};

/// Stream of orders produced by [`OrderStore::search`]
pub type OrderStream = Pin<Box<dyn Stream<Item = Order> + Send>>;

/// Main OrderStore struct holding every known order
///
/// This struct is cheaply cloneable (uses Arc internally) and can be safely
/// shared across threads. Every operation touches exactly one key, so a single
/// reader-writer lock is the only synchronisation needed.
///
/// # Example
///
/// ```rust,no_run
/// use ordermgmt::{Order, OrderStore};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = OrderStore::new();
///
///     store
///         .put(Order {
///             id: "101".to_string(),
///             items: vec!["iPhone XS".to_string()],
///             destination: "San Jose, CA".to_string(),
///             ..Default::default()
///         })
///         .await?;
///
///     let order = store.get("101").await?;
///     assert_eq!(order.destination, "San Jose, CA");
///
///     Ok(())
/// }
/// ```
#[derive(Clone, Default)]
pub struct OrderStore {
    orders: Arc<RwLock<HashMap<String, Order>>>,
}

impl OrderStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `orders`
    ///
    /// Later entries replace earlier ones sharing the same id.
    pub fn with_orders(orders: impl IntoIterator<Item = Order>) -> Self {
        let orders = orders
            .into_iter()
            .map(|order| (order.id.clone(), order))
            .collect();

        Self {
            orders: Arc::new(RwLock::new(orders)),
        }
    }

    /// Create a store holding the sample orders 102 through 106
    pub fn seeded() -> Self {
        let store = Self::with_orders(sample_orders());
        tracing::info!("Seeded order store with sample data");
        store
    }

    /// Get an order by identifier
    ///
    /// # Returns
    ///
    /// The current order, or [`OrderError::NotFound`] if the id is unknown
    pub async fn get(&self, id: &str) -> Result<Order> {
        tracing::debug!("GET order {}", id);

        let orders = self.orders.read().await;
        orders
            .get(id)
            .cloned()
            .ok_or_else(|| OrderError::NotFound(id.to_string()))
    }

    /// Insert or fully replace an order keyed by its id
    ///
    /// # Returns
    ///
    /// The identifier the order was stored under
    pub async fn put(&self, order: Order) -> Result<String> {
        if order.id.is_empty() {
            return Err(OrderError::InvalidArgument(
                "order id must not be empty".to_string(),
            ));
        }

        tracing::debug!("PUT order {} (destination: {})", order.id, order.destination);

        let id = order.id.clone();
        let mut orders = self.orders.write().await;
        if orders.insert(id.clone(), order).is_some() {
            tracing::debug!("Replaced existing order {}", id);
        }

        Ok(id)
    }

    /// Search orders whose item list contains `query`
    ///
    /// A snapshot is taken when this is called; matching is done lazily as
    /// the returned stream is polled. Iteration order is unspecified.
    pub async fn search(&self, query: &str) -> OrderStream {
        tracing::debug!("SEARCH orders for {:?}", query);

        let snapshot: Vec<Order> = self.orders.read().await.values().cloned().collect();
        let query = query.to_string();

        Box::pin(tokio_stream::iter(snapshot).filter(move |order| order.contains_item(&query)))
    }

    /// Number of stored orders
    pub async fn len(&self) -> usize {
        self.orders.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.orders.read().await.is_empty()
    }

    /// Check that the store is reachable
    ///
    /// # Returns
    ///
    /// `true` if the lock could be acquired for reading
    pub async fn health_check(&self) -> Result<bool> {
        let _guard = self.orders.read().await;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    fn order(id: &str, items: &[&str], destination: &str) -> Order {
        Order {
            id: id.to_string(),
            items: items.iter().map(|s| s.to_string()).collect(),
            destination: destination.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let store = OrderStore::new();

        let id = assert_ok!(store.put(order("101", &["iPhone XS"], "San Jose, CA")).await);
        assert_eq!(id, "101");

        let fetched = assert_ok!(store.get("101").await);
        assert_eq!(fetched.destination, "San Jose, CA");
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let store = OrderStore::new();
        let err = assert_err!(store.get("missing").await);
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_put_replaces_entire_record() {
        let store = OrderStore::new();
        store
            .put(order("102", &["Google Pixel 3A", "Mac Book Pro"], "Mountain View, CA"))
            .await
            .unwrap();
        store
            .put(order("102", &["Google Pixel Book"], "San Jose, CA"))
            .await
            .unwrap();

        let fetched = store.get("102").await.unwrap();
        assert_eq!(fetched.items, vec!["Google Pixel Book".to_string()]);
        assert_eq!(fetched.destination, "San Jose, CA");
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_put_rejects_empty_id() {
        let store = OrderStore::new();
        let err = assert_err!(store.put(order("", &["x"], "y")).await);
        assert!(matches!(err, OrderError::InvalidArgument(_)));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_search_matches_exact_subset() {
        let store = OrderStore::seeded();

        let mut ids: Vec<String> = store
            .search("Google")
            .await
            .map(|o| o.id)
            .collect()
            .await;
        ids.sort();
        assert_eq!(ids, vec!["102", "104"]);

        let ids: Vec<String> = store.search("google").await.map(|o| o.id).collect().await;
        assert!(ids.is_empty());
    }

    #[tokio::test]
    async fn test_search_reports_each_order_once() {
        let store = OrderStore::with_orders([order("1", &["Echo", "Echo Dot"], "X")]);
        let found: Vec<Order> = store.search("Echo").await.collect().await;
        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn test_search_snapshot_ignores_later_writes() {
        let store = OrderStore::with_orders([order("1", &["Echo"], "X")]);
        let stream = store.search("Echo").await;
        store.put(order("2", &["Echo"], "Y")).await.unwrap();

        let found: Vec<Order> = stream.collect().await;
        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_writers_are_all_visible() {
        let store = OrderStore::new();
        let mut handles = Vec::new();
        for i in 0..32 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .put(order(&i.to_string(), &["item"], "dest"))
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(store.len().await, 32);
    }

    #[tokio::test]
    async fn test_health_check() {
        let store = OrderStore::new();
        assert!(store.health_check().await.unwrap());
    }
}
