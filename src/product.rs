//! Product catalogue
//!
//! In-memory product registry backing the ProductInfo service. Identifiers are
//! generated server-side.

use crate::error::{OrderError, Result};
use crate::model::Product;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Clone, Default)]
pub struct ProductCatalog {
    products: Arc<RwLock<HashMap<String, Product>>>,
}

impl ProductCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a product under a freshly generated identifier
    ///
    /// Any id already set on `product` is overwritten.
    pub async fn add(&self, mut product: Product) -> String {
        let id = Uuid::new_v4().to_string();
        tracing::debug!("ADD product {} ({})", id, product.name);

        product.id = id.clone();
        self.products.write().await.insert(id.clone(), product);

        id
    }

    /// Get a product by identifier
    pub async fn get(&self, id: &str) -> Result<Product> {
        tracing::debug!("GET product {}", id);

        self.products
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| OrderError::NotFound(id.to_string()))
    }

    pub async fn len(&self) -> usize {
        self.products.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_generated_id_is_uuid_v4() {
        let catalog = ProductCatalog::new();
        let id = catalog.add(Product::default()).await;

        let parsed = Uuid::parse_str(&id).unwrap();
        assert_eq!(parsed.get_version_num(), 4);
        assert_eq!(parsed.to_string(), id);
    }

    #[tokio::test]
    async fn test_add_and_get() {
        let catalog = ProductCatalog::new();
        let id = catalog
            .add(Product {
                name: "Apple iPhone 14 Plus".to_string(),
                description: "Big and bigger.".to_string(),
                price: 899.0,
                ..Default::default()
            })
            .await;

        let product = catalog.get(&id).await.unwrap();
        assert_eq!(product.id, id);
        assert_eq!(product.name, "Apple iPhone 14 Plus");
    }

    #[tokio::test]
    async fn test_add_assigns_fresh_ids() {
        let catalog = ProductCatalog::new();
        let product = Product {
            id: "client-chosen".to_string(),
            name: "Echo".to_string(),
            ..Default::default()
        };
        let first = catalog.add(product.clone()).await;
        let second = catalog.add(product).await;

        assert_ne!(first, second);
        assert_ne!(first, "client-chosen");
        assert_eq!(catalog.len().await, 2);
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let catalog = ProductCatalog::new();
        assert!(catalog.get("nope").await.unwrap_err().is_not_found());
    }
}
