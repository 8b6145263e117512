//! Domain types shared by the store, the shipment pipeline and both API
//! surfaces.

use serde::{Deserialize, Serialize};

/// Status attached to every combined shipment built by a processing session
pub const SHIPMENT_STATUS_PROCESSED: &str = "Processed";

/// A purchase record
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    #[serde(default)]
    pub items: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: f32,
    #[serde(default)]
    pub destination: String,
}

impl Order {
    /// Returns `true` if any item name contains `query` (case-sensitive).
    pub fn contains_item(&self, query: &str) -> bool {
        self.items.iter().any(|item| item.contains(query))
    }
}

/// A destination-grouped batch of orders shipped together
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedShipment {
    pub id: String,
    pub status: String,
    pub orders: Vec<Order>,
}

impl CombinedShipment {
    /// Creates an empty shipment labelled by its destination
    pub fn new(destination: &str) -> Self {
        Self {
            id: destination.to_string(),
            status: SHIPMENT_STATUS_PROCESSED.to_string(),
            orders: Vec::new(),
        }
    }

    pub fn order_ids(&self) -> Vec<&str> {
        self.orders.iter().map(|o| o.id.as_str()).collect()
    }
}

/// A catalogue entry managed by the product service
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Product {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: f32,
}

fn order(id: &str, items: &[&str], destination: &str, price: f32) -> Order {
    Order {
        id: id.to_string(),
        items: items.iter().map(|s| s.to_string()).collect(),
        description: String::new(),
        price,
        destination: destination.to_string(),
    }
}

/// Seed orders loaded when the server starts with sample data enabled
pub fn sample_orders() -> Vec<Order> {
    vec![
        order(
            "102",
            &["Google Pixel 3A", "Mac Book Pro"],
            "Mountain View, CA",
            1800.0,
        ),
        order("103", &["Apple Watch S4"], "San Jose, CA", 400.0),
        order(
            "104",
            &["Google Home Mini", "Google Nest Hub"],
            "Mountain View, CA",
            400.0,
        ),
        order("105", &["Amazon Echo"], "San Jose, CA", 30.0),
        order(
            "106",
            &["Amazon Echo", "Apple iPhone XS"],
            "Mountain View, CA",
            300.0,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_item_is_case_sensitive_substring() {
        let order = order("1", &["Google Pixel 3A", "Mac Book Pro"], "X", 1.0);
        assert!(order.contains_item("Google"));
        assert!(order.contains_item("Book"));
        assert!(!order.contains_item("google"));
        assert!(!order.contains_item("iPhone"));
    }

    #[test]
    fn test_order_without_items_never_matches() {
        let order = order("1", &[], "X", 1.0);
        assert!(!order.contains_item(""));
    }

    #[test]
    fn test_new_shipment_is_empty_and_processed() {
        let shipment = CombinedShipment::new("San Jose, CA");
        assert_eq!(shipment.id, "San Jose, CA");
        assert_eq!(shipment.status, SHIPMENT_STATUS_PROCESSED);
        assert!(shipment.orders.is_empty());
    }

    #[test]
    fn test_order_deserializes_with_defaults() {
        let order: Order = serde_json::from_str(r#"{"id":"7"}"#).unwrap();
        assert_eq!(order.id, "7");
        assert!(order.items.is_empty());
        assert_eq!(order.price, 0.0);
    }

    #[test]
    fn test_sample_orders_have_unique_ids() {
        let orders = sample_orders();
        let mut ids: Vec<_> = orders.iter().map(|o| o.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), orders.len());
    }
}
