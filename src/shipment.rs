//! Shipment aggregation
//!
//! Buckets orders by destination into combined shipments for the lifetime of
//! one processing session and decides when the buckets are flushed.

use crate::model::{CombinedShipment, Order};
use std::collections::HashMap;

/// Default number of admitted orders between two flush points
pub const DEFAULT_BATCH_SIZE: usize = 3;

/// Per-session aggregation state
///
/// Every `batch_size` admitted orders form a flush point at which *all*
/// current buckets are emitted and the mapping is cleared, whether or not a
/// bucket is full. Buckets are never shared between sessions.
#[derive(Debug)]
pub struct ShipmentAggregator {
    batch_size: usize,
    pending: usize,
    buckets: HashMap<String, CombinedShipment>,
}

impl ShipmentAggregator {
    /// Create an aggregator flushing every `batch_size` orders
    ///
    /// A `batch_size` of zero is treated as one.
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
            pending: 0,
            buckets: HashMap::new(),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Orders admitted since the last flush point
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Number of in-progress destination buckets
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Add a resolved order to its destination bucket
    ///
    /// # Returns
    ///
    /// The shipments flushed by this admission, in unspecified order. Empty
    /// unless this order reached a flush point.
    pub fn admit(&mut self, order: Order) -> Vec<CombinedShipment> {
        let destination = order.destination.clone();
        let bucket = self
            .buckets
            .entry(destination)
            .or_insert_with_key(|destination| CombinedShipment::new(destination));
        bucket.orders.push(order);

        self.pending += 1;
        if self.pending < self.batch_size {
            return Vec::new();
        }

        self.pending = 0;
        let flushed = self.take_buckets();
        for shipment in &flushed {
            tracing::debug!(
                "Batch flush: {} -> {} order(s)",
                shipment.id,
                shipment.orders.len()
            );
        }
        flushed
    }

    /// Emit every remaining bucket regardless of size, consuming the state
    pub fn drain(mut self) -> Vec<CombinedShipment> {
        self.take_buckets()
    }

    fn take_buckets(&mut self) -> Vec<CombinedShipment> {
        self.buckets.drain().map(|(_, shipment)| shipment).collect()
    }
}

impl Default for ShipmentAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(id: &str, destination: &str) -> Order {
        Order {
            id: id.to_string(),
            destination: destination.to_string(),
            ..Default::default()
        }
    }

    fn by_id(mut shipments: Vec<CombinedShipment>) -> Vec<(String, Vec<String>)> {
        shipments.sort_by(|a, b| a.id.cmp(&b.id));
        shipments
            .into_iter()
            .map(|s| (s.id, s.orders.into_iter().map(|o| o.id).collect()))
            .collect()
    }

    #[test]
    fn test_flush_every_batch_and_clear_all_buckets() {
        let mut aggregator = ShipmentAggregator::new(3);

        assert!(aggregator.admit(order("1", "A")).is_empty());
        assert!(aggregator.admit(order("2", "B")).is_empty());
        let first = aggregator.admit(order("3", "A"));
        assert_eq!(
            by_id(first),
            vec![
                ("A".to_string(), vec!["1".to_string(), "3".to_string()]),
                ("B".to_string(), vec!["2".to_string()]),
            ]
        );
        assert_eq!(aggregator.bucket_count(), 0);
        assert_eq!(aggregator.pending(), 0);

        assert!(aggregator.admit(order("4", "A")).is_empty());
        assert!(aggregator.admit(order("5", "B")).is_empty());
        let second = aggregator.admit(order("6", "B"));
        assert_eq!(
            by_id(second),
            vec![
                ("A".to_string(), vec!["4".to_string()]),
                ("B".to_string(), vec!["5".to_string(), "6".to_string()]),
            ]
        );

        assert!(aggregator.drain().is_empty());
    }

    #[test]
    fn test_drain_emits_partial_buckets() {
        let mut aggregator = ShipmentAggregator::new(3);
        aggregator.admit(order("1", "A"));
        aggregator.admit(order("2", "B"));

        let drained = by_id(aggregator.drain());
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].1, vec!["1".to_string()]);
        assert_eq!(drained[1].1, vec!["2".to_string()]);
    }

    #[test]
    fn test_drain_of_fresh_aggregator_is_empty() {
        assert!(ShipmentAggregator::default().drain().is_empty());
    }

    #[test]
    fn test_shipments_share_one_destination() {
        let mut aggregator = ShipmentAggregator::new(5);
        for (i, dest) in ["A", "B", "A", "C", "B"].iter().enumerate() {
            aggregator.admit(order(&i.to_string(), dest));
        }
        // The fifth admission was the flush point; nothing left to drain.
        assert_eq!(aggregator.bucket_count(), 0);

        let mut aggregator = ShipmentAggregator::new(10);
        for (i, dest) in ["A", "B", "A", "C", "B"].iter().enumerate() {
            aggregator.admit(order(&i.to_string(), dest));
        }
        for shipment in aggregator.drain() {
            assert!(shipment.orders.iter().all(|o| o.destination == shipment.id));
            assert_eq!(shipment.status, "Processed");
        }
    }

    #[test]
    fn test_batch_size_one_flushes_each_order() {
        let mut aggregator = ShipmentAggregator::new(1);
        let flushed = aggregator.admit(order("1", "A"));
        assert_eq!(flushed.len(), 1);
        assert_eq!(flushed[0].order_ids(), vec!["1"]);
    }

    #[test]
    fn test_zero_batch_size_is_clamped() {
        let aggregator = ShipmentAggregator::new(0);
        assert_eq!(aggregator.batch_size(), 1);
    }
}
