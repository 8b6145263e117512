#![no_main]

use libfuzzer_sys::fuzz_target;
use ordermgmt::{Order, ShipmentAggregator};

// Fuzzer for the shipment aggregator.
//
// The first byte picks the batch size; every following byte is one order
// whose destination is drawn from a small alphabet so buckets collide. After
// feeding all orders through `admit` and `drain`, every order must have been
// emitted exactly once, and every shipment must hold a single destination.

fuzz_target!(|data: &[u8]| {
    let Some((&batch, orders)) = data.split_first() else {
        return;
    };
    let batch_size = (batch % 16) as usize + 1;
    let mut aggregator = ShipmentAggregator::new(batch_size);

    let mut emitted = Vec::new();
    for (i, byte) in orders.iter().enumerate() {
        let order = Order {
            id: i.to_string(),
            destination: format!("D{}", byte % 5),
            ..Default::default()
        };
        let flushed = aggregator.admit(order);
        if (i + 1) % batch_size == 0 {
            assert_eq!(aggregator.bucket_count(), 0);
        } else {
            assert!(flushed.is_empty());
        }
        emitted.extend(flushed);
    }
    emitted.extend(aggregator.drain());

    let mut seen: Vec<usize> = Vec::new();
    for shipment in &emitted {
        assert!(!shipment.orders.is_empty());
        for order in &shipment.orders {
            assert_eq!(order.destination, shipment.id);
            seen.push(order.id.parse().unwrap());
        }
    }
    seen.sort_unstable();
    assert_eq!(seen, (0..orders.len()).collect::<Vec<_>>());
});
