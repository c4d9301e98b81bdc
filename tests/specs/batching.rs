//! Batching + filtering specs
//!
//! A `main` container batching by 4 holds a single `half` child that only
//! admits even numbers and halves them two at a time. Odd items skip
//! straight to the drain in input order; even items follow once processed.

use crate::prelude::*;
use piper_engine::{Container, Processor, SegmentConfig};
use yare::parameterized;

#[test]
fn odd_items_skip_and_even_items_process_in_order() {
    let mut pipe = Container::new()
        .label("main")
        .batch_size(4)
        .child(
            Processor::new(halve)
                .label("half")
                .batch_size(2)
                .allow(|x: &i64| x % 2 == 0),
        )
        .init(())
        .unwrap();

    pipe.enqueue([1, 2, 3, 4, 5, 6]);
    assert_eq!(pipe.dequeue_n(6).unwrap(), vec![1, 3, 5, 1, 2, 3]);
    assert!(pipe.is_exhausted().unwrap());
}

#[test]
fn pull_driven_iteration_drains_everything() {
    let mut pipe = Container::new()
        .label("main")
        .child(
            Processor::new(halve)
                .label("half")
                .batch_size(2)
                .allow(|x: &i64| x % 2 == 0),
        )
        .init(())
        .unwrap();

    pipe.enqueue([2, 4, 6, 8]);
    let mut out = Vec::new();
    while pipe.isnt_exhausted().unwrap() {
        if let Some(item) = pipe.dequeue().unwrap() {
            out.push(item);
        }
    }
    assert_eq!(out, vec![1, 2, 3, 4]);
}

#[parameterized(
    singles = { 1 },
    pairs = { 2 },
    oversized = { 64 },
)]
fn order_is_preserved_for_any_batch_size(batch_size: usize) {
    let mut pipe = Container::new()
        .label("main")
        .child(Processor::new(passthrough).label("id").batch_size(batch_size))
        .init(())
        .unwrap();

    let items: Vec<i64> = (0..23).collect();
    pipe.enqueue(items.clone());
    assert_eq!(pipe.dequeue_n(23).unwrap(), items);
}

#[test]
fn option_records_configure_segments() {
    let config: SegmentConfig =
        serde_json::from_str(r#"{"label": "half", "batch_size": 2}"#).unwrap();
    let mut pipe = Container::new()
        .label("main")
        .child(
            Processor::new(halve)
                .configure(&config)
                .allow(|x: &i64| x % 2 == 0),
        )
        .init(())
        .unwrap();

    let half = pipe.find_segment("half").expect("label from the record");
    assert_eq!(pipe.effective_batch_size(half), 2);

    pipe.enqueue([2, 4]);
    assert_eq!(pipe.dequeue_n(2).unwrap(), vec![1, 2]);
}

#[test]
fn flush_and_prepare_drive_processing_without_dequeue() {
    let mut pipe = Container::new()
        .label("main")
        .child(Processor::new(passthrough).label("id").batch_size(1))
        .init(())
        .unwrap();

    pipe.enqueue([1, 2, 3]);
    pipe.prepare(2).unwrap();
    assert_eq!(pipe.ready(), 2);
    assert_eq!(pipe.pending(), 1);

    pipe.flush().unwrap();
    assert_eq!(pipe.ready(), 3);
    assert!(!pipe.has_pending());
}
