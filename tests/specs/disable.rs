//! Disable-inheritance specs
//!
//! Disabled segments never run handlers: items route to the segment's
//! drain-equivalent unchanged, while enabled siblings keep processing.

use crate::prelude::*;
use piper_engine::{Container, Error, Processor, Scope};

fn add_ten(scope: &mut Scope<'_, i64, ()>, batch: Vec<i64>) -> Result<(), Error> {
    scope.emit(batch.into_iter().map(|x| x + 10));
    Ok(())
}

fn two_stage() -> piper_engine::Pipeline<i64, ()> {
    Container::new()
        .label("main")
        .child(Processor::new(add_ten).label("first"))
        .child(Processor::new(add_ten).label("second"))
        .init(())
        .unwrap()
}

#[test]
fn disabling_the_root_forwards_items_unchanged() {
    let mut pipe = two_stage();
    pipe.set_enabled(pipe.root(), Some(false));

    pipe.enqueue([1, 2, 3]);
    assert_eq!(pipe.ready(), 3);
    assert_eq!(pipe.dequeue_n(3).unwrap(), vec![1, 2, 3]);
}

#[test]
fn reenabling_the_root_restores_processing() {
    let mut pipe = two_stage();
    pipe.set_enabled(pipe.root(), Some(false));
    pipe.enqueue([1]);
    assert_eq!(pipe.dequeue().unwrap(), Some(1));

    pipe.set_enabled(pipe.root(), None);
    pipe.enqueue([1]);
    assert_eq!(pipe.dequeue().unwrap(), Some(21));
}

#[test]
fn disabling_one_child_bypasses_only_that_child() {
    let mut pipe = two_stage();
    let first = pipe.find_segment("first").unwrap();
    pipe.set_enabled(first, Some(false));

    pipe.enqueue([1, 2]);
    assert_eq!(pipe.dequeue_n(2).unwrap(), vec![11, 12]);
}

#[test]
fn descendants_of_a_disabled_container_are_disabled() {
    let mut pipe = Container::new()
        .label("main")
        .child(
            Container::new()
                .label("sub")
                .child(Processor::new(add_ten).label("worker")),
        )
        .init(())
        .unwrap();
    let sub = pipe.find_segment("sub").unwrap();
    let worker = pipe.find_segment("worker").unwrap();

    pipe.set_enabled(sub, Some(false));
    assert!(!pipe.is_enabled(worker));

    // items pass the disabled subtree unchanged and are not stranded
    pipe.enqueue([5, 6]);
    assert_eq!(pipe.dequeue_n(2).unwrap(), vec![5, 6]);
    assert!(pipe.is_exhausted().unwrap());
}

#[test]
fn emit_bypasses_the_emitting_segments_own_gate() {
    // a segment that disables itself mid-handler still delivers its output:
    // emit consults only the follower's gate, never the producer's
    fn disable_and_emit(scope: &mut Scope<'_, i64, ()>, batch: Vec<i64>) -> Result<(), Error> {
        scope.set_enabled(Some(false));
        scope.emit(batch.into_iter().map(|x| x + 10));
        Ok(())
    }

    let mut pipe = Container::new()
        .label("main")
        .child(Processor::new(disable_and_emit).label("once"))
        .init(())
        .unwrap();

    pipe.enqueue([1]);
    assert_eq!(pipe.dequeue().unwrap(), Some(11));

    // the disable is in force for every later enqueue
    pipe.enqueue([2]);
    assert_eq!(pipe.dequeue().unwrap(), Some(2));
}

#[test]
fn allow_and_disable_compose_on_the_same_route() {
    let mut pipe = Container::new()
        .label("main")
        .child(
            Processor::new(add_ten)
                .label("picky")
                .allow(|x: &i64| *x > 0)
                .enabled(false),
        )
        .child(Processor::new(passthrough).label("relay"))
        .init(())
        .unwrap();

    // disabled wins before the predicate: everything bypasses to the relay
    pipe.enqueue([-1, 1]);
    assert_eq!(pipe.dequeue_n(2).unwrap(), vec![-1, 1]);
}
