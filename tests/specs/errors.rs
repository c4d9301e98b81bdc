//! Error-handling specs
//!
//! Configuration violations fail at `init`; unresolved locations and handler
//! failures surface from the driving root operation without corrupting the
//! pipeline.

use crate::prelude::*;
use piper_engine::{ConfigError, Container, Error, Processor, Scope};

#[test]
fn containers_require_at_least_one_child() {
    let error = Container::<i64, ()>::new()
        .label("main")
        .init(())
        .err()
        .expect("init should fail");
    match error {
        Error::Config(ConfigError::EmptyContainer { path }) => assert_eq!(path, "main"),
        other => panic!("expected EmptyContainer, got {other:?}"),
    }
}

#[test]
fn batch_sizes_must_be_positive() {
    let result = Container::new()
        .label("main")
        .child(Processor::new(passthrough).label("p").batch_size(0))
        .init(());
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::ZeroBatchSize { .. }))
    ));
}

#[test]
fn inject_after_unknown_location_names_the_op_and_location() {
    fn misroute(scope: &mut Scope<'_, i64, ()>, batch: Vec<i64>) -> Result<(), Error> {
        scope.inject_after("bogus", batch)?;
        Ok(())
    }

    let mut pipe = Container::new()
        .label("main")
        .child(Processor::new(misroute).label("p"))
        .init(())
        .unwrap();

    pipe.enqueue([1]);
    let error = pipe.dequeue().unwrap_err();
    let message = error.to_string();
    assert!(message.contains("inject_after"), "got: {message}");
    assert!(message.contains("bogus"), "got: {message}");

    // no partial routing happened
    assert_eq!(pipe.ready(), 0);
    assert!(!pipe.has_pending());
}

#[test]
fn handler_failures_leave_the_pipeline_retryable() {
    fn flaky(scope: &mut Scope<'_, i64, ()>, batch: Vec<i64>) -> Result<(), Error> {
        for x in batch {
            if x == 0 {
                return Err(scope.fail("zero is not welcome here"));
            }
            scope.emit([x]);
        }
        Ok(())
    }

    let mut pipe = Container::new()
        .label("main")
        .child(Processor::new(flaky).label("flaky").batch_size(1))
        .init(())
        .unwrap();

    pipe.enqueue([7, 0, 9]);
    assert_eq!(pipe.dequeue().unwrap(), Some(7));

    let error = pipe.dequeue().unwrap_err();
    assert!(error.to_string().contains("main/flaky"));
    assert!(error.to_string().contains("zero is not welcome here"));

    // subsequent operations keep working on the remaining items
    assert_eq!(pipe.dequeue().unwrap(), Some(9));
    assert!(pipe.is_exhausted().unwrap());
}

#[test]
fn errors_propagate_through_flush_and_prepare() {
    fn always_fails(scope: &mut Scope<'_, i64, ()>, _batch: Vec<i64>) -> Result<(), Error> {
        Err(scope.fail("broken"))
    }

    let mut pipe = Container::new()
        .label("main")
        .child(Processor::new(always_fails).label("p").batch_size(1))
        .init(())
        .unwrap();

    pipe.enqueue([1, 2]);
    assert!(pipe.flush().is_err());
    assert!(pipe.prepare(1).is_err());
    // both calls consumed one failing batch each
    assert!(pipe.is_exhausted().unwrap());
}
