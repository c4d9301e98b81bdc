//! Location-resolution specs
//!
//! Nearest-neighbour lookup over a tree with deliberately ambiguous labels:
//!
//! ```text
//! A { B { A { B }, B }, C { x } }
//! ```

use crate::prelude::*;
use piper_engine::{Container, Error, Pipeline, Processor, Scope};
use std::cell::RefCell;

fn precedence_tree() -> Pipeline<i64, ()> {
    Container::new()
        .label("A")
        .child(
            Container::new()
                .label("B")
                .child(
                    Container::new()
                        .label("A")
                        .child(Processor::new(passthrough).label("B")),
                )
                .child(Processor::new(passthrough).label("B")),
        )
        .child(
            Container::new()
                .label("C")
                .child(Processor::new(passthrough).label("x")),
        )
        .init(())
        .unwrap()
}

fn found_path(pipe: &Pipeline<i64, ()>, location: &str) -> Option<String> {
    pipe.find_segment(location)
        .map(|seg| pipe.path_of(seg).to_string())
}

#[test]
fn from_the_root_a_grandchild_beats_self() {
    let pipe = precedence_tree();
    assert_eq!(found_path(&pipe, "A"), Some("A/B/A".to_string()));
}

#[test]
fn deep_matches_beat_shallow_ones_for_multi_label_paths() {
    let pipe = precedence_tree();
    assert_eq!(found_path(&pipe, "A/B"), Some("A/B/A/B".to_string()));
}

#[test]
fn exact_full_paths_always_resolve() {
    let pipe = precedence_tree();
    assert_eq!(found_path(&pipe, "A/B/A/B"), Some("A/B/A/B".to_string()));
    assert_eq!(found_path(&pipe, "A/C/x"), Some("A/C/x".to_string()));
    assert_eq!(found_path(&pipe, "A/C"), Some("A/C".to_string()));
}

#[test]
fn unknown_locations_stay_unresolved() {
    let pipe = precedence_tree();
    assert_eq!(pipe.find_segment("missing"), None);
    assert_eq!(pipe.find_segment("A/missing"), None);
}

#[test]
fn handlers_resolve_relative_to_their_own_segment() {
    type Found = RefCell<Vec<(&'static str, bool)>>;

    fn spy(scope: &mut Scope<'_, i64, Found>, batch: Vec<i64>) -> Result<(), Error> {
        let mut journal = scope.context().borrow_mut();
        journal.push(("self", scope.find_segment("worker").is_some()));
        journal.push(("sibling", scope.find_segment("peer").is_some()));
        journal.push(("cousin", scope.find_segment("far/away").is_some()));
        journal.push(("missing", scope.find_segment("nowhere").is_some()));
        drop(journal);
        scope.emit(batch);
        Ok(())
    }

    fn idle(scope: &mut Scope<'_, i64, Found>, batch: Vec<i64>) -> Result<(), Error> {
        scope.emit(batch);
        Ok(())
    }

    let mut pipe = Container::new()
        .label("main")
        .child(Processor::new(spy).label("worker"))
        .child(Processor::new(idle).label("peer"))
        .child(
            Container::new()
                .label("far")
                .child(Processor::new(idle).label("away")),
        )
        .init(RefCell::new(Vec::new()))
        .unwrap();

    pipe.enqueue([1]);
    assert_eq!(pipe.dequeue().unwrap(), Some(1));
    assert_eq!(
        pipe.context().borrow().as_slice(),
        &[
            ("self", true),
            ("sibling", true),
            ("cousin", true),
            ("missing", false)
        ]
    );
}
