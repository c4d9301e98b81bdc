// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The batch scheduler and the pull-driven exhaustion loop.
//!
//! A single `process_batch` advances the tree minimally: containers pick one
//! child under pressure, drain it back-to-front, and move whatever became
//! ready into the chosen child's follower.

use piper_core::Level;

use crate::error::Error;
use crate::scope::Scope;
use crate::tree::{Body, Pipeline, SegmentId};

impl<T: 'static, C: 'static> Pipeline<T, C> {
    /// Advance the tree by one scheduling step.
    pub fn process_batch(&mut self) -> Result<(), Error> {
        let root = self.root();
        self.process_batch_at(root)
    }

    pub(crate) fn process_batch_at(&mut self, seg: SegmentId) -> Result<(), Error> {
        if self.is_container(seg) {
            self.schedule(seg)
        } else {
            self.run_handler(seg)
        }
    }

    /// Scheduling policy:
    /// 1. the last child (closest to the drain) holding at least a full
    ///    batch, or with drained items ready to move, wins — draining
    ///    back-to-front keeps upstream segments from stalling;
    /// 2. otherwise the child closest to overflow wins, first in tree order
    ///    on ties;
    /// 3. afterwards the chosen child's ready items move to its follower,
    ///    through that follower's own gate.
    fn schedule(&mut self, seg: SegmentId) -> Result<(), Error> {
        let children: Vec<SegmentId> = self.children_of(seg).to_vec();
        let overflowing = children
            .iter()
            .rev()
            .find(|&&child| self.urgency(child) >= 100)
            .copied();
        let chosen = match overflowing {
            Some(child) => {
                self.log(
                    Level::Debug,
                    seg,
                    "chose overflowing process closest to drain",
                );
                child
            }
            None => {
                let mut best: Option<(SegmentId, usize)> = None;
                for &child in &children {
                    if self.pending_at(child) == 0 && self.ready_at(child) == 0 {
                        continue;
                    }
                    let urgency = self.urgency(child);
                    if best.is_none_or(|(_, top)| urgency > top) {
                        best = Some((child, urgency));
                    }
                }
                let Some((child, _)) = best else {
                    return Ok(());
                };
                self.log(Level::Debug, seg, "chose process closest to overflow");
                child
            }
        };
        self.process_batch_at(chosen)?;
        self.move_ready(chosen);
        Ok(())
    }

    /// Move everything in the chosen child's drain into its follower.
    fn move_ready(&mut self, child: SegmentId) {
        let ready = self.ready_at(child);
        if ready == 0 {
            return;
        }
        let items = self.take_drain(child, ready);
        let outlet = self.outlet_of(child);
        self.deliver(outlet, items);
    }

    /// Dequeue up to one effective batch and hand it to the handler. Empty
    /// batches are skipped. A handler failure is logged once at the failing
    /// segment, then surfaced to the driving root operation.
    fn run_handler(&mut self, seg: SegmentId) -> Result<(), Error> {
        let batch_size = self.effective_batch_size(seg);
        let batch = match &mut self.nodes[seg.0].body {
            Body::Processor { pending, .. } => pending.dequeue(batch_size),
            Body::Container { .. } => Vec::new(),
        };
        if batch.is_empty() {
            return Ok(());
        }
        self.log(
            Level::Debug,
            seg,
            &format!("processing batch of {}", batch.len()),
        );
        let handler = match &self.node(seg).body {
            Body::Processor { handler, .. } => std::rc::Rc::clone(handler),
            Body::Container { .. } => return Ok(()),
        };
        let result = (*handler)(&mut Scope::new(self, seg), batch);
        if let Err(error) = &result {
            self.log(Level::Error, seg, &error.to_string());
        }
        result
    }

    // ---- exhaustion loop ----------------------------------------------

    /// Process until something reaches the root drain or nothing is left.
    /// Returns true when an item is ready to dequeue.
    pub fn isnt_exhausted(&mut self) -> Result<bool, Error> {
        while self.ready() == 0 && self.pending() > 0 {
            self.process_batch()?;
        }
        Ok(self.ready() > 0)
    }

    /// Once true, stays true until `enqueue` adds new work.
    pub fn is_exhausted(&mut self) -> Result<bool, Error> {
        Ok(!self.isnt_exhausted()?)
    }

    /// Process until nothing is pending, regardless of whether anything
    /// becomes ready.
    pub fn flush(&mut self) -> Result<(), Error> {
        while self.pending() > 0 {
            self.process_batch()?;
        }
        Ok(())
    }

    /// Process until at least `n` items are ready, or nothing is pending.
    pub fn prepare(&mut self, n: usize) -> Result<(), Error> {
        while self.ready() < n && self.pending() > 0 {
            self.process_batch()?;
        }
        Ok(())
    }

    /// Pull the next item, forcing processing as needed.
    pub fn dequeue(&mut self) -> Result<Option<T>, Error> {
        Ok(self.dequeue_n(1)?.pop())
    }

    /// Pull up to `n` items, forcing processing as needed. Returns fewer
    /// only when the pipeline exhausts first.
    pub fn dequeue_n(&mut self, n: usize) -> Result<Vec<T>, Error> {
        self.prepare(n)?;
        let root = self.root();
        Ok(self.take_drain(root, n))
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
