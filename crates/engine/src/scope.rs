// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The running segment's view, handed to handlers: flow control,
//! introspection, and gated logging.

use piper_core::{Level, Path};
use std::fmt;

use crate::error::Error;
use crate::tree::{Pipeline, SegmentId};

/// Handler-side view of the segment currently processing a batch.
///
/// Flow-control calls mutate the tree synchronously; anything enqueued here
/// is visible before the next scheduler step.
pub struct Scope<'a, T, C = ()> {
    pipe: &'a mut Pipeline<T, C>,
    seg: SegmentId,
}

impl<'a, T: 'static, C: 'static> Scope<'a, T, C> {
    pub(crate) fn new(pipe: &'a mut Pipeline<T, C>, seg: SegmentId) -> Self {
        Self { pipe, seg }
    }

    // ---- flow control -------------------------------------------------

    /// Send items onward to this segment's follower (or the root drain).
    /// Bypasses this segment's own gate; the follower's gate still runs.
    pub fn emit(&mut self, items: impl IntoIterator<Item = T>) {
        let items: Vec<T> = items.into_iter().collect();
        if items.is_empty() {
            return;
        }
        let outlet = self.pipe.outlet_of(self.seg);
        self.pipe.deliver(outlet, items);
    }

    /// Put items back at the front of this segment's pending queue. After
    /// `recycle([a, b, c])` the next three items dequeued locally are
    /// `a`, `b`, `c`.
    pub fn recycle(&mut self, items: impl IntoIterator<Item = T>) {
        let items: Vec<T> = items.into_iter().collect();
        if items.is_empty() {
            return;
        }
        self.pipe.requeue_pending(self.seg, items);
    }

    /// Re-enter the parent container's gate (or this segment's own at the
    /// root), as if the items had been enqueued from outside.
    pub fn inject(&mut self, items: impl IntoIterator<Item = T>) {
        let items: Vec<T> = items.into_iter().collect();
        if items.is_empty() {
            return;
        }
        let target = self.pipe.parent_of(self.seg).unwrap_or(self.seg);
        self.pipe.feed(target, items);
    }

    /// Skip the rest of the parent container: append items directly to its
    /// drain (or this segment's own drain at the root).
    pub fn eject(&mut self, items: impl IntoIterator<Item = T>) {
        let items: Vec<T> = items.into_iter().collect();
        if items.is_empty() {
            return;
        }
        let target = self.pipe.parent_of(self.seg).unwrap_or(self.seg);
        self.pipe.push_drain(target, items);
    }

    /// Enqueue items at the segment a location resolves to, through its
    /// gate. Fails with [`Error::Unresolved`] for unknown locations.
    pub fn inject_at(
        &mut self,
        location: &str,
        items: impl IntoIterator<Item = T>,
    ) -> Result<(), Error> {
        let Some(target) = self.pipe.find_segment_from(self.seg, location) else {
            return Err(Error::Unresolved {
                op: "inject_at",
                location: location.to_string(),
            });
        };
        self.pipe.feed(target, items.into_iter().collect());
        Ok(())
    }

    /// Enqueue items at the follower of the segment a location resolves to.
    /// Fails with [`Error::Unresolved`] for unknown locations.
    pub fn inject_after(
        &mut self,
        location: &str,
        items: impl IntoIterator<Item = T>,
    ) -> Result<(), Error> {
        let Some(target) = self.pipe.find_segment_from(self.seg, location) else {
            return Err(Error::Unresolved {
                op: "inject_after",
                location: location.to_string(),
            });
        };
        let outlet = self.pipe.outlet_of(target);
        self.pipe.deliver(outlet, items.into_iter().collect());
        Ok(())
    }

    /// Resolve a location relative to this segment (nearest match wins).
    pub fn find_segment(&self, location: &str) -> Option<SegmentId> {
        self.pipe.find_segment_from(self.seg, location)
    }

    // ---- introspection ------------------------------------------------

    pub fn id(&self) -> SegmentId {
        self.seg
    }

    pub fn path(&self) -> &Path {
        self.pipe.path_of(self.seg)
    }

    pub fn label(&self) -> &str {
        self.pipe.label_of(self.seg)
    }

    /// The shared read-only context captured at `init`.
    pub fn context(&self) -> &C {
        self.pipe.context()
    }

    pub fn pending(&self) -> usize {
        self.pipe.pending_at(self.seg)
    }

    pub fn ready(&self) -> usize {
        self.pipe.ready_at(self.seg)
    }

    pub fn pressure(&self) -> usize {
        self.pipe.pressure_at(self.seg)
    }

    pub fn batch_size(&self) -> usize {
        self.pipe.effective_batch_size(self.seg)
    }

    // ---- runtime attribute mirrors ------------------------------------

    pub fn set_batch_size(&mut self, value: Option<usize>) -> Result<(), Error> {
        self.pipe.set_batch_size(self.seg, value)
    }

    pub fn set_enabled(&mut self, value: Option<bool>) {
        self.pipe.set_enabled(self.seg, value);
    }

    pub fn set_debug(&mut self, value: Option<u32>) {
        self.pipe.set_debug(self.seg, value);
    }

    pub fn set_verbose(&mut self, value: Option<u32>) {
        self.pipe.set_verbose(self.seg, value);
    }

    // ---- logging ------------------------------------------------------

    pub fn info(&self, message: &str) {
        self.pipe.log(Level::Info, self.seg, message);
    }

    pub fn debug(&self, message: &str) {
        self.pipe.log(Level::Debug, self.seg, message);
    }

    pub fn warn(&self, message: &str) {
        self.pipe.log(Level::Warn, self.seg, message);
    }

    pub fn info_items(&self, message: &str, items: &[T])
    where
        T: fmt::Debug,
    {
        self.log_with(Level::Info, message, items);
    }

    pub fn debug_items(&self, message: &str, items: &[T])
    where
        T: fmt::Debug,
    {
        self.log_with(Level::Debug, message, items);
    }

    pub fn warn_items(&self, message: &str, items: &[T])
    where
        T: fmt::Debug,
    {
        self.log_with(Level::Warn, message, items);
    }

    /// Build a terminating handler failure carrying this segment's path.
    /// Return it from the handler to stop the driving root operation.
    pub fn fail(&self, message: impl Into<String>) -> Error {
        Error::Handler {
            path: self.path().to_string(),
            message: message.into(),
        }
    }

    fn log_with(&self, level: Level, message: &str, items: &[T])
    where
        T: fmt::Debug,
    {
        // item context costs formatting; only pay it when it will be shown
        let formatted: Vec<String> = if self.pipe.verbose_level(self.seg) > 1 {
            items.iter().map(|item| format!("{item:?}")).collect()
        } else {
            Vec::new()
        };
        self.pipe.log_items(level, self.seg, message, &formatted);
    }
}

#[cfg(test)]
#[path = "scope_tests.rs"]
mod tests;
