// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine settings: process defaults, queue factory, and log sink.
//!
//! Settings are an explicit record passed to `init_with` rather than ambient
//! global state, so tests and embedders can run pipelines with independent
//! configurations side by side.

use piper_core::{Fifo, Logger, Queue, TracingLogger};
use std::rc::Rc;

/// Default batch size when neither a segment nor an ancestor sets one.
pub const DEFAULT_BATCH_SIZE: usize = 200;

/// Environment variable that globally pins every segment's debug level.
pub const DEBUG_ENV: &str = "PIPER_DEBUG";

/// Environment variable that globally pins every segment's verbose level.
pub const VERBOSE_ENV: &str = "PIPER_VERBOSE";

/// Engine-wide settings captured once per pipeline instance.
///
/// `PIPER_DEBUG` / `PIPER_VERBOSE` are read at construction; when present
/// they mask every in-tree debug/verbose setting.
pub struct Engine<T> {
    pub(crate) batch_size: usize,
    pub(crate) queue_factory: Rc<dyn Fn() -> Box<dyn Queue<T>>>,
    pub(crate) logger: Rc<dyn Logger>,
    pub(crate) debug_override: Option<u32>,
    pub(crate) verbose_override: Option<u32>,
}

impl<T: 'static> Engine<T> {
    pub fn new() -> Self {
        let queue_factory: Rc<dyn Fn() -> Box<dyn Queue<T>>> = Rc::new(|| Box::new(Fifo::new()));
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            queue_factory,
            logger: Rc::new(TracingLogger),
            debug_override: env_level(DEBUG_ENV),
            verbose_override: env_level(VERBOSE_ENV),
        }
    }

    /// Default batch size for segments that don't set their own.
    /// Zero is rejected at `init`.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Factory for every pending queue and drain in the tree.
    pub fn with_queue_factory(
        mut self,
        factory: impl Fn() -> Box<dyn Queue<T>> + 'static,
    ) -> Self {
        self.queue_factory = Rc::new(factory);
        self
    }

    /// Diagnostic sink for every segment.
    pub fn with_logger(mut self, logger: impl Logger + 'static) -> Self {
        self.logger = Rc::new(logger);
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn debug_override(&self) -> Option<u32> {
        self.debug_override
    }

    pub fn verbose_override(&self) -> Option<u32> {
        self.verbose_override
    }

    pub(crate) fn new_queue(&self) -> Box<dyn Queue<T>> {
        (*self.queue_factory)()
    }
}

impl<T: 'static> Default for Engine<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Engine<T> {
    fn clone(&self) -> Self {
        Self {
            batch_size: self.batch_size,
            queue_factory: Rc::clone(&self.queue_factory),
            logger: Rc::clone(&self.logger),
            debug_override: self.debug_override,
            verbose_override: self.verbose_override,
        }
    }
}

/// Parse an integer level from the environment. Unset or unparseable
/// values are ignored.
fn env_level(name: &str) -> Option<u32> {
    let value = std::env::var(name).ok()?;
    match value.trim().parse() {
        Ok(level) => Some(level),
        Err(_) => {
            tracing::warn!(name, value = %value, "ignoring unparseable level override");
            None
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
