// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Segment blueprints: declarative descriptions of processors and containers.
//!
//! A blueprint is immutable once built and may be instantiated many times;
//! `init` produces a live [`Pipeline`] with its own queues and runtime state.

use serde::{Deserialize, Serialize};
use std::rc::Rc;

use crate::engine::Engine;
use crate::error::Error;
use crate::scope::Scope;
use crate::tree::Pipeline;

/// Handler invoked with the running segment's view and one batch of items.
///
/// Handlers route every result explicitly via flow-control calls on the
/// scope (`emit`, `recycle`, `inject`, ...); nothing is forwarded implicitly.
pub type Handler<T, C> = Rc<dyn Fn(&mut Scope<'_, T, C>, Vec<T>) -> Result<(), Error>>;

/// Per-item admission predicate, evaluated by the enqueue gate.
pub type Allow<T> = Rc<dyn Fn(&T) -> bool>;

/// Common segment options shared by processors and containers.
///
/// All fields distinguish set from unset; unset values inherit from the
/// nearest ancestor at runtime.
pub(crate) struct Opts<T> {
    pub(crate) label: Option<String>,
    pub(crate) batch_size: Option<usize>,
    pub(crate) enabled: Option<bool>,
    pub(crate) debug: Option<u32>,
    pub(crate) verbose: Option<u32>,
    pub(crate) allow: Option<Allow<T>>,
}

impl<T> Opts<T> {
    fn apply(&mut self, config: &SegmentConfig) {
        if let Some(label) = &config.label {
            self.label = Some(label.clone());
        }
        if let Some(batch_size) = config.batch_size {
            self.batch_size = Some(batch_size);
        }
        if let Some(enabled) = config.enabled {
            self.enabled = Some(enabled);
        }
        if let Some(debug) = config.debug {
            self.debug = Some(debug);
        }
        if let Some(verbose) = config.verbose {
            self.verbose = Some(verbose);
        }
    }
}

impl<T> Default for Opts<T> {
    fn default() -> Self {
        Self {
            label: None,
            batch_size: None,
            enabled: None,
            debug: None,
            verbose: None,
            allow: None,
        }
    }
}

impl<T> Clone for Opts<T> {
    fn clone(&self) -> Self {
        Self {
            label: self.label.clone(),
            batch_size: self.batch_size,
            enabled: self.enabled,
            debug: self.debug,
            verbose: self.verbose,
            allow: self.allow.clone(),
        }
    }
}

/// Declarative segment options, loadable from serialized config.
///
/// Only data-shaped attributes appear here; predicates and handlers are code
/// and attach through the builder methods.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentConfig {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub batch_size: Option<usize>,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub debug: Option<u32>,
    #[serde(default)]
    pub verbose: Option<u32>,
}

/// Leaf blueprint: a handler plus common options.
pub struct Processor<T, C = ()> {
    pub(crate) opts: Opts<T>,
    pub(crate) handler: Handler<T, C>,
}

impl<T: 'static, C: 'static> Processor<T, C> {
    pub fn new(
        handler: impl Fn(&mut Scope<'_, T, C>, Vec<T>) -> Result<(), Error> + 'static,
    ) -> Self {
        Self {
            opts: Opts::default(),
            handler: Rc::new(handler),
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.opts.label = Some(label.into());
        self
    }

    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.opts.batch_size = Some(batch_size);
        self
    }

    /// Admission predicate: items failing it skip this segment and continue
    /// to its follower.
    pub fn allow(mut self, predicate: impl Fn(&T) -> bool + 'static) -> Self {
        self.opts.allow = Some(Rc::new(predicate));
        self
    }

    /// Alias of [`Processor::allow`].
    pub fn filter(self, predicate: impl Fn(&T) -> bool + 'static) -> Self {
        self.allow(predicate)
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.opts.enabled = Some(enabled);
        self
    }

    pub fn debug(mut self, level: u32) -> Self {
        self.opts.debug = Some(level);
        self
    }

    pub fn verbose(mut self, level: u32) -> Self {
        self.opts.verbose = Some(level);
        self
    }

    /// Merge set fields from an option record over this blueprint.
    pub fn configure(mut self, config: &SegmentConfig) -> Self {
        self.opts.apply(config);
        self
    }

    pub fn init(self, context: C) -> Result<Pipeline<T, C>, Error> {
        Segment::from(self).init(context)
    }

    pub fn init_with(self, engine: Engine<T>, context: C) -> Result<Pipeline<T, C>, Error> {
        Segment::from(self).init_with(engine, context)
    }
}

impl<T, C> Clone for Processor<T, C> {
    fn clone(&self) -> Self {
        Self {
            opts: self.opts.clone(),
            handler: Rc::clone(&self.handler),
        }
    }
}

/// Branch blueprint: common options plus an ordered, non-empty child list.
pub struct Container<T, C = ()> {
    pub(crate) opts: Opts<T>,
    pub(crate) children: Vec<Segment<T, C>>,
}

impl<T: 'static, C: 'static> Container<T, C> {
    pub fn new() -> Self {
        Self {
            opts: Opts::default(),
            children: Vec::new(),
        }
    }

    /// Append a child segment. Accepts processors, containers,
    /// `(label, segment)` relabeling pairs, and live pipelines (unwrapped
    /// back to their blueprint).
    pub fn child(mut self, segment: impl Into<Segment<T, C>>) -> Self {
        self.children.push(segment.into());
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.opts.label = Some(label.into());
        self
    }

    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.opts.batch_size = Some(batch_size);
        self
    }

    /// Admission predicate: items failing it skip the whole container and
    /// land in its drain.
    pub fn allow(mut self, predicate: impl Fn(&T) -> bool + 'static) -> Self {
        self.opts.allow = Some(Rc::new(predicate));
        self
    }

    /// Alias of [`Container::allow`].
    pub fn filter(self, predicate: impl Fn(&T) -> bool + 'static) -> Self {
        self.allow(predicate)
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.opts.enabled = Some(enabled);
        self
    }

    pub fn debug(mut self, level: u32) -> Self {
        self.opts.debug = Some(level);
        self
    }

    pub fn verbose(mut self, level: u32) -> Self {
        self.opts.verbose = Some(level);
        self
    }

    /// Merge set fields from an option record over this blueprint.
    pub fn configure(mut self, config: &SegmentConfig) -> Self {
        self.opts.apply(config);
        self
    }

    pub fn init(self, context: C) -> Result<Pipeline<T, C>, Error> {
        Segment::from(self).init(context)
    }

    pub fn init_with(self, engine: Engine<T>, context: C) -> Result<Pipeline<T, C>, Error> {
        Segment::from(self).init_with(engine, context)
    }
}

impl<T: 'static, C: 'static> Default for Container<T, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, C> Clone for Container<T, C> {
    fn clone(&self) -> Self {
        Self {
            opts: self.opts.clone(),
            children: self.children.clone(),
        }
    }
}

/// A segment blueprint: either a processor or a container.
pub enum Segment<T, C = ()> {
    Processor(Processor<T, C>),
    Container(Container<T, C>),
}

impl<T: 'static, C: 'static> Segment<T, C> {
    pub(crate) fn opts(&self) -> &Opts<T> {
        match self {
            Segment::Processor(processor) => &processor.opts,
            Segment::Container(container) => &container.opts,
        }
    }

    /// Override the segment's label.
    pub fn label(self, label: impl Into<String>) -> Self {
        match self {
            Segment::Processor(processor) => Segment::Processor(processor.label(label)),
            Segment::Container(container) => Segment::Container(container.label(label)),
        }
    }

    /// Instantiate with default engine settings.
    pub fn init(self, context: C) -> Result<Pipeline<T, C>, Error> {
        self.init_with(Engine::default(), context)
    }

    /// Instantiate with explicit engine settings. The context is captured
    /// once and shared read-only with every handler invocation.
    pub fn init_with(self, engine: Engine<T>, context: C) -> Result<Pipeline<T, C>, Error> {
        Pipeline::build(self, engine, context)
    }
}

impl<T, C> Clone for Segment<T, C> {
    fn clone(&self) -> Self {
        match self {
            Segment::Processor(processor) => Segment::Processor(processor.clone()),
            Segment::Container(container) => Segment::Container(container.clone()),
        }
    }
}

impl<T, C> From<Processor<T, C>> for Segment<T, C> {
    fn from(processor: Processor<T, C>) -> Self {
        Segment::Processor(processor)
    }
}

impl<T, C> From<Container<T, C>> for Segment<T, C> {
    fn from(container: Container<T, C>) -> Self {
        Segment::Container(container)
    }
}

/// `(label, segment)` pairs override the segment's label.
impl<T: 'static, C: 'static, S: Into<Segment<T, C>>> From<(&str, S)> for Segment<T, C> {
    fn from((label, segment): (&str, S)) -> Self {
        segment.into().label(label)
    }
}

/// A live pipeline unwraps back to the blueprint it was built from.
impl<T: 'static, C: 'static> From<&Pipeline<T, C>> for Segment<T, C> {
    fn from(pipeline: &Pipeline<T, C>) -> Self {
        pipeline.blueprint().clone()
    }
}

#[cfg(test)]
#[path = "blueprint_tests.rs"]
mod tests;
