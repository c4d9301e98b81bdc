// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Live pipeline instances: the segment arena, attribute inheritance,
//! the enqueue gate, and pending/ready/pressure aggregation.

use indexmap::IndexMap;
use piper_core::{Level, Path, Queue};
use std::collections::HashMap;
use std::rc::Rc;

use crate::blueprint::{Allow, Handler, Segment};
use crate::engine::Engine;
use crate::error::{ConfigError, Error};

/// Stable handle to a segment within the pipeline instance that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SegmentId(pub(crate) usize);

/// Where a segment's output goes: the next sibling's gate, or a drain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outlet {
    Segment(SegmentId),
    Drain(SegmentId),
}

pub(crate) struct Node<T, C> {
    pub(crate) label: String,
    pub(crate) path: Path,
    pub(crate) parent: Option<SegmentId>,
    // writable mirrors of the blueprint options
    pub(crate) batch_size: Option<usize>,
    pub(crate) enabled: Option<bool>,
    pub(crate) debug: Option<u32>,
    pub(crate) verbose: Option<u32>,
    pub(crate) allow: Option<Allow<T>>,
    pub(crate) body: Body<T, C>,
}

pub(crate) enum Body<T, C> {
    Processor {
        handler: Handler<T, C>,
        pending: Box<dyn Queue<T>>,
        /// Present only when the processor is the pipeline root, so `emit`
        /// and `eject` still have a destination.
        drain: Option<Box<dyn Queue<T>>>,
    },
    Container {
        children: Vec<SegmentId>,
        directory: IndexMap<String, SegmentId>,
        follower: HashMap<SegmentId, Outlet>,
        drain: Box<dyn Queue<T>>,
    },
}

/// A live, stateful pipeline built from a [`Segment`] blueprint.
///
/// Execution is pull-driven and single-threaded: all state transitions
/// happen on the caller's thread inside `enqueue`, `dequeue`,
/// `process_batch`, `flush`, or `prepare`.
pub struct Pipeline<T, C = ()> {
    pub(crate) nodes: Vec<Node<T, C>>,
    pub(crate) root: SegmentId,
    pub(crate) engine: Engine<T>,
    pub(crate) context: Rc<C>,
    pub(crate) blueprint: Segment<T, C>,
}

impl<T: 'static, C: 'static> Pipeline<T, C> {
    pub(crate) fn build(
        blueprint: Segment<T, C>,
        engine: Engine<T>,
        context: C,
    ) -> Result<Self, Error> {
        if engine.batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize {
                path: "<engine>".to_string(),
            }
            .into());
        }
        let mut pipeline = Self {
            nodes: Vec::new(),
            root: SegmentId(0),
            engine,
            context: Rc::new(context),
            blueprint: blueprint.clone(),
        };
        let root = pipeline.add_node(&blueprint, None, &Path::default())?;
        pipeline.root = root;
        if matches!(pipeline.nodes[root.0].body, Body::Processor { .. }) {
            let queue = pipeline.engine.new_queue();
            if let Body::Processor { drain, .. } = &mut pipeline.nodes[root.0].body {
                *drain = Some(queue);
            }
        }
        tracing::debug!(
            root = %pipeline.nodes[root.0].path,
            segments = pipeline.nodes.len(),
            "pipeline initialized"
        );
        Ok(pipeline)
    }

    /// Pre-order traversal: binds parents, caches paths, and builds each
    /// container's directory and follower map.
    fn add_node(
        &mut self,
        blueprint: &Segment<T, C>,
        parent: Option<SegmentId>,
        parent_path: &Path,
    ) -> Result<SegmentId, Error> {
        let opts = blueprint.opts();
        let label = opts.label.clone().unwrap_or_else(generated_label);
        let path = parent_path.child(label.clone());
        if opts.batch_size == Some(0) {
            return Err(ConfigError::ZeroBatchSize {
                path: path.to_string(),
            }
            .into());
        }

        let id = SegmentId(self.nodes.len());
        match blueprint {
            Segment::Processor(processor) => {
                self.nodes.push(Node {
                    label,
                    path,
                    parent,
                    batch_size: opts.batch_size,
                    enabled: opts.enabled,
                    debug: opts.debug,
                    verbose: opts.verbose,
                    allow: opts.allow.clone(),
                    body: Body::Processor {
                        handler: Rc::clone(&processor.handler),
                        pending: self.engine.new_queue(),
                        drain: None,
                    },
                });
                Ok(id)
            }
            Segment::Container(container) => {
                if container.children.is_empty() {
                    return Err(ConfigError::EmptyContainer {
                        path: path.to_string(),
                    }
                    .into());
                }
                self.nodes.push(Node {
                    label,
                    path: path.clone(),
                    parent,
                    batch_size: opts.batch_size,
                    enabled: opts.enabled,
                    debug: opts.debug,
                    verbose: opts.verbose,
                    allow: opts.allow.clone(),
                    body: Body::Container {
                        children: Vec::new(),
                        directory: IndexMap::new(),
                        follower: HashMap::new(),
                        drain: self.engine.new_queue(),
                    },
                });

                let mut child_ids = Vec::with_capacity(container.children.len());
                for child in &container.children {
                    child_ids.push(self.add_node(child, Some(id), &path)?);
                }

                // first declared child wins the directory slot; later
                // duplicates stay reachable via deeper or exact paths
                let mut directory = IndexMap::new();
                for &child in &child_ids {
                    directory
                        .entry(self.nodes[child.0].label.clone())
                        .or_insert(child);
                }
                let mut follower = HashMap::new();
                for (position, &child) in child_ids.iter().enumerate() {
                    let outlet = match child_ids.get(position + 1) {
                        Some(&next) => Outlet::Segment(next),
                        None => Outlet::Drain(id),
                    };
                    follower.insert(child, outlet);
                }
                if let Body::Container {
                    children,
                    directory: slot_directory,
                    follower: slot_follower,
                    ..
                } = &mut self.nodes[id.0].body
                {
                    *children = child_ids;
                    *slot_directory = directory;
                    *slot_follower = follower;
                }
                Ok(id)
            }
        }
    }

    pub(crate) fn node(&self, seg: SegmentId) -> &Node<T, C> {
        &self.nodes[seg.0]
    }

    pub fn root(&self) -> SegmentId {
        self.root
    }

    /// The read-only context captured at `init`.
    pub fn context(&self) -> &C {
        &self.context
    }

    /// The blueprint this instance was built from.
    pub fn blueprint(&self) -> &Segment<T, C> {
        &self.blueprint
    }

    pub fn label_of(&self, seg: SegmentId) -> &str {
        &self.node(seg).label
    }

    pub fn path_of(&self, seg: SegmentId) -> &Path {
        &self.node(seg).path
    }

    pub fn parent_of(&self, seg: SegmentId) -> Option<SegmentId> {
        self.node(seg).parent
    }

    pub fn is_container(&self, seg: SegmentId) -> bool {
        matches!(self.node(seg).body, Body::Container { .. })
    }

    /// The root's immediate children.
    pub fn children(&self) -> &[SegmentId] {
        self.children_of(self.root)
    }

    pub fn children_of(&self, seg: SegmentId) -> &[SegmentId] {
        match &self.node(seg).body {
            Body::Container { children, .. } => children,
            Body::Processor { .. } => &[],
        }
    }

    // ---- metrics ------------------------------------------------------

    /// Items buffered inside the tree that have not yet reached the root
    /// drain.
    pub fn pending(&self) -> usize {
        self.pending_at(self.root)
    }

    /// Processor: length of its pending queue. Container: everything still
    /// inside it — children's pending plus children's drains.
    pub fn pending_at(&self, seg: SegmentId) -> usize {
        match &self.node(seg).body {
            Body::Processor { pending, .. } => pending.ready(),
            Body::Container { children, .. } => children
                .iter()
                .map(|&child| self.pending_at(child) + self.ready_at(child))
                .sum(),
        }
    }

    /// Items waiting in the root drain.
    pub fn ready(&self) -> usize {
        self.ready_at(self.root)
    }

    pub fn ready_at(&self, seg: SegmentId) -> usize {
        match &self.node(seg).body {
            Body::Processor { drain, .. } => drain.as_ref().map_or(0, |queue| queue.ready()),
            Body::Container { drain, .. } => drain.ready(),
        }
    }

    pub fn pressure(&self) -> usize {
        self.pressure_at(self.root)
    }

    /// Processor: `round(100 * pending / effective_batch_size)`. At or above
    /// 100 a full batch is buffered. Container: the most urgent child.
    pub fn pressure_at(&self, seg: SegmentId) -> usize {
        match &self.node(seg).body {
            Body::Processor { pending, .. } => {
                let batch_size = self.effective_batch_size(seg);
                (100 * pending.ready() + batch_size / 2) / batch_size
            }
            Body::Container { children, .. } => children
                .iter()
                .map(|&child| self.urgency(child))
                .max()
                .unwrap_or(0),
        }
    }

    /// Scheduler metric: pressure, saturated to at least 100 when the
    /// segment has drained items ready to move onward.
    pub(crate) fn urgency(&self, seg: SegmentId) -> usize {
        let pressure = self.pressure_at(seg);
        if self.ready_at(seg) > 0 {
            pressure.max(100)
        } else {
            pressure
        }
    }

    pub fn has_pending(&self) -> bool {
        self.pending() > 0
    }

    // ---- attribute inheritance ----------------------------------------

    /// Own value if set, else the nearest ancestor's, else the engine
    /// default. The walk happens on every read, so mutating an ancestor
    /// immediately affects descendants without their own setting.
    pub fn effective_batch_size(&self, seg: SegmentId) -> usize {
        let mut current = Some(seg);
        while let Some(id) = current {
            if let Some(batch_size) = self.node(id).batch_size {
                return batch_size;
            }
            current = self.node(id).parent;
        }
        self.engine.batch_size
    }

    /// Effective debug level; `PIPER_DEBUG` masks every in-tree setting.
    pub fn debug_level(&self, seg: SegmentId) -> u32 {
        if let Some(level) = self.engine.debug_override {
            return level;
        }
        let mut current = Some(seg);
        while let Some(id) = current {
            if let Some(level) = self.node(id).debug {
                return level;
            }
            current = self.node(id).parent;
        }
        0
    }

    /// Effective verbose level; `PIPER_VERBOSE` masks every in-tree setting.
    pub fn verbose_level(&self, seg: SegmentId) -> u32 {
        if let Some(level) = self.engine.verbose_override {
            return level;
        }
        let mut current = Some(seg);
        while let Some(id) = current {
            if let Some(level) = self.node(id).verbose {
                return level;
            }
            current = self.node(id).parent;
        }
        0
    }

    /// A segment is enabled only if it and every ancestor is enabled.
    pub fn is_enabled(&self, seg: SegmentId) -> bool {
        let mut current = Some(seg);
        while let Some(id) = current {
            if self.node(id).enabled == Some(false) {
                return false;
            }
            current = self.node(id).parent;
        }
        true
    }

    // ---- local (raw) attribute mirrors --------------------------------

    pub fn local_batch_size(&self, seg: SegmentId) -> Option<usize> {
        self.node(seg).batch_size
    }

    pub fn local_enabled(&self, seg: SegmentId) -> Option<bool> {
        self.node(seg).enabled
    }

    pub fn local_debug(&self, seg: SegmentId) -> Option<u32> {
        self.node(seg).debug
    }

    pub fn local_verbose(&self, seg: SegmentId) -> Option<u32> {
        self.node(seg).verbose
    }

    /// Set or clear a segment's batch size. Zero is rejected.
    pub fn set_batch_size(&mut self, seg: SegmentId, value: Option<usize>) -> Result<(), Error> {
        if value == Some(0) {
            return Err(ConfigError::ZeroBatchSize {
                path: self.path_of(seg).to_string(),
            }
            .into());
        }
        self.nodes[seg.0].batch_size = value;
        Ok(())
    }

    pub fn set_enabled(&mut self, seg: SegmentId, value: Option<bool>) {
        self.nodes[seg.0].enabled = value;
    }

    pub fn set_debug(&mut self, seg: SegmentId, value: Option<u32>) {
        self.nodes[seg.0].debug = value;
    }

    pub fn set_verbose(&mut self, seg: SegmentId, value: Option<u32>) {
        self.nodes[seg.0].verbose = value;
    }

    // ---- enqueue gate -------------------------------------------------

    /// Feed items into the root segment's gate.
    pub fn enqueue(&mut self, items: impl IntoIterator<Item = T>) {
        let items: Vec<T> = items.into_iter().collect();
        let root = self.root;
        self.feed(root, items);
    }

    /// The enqueue gate. Disabled segments and `allow`-rejected items skip
    /// to the segment's drain-equivalent; accepted items land in the pending
    /// queue (processor) or the first child's gate (container).
    pub(crate) fn feed(&mut self, seg: SegmentId, items: Vec<T>) {
        if items.is_empty() {
            return;
        }
        if !self.is_enabled(seg) {
            self.log(
                Level::Debug,
                seg,
                &format!("skipping {} items (disabled)", items.len()),
            );
            return self.bypass(seg, items);
        }
        let items = match self.node(seg).allow.clone() {
            Some(allow) => {
                let mut accepted = Vec::with_capacity(items.len());
                let mut rejected = Vec::new();
                for item in items {
                    if (*allow)(&item) {
                        accepted.push(item);
                    } else {
                        rejected.push(item);
                    }
                }
                if !rejected.is_empty() {
                    self.log(
                        Level::Debug,
                        seg,
                        &format!("{} items filtered out", rejected.len()),
                    );
                    self.bypass(seg, rejected);
                }
                accepted
            }
            None => items,
        };
        if items.is_empty() {
            return;
        }
        if self.is_container(seg) {
            let first = self.children_of(seg)[0];
            self.feed(first, items);
        } else if let Body::Processor { pending, .. } = &mut self.nodes[seg.0].body {
            pending.enqueue(items);
        }
    }

    /// Route items around a segment: containers pass through to their own
    /// drain, processors hand off to their follower's gate.
    fn bypass(&mut self, seg: SegmentId, items: Vec<T>) {
        if self.is_container(seg) {
            self.push_drain(seg, items);
        } else {
            let outlet = self.outlet_of(seg);
            self.deliver(outlet, items);
        }
    }

    /// Where this segment's output goes: its follower within the parent, or
    /// its own drain at the root.
    pub(crate) fn outlet_of(&self, seg: SegmentId) -> Outlet {
        match self.node(seg).parent {
            None => Outlet::Drain(seg),
            Some(parent) => match &self.node(parent).body {
                Body::Container { follower, .. } => {
                    follower.get(&seg).copied().unwrap_or(Outlet::Drain(parent))
                }
                Body::Processor { .. } => Outlet::Drain(parent),
            },
        }
    }

    /// Deliver items to an outlet. A segment outlet re-runs that segment's
    /// gate; a drain outlet appends directly.
    pub(crate) fn deliver(&mut self, outlet: Outlet, items: Vec<T>) {
        match outlet {
            Outlet::Segment(next) => self.feed(next, items),
            Outlet::Drain(owner) => self.push_drain(owner, items),
        }
    }

    pub(crate) fn push_drain(&mut self, seg: SegmentId, items: Vec<T>) {
        match &mut self.nodes[seg.0].body {
            Body::Container { drain, .. } => drain.enqueue(items),
            Body::Processor {
                drain: Some(drain), ..
            } => drain.enqueue(items),
            Body::Processor { drain: None, .. } => {}
        }
    }

    pub(crate) fn take_drain(&mut self, seg: SegmentId, n: usize) -> Vec<T> {
        match &mut self.nodes[seg.0].body {
            Body::Container { drain, .. } => drain.dequeue(n),
            Body::Processor {
                drain: Some(drain), ..
            } => drain.dequeue(n),
            Body::Processor { drain: None, .. } => Vec::new(),
        }
    }

    pub(crate) fn requeue_pending(&mut self, seg: SegmentId, items: Vec<T>) {
        if let Body::Processor { pending, .. } = &mut self.nodes[seg.0].body {
            pending.requeue(items);
        }
    }

    // ---- logging ------------------------------------------------------

    pub(crate) fn log(&self, level: Level, seg: SegmentId, message: &str) {
        self.log_items(level, seg, message, &[]);
    }

    pub(crate) fn log_items(&self, level: Level, seg: SegmentId, message: &str, items: &[String]) {
        let debug = self.debug_level(seg);
        let verbose = self.verbose_level(seg);
        if !level.enabled(debug, verbose) {
            return;
        }
        let items = if verbose > 1 { items } else { &[] };
        self.engine
            .logger
            .write(level, &self.path_of(seg).to_string(), message, items);
    }
}

fn generated_label() -> String {
    let hex = uuid::Uuid::new_v4().simple().to_string();
    format!("seg-{}", &hex[..8])
}

#[cfg(test)]
#[path = "tree_tests.rs"]
mod tests;
