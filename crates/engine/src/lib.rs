// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! piper-engine: builder and runtime for pull-driven, batching pipelines.
//!
//! A [`Segment`] blueprint describes a tree of processors and containers;
//! `init` turns it into a live [`Pipeline`] that owns per-segment queues.
//! Driving `dequeue` (or `flush`/`prepare`) advances the tree minimally via
//! the pressure-based scheduler; handlers steer items with the flow-control
//! calls on their [`Scope`].

pub mod blueprint;
pub mod engine;
pub mod error;
mod resolver;
mod scheduler;
pub mod scope;
pub mod tree;

pub use blueprint::{Allow, Container, Handler, Processor, Segment, SegmentConfig};
pub use engine::{Engine, DEBUG_ENV, DEFAULT_BATCH_SIZE, VERBOSE_ENV};
pub use error::{ConfigError, Error};
pub use scope::Scope;
pub use tree::{Pipeline, SegmentId};
