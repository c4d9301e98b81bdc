// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! piper-core: label paths, queue contract, and logger contract for the
//! piper pipeline engine.

pub mod logger;
pub mod path;
pub mod queue;

pub use logger::{Level, LogRecord, Logger, MemoryLogger, TracingLogger};
pub use path::Path;
pub use queue::{Fifo, Queue};
