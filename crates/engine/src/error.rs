// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for blueprint construction and pipeline execution

use thiserror::Error;

/// A blueprint or engine setting violates a structural constraint.
/// Raised synchronously at `init`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("container '{path}' has no children")]
    EmptyContainer { path: String },
    #[error("batch size for '{path}' must be positive")]
    ZeroBatchSize { path: String },
}

/// Errors surfaced while driving a pipeline.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A flow-control call named a location no segment matches.
    #[error("{op}: no segment matching '{location}'")]
    Unresolved { op: &'static str, location: String },
    /// A handler failed; surfaced to whichever root operation was driving
    /// execution. The pipeline keeps the partial state the handler produced.
    #[error("handler failed in '{path}': {message}")]
    Handler { path: String, message: String },
}
