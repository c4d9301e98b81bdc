// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Hierarchical segment paths

use serde::{Deserialize, Serialize};
use std::fmt;

/// An ordered sequence of segment labels, displayed joined by `/`.
///
/// Paths identify segments inside a pipeline tree and prefix every log line.
/// They are immutable; `child` returns a new extended path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Path {
    labels: Vec<String>,
}

impl Path {
    /// Parse a location string (`a`, `a/b/c`). Empty pieces are dropped, so
    /// `a//b` and `/a/b/` both parse as `a/b`.
    pub fn new(location: &str) -> Self {
        Self {
            labels: location
                .split('/')
                .filter(|piece| !piece.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    /// A single-label path.
    pub fn root(label: impl Into<String>) -> Self {
        Self {
            labels: vec![label.into()],
        }
    }

    /// This path extended by one label.
    pub fn child(&self, label: impl Into<String>) -> Self {
        let mut labels = self.labels.clone();
        labels.push(label.into());
        Self { labels }
    }

    /// The final label, or `""` for an empty path.
    pub fn name(&self) -> &str {
        self.labels.last().map(String::as_str).unwrap_or("")
    }

    /// The individual labels, first to last.
    pub fn split(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.labels.join("/"))
    }
}

impl From<&str> for Path {
    fn from(location: &str) -> Self {
        Self::new(location)
    }
}

#[cfg(test)]
#[path = "path_tests.rs"]
mod tests;
