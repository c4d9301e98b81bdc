// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Location resolution: nearest-neighbour, depth-first-before-self search
//! mapping label paths to segments.

use piper_core::Path;

use crate::tree::{Body, Pipeline, SegmentId};

impl<T: 'static, C: 'static> Pipeline<T, C> {
    /// Resolve a location (`half`, `integer/add_three`) from the root.
    pub fn find_segment(&self, location: &str) -> Option<SegmentId> {
        let root = self.root();
        self.find_segment_from(root, location)
    }

    /// Resolve a location relative to `caller`: search the caller's own
    /// container first, then climb one ancestor at a time until the root
    /// has been searched.
    pub(crate) fn find_segment_from(
        &self,
        caller: SegmentId,
        location: &str,
    ) -> Option<SegmentId> {
        let path = Path::new(location);
        if path.is_empty() {
            return None;
        }
        let mut base = if self.is_container(caller) {
            Some(caller)
        } else {
            self.parent_of(caller)
        };
        while let Some(seg) = base {
            if let Some(found) = self.descendant(seg, path.split()) {
                return Some(found);
            }
            base = self.parent_of(seg);
        }
        None
    }

    /// Match `labels` within the subtree rooted at `seg`. Precedence:
    /// a direct directory hit, then grandchildren depth-first, then the
    /// node's own label — so a deeper match beats the same label on self.
    fn descendant(&self, seg: SegmentId, labels: &[String]) -> Option<SegmentId> {
        let (first, rest) = labels.split_first()?;
        if let Body::Container {
            directory,
            children,
            ..
        } = &self.node(seg).body
        {
            if let Some(&hit) = directory.get(first.as_str()) {
                if rest.is_empty() {
                    return Some(hit);
                }
                if let Some(found) = self.descendant(hit, rest) {
                    return Some(found);
                }
            }
            for &child in children {
                if let Some(found) = self.descendant(child, labels) {
                    return Some(found);
                }
            }
        }
        if self.node(seg).label == *first {
            if rest.is_empty() {
                return Some(seg);
            }
            if let Some(found) = self.descendant(seg, rest) {
                return Some(found);
            }
        }
        None
    }
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
