//! Path resolution over a field tree
//!
//! [`resolve`] consumes a [`FieldPath`] front to back. `..` moves to the
//! parent of the current node; any other segment selects the first child, in
//! declaration order, whose name or list identity equals the segment.
//!
//! A failed lookup is an ordinary outcome: optional dependencies are legal, so
//! callers get a [`NotFound`] value to log or ignore rather than a panic.

use crate::node::{matches_segment, FieldNode};
use crate::path::{FieldPath, PARENT_SEGMENT};
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

/// Resolve `path` starting at `start`
///
/// Resolution does not mutate the tree and is deterministic. The tree is
/// acyclic by construction, so no cycle protection is needed.
///
/// # Errors
/// Returns [`NotFound`] describing the segment where resolution stopped
pub fn resolve(path: &FieldPath, start: &Arc<dyn FieldNode>) -> Result<Arc<dyn FieldNode>, NotFound> {
    let found = resolve_segments(path.segments(), start).map_err(|(segment, reason)| NotFound {
        path: path.clone(),
        segment,
        reason,
    });

    match &found {
        Ok(node) => tracing::trace!(%path, from = start.name(), to = node.name(), "resolved field path"),
        Err(e) => tracing::trace!(%path, from = start.name(), error = %e, "field path did not resolve"),
    }

    found
}

fn resolve_segments(
    segments: &[String],
    start: &Arc<dyn FieldNode>,
) -> Result<Arc<dyn FieldNode>, (String, NotFoundReason)> {
    // A trailing `..` leaves nothing to match against
    let Some((head, rest)) = segments.split_first() else {
        return Err((String::new(), NotFoundReason::NoMatch));
    };

    if head == PARENT_SEGMENT {
        let parent = start
            .parent()
            .ok_or_else(|| (head.clone(), NotFoundReason::NoParent))?;
        return resolve_segments(rest, &parent);
    }

    let children = start
        .children()
        .ok_or_else(|| (head.clone(), NotFoundReason::NoChildren))?;

    let matched = children
        .into_iter()
        .find(|child| matches_segment(child.as_ref(), head))
        .ok_or_else(|| (head.clone(), NotFoundReason::NoMatch))?;

    if rest.is_empty() {
        Ok(matched)
    } else {
        resolve_segments(rest, &matched)
    }
}

/// A path that did not lead to a field
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("field '{path}' not found: {reason} at segment '{segment}'")]
pub struct NotFound {
    /// The path being resolved
    pub path: FieldPath,
    /// Segment at which resolution stopped
    pub segment: String,
    /// Why it stopped
    pub reason: NotFoundReason,
}

/// Why a path segment failed to resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundReason {
    /// `..` applied to a node without a parent
    NoParent,
    /// Current node is a leaf
    NoChildren,
    /// No child answers to the segment
    NoMatch,
}

impl Display for NotFoundReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::NoParent => "no parent",
            Self::NoChildren => "node has no children",
            Self::NoMatch => "no matching child",
        };
        f.write_str(text)
    }
}
