//! Dependency watching
//!
//! The card count a row validates against comes from two fields elsewhere in
//! the form: an optional numeric override and the card collection. Once the
//! tree is ready the [`DependencyWatcher`] resolves both, subscribes to their
//! events and recomputes the count with [`derive_count`] on every event.

use crate::config::InputRowConfig;
use crate::error::InputRowError;
use inputrow_tree::{resolve, FieldNode, FieldPath, Listener};
use std::fmt;
use std::sync::{Arc, OnceLock, Weak};

/// Derive the card count from the override text and the collection length
///
/// An override below `min_override` or above the collection length is ignored
/// in favour of the collection length. Empty or unparseable text reads as `0`.
#[must_use]
pub fn derive_count(override_raw: &str, collection_length: usize, min_override: i64) -> u32 {
    let requested = parse_override(override_raw);
    let available = i64::try_from(collection_length).unwrap_or(i64::MAX);

    let count = if requested < min_override || requested > available {
        available
    } else {
        requested
    };

    u32::try_from(count.max(0)).unwrap_or(u32::MAX)
}

#[allow(clippy::cast_possible_truncation)] // truncation toward zero is intended
fn parse_override(raw: &str) -> i64 {
    let raw = raw.trim();
    if raw.is_empty() {
        return 0;
    }
    if let Ok(whole) = raw.parse::<i64>() {
        return whole;
    }
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => value.trunc() as i64,
        _ => 0,
    }
}

/// Resolved dependency targets
pub struct DependencyLink {
    override_field: Option<Weak<dyn FieldNode>>,
    collection_field: Weak<dyn FieldNode>,
}

impl DependencyLink {
    /// Whether a numeric override field was found
    #[must_use]
    pub fn has_override(&self) -> bool {
        self.override_field.is_some()
    }
}

impl fmt::Debug for DependencyLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependencyLink")
            .field("has_override", &self.has_override())
            .field("collection_alive", &(self.collection_field.strong_count() > 0))
            .finish()
    }
}

/// Binds a row to its override and collection fields
pub struct DependencyWatcher {
    override_path: FieldPath,
    collection_path: FieldPath,
    min_override: i64,
    /// Set once by `bind`; `None` inside means resolution failed
    link: OnceLock<Option<DependencyLink>>,
}

impl DependencyWatcher {
    /// Create watcher from configuration
    ///
    /// # Errors
    /// Returns [`InputRowError::InvalidPath`] for malformed paths
    pub fn new(config: &InputRowConfig) -> Result<Self, InputRowError> {
        Ok(Self {
            override_path: config.override_path.parse()?,
            collection_path: config.collection_path.parse()?,
            min_override: config.min_override,
            link: OnceLock::new(),
        })
    }

    /// Whether `bind` ran and found the collection
    #[must_use]
    pub fn is_bound(&self) -> bool {
        matches!(self.link.get(), Some(Some(_)))
    }

    /// Whether `bind` already ran, successfully or not
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.link.get().is_some()
    }

    /// Resolve both paths from `root` and subscribe `listener` to their events
    ///
    /// Runs once; later calls return `false`. A missing collection leaves the
    /// watcher inert. A missing override only means the override reads empty.
    pub fn bind(&self, root: &Arc<dyn FieldNode>, listener: &Listener) -> bool {
        if self.is_resolved() {
            tracing::debug!("Dependencies already resolved, ignoring bind");
            return false;
        }

        let link = self.resolve_link(root, listener);
        let bound = link.is_some();
        if self.link.set(link).is_err() {
            return false;
        }
        bound
    }

    fn resolve_link(&self, root: &Arc<dyn FieldNode>, listener: &Listener) -> Option<DependencyLink> {
        let collection = match resolve(&self.collection_path, root) {
            Ok(node) => node,
            Err(missing) => {
                tracing::warn!("Card collection not found, count will not update: {}", missing);
                return None;
            }
        };
        let Some(items) = collection.as_collection() else {
            tracing::warn!(
                "Field '{}' at '{}' is not a collection, count will not update",
                collection.name(),
                self.collection_path
            );
            return None;
        };

        let override_field = match resolve(&self.override_path, root) {
            Ok(node) if node.as_numeric().is_some() => Some(node),
            Ok(node) => {
                tracing::warn!(
                    "Field '{}' at '{}' is not numeric, ignoring override",
                    node.name(),
                    self.override_path
                );
                None
            }
            Err(missing) => {
                tracing::warn!("Override field not found, using collection length: {}", missing);
                None
            }
        };

        if let Some(numeric) = override_field.as_ref().and_then(|n| n.as_numeric()) {
            numeric.on_value_change(Arc::clone(listener));
        }
        items.on_item_added(Arc::clone(listener));
        items.on_item_removed(Arc::clone(listener));

        tracing::info!(
            "Bound card count to '{}' (override '{}': {})",
            self.collection_path,
            self.override_path,
            if override_field.is_some() { "found" } else { "missing" }
        );

        Some(DependencyLink {
            override_field: override_field.as_ref().map(Arc::downgrade),
            collection_field: Arc::downgrade(&collection),
        })
    }

    /// Recompute the count from the current field states
    ///
    /// `None` while unbound, inert, or once the collection has been dropped.
    #[must_use]
    pub fn recompute(&self) -> Option<u32> {
        let link = self.link.get()?.as_ref()?;
        let collection = link.collection_field.upgrade()?;
        let length = collection.as_collection()?.length();

        let override_raw = link
            .override_field
            .as_ref()
            .and_then(Weak::upgrade)
            .and_then(|node| node.as_numeric().map(|n| n.current_value()))
            .unwrap_or_default();

        let count = derive_count(&override_raw, length, self.min_override);
        tracing::debug!(
            "Card count {} (override '{}', {} cards)",
            count,
            override_raw,
            length
        );
        Some(count)
    }
}

impl fmt::Debug for DependencyWatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependencyWatcher")
            .field("override_path", &self.override_path)
            .field("collection_path", &self.collection_path)
            .field("min_override", &self.min_override)
            .field("link", &self.link.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn override_within_range_is_used() {
        assert_eq!(derive_count("5", 10, 3), 5);
    }

    #[test]
    fn empty_override_falls_back_to_length() {
        assert_eq!(derive_count("", 10, 3), 10);
        assert_eq!(derive_count("   ", 10, 3), 10);
    }

    #[test]
    fn override_above_length_clamps() {
        assert_eq!(derive_count("20", 10, 3), 10);
    }

    #[test]
    fn override_at_minimum_is_used() {
        assert_eq!(derive_count("3", 10, 3), 3);
        assert_eq!(derive_count("2", 10, 3), 10);
    }

    #[test]
    fn override_equal_to_length_is_used() {
        assert_eq!(derive_count("10", 10, 3), 10);
    }

    #[test]
    fn odd_override_text() {
        assert_eq!(derive_count("abc", 10, 3), 10);
        assert_eq!(derive_count("-4", 10, 3), 10);
        assert_eq!(derive_count("6.9", 10, 3), 6);
        assert_eq!(derive_count(" 7 ", 10, 3), 7);
    }

    #[test]
    fn empty_collection() {
        assert_eq!(derive_count("5", 0, 3), 0);
        assert_eq!(derive_count("", 0, 3), 0);
    }

    #[test]
    fn watcher_rejects_bad_paths() {
        let config = InputRowConfig::new().with_collection_path("cards//list");
        assert!(matches!(
            DependencyWatcher::new(&config),
            Err(InputRowError::InvalidPath(_))
        ));
    }

    #[test]
    fn unbound_watcher_has_no_count() {
        let watcher = DependencyWatcher::new(&InputRowConfig::new()).unwrap();
        assert!(!watcher.is_bound());
        assert!(!watcher.is_resolved());
        assert_eq!(watcher.recompute(), None);
    }

    proptest! {
        #[test]
        fn prop_count_never_exceeds_collection(o in -50i64..200, len in 0usize..150) {
            let count = derive_count(&o.to_string(), len, 3);
            prop_assert!(count as usize <= len);
        }

        #[test]
        fn prop_valid_override_is_kept(len in 3usize..150, pick in 0usize..1000) {
            let o = 3 + pick % (len - 2);
            prop_assert_eq!(derive_count(&o.to_string(), len, 3) as usize, o);
        }

        #[test]
        fn prop_ignored_override_yields_length(o in -50i64..3, len in 0usize..150) {
            prop_assert_eq!(derive_count(&o.to_string(), len, 3) as usize, len);
        }
    }
}
