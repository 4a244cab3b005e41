//! Field tree nodes
//!
//! Every participant of a form tree implements [`FieldNode`]. Ownership flows
//! strictly from parent to child: a node holds its children by [`Arc`] and its
//! parent only as a non-owning back-reference, which [`FieldNode::parent`]
//! upgrades on demand.
//!
//! Fields that other nodes can depend on expose a capability through
//! [`FieldNode::as_numeric`] or [`FieldNode::as_collection`].

use crate::ready::ReadySignal;
use std::fmt;
use std::sync::Arc;

/// Notification callback registered on a field event
pub type Listener = Arc<dyn Fn() + Send + Sync>;

/// Minimal capability of every node in a form tree
pub trait FieldNode: Send + Sync {
    /// Field name as declared in the form semantics
    fn name(&self) -> &str;

    /// Alternate name used by collection nodes during path matching
    fn list_identity(&self) -> Option<&str> {
        None
    }

    /// Parent node, if it is still alive and this node is not the root
    fn parent(&self) -> Option<Arc<dyn FieldNode>>;

    /// Ordered children, or `None` for leaf nodes
    fn children(&self) -> Option<Vec<Arc<dyn FieldNode>>> {
        None
    }

    /// Readiness signal; only the tree root carries one
    fn ready_signal(&self) -> Option<&ReadySignal> {
        None
    }

    /// Numeric input capability
    fn as_numeric(&self) -> Option<&dyn NumericInput> {
        None
    }

    /// Collection capability
    fn as_collection(&self) -> Option<&dyn CollectionInput> {
        None
    }
}

/// Single numeric input owned by another part of the form
pub trait NumericInput: Send + Sync {
    /// Raw input text; may be empty
    fn current_value(&self) -> String;

    /// Register a listener for value changes
    fn on_value_change(&self, listener: Listener);
}

/// Variable-length collection owned by another part of the form
pub trait CollectionInput: Send + Sync {
    /// Current number of items
    fn length(&self) -> usize;

    /// Register a listener fired after an item was added
    fn on_item_added(&self, listener: Listener);

    /// Register a listener fired after an item was removed
    fn on_item_removed(&self, listener: Listener);
}

/// Walk parent back-references up to the top of the tree
#[must_use]
pub fn top_field(node: Arc<dyn FieldNode>) -> Arc<dyn FieldNode> {
    let mut current = node;
    while let Some(parent) = current.parent() {
        current = parent;
    }
    current
}

/// Check whether `node` answers to a path segment
///
/// A node matches by its field name or, for collections, by its list identity.
#[inline]
#[must_use]
pub fn matches_segment(node: &dyn FieldNode, segment: &str) -> bool {
    node.name() == segment || node.list_identity() == Some(segment)
}

impl fmt::Debug for dyn FieldNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldNode")
            .field("name", &self.name())
            .field("list_identity", &self.list_identity())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::RwLock;
    use std::sync::Weak;

    struct Node {
        name: String,
        identity: Option<String>,
        parent: Weak<dyn FieldNode>,
        children: RwLock<Vec<Arc<dyn FieldNode>>>,
    }

    impl FieldNode for Node {
        fn name(&self) -> &str {
            &self.name
        }

        fn list_identity(&self) -> Option<&str> {
            self.identity.as_deref()
        }

        fn parent(&self) -> Option<Arc<dyn FieldNode>> {
            self.parent.upgrade()
        }

        fn children(&self) -> Option<Vec<Arc<dyn FieldNode>>> {
            Some(self.children.read().clone())
        }
    }

    fn node(name: &str, identity: Option<&str>, parent: Weak<dyn FieldNode>) -> Arc<Node> {
        Arc::new(Node {
            name: name.to_string(),
            identity: identity.map(str::to_string),
            parent,
            children: RwLock::new(Vec::new()),
        })
    }

    #[test]
    fn top_field_walks_to_root() {
        let root = node("form", None, Weak::<Node>::new());
        let root_dyn: Arc<dyn FieldNode> = root.clone();
        let group = node("behaviour", None, Arc::downgrade(&root_dyn));
        root.children.write().push(group.clone());
        let group_dyn: Arc<dyn FieldNode> = group.clone();
        let leaf = node("numCardsToUse", None, Arc::downgrade(&group_dyn));

        let top = top_field(leaf);
        assert_eq!(top.name(), "form");
    }

    #[test]
    fn top_field_of_root_is_root() {
        let root: Arc<dyn FieldNode> = node("form", None, Weak::<Node>::new());
        assert_eq!(top_field(root).name(), "form");
    }

    #[test]
    fn matches_by_name_or_identity() {
        let list = node("cards_field", Some("cards"), Weak::<Node>::new());
        assert!(matches_segment(list.as_ref(), "cards_field"));
        assert!(matches_segment(list.as_ref(), "cards"));
        assert!(!matches_segment(list.as_ref(), "card"));
    }

    #[test]
    fn default_capabilities_are_absent() {
        let leaf = node("leaf", None, Weak::<Node>::new());
        assert!(leaf.as_numeric().is_none());
        assert!(leaf.as_collection().is_none());
        assert!(leaf.ready_signal().is_none());
    }

    #[test]
    fn trait_objects_debug_by_name() {
        let list: Arc<dyn FieldNode> = node("deck", Some("cards"), Weak::<Node>::new());
        let shown = format!("{list:?}");
        assert!(shown.contains("\"deck\""));
        assert!(shown.contains("\"cards\""));
    }
}
