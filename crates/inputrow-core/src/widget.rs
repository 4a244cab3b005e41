//! Child widget contract
//!
//! Children of a row are built by a [`WidgetFactory`] from a [`WidgetContext`]
//! and report edits through the context's change callback.

use crate::error::InputRowError;
use crate::spec::FieldSpec;
use crate::surface::Surface;
use inputrow_tree::FieldNode;
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, Weak};

/// Callback a child invokes with its spec and new value after every edit
pub type ChangeCallback = Arc<dyn Fn(&FieldSpec, Value) + Send + Sync>;

/// An input widget owned by a row
pub trait Widget: FieldNode {
    /// Spec the widget was built from
    fn spec(&self) -> &FieldSpec;

    /// Attach rendered content to the surface
    fn attach(&self, surface: &mut dyn Surface);

    /// Own verdict; `None` means no verdict and counts as invalid
    fn validate(&self) -> Option<bool>;

    /// Detach rendered content
    fn detach(&self) {}

    /// Current error texts of this widget
    fn errors(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Everything a factory needs to build one child
pub struct WidgetContext {
    /// Non-owning back-reference to the owning row
    pub parent: Weak<dyn FieldNode>,
    /// The child's spec
    pub spec: FieldSpec,
    /// Initial value, if any
    pub value: Option<Value>,
    /// Edit notification hook
    pub on_change: ChangeCallback,
}

impl fmt::Debug for WidgetContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetContext")
            .field("spec", &self.spec)
            .field("value", &self.value)
            .field("has_parent", &(self.parent.strong_count() > 0))
            .finish_non_exhaustive()
    }
}

/// Constructor capability for one widget type
pub trait WidgetFactory: Send + Sync {
    /// Build a widget
    ///
    /// # Errors
    /// Returns error if the widget cannot be built from the context
    fn create(&self, ctx: WidgetContext) -> Result<Arc<dyn Widget>, InputRowError>;
}

impl<F> WidgetFactory for F
where
    F: Fn(WidgetContext) -> Result<Arc<dyn Widget>, InputRowError> + Send + Sync,
{
    fn create(&self, ctx: WidgetContext) -> Result<Arc<dyn Widget>, InputRowError> {
        self(ctx)
    }
}
