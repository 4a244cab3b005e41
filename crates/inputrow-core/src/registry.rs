//! Widget registry
//!
//! Provides [`WidgetRegistry`], the injected mapping from type tag to
//! [`WidgetFactory`] a row uses to build its children.

use crate::error::InputRowError;
use crate::widget::{Widget, WidgetContext, WidgetFactory};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Registry of widget factories keyed by type tag
#[derive(Default, Clone)]
pub struct WidgetRegistry {
    factories: HashMap<String, Arc<dyn WidgetFactory>>,
}

impl WidgetRegistry {
    /// Create new empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a factory, replacing any previous one for the tag
    pub fn register(&mut self, type_tag: &str, factory: impl WidgetFactory + 'static) {
        self.factories.insert(type_tag.to_string(), Arc::new(factory));
    }

    /// Builder form of [`register`](Self::register)
    #[must_use]
    pub fn with(mut self, type_tag: &str, factory: impl WidgetFactory + 'static) -> Self {
        self.register(type_tag, factory);
        self
    }

    /// Check if a factory exists for the tag
    #[inline]
    #[must_use]
    pub fn contains(&self, type_tag: &str) -> bool {
        self.factories.contains_key(type_tag)
    }

    /// Remove factory
    #[inline]
    pub fn remove(&mut self, type_tag: &str) -> bool {
        self.factories.remove(type_tag).is_some()
    }

    /// Registered type tags, sorted
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Get number of registered factories
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Build the widget selected by the context's type tag
    ///
    /// # Errors
    /// Returns [`InputRowError::UnknownWidgetType`] for unregistered tags, or the
    /// factory's own error
    pub fn create(&self, ctx: WidgetContext) -> Result<Arc<dyn Widget>, InputRowError> {
        let Some(factory) = self.factories.get(&ctx.spec.field_type) else {
            return Err(InputRowError::UnknownWidgetType {
                field: ctx.spec.name.clone(),
                widget_type: ctx.spec.field_type.clone(),
            });
        };
        factory.create(ctx)
    }
}

impl fmt::Debug for WidgetRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetRegistry")
            .field("types", &self.names())
            .finish()
    }
}
