//! Error types for the input row
//!
//! Construction and configuration problems are reported as [`InputRowError`].
//! Validation outcomes are not errors: they surface through
//! [`Validity`](crate::Validity) and the row's error slot.

use inputrow_tree::PathError;

/// Main input row error type
#[derive(Debug, thiserror::Error)]
pub enum InputRowError {
    /// No factory registered for a child's type tag
    #[error("no widget registered for type '{widget_type}' (field '{field}')")]
    UnknownWidgetType {
        /// Child field name
        field: String,
        /// Requested type tag
        widget_type: String,
    },

    /// Two children share a name
    #[error("duplicate child field: '{0}'")]
    DuplicateChild(String),

    /// Constrained parameter is not one of the declared children
    #[error("constrained field '{0}' is not declared in the row")]
    UndeclaredConstraintField(String),

    /// Change reported for a name the row does not own
    #[error("unknown child field: '{0}'")]
    UnknownChild(String),

    /// `initialize` called twice
    #[error("input row '{0}' is already initialized")]
    AlreadyInitialized(String),

    /// Widget factory failed to build a child
    #[error("widget for field '{field}' failed: {message}")]
    WidgetFailed {
        /// Child field name
        field: String,
        /// Factory-provided reason
        message: String,
    },

    /// Malformed dependency path in configuration
    #[error("invalid dependency path: {0}")]
    InvalidPath(#[from] PathError),

    /// Configuration document could not be parsed
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] serde_json::Error),
}

impl InputRowError {
    /// Create widget failure for a field
    pub fn widget_failed(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::WidgetFailed {
            field: field.into(),
            message: message.into(),
        }
    }
}
