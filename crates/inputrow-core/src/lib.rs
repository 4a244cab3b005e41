//! InputRow Core
//!
//! A composite form field that lays several inputs out as one row, mirrors
//! their values into a parameter map and validates a numeric relation between
//! two of them against a card count derived from elsewhere in the form.
//!
//! # Core Concepts
//!
//! - [`CompositeRowField`]: Owns the children, the parameters and the change protocol
//! - [`DependencyWatcher`]: Derives the card count from an override and a collection
//! - [`ConstraintValidator`]: Child verdicts plus `count * 2 / rows == columns`
//! - [`WidgetRegistry`]: Injected type-tag to [`WidgetFactory`] mapping
//! - [`Surface`]: Host rendering target receiving mount decisions
//!
//! # Example
//!
//! ```rust,ignore
//! use inputrow_core::prelude::*;
//!
//! let row = CompositeRowField::build(
//!     RowContext {
//!         parent: Arc::downgrade(&form),
//!         spec,
//!         params: saved,
//!         persist: Arc::new(|spec, params| store(spec, params)),
//!         config: InputRowConfig::new(),
//!     },
//!     &registry,
//! )?;
//!
//! row.subscribe(Arc::new(|params| println!("now {params:?}")));
//! form.ready_signal().unwrap().fire();
//! assert!(row.validate());
//! ```

#![warn(unreachable_pub)]

mod config;
mod constraint;
mod error;
mod registry;
mod row;
mod spec;
mod subscribers;
mod surface;
mod watcher;
mod widget;

// Re-exports
pub use config::{
    ConstraintPair, InputRowConfig, DEFAULT_COLLECTION_PATH, DEFAULT_MIN_OVERRIDE,
    DEFAULT_OVERRIDE_PATH,
};
pub use constraint::{
    operand, ConstraintValidator, ConstraintViolation, Validity, CARDS_PER_PAIR, VIOLATION_KEY,
};
pub use error::InputRowError;
pub use registry::WidgetRegistry;
pub use row::{CompositeRowField, PersistFn, RowContext};
pub use spec::{FieldSpec, Params, RowOptions, NUMBER_TYPE, WIDGET_NONE};
pub use subscribers::{Subscriber, SubscriptionId};
pub use surface::{ChildMount, NumberInputAttrs, RowHeader, Surface};
pub use watcher::{derive_count, DependencyLink, DependencyWatcher};
pub use widget::{ChangeCallback, Widget, WidgetContext, WidgetFactory};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for hosting an input row
    pub use crate::{
        CompositeRowField, FieldSpec, InputRowConfig, InputRowError, Params, RowContext, Surface,
        Widget, WidgetContext, WidgetRegistry,
    };
    pub use inputrow_tree::{FieldNode, ReadySignal};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
