//! Composite input row
//!
//! [`CompositeRowField`] owns a fixed, ordered set of child widgets and the
//! parameter map mirroring their values. Lifecycle is two-phase:
//!
//! 1. **Construct**: [`new`](CompositeRowField::new) then
//!    [`initialize`](CompositeRowField::initialize) build the children and
//!    publish the initial snapshot.
//! 2. **Bind**: when the tree root fires its ready signal,
//!    [`bind`](CompositeRowField::bind) resolves the card override and the card
//!    collection and starts recomputing the derived count.
//!
//! Every child edit runs to completion before returning: params updated,
//! persisted, validated, subscribers notified.

use crate::config::InputRowConfig;
use crate::constraint::{ConstraintValidator, ConstraintViolation, Validity};
use crate::error::InputRowError;
use crate::registry::WidgetRegistry;
use crate::spec::{FieldSpec, Params};
use crate::subscribers::{ChangeSubscribers, Subscriber, SubscriptionId};
use crate::surface::{ChildMount, RowHeader, Surface};
use crate::watcher::DependencyWatcher;
use crate::widget::{ChangeCallback, Widget, WidgetContext};
use inputrow_tree::{top_field, FieldNode, Listener};
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, OnceLock, Weak};

/// Host callback receiving the row spec and its parameters
pub type PersistFn = Arc<dyn Fn(&FieldSpec, &Params) + Send + Sync>;

/// Inputs for [`CompositeRowField::build`]
pub struct RowContext {
    /// Non-owning back-reference to the enclosing node
    pub parent: Weak<dyn FieldNode>,
    /// The row's own spec; children are listed in `fields`
    pub spec: FieldSpec,
    /// Parameters previously saved by the host
    pub params: Option<Params>,
    /// Persistence callback
    pub persist: PersistFn,
    /// Dependency paths and constraint pair
    pub config: InputRowConfig,
}

impl fmt::Debug for RowContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowContext")
            .field("spec", &self.spec)
            .field("params", &self.params)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// A form field grouping several inputs into one row
pub struct CompositeRowField {
    spec: FieldSpec,
    parent: Weak<dyn FieldNode>,
    params: RwLock<Params>,
    children: RwLock<Vec<Arc<dyn Widget>>>,
    persist: OnceLock<PersistFn>,
    validator: ConstraintValidator,
    watcher: DependencyWatcher,
    derived_count: AtomicU32,
    constraint_error: RwLock<Option<ConstraintViolation>>,
    subscribers: ChangeSubscribers,
    attached: AtomicBool,
}

impl CompositeRowField {
    /// Construct, initialize and register for the tree's ready signal
    ///
    /// # Errors
    /// Returns error if the spec or configuration is inconsistent or a child
    /// cannot be built
    pub fn build(ctx: RowContext, registry: &WidgetRegistry) -> Result<Arc<Self>, InputRowError> {
        let row = Self::new(ctx.parent, ctx.spec, &ctx.config)?;
        row.initialize(registry, ctx.params.as_ref(), ctx.persist)?;
        row.bind_when_ready();
        Ok(row)
    }

    /// Create a row without children
    ///
    /// # Errors
    /// Returns error for duplicate child names, an undeclared constrained
    /// field or a malformed dependency path
    pub fn new(
        parent: Weak<dyn FieldNode>,
        spec: FieldSpec,
        config: &InputRowConfig,
    ) -> Result<Arc<Self>, InputRowError> {
        let mut seen = HashSet::new();
        if let Some(dup) = spec.fields.iter().find(|f| !seen.insert(f.name.as_str())) {
            return Err(InputRowError::DuplicateChild(dup.name.clone()));
        }

        let validator = ConstraintValidator::from_spec(&spec, config.constraint.as_ref())?;
        let watcher = DependencyWatcher::new(config)?;

        Ok(Arc::new(Self {
            spec,
            parent,
            params: RwLock::new(Params::new()),
            children: RwLock::new(Vec::new()),
            persist: OnceLock::new(),
            validator,
            watcher,
            derived_count: AtomicU32::new(0),
            constraint_error: RwLock::new(None),
            subscribers: ChangeSubscribers::default(),
            attached: AtomicBool::new(false),
        }))
    }

    /// Build the declared children and publish the initial parameters
    ///
    /// Each child starts from the saved value, else its declared default.
    /// Saved keys that match no declared child are dropped. `persist` is
    /// invoked once after all children exist. Nothing is stored unless every
    /// child was built, so a failed call may be retried.
    ///
    /// # Errors
    /// Returns error if already initialized or a child cannot be built
    pub fn initialize(
        self: &Arc<Self>,
        registry: &WidgetRegistry,
        initial: Option<&Params>,
        persist: PersistFn,
    ) -> Result<(), InputRowError> {
        if self.persist.get().is_some() {
            return Err(InputRowError::AlreadyInitialized(self.spec.name.clone()));
        }

        let mut params = Params::with_capacity(self.spec.fields.len());
        for child in &self.spec.fields {
            let value = initial
                .and_then(|saved| saved.get(&child.name))
                .filter(|v| !v.is_null())
                .cloned()
                .or_else(|| child.default.clone())
                .unwrap_or(Value::Null);
            params.insert(child.name.clone(), value);
        }
        if let Some(saved) = initial {
            for extra in saved.keys().filter(|k| !params.contains_key(k.as_str())) {
                tracing::debug!("Dropping saved value '{}' with no matching child", extra);
            }
        }

        let children = self.build_children(registry, &params)?;

        if self.persist.set(persist).is_err() {
            return Err(InputRowError::AlreadyInitialized(self.spec.name.clone()));
        }
        *self.params.write() = params;
        *self.children.write() = children;

        tracing::info!(
            "Initialized input row '{}' with {} children",
            self.spec.name,
            self.spec.fields.len()
        );
        self.persist_snapshot(&self.params());
        Ok(())
    }

    fn build_children(
        self: &Arc<Self>,
        registry: &WidgetRegistry,
        params: &Params,
    ) -> Result<Vec<Arc<dyn Widget>>, InputRowError> {
        let weak_row = Arc::downgrade(self);
        let as_parent: Weak<dyn FieldNode> = weak_row.clone();

        let mut children = Vec::with_capacity(self.spec.fields.len());
        for child in &self.spec.fields {
            let weak_row = weak_row.clone();
            let on_change: ChangeCallback = Arc::new(move |field: &FieldSpec, value: Value| {
                let Some(row) = weak_row.upgrade() else {
                    return;
                };
                if let Err(e) = row.handle_changed(&field.name, value) {
                    tracing::warn!("Ignoring change: {}", e);
                }
            });

            let built = registry
                .create(WidgetContext {
                    parent: as_parent.clone(),
                    spec: child.clone(),
                    value: params.get(&child.name).filter(|v| !v.is_null()).cloned(),
                    on_change,
                })
                .inspect_err(|e| tracing::warn!("Input row '{}' not initialized: {}", self.spec.name, e))?;
            children.push(built);
        }
        Ok(children)
    }

    /// Bind dependencies when the tree root fires its ready signal
    fn bind_when_ready(self: &Arc<Self>) {
        let me: Arc<dyn FieldNode> = Arc::clone(self) as Arc<dyn FieldNode>;
        let top = top_field(me);
        let Some(signal) = top.ready_signal() else {
            tracing::warn!(
                "No ready signal above input row '{}'; call bind() once the form is built",
                self.spec.name
            );
            return;
        };

        let weak_row = Arc::downgrade(self);
        let weak_top = Arc::downgrade(&top);
        signal.on_ready(Box::new(move || {
            if let (Some(row), Some(top)) = (weak_row.upgrade(), weak_top.upgrade()) {
                row.bind(&top);
            }
        }));
    }

    /// Resolve dependencies from `root` and establish the initial count
    ///
    /// Runs once; later calls are ignored.
    pub fn bind(self: &Arc<Self>, root: &Arc<dyn FieldNode>) {
        let weak_row = Arc::downgrade(self);
        let listener: Listener = Arc::new(move || {
            if let Some(row) = weak_row.upgrade() {
                row.handle_dependency_changed();
            }
        });

        if self.watcher.bind(root, &listener) {
            self.handle_dependency_changed();
        }
    }

    /// Recompute the derived count and revalidate
    pub fn handle_dependency_changed(&self) {
        let Some(count) = self.watcher.recompute() else {
            return;
        };
        self.derived_count.store(count, Ordering::Release);
        self.validate();
    }

    /// Mount the row and its children on `surface` in declaration order
    pub fn attach(&self, surface: &mut dyn Surface) {
        let params = self.params();
        let children = self.children.read().clone();
        surface.open_row(&RowHeader::from_spec(&self.spec));
        for child in children {
            surface.mount_child(&ChildMount::plan(&self.spec, child.spec(), &params));
            child.attach(surface);
        }
        surface.close_row();
        self.attached.store(true, Ordering::Release);
    }

    /// Apply a child edit
    ///
    /// Updates the parameter, persists, validates and notifies subscribers,
    /// in that order.
    ///
    /// # Errors
    /// Returns [`InputRowError::UnknownChild`] if `child` is not declared
    pub fn handle_changed(&self, child: &str, value: Value) -> Result<(), InputRowError> {
        let snapshot = {
            let mut params = self.params.write();
            let Some(slot) = params.get_mut(child) else {
                return Err(InputRowError::UnknownChild(child.to_string()));
            };
            *slot = value;
            params.clone()
        };
        tracing::debug!("Row '{}': '{}' changed", self.spec.name, child);

        self.persist_snapshot(&snapshot);
        self.validate();
        self.subscribers.notify(&snapshot);
        Ok(())
    }

    fn persist_snapshot(&self, params: &Params) {
        if let Some(persist) = self.persist.get() {
            persist(&self.spec, params);
        }
    }

    /// Validate the row as a whole
    ///
    /// Clears the previous message, then records a new one if the relation
    /// fails. Idempotent for unchanged inputs.
    pub fn validate(&self) -> bool {
        self.validity().is_valid()
    }

    /// Validate and return the detailed outcome
    pub fn validity(&self) -> Validity {
        *self.constraint_error.write() = None;

        let children = self.children.read().clone();
        let params = self.params();
        let outcome = self.validator.validate(&children, &params, self.derived_count());

        if let Some(violation) = outcome.violation() {
            tracing::debug!("Row '{}' invalid: {}", self.spec.name, violation);
            *self.constraint_error.write() = Some(violation.clone());
        }
        outcome
    }

    /// Detach rendered content; parameters stay readable
    pub fn dispose(&self) {
        let children = self.children.read().clone();
        for child in children {
            child.detach();
        }
        self.attached.store(false, Ordering::Release);
        tracing::debug!("Disposed input row '{}'", self.spec.name);
    }

    /// Register a change subscriber
    pub fn subscribe(&self, subscriber: Subscriber) -> SubscriptionId {
        self.subscribers.subscribe(subscriber)
    }

    /// Remove a subscriber; `false` if it was not registered
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    /// Snapshot of the parameters
    #[must_use]
    pub fn params(&self) -> Params {
        self.params.read().clone()
    }

    /// Current value of one parameter
    #[must_use]
    pub fn param(&self, name: &str) -> Option<Value> {
        self.params.read().get(name).cloned()
    }

    /// Card count the relation is checked against
    #[must_use]
    pub fn derived_count(&self) -> u32 {
        self.derived_count.load(Ordering::Acquire)
    }

    /// Message from the last validation pass
    #[must_use]
    pub fn constraint_error(&self) -> Option<ConstraintViolation> {
        self.constraint_error.read().clone()
    }

    /// Rendered constraint message, if any
    #[must_use]
    pub fn error_text(&self) -> Option<String> {
        self.constraint_error.read().as_ref().map(ToString::to_string)
    }

    /// Child errors in declaration order, then the row's own message
    #[must_use]
    pub fn errors(&self) -> Vec<String> {
        let mut errors: Vec<String> = self
            .children
            .read()
            .iter()
            .flat_map(|child| child.errors())
            .collect();
        errors.extend(self.error_text());
        errors
    }

    /// The row's own spec
    #[must_use]
    pub fn spec(&self) -> &FieldSpec {
        &self.spec
    }

    /// Child widget by name
    #[must_use]
    pub fn child(&self, name: &str) -> Option<Arc<dyn Widget>> {
        self.children
            .read()
            .iter()
            .find(|child| child.name() == name)
            .cloned()
    }

    /// Whether the row is mounted on a surface
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::Acquire)
    }

    /// Whether dependencies were resolved and the collection found
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.watcher.is_bound()
    }

    /// Number of registered change subscribers
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl FieldNode for CompositeRowField {
    fn name(&self) -> &str {
        &self.spec.name
    }

    fn parent(&self) -> Option<Arc<dyn FieldNode>> {
        self.parent.upgrade()
    }

    fn children(&self) -> Option<Vec<Arc<dyn FieldNode>>> {
        Some(
            self.children
                .read()
                .iter()
                .map(|child| Arc::clone(child) as Arc<dyn FieldNode>)
                .collect(),
        )
    }
}

impl Widget for CompositeRowField {
    fn spec(&self) -> &FieldSpec {
        &self.spec
    }

    fn attach(&self, surface: &mut dyn Surface) {
        CompositeRowField::attach(self, surface);
    }

    fn validate(&self) -> Option<bool> {
        Some(CompositeRowField::validate(self))
    }

    fn detach(&self) {
        self.dispose();
    }

    fn errors(&self) -> Vec<String> {
        CompositeRowField::errors(self)
    }
}

impl fmt::Debug for CompositeRowField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeRowField")
            .field("name", &self.spec.name)
            .field("params", &*self.params.read())
            .field("children", &self.children.read().len())
            .field("derived_count", &self.derived_count())
            .field("constraint_error", &*self.constraint_error.read())
            .field("watcher", &self.watcher)
            .finish_non_exhaustive()
    }
}
