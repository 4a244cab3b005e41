//! Testing utilities for the InputRow workspace
//!
//! Fake widgets, a recording surface and a memory-game form fixture.

#![allow(missing_docs)]

use inputrow_core::{
    ChildMount, CompositeRowField, FieldSpec, InputRowConfig, InputRowError, Params, RowContext,
    RowHeader, Surface, Widget, WidgetContext, WidgetRegistry, ChangeCallback,
};
use inputrow_tree::{CollectionInput, FieldNode, Listener, NumericInput, ReadySignal};
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use std::sync::{Arc, Once, Weak};
use tracing_subscriber::{fmt, EnvFilter};

static TRACING: Once = Once::new();

/// Install a test subscriber once; honours `RUST_LOG`
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = fmt()
            .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
            .with_test_writer()
            .try_init();
    });
}

fn fire(listeners: &Mutex<Vec<Listener>>) {
    let listeners = listeners.lock().clone();
    for listener in listeners {
        listener();
    }
}

/// Number input usable both as a row child and as a standalone override field
pub struct FakeNumberField {
    spec: FieldSpec,
    parent: Weak<dyn FieldNode>,
    value: Mutex<Value>,
    on_change: Option<ChangeCallback>,
    listeners: Mutex<Vec<Listener>>,
    verdict: Mutex<Option<bool>>,
    errors: Mutex<Vec<String>>,
    attached: Mutex<bool>,
}

impl FakeNumberField {
    /// Standalone field outside any row
    pub fn standalone(name: &str, parent: Weak<dyn FieldNode>, value: impl Into<Value>) -> Arc<Self> {
        Arc::new(Self::with_parts(FieldSpec::number(name), parent, value.into(), None))
    }

    fn from_context(ctx: WidgetContext) -> Self {
        Self::with_parts(ctx.spec, ctx.parent, ctx.value.unwrap_or(Value::Null), Some(ctx.on_change))
    }

    fn with_parts(spec: FieldSpec, parent: Weak<dyn FieldNode>, value: Value, on_change: Option<ChangeCallback>) -> Self {
        Self {
            spec,
            parent,
            value: Mutex::new(value),
            on_change,
            listeners: Mutex::new(Vec::new()),
            verdict: Mutex::new(Some(true)),
            errors: Mutex::new(Vec::new()),
            attached: Mutex::new(false),
        }
    }

    /// Simulate a user edit
    pub fn set_value(&self, value: impl Into<Value>) {
        let value = value.into();
        *self.value.lock() = value.clone();
        fire(&self.listeners);
        if let Some(on_change) = &self.on_change {
            on_change(&self.spec, value);
        }
    }

    pub fn value(&self) -> Value {
        self.value.lock().clone()
    }

    pub fn set_verdict(&self, verdict: Option<bool>) {
        *self.verdict.lock() = verdict;
    }

    pub fn set_errors(&self, errors: Vec<String>) {
        *self.errors.lock() = errors;
    }

    pub fn is_attached(&self) -> bool {
        *self.attached.lock()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }
}

impl FieldNode for FakeNumberField {
    fn name(&self) -> &str {
        &self.spec.name
    }

    fn parent(&self) -> Option<Arc<dyn FieldNode>> {
        self.parent.upgrade()
    }

    fn as_numeric(&self) -> Option<&dyn NumericInput> {
        Some(self)
    }
}

impl NumericInput for FakeNumberField {
    fn current_value(&self) -> String {
        match &*self.value.lock() {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    fn on_value_change(&self, listener: Listener) {
        self.listeners.lock().push(listener);
    }
}

impl Widget for FakeNumberField {
    fn spec(&self) -> &FieldSpec {
        &self.spec
    }

    fn attach(&self, _surface: &mut dyn Surface) {
        *self.attached.lock() = true;
    }

    fn validate(&self) -> Option<bool> {
        *self.verdict.lock()
    }

    fn detach(&self) {
        *self.attached.lock() = false;
    }

    fn errors(&self) -> Vec<String> {
        self.errors.lock().clone()
    }
}

/// Plain text child; always valid
pub struct FakeTextField {
    spec: FieldSpec,
    parent: Weak<dyn FieldNode>,
    value: Mutex<Value>,
    on_change: ChangeCallback,
}

impl FakeTextField {
    pub fn set_value(&self, value: impl Into<Value>) {
        let value = value.into();
        *self.value.lock() = value.clone();
        (self.on_change)(&self.spec, value);
    }

    pub fn value(&self) -> Value {
        self.value.lock().clone()
    }
}

impl FieldNode for FakeTextField {
    fn name(&self) -> &str {
        &self.spec.name
    }

    fn parent(&self) -> Option<Arc<dyn FieldNode>> {
        self.parent.upgrade()
    }
}

impl Widget for FakeTextField {
    fn spec(&self) -> &FieldSpec {
        &self.spec
    }

    fn attach(&self, _surface: &mut dyn Surface) {}

    fn validate(&self) -> Option<bool> {
        Some(true)
    }
}

/// Variable-length list exposing a collection capability
pub struct FakeListField {
    name: String,
    identity: Option<String>,
    parent: Weak<dyn FieldNode>,
    items: Mutex<usize>,
    added: Mutex<Vec<Listener>>,
    removed: Mutex<Vec<Listener>>,
}

impl FakeListField {
    pub fn new(name: &str, identity: Option<&str>, parent: Weak<dyn FieldNode>, items: usize) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            identity: identity.map(str::to_string),
            parent,
            items: Mutex::new(items),
            added: Mutex::new(Vec::new()),
            removed: Mutex::new(Vec::new()),
        })
    }

    pub fn add_item(&self) {
        *self.items.lock() += 1;
        fire(&self.added);
    }

    pub fn remove_item(&self) {
        {
            let mut items = self.items.lock();
            *items = items.saturating_sub(1);
        }
        fire(&self.removed);
    }

    pub fn listener_count(&self) -> usize {
        self.added.lock().len() + self.removed.lock().len()
    }
}

impl FieldNode for FakeListField {
    fn name(&self) -> &str {
        &self.name
    }

    fn list_identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    fn parent(&self) -> Option<Arc<dyn FieldNode>> {
        self.parent.upgrade()
    }

    fn as_collection(&self) -> Option<&dyn CollectionInput> {
        Some(self)
    }
}

impl CollectionInput for FakeListField {
    fn length(&self) -> usize {
        *self.items.lock()
    }

    fn on_item_added(&self, listener: Listener) {
        self.added.lock().push(listener);
    }

    fn on_item_removed(&self, listener: Listener) {
        self.removed.lock().push(listener);
    }
}

/// Container node grouping other fields
pub struct FakeGroup {
    name: String,
    parent: Weak<dyn FieldNode>,
    children: RwLock<Vec<Arc<dyn FieldNode>>>,
}

impl FakeGroup {
    pub fn new(name: &str, parent: Weak<dyn FieldNode>) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            parent,
            children: RwLock::new(Vec::new()),
        })
    }

    pub fn push(&self, child: Arc<dyn FieldNode>) {
        self.children.write().push(child);
    }
}

impl FieldNode for FakeGroup {
    fn name(&self) -> &str {
        &self.name
    }

    fn parent(&self) -> Option<Arc<dyn FieldNode>> {
        self.parent.upgrade()
    }

    fn children(&self) -> Option<Vec<Arc<dyn FieldNode>>> {
        Some(self.children.read().clone())
    }
}

/// Tree root carrying the ready signal
pub struct FakeFormRoot {
    ready: ReadySignal,
    children: RwLock<Vec<Arc<dyn FieldNode>>>,
}

impl FakeFormRoot {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            ready: ReadySignal::new(),
            children: RwLock::new(Vec::new()),
        })
    }

    pub fn push(&self, child: Arc<dyn FieldNode>) {
        self.children.write().push(child);
    }

    /// Fire the ready signal
    pub fn ready(&self) {
        self.ready.fire();
    }
}

impl FieldNode for FakeFormRoot {
    fn name(&self) -> &str {
        "form"
    }

    fn parent(&self) -> Option<Arc<dyn FieldNode>> {
        None
    }

    fn children(&self) -> Option<Vec<Arc<dyn FieldNode>>> {
        Some(self.children.read().clone())
    }

    fn ready_signal(&self) -> Option<&ReadySignal> {
        Some(&self.ready)
    }
}

/// Surface calls as recorded by [`RecordingSurface`]
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    OpenRow(RowHeader),
    Mount(ChildMount),
    CloseRow,
}

#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub events: Vec<SurfaceEvent>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of mounted children, in mount order
    pub fn mounted(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|event| match event {
                SurfaceEvent::Mount(mount) => Some(mount.name.clone()),
                _ => None,
            })
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn open_row(&mut self, header: &RowHeader) {
        self.events.push(SurfaceEvent::OpenRow(header.clone()));
    }

    fn mount_child(&mut self, mount: &ChildMount) {
        self.events.push(SurfaceEvent::Mount(mount.clone()));
    }

    fn close_row(&mut self) {
        self.events.push(SurfaceEvent::CloseRow);
    }
}

/// Registry of fake widgets that remembers what it built
#[derive(Clone, Default)]
pub struct FakeWidgets {
    numbers: Arc<Mutex<Vec<Arc<FakeNumberField>>>>,
    texts: Arc<Mutex<Vec<Arc<FakeTextField>>>>,
}

impl FakeWidgets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with `number` and `text` factories
    pub fn registry(&self) -> WidgetRegistry {
        let numbers = Arc::clone(&self.numbers);
        let texts = Arc::clone(&self.texts);
        WidgetRegistry::new()
            .with("number", move |ctx: WidgetContext| -> Result<Arc<dyn Widget>, InputRowError> {
                let field = Arc::new(FakeNumberField::from_context(ctx));
                numbers.lock().push(Arc::clone(&field));
                Ok(field)
            })
            .with("text", move |ctx: WidgetContext| -> Result<Arc<dyn Widget>, InputRowError> {
                let field = Arc::new(FakeTextField {
                    spec: ctx.spec,
                    parent: ctx.parent,
                    value: Mutex::new(ctx.value.unwrap_or(Value::Null)),
                    on_change: ctx.on_change,
                });
                texts.lock().push(Arc::clone(&field));
                Ok(field)
            })
    }

    /// Most recently built number child with this name
    pub fn number(&self, name: &str) -> Option<Arc<FakeNumberField>> {
        self.numbers.lock().iter().rev().find(|f| f.name() == name).cloned()
    }

    pub fn text(&self, name: &str) -> Option<Arc<FakeTextField>> {
        self.texts.lock().iter().rev().find(|f| f.name() == name).cloned()
    }
}

/// Spec of the grid-sizing row: `rows` and `columns`
pub fn sizing_row_spec() -> FieldSpec {
    FieldSpec::new("sizing", "inputrow")
        .with_label("Grid size")
        .with_fields(vec![
            FieldSpec::number("rows").with_label("Rows").with_range(1.0, 20.0),
            FieldSpec::number("columns").with_label("Columns").with_range(1.0, 20.0),
        ])
}

/// Memory-game form: `behaviour/numCardsToUse`, a `cards` list and the row
pub struct MemoryGameForm {
    pub root: Arc<FakeFormRoot>,
    pub num_cards: Option<Arc<FakeNumberField>>,
    pub cards: Option<Arc<FakeListField>>,
    pub row: Arc<CompositeRowField>,
    pub widgets: FakeWidgets,
    pub persisted: Arc<Mutex<Vec<Params>>>,
}

impl MemoryGameForm {
    pub fn builder() -> MemoryGameFormBuilder {
        MemoryGameFormBuilder::default()
    }

    pub fn ready(&self) {
        self.root.ready();
    }

    /// Number child of the row
    pub fn child(&self, name: &str) -> Arc<FakeNumberField> {
        self.widgets
            .number(name)
            .unwrap_or_else(|| panic!("no number child named {name}"))
    }

    pub fn num_cards(&self) -> &Arc<FakeNumberField> {
        self.num_cards.as_ref().expect("form built without override field")
    }

    pub fn cards(&self) -> &Arc<FakeListField> {
        self.cards.as_ref().expect("form built without card list")
    }

    pub fn persist_count(&self) -> usize {
        self.persisted.lock().len()
    }
}

pub struct MemoryGameFormBuilder {
    cards: Option<usize>,
    card_identity: Option<String>,
    override_value: Option<Value>,
    saved: Option<Params>,
    spec: FieldSpec,
    config: InputRowConfig,
}

impl Default for MemoryGameFormBuilder {
    fn default() -> Self {
        Self {
            cards: Some(10),
            card_identity: None,
            override_value: Some(Value::String(String::new())),
            saved: None,
            spec: sizing_row_spec(),
            config: InputRowConfig::new(),
        }
    }
}

impl MemoryGameFormBuilder {
    pub fn cards(mut self, count: usize) -> Self {
        self.cards = Some(count);
        self
    }

    /// Name the list differently and make it answer to `identity`
    pub fn card_identity(mut self, identity: &str) -> Self {
        self.card_identity = Some(identity.to_string());
        self
    }

    pub fn without_cards(mut self) -> Self {
        self.cards = None;
        self
    }

    pub fn override_value(mut self, value: impl Into<Value>) -> Self {
        self.override_value = Some(value.into());
        self
    }

    pub fn without_override(mut self) -> Self {
        self.override_value = None;
        self
    }

    pub fn saved(mut self, params: Params) -> Self {
        self.saved = Some(params);
        self
    }

    pub fn spec(mut self, spec: FieldSpec) -> Self {
        self.spec = spec;
        self
    }

    pub fn config(mut self, config: InputRowConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> MemoryGameForm {
        self.try_build().expect("memory game form should build")
    }

    pub fn try_build(self) -> Result<MemoryGameForm, InputRowError> {
        let root = FakeFormRoot::new();
        let root_weak: Weak<dyn FieldNode> = Arc::downgrade(&root) as Weak<dyn FieldNode>;

        let behaviour = FakeGroup::new("behaviour", root_weak.clone());
        let behaviour_weak: Weak<dyn FieldNode> = Arc::downgrade(&behaviour) as Weak<dyn FieldNode>;
        let num_cards = self
            .override_value
            .map(|value| FakeNumberField::standalone("numCardsToUse", behaviour_weak, value));
        if let Some(field) = &num_cards {
            behaviour.push(Arc::clone(field) as Arc<dyn FieldNode>);
        }
        root.push(behaviour as Arc<dyn FieldNode>);

        let cards = self.cards.map(|count| match &self.card_identity {
            Some(identity) => FakeListField::new("deck", Some(identity), root_weak.clone(), count),
            None => FakeListField::new("cards", None, root_weak.clone(), count),
        });
        if let Some(list) = &cards {
            root.push(Arc::clone(list) as Arc<dyn FieldNode>);
        }

        let widgets = FakeWidgets::new();
        let persisted = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&persisted);
        let row = CompositeRowField::build(
            RowContext {
                parent: root_weak,
                spec: self.spec,
                params: self.saved,
                persist: Arc::new(move |_: &FieldSpec, params: &Params| sink.lock().push(params.clone())),
                config: self.config,
            },
            &widgets.registry(),
        )?;
        root.push(Arc::clone(&row) as Arc<dyn FieldNode>);

        Ok(MemoryGameForm {
            root,
            num_cards,
            cards,
            row,
            widgets,
            persisted,
        })
    }
}
