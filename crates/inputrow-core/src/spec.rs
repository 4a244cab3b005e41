//! Field specifications supplied by the host
//!
//! A [`FieldSpec`] is one entry of the form semantics. The input row's own spec
//! lists its children under `fields`, in display order.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Widget hint meaning "do not render this child"
pub const WIDGET_NONE: &str = "none";

/// Type tag of numeric children
pub const NUMBER_TYPE: &str = "number";

/// Parameter map of a row: child name to current value, in declaration order
pub type Params = IndexMap<String, Value>;

/// Field description from the form semantics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Name, unique among siblings
    pub name: String,

    /// Type tag selecting the widget implementation
    #[serde(rename = "type")]
    pub field_type: String,

    /// Human-readable label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Help text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Value used when the host supplies none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    /// Lower bound for numeric fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    /// Upper bound for numeric fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,

    /// Increment for numeric fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,

    /// Widget override; `"none"` hides the field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub widget: Option<String>,

    /// Children of a composite field
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldSpec>,

    /// Input row display options
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputrow: Option<RowOptions>,
}

impl FieldSpec {
    /// Create spec with name and type tag
    #[must_use]
    pub fn new(name: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
            label: None,
            description: None,
            default: None,
            min: None,
            max: None,
            step: None,
            widget: None,
            fields: Vec::new(),
            inputrow: None,
        }
    }

    /// Create a numeric field spec
    #[inline]
    #[must_use]
    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, NUMBER_TYPE)
    }

    /// With label
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// With help text
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// With default value
    #[must_use]
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// With numeric bounds
    #[must_use]
    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    /// With numeric increment
    #[must_use]
    pub fn with_step(mut self, step: f64) -> Self {
        self.step = Some(step);
        self
    }

    /// With widget hint
    #[must_use]
    pub fn with_widget(mut self, widget: impl Into<String>) -> Self {
        self.widget = Some(widget.into());
        self
    }

    /// With child specs
    #[must_use]
    pub fn with_fields(mut self, fields: Vec<FieldSpec>) -> Self {
        self.fields = fields;
        self
    }

    /// With row display options
    #[must_use]
    pub fn with_options(mut self, options: RowOptions) -> Self {
        self.inputrow = Some(options);
        self
    }

    /// Label, falling back to the field name
    #[inline]
    #[must_use]
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    /// Whether the widget hint hides this field
    #[inline]
    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.widget.as_deref() == Some(WIDGET_NONE)
    }

    /// Whether this is a numeric field
    #[inline]
    #[must_use]
    pub fn is_number(&self) -> bool {
        self.field_type == NUMBER_TYPE
    }

    /// Row options, defaulted when absent
    #[inline]
    #[must_use]
    pub fn options(&self) -> RowOptions {
        self.inputrow.unwrap_or_default()
    }
}

/// Per-row or per-child display options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RowOptions {
    /// Render numeric children as native number inputs
    #[serde(rename = "HTML5NumberField")]
    pub html5_number_field: bool,

    /// Commit numeric children when Enter is pressed
    pub changed_on_enter: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_host_semantics() {
        let spec: FieldSpec = serde_json::from_value(json!({
            "name": "sizing",
            "type": "group",
            "label": "Grid size",
            "widget": "inputrow",
            "inputrow": { "HTML5NumberField": true },
            "fields": [
                { "name": "rows", "type": "number", "label": "Rows", "min": 1, "default": 4 },
                { "name": "columns", "type": "number", "optional": true }
            ]
        }))
        .unwrap();

        assert_eq!(spec.fields.len(), 2);
        assert_eq!(spec.fields[0].default, Some(json!(4)));
        assert_eq!(spec.fields[0].min, Some(1.0));
        assert_eq!(spec.fields[1].display_label(), "columns");
        assert!(spec.options().html5_number_field);
        assert!(!spec.options().changed_on_enter);
    }

    #[test]
    fn null_default_is_absent() {
        let spec: FieldSpec =
            serde_json::from_value(json!({ "name": "rows", "type": "number", "default": null })).unwrap();
        assert_eq!(spec.default, None);
    }

    #[test]
    fn hidden_widget() {
        assert!(FieldSpec::number("rows").with_widget("none").is_hidden());
        assert!(!FieldSpec::number("rows").with_widget("slider").is_hidden());
        assert!(!FieldSpec::number("rows").is_hidden());
    }

    #[test]
    fn serializes_type_tag() {
        let value = serde_json::to_value(FieldSpec::number("rows").with_label("Rows")).unwrap();
        assert_eq!(value, json!({ "name": "rows", "type": "number", "label": "Rows" }));
    }
}
