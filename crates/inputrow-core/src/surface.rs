//! Rendering surface contract
//!
//! The row does not draw anything itself. It tells the host's [`Surface`] what
//! to mount, in declaration order, and which display decisions apply to each
//! child.

use crate::spec::{FieldSpec, Params};
use serde::Serialize;
use serde_json::Value;

/// Host-side rendering target
#[cfg_attr(test, mockall::automock)]
pub trait Surface {
    /// Start the row container
    fn open_row(&mut self, header: &RowHeader);

    /// Mount the slot of one child; the child attaches its own content next
    fn mount_child(&mut self, mount: &ChildMount);

    /// Finish the row container
    fn close_row(&mut self);
}

/// Row container header
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowHeader {
    /// Row field name
    pub name: String,
    /// Row label
    pub label: Option<String>,
    /// Help text under the label
    pub description: Option<String>,
}

impl RowHeader {
    /// Header for a row's spec
    #[must_use]
    pub fn from_spec(spec: &FieldSpec) -> Self {
        Self {
            name: spec.name.clone(),
            label: spec.label.clone(),
            description: spec.description.clone(),
        }
    }
}

/// Display decisions for one child slot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChildMount {
    /// Child field name
    pub name: String,
    /// `widget: "none"` was requested
    pub hidden: bool,
    /// Native number input attributes, when enabled
    pub number: Option<NumberInputAttrs>,
    /// Enter commits the value
    pub commit_on_enter: bool,
}

impl ChildMount {
    /// Decide how to mount `child` inside the row described by `row`
    ///
    /// Number rendering and commit-on-enter apply to `number` children only and
    /// may be enabled on the row or on the child itself.
    #[must_use]
    pub fn plan(row: &FieldSpec, child: &FieldSpec, params: &Params) -> Self {
        let row_options = row.options();
        let child_options = child.options();

        let number = (child.is_number()
            && (row_options.html5_number_field || child_options.html5_number_field))
            .then(|| {
                let unset = params.get(&child.name).is_none_or(Value::is_null);
                NumberInputAttrs {
                    min: child.min,
                    max: child.max,
                    step: child.step,
                    placeholder_value: child.default.clone().filter(|_| unset),
                }
            });

        Self {
            name: child.name.clone(),
            hidden: child.is_hidden(),
            number,
            commit_on_enter: child.is_number()
                && (row_options.changed_on_enter || child_options.changed_on_enter),
        }
    }
}

/// Native number input attributes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumberInputAttrs {
    /// Lower bound
    pub min: Option<f64>,
    /// Upper bound
    pub max: Option<f64>,
    /// Increment
    pub step: Option<f64>,
    /// Declared default shown while the parameter is unset
    pub placeholder_value: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::RowOptions;
    use serde_json::json;

    fn row(options: Option<RowOptions>) -> FieldSpec {
        let mut spec = FieldSpec::new("sizing", "group");
        spec.inputrow = options;
        spec
    }

    #[test]
    fn plain_child_has_no_number_attrs() {
        let child = FieldSpec::number("rows").with_range(1.0, 10.0);
        let mount = ChildMount::plan(&row(None), &child, &Params::new());

        assert_eq!(mount.name, "rows");
        assert!(!mount.hidden);
        assert!(mount.number.is_none());
        assert!(!mount.commit_on_enter);
    }

    #[test]
    fn row_level_options_apply_to_number_children() {
        let options = RowOptions {
            html5_number_field: true,
            changed_on_enter: true,
        };
        let child = FieldSpec::number("rows").with_range(1.0, 10.0).with_step(1.0);
        let mut params = Params::new();
        params.insert("rows".to_string(), json!(4));

        let mount = ChildMount::plan(&row(Some(options)), &child, &params);

        let attrs = mount.number.unwrap();
        assert_eq!(attrs.min, Some(1.0));
        assert_eq!(attrs.max, Some(10.0));
        assert_eq!(attrs.step, Some(1.0));
        assert_eq!(attrs.placeholder_value, None);
        assert!(mount.commit_on_enter);
    }

    #[test]
    fn child_level_options_and_placeholder() {
        let child = FieldSpec::number("columns")
            .with_default(5)
            .with_options(RowOptions {
                html5_number_field: true,
                changed_on_enter: false,
            });
        let mut params = Params::new();
        params.insert("columns".to_string(), Value::Null);

        let mount = ChildMount::plan(&row(None), &child, &params);

        assert_eq!(mount.number.unwrap().placeholder_value, Some(json!(5)));
        assert!(!mount.commit_on_enter);
    }

    #[test]
    fn options_ignored_for_text_children() {
        let options = RowOptions {
            html5_number_field: true,
            changed_on_enter: true,
        };
        let child = FieldSpec::new("title", "text").with_widget("none");
        let mount = ChildMount::plan(&row(Some(options)), &child, &Params::new());

        assert!(mount.hidden);
        assert!(mount.number.is_none());
        assert!(!mount.commit_on_enter);
    }
}
