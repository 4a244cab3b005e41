//! Constraint validation
//!
//! Provides [`ConstraintValidator`], which checks the row as a whole: every
//! child must give a positive verdict, then the two constrained parameters must
//! satisfy `count * 2 / rows == columns` for the derived card count.

use crate::config::ConstraintPair;
use crate::error::InputRowError;
use crate::spec::{FieldSpec, Params};
use crate::widget::Widget;
use serde_json::Value;
use std::sync::Arc;

/// Cards that make up one pair
pub const CARDS_PER_PAIR: f64 = 2.0;

/// Localization key of the violation message
pub const VIOLATION_KEY: &str = "rowColumnsNotPossible";

/// Outcome of one validation pass
#[derive(Debug, Clone, PartialEq)]
pub enum Validity {
    /// Children valid and relation holds or is not yet applicable
    Valid,
    /// A child reported invalid or gave no verdict; relation not checked
    InvalidChild {
        /// First failing child
        field: String,
    },
    /// The relation does not hold
    Violated(ConstraintViolation),
}

impl Validity {
    /// Whether the pass succeeded
    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Violation message, if the relation failed
    #[inline]
    #[must_use]
    pub fn violation(&self) -> Option<&ConstraintViolation> {
        match self {
            Self::Violated(v) => Some(v),
            _ => None,
        }
    }
}

/// The relation between the constrained parameters does not hold
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("the combination of {rows_label} and {columns_label} is not possible with {count} cards")]
pub struct ConstraintViolation {
    /// Label of the rows parameter
    pub rows_label: String,
    /// Label of the columns parameter
    pub columns_label: String,
    /// Rows operand
    pub rows: f64,
    /// Columns operand
    pub columns: f64,
    /// Card count checked against
    pub count: u32,
}

impl ConstraintViolation {
    /// Stable key for the host's localization layer
    #[inline]
    #[must_use]
    pub fn key(&self) -> &'static str {
        VIOLATION_KEY
    }

    /// Placeholder substitutions for the localized message
    #[must_use]
    pub fn placeholders(&self) -> [(&'static str, &str); 2] {
        [(":rows", self.rows_label.as_str()), (":columns", self.columns_label.as_str())]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ConstrainedField {
    name: String,
    label: String,
}

/// Validator for a row's children and its numeric relation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintValidator {
    /// `None` when the row declares fewer than two children
    pair: Option<(ConstrainedField, ConstrainedField)>,
}

impl ConstraintValidator {
    /// Create validator for a row spec
    ///
    /// Uses the declared pair when given, otherwise the first two children.
    ///
    /// # Errors
    /// Returns [`InputRowError::UndeclaredConstraintField`] if a declared name
    /// is not a child of the row
    pub fn from_spec(row: &FieldSpec, declared: Option<&ConstraintPair>) -> Result<Self, InputRowError> {
        let lookup = |name: &str| {
            row.fields
                .iter()
                .find(|f| f.name == name)
                .map(constrained)
                .ok_or_else(|| InputRowError::UndeclaredConstraintField(name.to_string()))
        };

        let pair = match declared {
            Some(pair) => Some((lookup(pair.rows.as_str())?, lookup(pair.columns.as_str())?)),
            None => match row.fields.as_slice() {
                [first, second, ..] => Some((constrained(first), constrained(second))),
                _ => {
                    tracing::debug!("Row '{}' has fewer than two children, no relation to check", row.name);
                    None
                }
            },
        };

        Ok(Self { pair })
    }

    /// Names of the constrained parameters
    #[must_use]
    pub fn constrained_names(&self) -> Option<(&str, &str)> {
        self.pair
            .as_ref()
            .map(|(rows, columns)| (rows.name.as_str(), columns.name.as_str()))
    }

    /// Run a full validation pass
    ///
    /// Children are asked in declaration order and the pass stops at the first
    /// one without a positive verdict.
    #[must_use]
    pub fn validate(&self, children: &[Arc<dyn Widget>], params: &Params, count: u32) -> Validity {
        for child in children {
            match child.validate() {
                Some(true) => {}
                verdict => {
                    tracing::debug!("Child '{}' failed validation: {:?}", child.name(), verdict);
                    return Validity::InvalidChild {
                        field: child.name().to_string(),
                    };
                }
            }
        }

        match self.check(params, count) {
            Ok(()) => Validity::Valid,
            Err(violation) => Validity::Violated(violation),
        }
    }

    /// Check the relation alone
    ///
    /// Skipped while either operand is undefined. A zero divisor never matches
    /// and is reported like any other violation.
    ///
    /// # Errors
    /// Returns the violation when `count * 2 / rows != columns`
    #[allow(clippy::float_cmp)] // exact comparison is the relation
    pub fn check(&self, params: &Params, count: u32) -> Result<(), ConstraintViolation> {
        let Some((rows_field, columns_field)) = &self.pair else {
            return Ok(());
        };
        let (Some(rows), Some(columns)) = (
            operand(params.get(&rows_field.name)),
            operand(params.get(&columns_field.name)),
        ) else {
            return Ok(());
        };

        if f64::from(count) * CARDS_PER_PAIR / rows == columns {
            return Ok(());
        }

        Err(ConstraintViolation {
            rows_label: rows_field.label.clone(),
            columns_label: columns_field.label.clone(),
            rows,
            columns,
            count,
        })
    }
}

fn constrained(spec: &FieldSpec) -> ConstrainedField {
    ConstrainedField {
        name: spec.name.clone(),
        label: spec.display_label().to_string(),
    }
}

/// Numeric reading of a parameter; `None` when undefined
///
/// Numeric strings are parsed; anything else defined reads as NaN.
#[must_use]
pub fn operand(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Null => None,
        Value::Number(n) => Some(n.as_f64().unwrap_or(f64::NAN)),
        Value::String(s) => Some(s.trim().parse().unwrap_or(f64::NAN)),
        _ => Some(f64::NAN),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row() -> FieldSpec {
        FieldSpec::new("sizing", "group").with_fields(vec![
            FieldSpec::number("rows").with_label("Rows"),
            FieldSpec::number("columns").with_label("Columns"),
            FieldSpec::new("note", "text"),
        ])
    }

    fn params(rows: Value, columns: Value) -> Params {
        let mut params = Params::new();
        params.insert("rows".to_string(), rows);
        params.insert("columns".to_string(), columns);
        params
    }

    #[test]
    fn relation_holds() {
        let validator = ConstraintValidator::from_spec(&row(), None).unwrap();
        assert!(validator.check(&params(json!(8), json!(5)), 20).is_ok());
    }

    #[test]
    fn relation_violated_names_labels() {
        let validator = ConstraintValidator::from_spec(&row(), None).unwrap();
        let violation = validator.check(&params(json!(4), json!(5)), 20).unwrap_err();

        assert_eq!(violation.rows_label, "Rows");
        assert_eq!(violation.columns_label, "Columns");
        assert_eq!(violation.key(), "rowColumnsNotPossible");
        assert_eq!(violation.placeholders(), [(":rows", "Rows"), (":columns", "Columns")]);
        assert_eq!(
            violation.to_string(),
            "the combination of Rows and Columns is not possible with 20 cards"
        );
    }

    #[test]
    fn labels_fall_back_to_names() {
        let spec = FieldSpec::new("sizing", "group")
            .with_fields(vec![FieldSpec::number("rows"), FieldSpec::number("columns")]);
        let validator = ConstraintValidator::from_spec(&spec, None).unwrap();
        let violation = validator.check(&params(json!(3), json!(3)), 10).unwrap_err();

        assert_eq!(violation.placeholders(), [(":rows", "rows"), (":columns", "columns")]);
    }

    #[test]
    fn zero_rows_is_a_violation() {
        let validator = ConstraintValidator::from_spec(&row(), None).unwrap();
        assert!(validator.check(&params(json!(0), json!(5)), 20).is_err());
        assert!(validator.check(&params(json!(0), json!(0)), 0).is_err());
    }

    #[test]
    fn undefined_operand_skips_relation() {
        let validator = ConstraintValidator::from_spec(&row(), None).unwrap();
        assert!(validator.check(&params(Value::Null, json!(5)), 20).is_ok());
        assert!(validator.check(&Params::new(), 20).is_ok());
    }

    #[test]
    fn non_numeric_operand_is_a_violation() {
        let validator = ConstraintValidator::from_spec(&row(), None).unwrap();
        assert!(validator.check(&params(json!("abc"), json!(5)), 20).is_err());
        assert!(validator.check(&params(json!("8"), json!(5)), 20).is_ok());
    }

    #[test]
    fn declared_pair_overrides_position() {
        let spec = FieldSpec::new("sizing", "group").with_fields(vec![
            FieldSpec::new("note", "text"),
            FieldSpec::number("columns"),
            FieldSpec::number("rows"),
        ]);
        let pair = ConstraintPair {
            rows: "rows".to_string(),
            columns: "columns".to_string(),
        };
        let validator = ConstraintValidator::from_spec(&spec, Some(&pair)).unwrap();
        assert_eq!(validator.constrained_names(), Some(("rows", "columns")));
    }

    #[test]
    fn declared_pair_must_exist() {
        let pair = ConstraintPair {
            rows: "height".to_string(),
            columns: "columns".to_string(),
        };
        let err = ConstraintValidator::from_spec(&row(), Some(&pair)).unwrap_err();
        assert!(matches!(err, InputRowError::UndeclaredConstraintField(ref n) if n == "height"));
    }

    #[test]
    fn single_child_has_no_relation() {
        let spec = FieldSpec::new("sizing", "group").with_fields(vec![FieldSpec::number("rows")]);
        let validator = ConstraintValidator::from_spec(&spec, None).unwrap();
        assert_eq!(validator.constrained_names(), None);
        assert!(validator.check(&params(json!(0), json!(0)), 7).is_ok());
    }

    #[test]
    fn operand_readings() {
        assert_eq!(operand(None), None);
        assert_eq!(operand(Some(&Value::Null)), None);
        assert_eq!(operand(Some(&json!(2.5))), Some(2.5));
        assert_eq!(operand(Some(&json!(" 4 "))), Some(4.0));
        assert!(operand(Some(&json!(true))).unwrap().is_nan());
    }
}
