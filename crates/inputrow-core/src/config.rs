//! Input row configuration
//!
//! Where the row finds its dependencies and which two parameters the constraint
//! relates. Hosts build it with the `with_*` methods or deserialize it from JSON.

use crate::error::InputRowError;
use serde::{Deserialize, Serialize};

/// Default path of the field overriding the card count
pub const DEFAULT_OVERRIDE_PATH: &str = "behaviour/numCardsToUse";

/// Default path of the card collection
pub const DEFAULT_COLLECTION_PATH: &str = "cards";

/// Smallest override that is honoured
pub const DEFAULT_MIN_OVERRIDE: i64 = 3;

/// Input row configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InputRowConfig {
    /// Path of the numeric override field, resolved from the tree root
    pub override_path: String,
    /// Path of the collection field, resolved from the tree root
    pub collection_path: String,
    /// Overrides below this value fall back to the collection length
    pub min_override: i64,
    /// Constrained parameters; the first two declared children when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraint: Option<ConstraintPair>,
}

impl InputRowConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse configuration from a JSON document
    ///
    /// # Errors
    /// Returns [`InputRowError::InvalidConfig`] if the document is malformed
    pub fn from_json(json: &str) -> Result<Self, InputRowError> {
        Ok(serde_json::from_str(json)?)
    }

    /// With override field path
    #[inline]
    #[must_use]
    pub fn with_override_path(mut self, path: impl Into<String>) -> Self {
        self.override_path = path.into();
        self
    }

    /// With collection field path
    #[inline]
    #[must_use]
    pub fn with_collection_path(mut self, path: impl Into<String>) -> Self {
        self.collection_path = path.into();
        self
    }

    /// With minimum honoured override
    #[inline]
    #[must_use]
    pub fn with_min_override(mut self, min: i64) -> Self {
        self.min_override = min;
        self
    }

    /// With explicitly declared constrained parameters
    #[inline]
    #[must_use]
    pub fn with_constraint(mut self, rows: impl Into<String>, columns: impl Into<String>) -> Self {
        self.constraint = Some(ConstraintPair {
            rows: rows.into(),
            columns: columns.into(),
        });
        self
    }
}

impl Default for InputRowConfig {
    fn default() -> Self {
        Self {
            override_path: DEFAULT_OVERRIDE_PATH.to_string(),
            collection_path: DEFAULT_COLLECTION_PATH.to_string(),
            min_override: DEFAULT_MIN_OVERRIDE,
            constraint: None,
        }
    }
}

/// The two parameters related by the constraint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintPair {
    /// Divisor parameter
    pub rows: String,
    /// Expected quotient parameter
    pub columns: String,
}
