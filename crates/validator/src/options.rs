//! Validator configuration
//!
//! [`ValidatorOptions`] carries the global defaults that per-type
//! [`TypeSettings`](crate::model::TypeSettings) can override, plus the pool
//! sizes used by the outcome aggregator. It deserializes from JSON with every
//! field optional.

use serde::{Deserialize, Serialize};

/// Global validator configuration.
///
/// # Examples
///
/// ```rust
/// use nebula_validator::ValidatorOptions;
///
/// let options = ValidatorOptions::from_json(r#"{ "fail_fast": true }"#).unwrap();
/// assert!(options.fail_fast);
/// assert_eq!(options.global_message_capacity, 16);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorOptions {
    /// Attach `required` to non-nullable fields and `in_enum` to enumerations
    pub auto_rules: bool,

    /// Stop at the first failing field or hook
    pub fail_fast: bool,

    /// Message buffer length for object-level outcomes
    pub global_message_capacity: usize,

    /// Message buffer length for field-level outcomes
    pub field_message_capacity: usize,

    /// Idle outcome shells retained for reuse
    pub outcome_pool_size: usize,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self {
            auto_rules: false,
            fail_fast: false,
            global_message_capacity: 16,
            field_message_capacity: 16,
            outcome_pool_size: nebula_memory::pool::default_retained(),
        }
    }
}

impl ValidatorOptions {
    /// Parses options from JSON. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns the parser error for malformed JSON or mistyped fields.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Sets automatic rule discovery.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_auto_rules(mut self, enabled: bool) -> Self {
        self.auto_rules = enabled;
        self
    }

    /// Sets fail-fast.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_fail_fast(mut self, enabled: bool) -> Self {
        self.fail_fast = enabled;
        self
    }

    /// Sets the object-level message buffer length.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_global_message_capacity(mut self, capacity: usize) -> Self {
        self.global_message_capacity = capacity;
        self
    }

    /// Sets the field-level message buffer length.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_field_message_capacity(mut self, capacity: usize) -> Self {
        self.field_message_capacity = capacity;
        self
    }

    /// Sets how many idle outcome shells are retained.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_outcome_pool_size(mut self, size: usize) -> Self {
        self.outcome_pool_size = size;
        self
    }
}
