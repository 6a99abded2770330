//! Validation context
//!
//! Every rule invocation sees a [`ValidationContext`]: the type being
//! validated, the dotted path to the current field, and any caller-supplied
//! values. Nested objects get a child context sharing the same data.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

// ============================================================================
// VALIDATION CONTEXT
// ============================================================================

/// Per-call context handed to rules, routines, and hooks.
#[derive(Clone, Default)]
pub struct ValidationContext {
    data: Arc<HashMap<String, Arc<dyn Any + Send + Sync>>>,
    type_name: Option<Arc<str>>,
    field_path: Vec<Arc<str>>,
}

impl ValidationContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a caller value visible to every rule.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use nebula_validator::ValidationContext;
    ///
    /// let ctx = ValidationContext::new().with("tenant", 7u32);
    /// assert_eq!(ctx.get::<u32>("tenant"), Some(&7));
    /// ```
    #[must_use = "builder methods must be chained or built"]
    pub fn with<T: Send + Sync + 'static>(mut self, key: impl Into<String>, value: T) -> Self {
        Arc::make_mut(&mut self.data).insert(key.into(), Arc::new(value));
        self
    }

    /// Gets a caller value.
    #[must_use]
    pub fn get<T: 'static>(&self, key: &str) -> Option<&T> {
        self.data.get(key).and_then(|v| v.downcast_ref::<T>())
    }

    /// Checks if a caller value exists.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Name of the type currently being validated.
    #[must_use]
    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    /// Name of the field currently being validated.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        self.field_path.last().map(AsRef::as_ref)
    }

    /// Dotted path from the root object to the current field.
    #[must_use]
    pub fn field_path(&self) -> String {
        self.field_path.iter().map(AsRef::as_ref).collect::<Vec<&str>>().join(".")
    }

    /// Nesting depth; zero for the root object.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.field_path.len().saturating_sub(1)
    }

    pub(crate) fn enter_type(&mut self, type_name: &Arc<str>) {
        self.type_name = Some(Arc::clone(type_name));
    }

    pub(crate) fn push_field(&mut self, field: &Arc<str>) {
        self.field_path.push(Arc::clone(field));
    }

    pub(crate) fn pop_field(&mut self) {
        self.field_path.pop();
    }
}

impl fmt::Debug for ValidationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationContext")
            .field("type_name", &self.type_name)
            .field("field_path", &self.field_path())
            .field("values", &self.data.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_field_path_tracks_nesting() {
        let mut ctx = ValidationContext::new();
        let user: Arc<str> = Arc::from("user");
        let address: Arc<str> = Arc::from("address");

        ctx.push_field(&user);
        assert_eq!(ctx.depth(), 0);
        ctx.push_field(&address);
        assert_eq!(ctx.field_path(), "user.address");
        assert_eq!(ctx.field(), Some("address"));
        assert_eq!(ctx.depth(), 1);

        ctx.pop_field();
        assert_eq!(ctx.field_path(), "user");
    }

    #[test]
    fn test_values_are_shared_by_clones() {
        let ctx = ValidationContext::new().with("limit", 10usize);
        let child = ctx.clone();
        assert_eq!(child.get::<usize>("limit"), Some(&10));
        assert_eq!(child.get::<String>("limit"), None);
        assert!(!child.contains("missing"));
    }
}
