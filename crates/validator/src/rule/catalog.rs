//! Rule catalog
//!
//! Maps rule identifiers to factories. A factory turns a field's constant
//! [`RuleArgs`] into a configured [`Rule`] once, at plan compile time.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::Rule;
use crate::foundation::CompileError;
use crate::model::RuleArgs;
use crate::validators;

/// Builds a configured rule from attachment arguments.
pub type RuleFactory = dyn Fn(&RuleArgs) -> Result<Arc<dyn Rule>, CompileError> + Send + Sync;

/// Registry of rule factories by identifier.
///
/// # Examples
///
/// ```rust
/// use nebula_validator::prelude::*;
///
/// let catalog = RuleCatalog::builtin().with("not_admin", |_args| {
///     Ok(rule_fn(Signature::returning("Option<Message>"), |call| {
///         (call.value().as_str() == Some("admin"))
///             .then(|| Message::new("Name is reserved.", "user.reserved"))
///             .into()
///     }))
/// });
/// assert!(catalog.contains("not_admin"));
/// assert!(catalog.contains("phone_number"));
/// ```
#[derive(Clone, Default)]
pub struct RuleCatalog {
    factories: HashMap<Cow<'static, str>, Arc<RuleFactory>>,
}

impl RuleCatalog {
    /// Catalog with no rules.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Catalog with the built-in rules.
    #[must_use]
    pub fn builtin() -> Self {
        let mut catalog = Self::empty();
        validators::register_builtin(&mut catalog);
        catalog
    }

    /// Registers (or replaces) a rule factory.
    pub fn register<F>(&mut self, id: impl Into<Cow<'static, str>>, factory: F) -> &mut Self
    where
        F: Fn(&RuleArgs) -> Result<Arc<dyn Rule>, CompileError> + Send + Sync + 'static,
    {
        self.factories.insert(id.into(), Arc::new(factory));
        self
    }

    /// Builder form of [`register`](Self::register).
    #[must_use = "builder methods must be chained or built"]
    pub fn with<F>(mut self, id: impl Into<Cow<'static, str>>, factory: F) -> Self
    where
        F: Fn(&RuleArgs) -> Result<Arc<dyn Rule>, CompileError> + Send + Sync + 'static,
    {
        self.register(id, factory);
        self
    }

    /// Whether a rule is registered.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.factories.contains_key(id)
    }

    /// Number of registered rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Instantiates a rule. `Ok(None)` when the identifier is unknown.
    ///
    /// # Errors
    ///
    /// Whatever the factory reports for bad arguments.
    pub fn instantiate(&self, id: &str, args: &RuleArgs) -> Result<Option<Arc<dyn Rule>>, CompileError> {
        self.factories.get(id).map(|factory| factory(args)).transpose()
    }
}

impl fmt::Debug for RuleCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<&str> = self.factories.keys().map(AsRef::as_ref).collect();
        ids.sort_unstable();
        f.debug_struct("RuleCatalog").field("rules", &ids).finish()
    }
}
