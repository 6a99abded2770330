//! Plan cache
//!
//! Plans are compiled once per type and shared behind an `Arc`. Compiling a
//! type compiles every type reachable through nested fields; recursive types
//! terminate because each type is compiled at most once.

use std::any::TypeId;
use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use super::plan::{InvocationPlan, build_plan};
use crate::foundation::{CompileError, TypeKey};
use crate::model::extract;
use crate::options::ValidatorOptions;
use crate::rule::RuleCatalog;

/// Concurrent cache of compiled plans keyed by type.
#[derive(Debug)]
pub struct PlanRegistry {
    plans: DashMap<TypeId, Arc<InvocationPlan>>,
    catalog: RuleCatalog,
    options: ValidatorOptions,
}

impl PlanRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new(catalog: RuleCatalog, options: ValidatorOptions) -> Self {
        Self {
            plans: DashMap::new(),
            catalog,
            options,
        }
    }

    /// Rule catalog used for compilation.
    pub fn catalog(&self) -> &RuleCatalog {
        &self.catalog
    }

    /// Options used for compilation.
    pub fn options(&self) -> &ValidatorOptions {
        &self.options
    }

    /// Number of cached plans.
    #[must_use]
    pub fn len(&self) -> usize {
        self.plans.len()
    }

    /// Whether nothing has been compiled yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }

    /// Cached plan, if already compiled.
    #[must_use]
    pub fn get(&self, id: TypeId) -> Option<Arc<InvocationPlan>> {
        self.plans.get(&id).map(|entry| Arc::clone(entry.value()))
    }

    /// Plan for `key`, compiling it and its nested types on first use.
    ///
    /// Nothing is cached unless the whole reachable set compiles.
    ///
    /// # Errors
    ///
    /// The first [`CompileError`] met in `key` or any nested type.
    pub fn plan_for(&self, key: TypeKey) -> Result<Arc<InvocationPlan>, CompileError> {
        if let Some(plan) = self.get(key.id()) {
            return Ok(plan);
        }

        let mut compiled = Vec::new();
        let mut seen = HashSet::new();
        let mut pending = vec![key];
        while let Some(next) = pending.pop() {
            if !seen.insert(next.id()) || self.plans.contains_key(&next.id()) {
                continue;
            }

            let descriptor = next.describe();
            let model = extract(&descriptor, &self.catalog, &self.options)?;
            let plan = build_plan(&model, next, self.options.field_message_capacity)?;
            debug!(
                type_name = %plan.type_name,
                fields = plan.fields.len(),
                calls = plan.call_count(),
                dependencies = plan.dependencies.len(),
                fail_fast = plan.fail_fast,
                "compiled invocation plan"
            );

            pending.extend(plan.nested_types());
            compiled.push(Arc::new(plan));
        }

        let mut root = None;
        for plan in compiled {
            let stored = Arc::clone(self.plans.entry(plan.type_id).or_insert(plan).value());
            if stored.type_id == key.id() {
                root = Some(stored);
            }
        }

        match root {
            Some(plan) => Ok(plan),
            // Another thread finished the root between our lookups
            None => self.get(key.id()).ok_or_else(|| CompileError::NestedTypeMissing {
                field: key.name().to_string(),
            }),
        }
    }

    /// Whether `key` and every type reachable from it validate without suspending.
    ///
    /// # Errors
    ///
    /// Compilation errors of `key` or its nested types.
    pub fn is_synchronous(&self, key: TypeKey) -> Result<bool, CompileError> {
        let mut seen = HashSet::new();
        let mut pending = vec![key];
        while let Some(next) = pending.pop() {
            if !seen.insert(next.id()) {
                continue;
            }
            let plan = self.plan_for(next)?;
            if !plan.is_synchronous() {
                return Ok(false);
            }
            pending.extend(plan.nested_types());
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::{FieldValue, Validatable};
    use crate::model::{FieldDescriptor, TypeDescriptor};
    use pretty_assertions::assert_eq;

    struct Node;

    impl Validatable for Node {
        fn describe() -> TypeDescriptor {
            TypeDescriptor::new("Node")
                .field(FieldDescriptor::new("label", "String").rule("required"))
                .field(FieldDescriptor::nested::<Node>("next").nullable())
        }

        fn field(&self, _name: &str) -> FieldValue<'_> {
            FieldValue::Null
        }
    }

    struct Broken;

    impl Validatable for Broken {
        fn describe() -> TypeDescriptor {
            TypeDescriptor::new("Broken")
                .field(FieldDescriptor::new("ok", "String"))
                .field(FieldDescriptor::nested::<Bad>("bad"))
        }

        fn field(&self, _name: &str) -> FieldValue<'_> {
            FieldValue::Null
        }
    }

    struct Bad;

    impl Validatable for Bad {
        fn describe() -> TypeDescriptor {
            TypeDescriptor::new("Bad").field(FieldDescriptor::new("x", "String").rule("nope"))
        }

        fn field(&self, _name: &str) -> FieldValue<'_> {
            FieldValue::Null
        }
    }

    fn registry() -> PlanRegistry {
        PlanRegistry::new(RuleCatalog::builtin(), ValidatorOptions::default())
    }

    #[test]
    fn test_recursive_type_compiles_once() {
        let registry = registry();
        let first = registry.plan_for(TypeKey::of::<Node>()).unwrap();
        let second = registry.plan_for(TypeKey::of::<Node>()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 1);
        assert!(registry.is_synchronous(TypeKey::of::<Node>()).unwrap());
    }

    #[test]
    fn test_nested_failure_caches_nothing() {
        let registry = registry();
        let err = registry.plan_for(TypeKey::of::<Broken>()).unwrap_err();
        assert!(matches!(err, CompileError::UnknownRule { .. }));
        assert!(registry.is_empty());
    }
}
