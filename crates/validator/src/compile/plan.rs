//! Invocation plans
//!
//! An [`InvocationPlan`] is the compiled, immutable recipe for validating one
//! type: every field in declaration order, each with its calls split into the
//! five shape groups of [`ReturnShape::group`], plus hooks and the distinct
//! dependencies to resolve before the first field runs.

use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use super::dependency::{ArgSource, DependencyRef, DependencyTracker, resolve_parameters};
use super::shape::{ReturnShape, Shape};
use crate::foundation::{CompileError, TypeKey};
use crate::model::{RuleRef, TypeModel};
use crate::rule::Rule;

// ============================================================================
// PLAN
// ============================================================================

/// One compiled rule invocation.
#[derive(Clone)]
pub struct PlannedCall {
    /// Rule identifier or routine name
    pub rule: Arc<str>,
    /// Implementation
    pub callee: Arc<dyn Rule>,
    /// Classified return shape
    pub shape: ReturnShape,
    /// Runtime source of each declared parameter
    pub args: SmallVec<[ArgSource; 4]>,
}

impl fmt::Debug for PlannedCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlannedCall")
            .field("rule", &self.rule)
            .field("shape", &self.shape)
            .field("args", &self.args)
            .finish()
    }
}

/// Compiled steps for one field.
#[derive(Debug, Clone)]
pub struct FieldStep {
    /// Field name
    pub name: Arc<str>,
    /// Calls by shape group, declaration order within each group
    pub groups: [Vec<PlannedCall>; ReturnShape::GROUPS],
    /// Nested type validated after the field's own calls
    pub nested: Option<TypeKey>,
    /// Child field outcomes the field may receive from composite calls
    pub child_capacity: usize,
}

impl FieldStep {
    /// Calls in execution order.
    pub fn calls(&self) -> impl Iterator<Item = &PlannedCall> {
        self.groups.iter().flatten()
    }

    /// Whether any call can suspend.
    #[must_use]
    pub fn is_suspendable(&self) -> bool {
        self.calls().any(|c| c.shape.is_suspendable())
    }
}

/// Compiled validation recipe for one type.
#[derive(Debug, Clone)]
pub struct InvocationPlan {
    /// Type name
    pub type_name: Arc<str>,
    /// Rust type identity
    pub type_id: TypeId,
    /// Stop at the first failing field or hook
    pub fail_fast: bool,
    /// Auto rules were applied
    pub auto_rules: bool,
    /// Field steps in declaration order
    pub fields: Vec<FieldStep>,
    /// `before_validate` call
    pub before: Option<PlannedCall>,
    /// `after_validate` call
    pub after: Option<PlannedCall>,
    /// Distinct dependencies, indexed by slot
    pub dependencies: Vec<DependencyRef>,
}

impl InvocationPlan {
    /// Whether this plan (ignoring nested types) can run without suspending.
    #[must_use]
    pub fn is_synchronous(&self) -> bool {
        !self.fields.iter().any(FieldStep::is_suspendable)
            && self.hooks().all(|h| !h.shape.is_suspendable())
    }

    /// Nested types referenced by fields, in field order.
    pub fn nested_types(&self) -> impl Iterator<Item = TypeKey> + '_ {
        self.fields.iter().filter_map(|f| f.nested)
    }

    /// Total number of planned calls, hooks included.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.fields.iter().map(|f| f.calls().count()).sum::<usize>() + self.hooks().count()
    }

    fn hooks(&self) -> impl Iterator<Item = &PlannedCall> {
        self.before.iter().chain(self.after.iter())
    }
}

// ============================================================================
// BUILDER
// ============================================================================

/// Compiles an extracted model into a plan.
///
/// # Errors
///
/// [`CompileError::NonConstantKey`] for keyed parameters with non-constant
/// keys; [`CompileError::MalformedType`] never occurs here since types were
/// parsed during extraction.
pub fn build_plan(
    model: &TypeModel,
    key: TypeKey,
    field_message_capacity: usize,
) -> Result<InvocationPlan, CompileError> {
    let mut tracker = DependencyTracker::new();

    let before = model
        .before
        .as_ref()
        .map(|hook| plan_call(hook, &mut tracker))
        .transpose()?;

    let mut fields = Vec::with_capacity(model.fields.len());
    for field in &model.fields {
        let mut groups: [Vec<PlannedCall>; ReturnShape::GROUPS] = Default::default();
        for rule in &field.rules {
            let call = plan_call(rule, &mut tracker)?;
            groups[call.shape.group()].push(call);
        }

        let composite = !groups[0].is_empty()
            || groups[3..].iter().flatten().any(|c| c.shape.shape == Shape::CompositeOutcome);
        fields.push(FieldStep {
            name: Arc::clone(&field.name),
            groups,
            nested: field.nested,
            child_capacity: if composite { field_message_capacity } else { 0 },
        });
    }

    let after = model
        .after
        .as_ref()
        .map(|hook| plan_call(hook, &mut tracker))
        .transpose()?;

    Ok(InvocationPlan {
        type_name: Arc::clone(&model.name),
        type_id: key.id(),
        fail_fast: model.fail_fast,
        auto_rules: model.auto_rules,
        fields,
        before,
        after,
        dependencies: tracker.into_dependencies(),
    })
}

fn plan_call(rule: &RuleRef, tracker: &mut DependencyTracker) -> Result<PlannedCall, CompileError> {
    Ok(PlannedCall {
        rule: Arc::clone(&rule.id),
        callee: Arc::clone(&rule.callee),
        shape: ReturnShape::classify(&rule.signature.returns),
        args: resolve_parameters(&rule.id, &rule.signature.params, tracker)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::Wrapper;
    use crate::foundation::{FieldValue, Validatable};
    use crate::model::{FieldDescriptor, ParamDescriptor, Signature, TypeDescriptor, extract};
    use crate::options::ValidatorOptions;
    use crate::rule::{RuleCatalog, RuleOutput, rule_fn};
    use pretty_assertions::assert_eq;

    struct Dummy;

    impl Validatable for Dummy {
        fn describe() -> TypeDescriptor {
            TypeDescriptor::new("Dummy")
        }

        fn field(&self, _name: &str) -> FieldValue<'_> {
            FieldValue::Null
        }
    }

    fn catalog() -> RuleCatalog {
        let with = |returns: &'static str, params: Vec<ParamDescriptor>| {
            move |_: &crate::model::RuleArgs| {
                let mut sig = Signature::returning(returns);
                sig.params.clone_from(&params);
                Ok::<_, CompileError>(rule_fn(sig, |_| RuleOutput::Nothing))
            }
        };
        RuleCatalog::empty()
            .with("single", with("Option<Message>", vec![]))
            .with("seq", with("Vec<Message>", vec![]))
            .with("composite", with("Outcome", vec![]))
            .with("later", with("BoxFuture<'a, Option<Message>>", vec![]))
            .with("stream", with("BoxStream<'a, Message>", vec![]))
            .with("clocked", with("Option<Message>", vec![ParamDescriptor::of("Clock")]))
            .with("clocked_ctx", with("Option<Message>", vec![
                ParamDescriptor::of("ValidationContext"),
                ParamDescriptor::of("Clock"),
            ]))
    }

    fn plan(desc: &TypeDescriptor) -> InvocationPlan {
        let model = extract(desc, &catalog(), &ValidatorOptions::default()).unwrap();
        build_plan(&model, TypeKey::of::<Dummy>(), 16).unwrap()
    }

    #[test]
    fn test_calls_grouped_by_shape_in_declaration_order() {
        let desc = TypeDescriptor::new("Dummy").field(
            FieldDescriptor::new("f", "String")
                .rule("stream")
                .rule("seq")
                .rule("later")
                .rule("single")
                .rule("composite")
                .rule("clocked"),
        );
        let plan = plan(&desc);
        let order: Vec<&str> = plan.fields[0].calls().map(|c| c.rule.as_ref()).collect();
        assert_eq!(order, vec!["composite", "single", "clocked", "seq", "later", "stream"]);
        assert!(!plan.is_synchronous());
        assert_eq!(plan.fields[0].child_capacity, 16);
    }

    #[test]
    fn test_dependencies_deduplicated_across_fields() {
        let desc = TypeDescriptor::new("Dummy")
            .field(FieldDescriptor::new("a", "String").rule("clocked"))
            .field(FieldDescriptor::new("b", "String").rule("clocked_ctx"));
        let plan = plan(&desc);
        assert_eq!(plan.dependencies.len(), 1);
        assert_eq!(plan.fields[0].groups[1][0].args.as_slice(), &[ArgSource::Dependency(0)]);
        assert_eq!(
            plan.fields[1].groups[1][0].args.as_slice(),
            &[ArgSource::Context, ArgSource::Dependency(0)]
        );
    }

    #[test]
    fn test_zero_rule_field_still_planned() {
        let desc = TypeDescriptor::new("Dummy").field(FieldDescriptor::new("plain", "i64"));
        let plan = plan(&desc);
        assert_eq!(plan.fields.len(), 1);
        assert_eq!(plan.fields[0].calls().count(), 0);
        assert_eq!(plan.fields[0].child_capacity, 0);
        assert!(plan.is_synchronous());
        assert_eq!(plan.call_count(), 0);
    }

    #[test]
    fn test_shapes_recorded() {
        let desc = TypeDescriptor::new("Dummy").field(FieldDescriptor::new("f", "String").rule("later"));
        let call = &plan(&desc).fields[0].groups[3][0];
        assert_eq!(call.shape.wrapper, Wrapper::SuspendableSingle);
        assert_eq!(call.shape.shape, Shape::SingleMessage);
    }
}
