//! Plan executor
//!
//! Walks an [`InvocationPlan`] for one object:
//!
//! 1. check cancellation and resolve every dependency slot
//! 2. run `before_validate`
//! 3. for each field in declaration order, run its calls group by group,
//!    or, for a nested field, validate the object and merge it under the
//!    field's name
//! 4. run `after_validate`
//!
//! With fail-fast, the first failing group or hook ends the object: the
//! failing field is recorded and nothing after it runs. Cancellation is
//! observed before each object and field and at every suspension point.

use std::future::Future;
use std::sync::Arc;

use futures::StreamExt;
use futures::future::BoxFuture;
use smallvec::SmallVec;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use super::{FieldOutcome, Outcome, OutcomePools};
use crate::compile::{FieldStep, InvocationPlan, PlanRegistry, PlannedCall, Shape, Wrapper};
use crate::foundation::{FieldValue, ValidateError, ValidateObject, ValidationContext};
use crate::provider::{Capability, CapabilityProvider, resolve_ref};
use crate::rule::{Call, RuleOutput};

/// Per-call execution state shared by every object in the tree.
pub(crate) struct Executor<'v> {
    pub(crate) registry: &'v PlanRegistry,
    pub(crate) pools: &'v OutcomePools,
    pub(crate) provider: &'v dyn CapabilityProvider,
    pub(crate) cancel: &'v CancellationToken,
}

/// Borrowed inputs common to every call on one object.
#[derive(Clone, Copy)]
struct Scope<'a> {
    target: &'a dyn ValidateObject,
    deps: &'a [Capability],
    context: &'a ValidationContext,
}

impl<'v> Executor<'v> {
    /// Validates `target` against `plan`.
    pub(crate) fn run<'a>(
        &'a self,
        plan: Arc<InvocationPlan>,
        target: &'a dyn ValidateObject,
        mut context: ValidationContext,
    ) -> BoxFuture<'a, Result<Outcome, ValidateError>> {
        Box::pin(async move {
            self.check_cancelled(&plan)?;
            context.enter_type(&plan.type_name);

            let deps = plan
                .dependencies
                .iter()
                .map(|dependency| resolve_ref(self.provider, dependency))
                .collect::<Result<SmallVec<[Capability; 4]>, _>>()?;

            let mut result = self.pools.create(plan.fields.len());

            if let Some(hook) = &plan.before {
                let scope = Scope { target, deps: &deps, context: &context };
                self.run_hook(&plan, hook, scope, &mut result).await?;
                if plan.fail_fast && !result.is_success() {
                    return Ok(result);
                }
            }

            for step in &plan.fields {
                self.check_cancelled(&plan)?;
                context.push_field(&step.name);
                let scope = Scope { target, deps: &deps, context: &context };
                let field = self.run_field(&plan, step, scope, &result).await;
                context.pop_field();

                let field = field?;
                let failed = !field.is_success();
                result.add_field_outcome(field);
                if failed && plan.fail_fast {
                    trace!(type_name = %plan.type_name, field = %step.name, "fail-fast stop");
                    return Ok(result);
                }
            }

            if let Some(hook) = &plan.after {
                let scope = Scope { target, deps: &deps, context: &context };
                self.run_hook(&plan, hook, scope, &mut result).await?;
            }

            Ok(result)
        })
    }

    async fn run_field(
        &self,
        plan: &InvocationPlan,
        step: &FieldStep,
        scope: Scope<'_>,
        result: &Outcome,
    ) -> Result<FieldOutcome, ValidateError> {
        let value = scope.target.field_value(&step.name);
        let nested = step.nested.map(|key| self.registry.plan_for(key)).transpose()?;
        let capacity = nested.as_ref().map_or(step.child_capacity, |p| p.fields.len());
        let mut field = self.pools.create_field(Arc::clone(&step.name), capacity);

        for group in step.groups.iter().filter(|g| !g.is_empty()) {
            for call in group {
                self.invoke(call, value, scope, result, field.outcome_mut()).await?;
            }
            if plan.fail_fast && !field.is_success() {
                return Ok(field);
            }
        }

        if let (Some(nested), Some(object)) = (nested, value.as_object()) {
            let mut child = self.run(nested, object, scope.context.clone()).await?;
            field.outcome_mut().combine_nested(&mut child, &step.name);
        }

        Ok(field)
    }

    async fn run_hook(
        &self,
        plan: &InvocationPlan,
        hook: &PlannedCall,
        scope: Scope<'_>,
        result: &mut Outcome,
    ) -> Result<(), ValidateError> {
        let mut scratch = self.pools.create(plan.fields.len());
        self.invoke(hook, FieldValue::Object(scope.target), scope, result, &mut scratch)
            .await?;
        result.combine(&mut scratch);
        Ok(())
    }

    async fn invoke(
        &self,
        call: &PlannedCall,
        value: FieldValue<'_>,
        scope: Scope<'_>,
        result: &Outcome,
        into: &mut Outcome,
    ) -> Result<(), ValidateError> {
        let input = Call {
            value,
            target: scope.target,
            args: &call.args,
            resolved: scope.deps,
            context: scope.context,
            cancel: self.cancel,
            pools: self.pools,
            outcome: result,
        };

        match (call.shape.wrapper, call.callee.evaluate(input)) {
            (Wrapper::Sync, pending @ (RuleOutput::Pending(_) | RuleOutput::Streaming(_))) => {
                fold(call, pending, into);
            }
            (_, RuleOutput::Pending(future)) => {
                let ready = self.suspend(future).await?;
                fold(call, ready, into);
            }
            (_, RuleOutput::Streaming(mut stream)) => {
                while let Some(message) = self.suspend(stream.next()).await? {
                    if call.shape.shape != Shape::None {
                        into.add_message(message);
                    }
                }
            }
            (_, ready) => fold(call, ready, into),
        }
        Ok(())
    }

    async fn suspend<F: Future>(&self, future: F) -> Result<F::Output, ValidateError> {
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => {
                debug!("validation cancelled while suspended");
                Err(ValidateError::Cancelled)
            }
            output = future => Ok(output),
        }
    }

    fn check_cancelled(&self, plan: &InvocationPlan) -> Result<(), ValidateError> {
        if self.cancel.is_cancelled() {
            debug!(type_name = %plan.type_name, "validation cancelled");
            return Err(ValidateError::Cancelled);
        }
        Ok(())
    }
}

/// Folds a ready output into `into` according to the call's declared shape.
fn fold(call: &PlannedCall, output: RuleOutput<'_>, into: &mut Outcome) {
    match (call.shape.shape, output) {
        (_, RuleOutput::Nothing) | (Shape::None, _) => {}
        (Shape::SingleMessage, RuleOutput::Message(message)) => {
            if let Some(message) = message {
                into.add_message(message);
            }
        }
        (Shape::MessageSequence, RuleOutput::Messages(messages)) => {
            for message in messages {
                into.add_message(message);
            }
        }
        (Shape::CompositeOutcome, RuleOutput::Outcome(mut child)) => into.combine(&mut child),
        (shape, other) => warn!(
            rule = %call.rule,
            ?shape,
            output = ?other,
            "rule output does not match its declared return shape; ignored"
        ),
    }
}
