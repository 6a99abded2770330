//! The rule contract
//!
//! Catalog rules, custom routines, and before/after hooks all implement
//! [`Rule`]. A rule declares a [`Signature`]: its extra parameters (injected
//! dependencies, the context, the outcome under construction, or the
//! cancellation token) and its return type. The return type's *shape*
//! decides when the rule runs relative to others on the same field and how
//! its [`RuleOutput`] is folded into the field's outcome.
//!
//! ```rust
//! use nebula_validator::prelude::*;
//!
//! let not_admin = rule_fn(Signature::returning("Option<Message>"), |call| {
//!     let taken = call.value().as_str() == Some("admin");
//!     taken.then(|| Message::new("Name is reserved.", "user.reserved")).into()
//! });
//! # let _ = not_admin;
//! ```

mod catalog;

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::stream::BoxStream;
use tokio_util::sync::CancellationToken;

pub use catalog::{RuleCatalog, RuleFactory};

use crate::compile::ArgSource;
use crate::foundation::{FieldValue, Message, Validatable, ValidateObject, ValidationContext};
use crate::model::Signature;
use crate::provider::Capability;
use crate::runtime::{Outcome, OutcomePools};

// ============================================================================
// RULE
// ============================================================================

/// A unit of validation logic.
pub trait Rule: Send + Sync + 'static {
    /// Declared parameters and return type.
    fn signature(&self) -> Signature;

    /// Evaluates the rule for one value.
    fn evaluate<'a>(&'a self, call: Call<'a>) -> RuleOutput<'a>;
}

/// What a rule produced.
///
/// Which variants are meaningful is decided by the declared return shape;
/// a variant that disagrees with it is ignored.
pub enum RuleOutput<'a> {
    /// No findings
    Nothing,
    /// Zero or one finding
    Message(Option<Message>),
    /// A sequence of findings
    Messages(Vec<Message>),
    /// A composite outcome to merge
    Outcome(Outcome),
    /// Suspends, then yields one of the ready variants
    Pending(BoxFuture<'a, RuleOutput<'a>>),
    /// Suspends between findings
    Streaming(BoxStream<'a, Message>),
}

impl RuleOutput<'_> {
    /// Whether the output must be awaited.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_) | Self::Streaming(_))
    }
}

impl fmt::Debug for RuleOutput<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nothing => f.write_str("Nothing"),
            Self::Message(m) => f.debug_tuple("Message").field(m).finish(),
            Self::Messages(ms) => f.debug_tuple("Messages").field(ms).finish(),
            Self::Outcome(o) => f.debug_tuple("Outcome").field(o).finish(),
            Self::Pending(_) => f.write_str("Pending(..)"),
            Self::Streaming(_) => f.write_str("Streaming(..)"),
        }
    }
}

impl From<()> for RuleOutput<'_> {
    fn from((): ()) -> Self {
        Self::Nothing
    }
}

impl From<Message> for RuleOutput<'_> {
    fn from(message: Message) -> Self {
        Self::Message(Some(message))
    }
}

impl From<Option<Message>> for RuleOutput<'_> {
    fn from(message: Option<Message>) -> Self {
        Self::Message(message)
    }
}

impl From<Vec<Message>> for RuleOutput<'_> {
    fn from(messages: Vec<Message>) -> Self {
        Self::Messages(messages)
    }
}

impl From<Outcome> for RuleOutput<'_> {
    fn from(outcome: Outcome) -> Self {
        Self::Outcome(outcome)
    }
}

// ============================================================================
// CALL
// ============================================================================

/// Inputs of one rule invocation.
#[derive(Clone, Copy)]
pub struct Call<'a> {
    pub(crate) value: FieldValue<'a>,
    pub(crate) target: &'a dyn ValidateObject,
    pub(crate) args: &'a [ArgSource],
    pub(crate) resolved: &'a [Capability],
    pub(crate) context: &'a ValidationContext,
    pub(crate) cancel: &'a CancellationToken,
    pub(crate) pools: &'a OutcomePools,
    pub(crate) outcome: &'a Outcome,
}

impl<'a> Call<'a> {
    /// The field value; the whole object for hooks.
    #[must_use]
    pub fn value(&self) -> FieldValue<'a> {
        self.value
    }

    /// The object being validated.
    #[must_use]
    pub fn target(&self) -> &'a dyn ValidateObject {
        self.target
    }

    /// The object being validated, as its concrete type.
    #[must_use]
    pub fn target_as<T: Any>(&self) -> Option<&'a T> {
        self.target.as_any().downcast_ref::<T>()
    }

    /// Injected dependency for declared parameter `index`.
    ///
    /// `None` when the parameter is not a dependency or has a different type.
    #[must_use]
    pub fn dependency<T: Any + Send + Sync>(&self, index: usize) -> Option<&'a T> {
        match self.args.get(index)? {
            ArgSource::Dependency(slot) => self.resolved.get(*slot)?.as_ref().downcast_ref::<T>(),
            _ => None,
        }
    }

    /// The validation context.
    #[must_use]
    pub fn context(&self) -> &'a ValidationContext {
        self.context
    }

    /// The call's cancellation token.
    #[must_use]
    pub fn cancellation(&self) -> &'a CancellationToken {
        self.cancel
    }

    /// The object-level outcome built so far.
    #[must_use]
    pub fn outcome(&self) -> &'a Outcome {
        self.outcome
    }

    /// Pools for building a composite [`Outcome`].
    #[must_use]
    pub fn pools(&self) -> &'a OutcomePools {
        self.pools
    }
}

impl fmt::Debug for Call<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Call")
            .field("value", &self.value)
            .field("args", &self.args)
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// CLOSURE ADAPTERS
// ============================================================================

struct FnRule<F> {
    signature: Signature,
    f: F,
}

impl<F> Rule for FnRule<F>
where
    F: for<'a> Fn(Call<'a>) -> RuleOutput<'a> + Send + Sync + 'static,
{
    fn signature(&self) -> Signature {
        self.signature.clone()
    }

    fn evaluate<'a>(&'a self, call: Call<'a>) -> RuleOutput<'a> {
        (self.f)(call)
    }
}

/// Builds a rule from a closure.
pub fn rule_fn<F>(signature: Signature, f: F) -> Arc<dyn Rule>
where
    F: for<'a> Fn(Call<'a>) -> RuleOutput<'a> + Send + Sync + 'static,
{
    Arc::new(FnRule { signature, f })
}

/// Builds a routine that receives the object as its concrete type.
///
/// # Examples
///
/// ```rust
/// use nebula_validator::prelude::*;
///
/// struct Signup { password: String, confirm: String }
///
/// let check = routine::<Signup, _>(Signature::returning("Option<Message>"), |signup, _call| {
///     (signup.password != signup.confirm)
///         .then(|| Message::new("Passwords do not match.", "signup.mismatch"))
///         .into()
/// });
/// # let _ = check;
/// # impl Validatable for Signup {
/// #     fn describe() -> TypeDescriptor { TypeDescriptor::new("Signup") }
/// #     fn field(&self, _: &str) -> FieldValue<'_> { FieldValue::Null }
/// # }
/// ```
pub fn routine<T, F>(signature: Signature, f: F) -> Arc<dyn Rule>
where
    T: Validatable,
    F: for<'a> Fn(&'a T, Call<'a>) -> RuleOutput<'a> + Send + Sync + 'static,
{
    rule_fn(signature, move |call| match call.target_as::<T>() {
        Some(target) => f(target, call),
        None => RuleOutput::Nothing,
    })
}
