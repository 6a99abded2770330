//! The validator entry point

use std::sync::Arc;

use futures::FutureExt;
use tokio_util::sync::CancellationToken;

use crate::compile::{InvocationPlan, PlanRegistry};
use crate::foundation::{CompileError, TypeKey, Validatable, ValidateError, ValidationContext};
use crate::model::RuleArgs;
use crate::options::ValidatorOptions;
use crate::provider::CapabilityProvider;
use crate::rule::{Rule, RuleCatalog};
use crate::runtime::{Executor, Outcome, OutcomePools};

/// Compiles plans on first use and runs them.
///
/// A `Validator` is meant to be built once and shared; plans and pools are
/// reused across calls and threads.
///
/// # Examples
///
/// ```rust
/// use nebula_validator::prelude::*;
///
/// struct Signup {
///     password: String,
/// }
///
/// impl Validatable for Signup {
///     fn describe() -> TypeDescriptor {
///         TypeDescriptor::new("Signup").field(
///             FieldDescriptor::new("password", "String").rule(
///                 RuleAttachment::new("password")
///                     .arg("min_length", 8)
///                     .arg("required_upper", 1),
///             ),
///         )
///     }
///
///     fn field(&self, name: &str) -> FieldValue<'_> {
///         match name {
///             "password" => (&self.password).into(),
///             _ => FieldValue::Null,
///         }
///     }
/// }
///
/// let validator = Validator::new();
/// let outcome = validator
///     .validate_now(&Signup { password: "lowercase1".into() }, &NoServices)
///     .unwrap();
///
/// assert!(!outcome.is_success());
/// assert_eq!(outcome.field("password").unwrap().messages().len(), 1);
/// ```
#[derive(Debug)]
pub struct Validator {
    registry: PlanRegistry,
    pools: OutcomePools,
}

impl Validator {
    /// Validator with built-in rules and default options.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Builder.
    #[must_use]
    pub fn builder() -> ValidatorBuilder {
        ValidatorBuilder::default()
    }

    /// Active options.
    pub fn options(&self) -> &ValidatorOptions {
        self.registry.options()
    }

    /// Rule catalog.
    pub fn catalog(&self) -> &RuleCatalog {
        self.registry.catalog()
    }

    /// Outcome pools.
    pub fn pools(&self) -> &OutcomePools {
        &self.pools
    }

    /// Compiled plan for `T`, compiling it (and its nested types) on first use.
    ///
    /// # Errors
    ///
    /// The [`CompileError`] of `T` or any nested type.
    pub fn plan<T: Validatable>(&self) -> Result<Arc<InvocationPlan>, CompileError> {
        self.registry.plan_for(TypeKey::of::<T>())
    }

    /// Validates `value`.
    ///
    /// Rule failures are messages in the returned [`Outcome`]; `Err` means the
    /// call was aborted.
    ///
    /// # Errors
    ///
    /// - [`ValidateError::Compile`] when `T` does not compile
    /// - [`ValidateError::Configuration`] when a dependency cannot be resolved
    /// - [`ValidateError::Cancelled`] when `cancel` fires
    pub async fn validate<T: Validatable>(
        &self,
        value: &T,
        provider: &dyn CapabilityProvider,
        cancel: &CancellationToken,
    ) -> Result<Outcome, ValidateError> {
        self.validate_in(value, provider, cancel, ValidationContext::new())
            .await
    }

    /// Validates `value` with caller-supplied context values.
    ///
    /// # Errors
    ///
    /// Same as [`validate`](Self::validate).
    pub async fn validate_in<T: Validatable>(
        &self,
        value: &T,
        provider: &dyn CapabilityProvider,
        cancel: &CancellationToken,
        context: ValidationContext,
    ) -> Result<Outcome, ValidateError> {
        let plan = self.plan::<T>()?;
        let executor = Executor {
            registry: &self.registry,
            pools: &self.pools,
            provider,
            cancel,
        };
        executor.run(plan, value, context).await
    }

    /// Validates `value` without an async runtime.
    ///
    /// # Errors
    ///
    /// [`ValidateError::RequiresSuspension`] when `T` or a nested type has a
    /// suspendable rule or hook, otherwise as [`validate`](Self::validate).
    pub fn validate_now<T: Validatable>(
        &self,
        value: &T,
        provider: &dyn CapabilityProvider,
    ) -> Result<Outcome, ValidateError> {
        let key = TypeKey::of::<T>();
        let requires_suspension = || ValidateError::RequiresSuspension {
            type_name: key.name().to_string(),
        };

        if !self.registry.is_synchronous(key)? {
            return Err(requires_suspension());
        }

        let cancel = CancellationToken::new();
        self.validate(value, provider, &cancel)
            .now_or_never()
            .unwrap_or_else(|| Err(requires_suspension()))
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for [`Validator`].
#[derive(Debug, Default)]
#[must_use = "builder methods must be chained or built"]
pub struct ValidatorBuilder {
    options: Option<ValidatorOptions>,
    catalog: Option<RuleCatalog>,
    pools: Option<OutcomePools>,
}

impl ValidatorBuilder {
    /// Sets options.
    pub fn options(mut self, options: ValidatorOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Replaces the rule catalog (built-ins are not added).
    pub fn catalog(mut self, catalog: RuleCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Registers an extra rule on top of the current catalog.
    pub fn rule<F>(mut self, id: &'static str, factory: F) -> Self
    where
        F: Fn(&RuleArgs) -> Result<Arc<dyn Rule>, CompileError> + Send + Sync + 'static,
    {
        self.catalog
            .get_or_insert_with(RuleCatalog::builtin)
            .register(id, factory);
        self
    }

    /// Uses custom outcome pools.
    pub fn pools(mut self, pools: OutcomePools) -> Self {
        self.pools = Some(pools);
        self
    }

    /// Builds the validator.
    #[must_use]
    pub fn build(self) -> Validator {
        let options = self.options.unwrap_or_default();
        let pools = self.pools.unwrap_or_else(|| OutcomePools::new(&options));
        let catalog = self.catalog.unwrap_or_else(RuleCatalog::builtin);
        Validator {
            registry: PlanRegistry::new(catalog, options),
            pools,
        }
    }
}
