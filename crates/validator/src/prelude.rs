//! Prelude module for convenient imports.
//!
//! Provides a single `use nebula_validator::prelude::*;` import that brings
//! in everything needed to describe a type, register rules, and validate.
//!
//! # Examples
//!
//! ```rust
//! use nebula_validator::prelude::*;
//!
//! let validator = Validator::builder()
//!     .options(ValidatorOptions::default().with_fail_fast(true))
//!     .build();
//! assert!(validator.options().fail_fast);
//! ```

// ============================================================================
// FOUNDATION: Messages, values, context, errors
// ============================================================================

pub use crate::foundation::{
    CompileError, FieldValue, Message, MessageArg, ResolveError, TypeKey, Validatable,
    ValidateError, ValidateObject, ValidationContext,
};

// ============================================================================
// MODEL: Describing validatable types
// ============================================================================

pub use crate::model::{
    Constant, FieldDescriptor, ParamDescriptor, RuleArgs, RuleAttachment, Signature,
    TypeDescriptor, TypeSettings,
};

// ============================================================================
// RULES AND PROVIDERS
// ============================================================================

pub use crate::compile::DependencyKey;
pub use crate::provider::{Capability, CapabilityProvider, NoServices, ServiceRegistry};
pub use crate::rule::{Call, Rule, RuleCatalog, RuleOutput, routine, rule_fn};

// ============================================================================
// RUNTIME: Outcomes and the validator
// ============================================================================

pub use crate::options::ValidatorOptions;
pub use crate::runtime::{FieldOutcome, Outcome, OutcomePools};
pub use crate::validator::{Validator, ValidatorBuilder};

pub use futures::future::BoxFuture;
pub use futures::stream::BoxStream;
pub use tokio_util::sync::CancellationToken;
