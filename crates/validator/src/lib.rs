//! # nebula-validator
//!
//! Declarative, plan-based validation for the Nebula workflow engine.
//!
//! A type describes its fields and the rules attached to them once, through
//! [`Validatable`]. The first validation of that type compiles the description
//! into an immutable [`InvocationPlan`](compile::InvocationPlan): rules are
//! instantiated from the [`RuleCatalog`], their parameters resolved to
//! injected dependencies, and their calls ordered by return shape. Every later
//! validation just walks the cached plan, collecting findings into a pooled
//! [`Outcome`].
//!
//! ## Quick Start
//!
//! ```rust
//! use nebula_validator::prelude::*;
//!
//! struct Contact {
//!     phone: Option<String>,
//! }
//!
//! impl Validatable for Contact {
//!     fn describe() -> TypeDescriptor {
//!         TypeDescriptor::new("Contact")
//!             .field(FieldDescriptor::new("phone", "Option<String>").rule("phone_number"))
//!     }
//!
//!     fn field(&self, name: &str) -> FieldValue<'_> {
//!         match name {
//!             "phone" => (&self.phone).into(),
//!             _ => FieldValue::Null,
//!         }
//!     }
//! }
//!
//! let validator = Validator::new();
//!
//! let ok = validator.validate_now(&Contact { phone: Some("+1234567890".into()) }, &NoServices).unwrap();
//! assert!(ok.is_success());
//!
//! let bad = validator.validate_now(&Contact { phone: Some("+0123456789".into()) }, &NoServices).unwrap();
//! assert!(!bad.is_success());
//! ```
//!
//! ## Layers
//!
//! - [`foundation`]: messages, field values, context, errors
//! - [`model`]: type descriptors, type names, model extraction
//! - [`compile`]: dependency resolution, shape classification, plans
//! - [`runtime`]: pooled outcomes and the executor
//! - [`validators`]: built-in rules

#![warn(rust_2018_idioms)]

pub mod compile;
pub mod foundation;
pub mod model;
mod options;
pub mod prelude;
mod provider;
pub mod rule;
pub mod runtime;
mod validator;
pub mod validators;

pub use foundation::{
    CompileError, FieldValue, Message, MessageArg, ResolveError, TypeKey, Validatable,
    ValidateError, ValidateObject, ValidationContext,
};
pub use options::ValidatorOptions;
pub use provider::{Capability, CapabilityProvider, NoServices, ServiceRegistry, ServiceRegistryBuilder};
pub use rule::{Call, Rule, RuleCatalog, RuleOutput};
pub use runtime::{FieldOutcome, Outcome, OutcomePools};
pub use validator::{Validator, ValidatorBuilder};
