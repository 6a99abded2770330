//! Error types for plan compilation, dependency resolution, and validation
//!
//! Rule *failures* are never errors: they are [`Message`](crate::Message)s
//! recorded in an [`Outcome`](crate::Outcome). The types here cover the
//! exceptional paths only:
//!
//! - [`CompileError`] for malformed type descriptions, raised once per type
//! - [`ResolveError`] for dependencies a provider cannot supply
//! - [`ValidateError`] for everything that aborts a validation call

use std::borrow::Cow;

// ============================================================================
// COMPILE ERROR
// ============================================================================

/// A type description could not be turned into an invocation plan.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    /// Two fields of the same type share a name.
    #[error("type `{type_name}` declares field `{field}` more than once")]
    DuplicateField {
        /// Declaring type
        type_name: String,
        /// Repeated field name
        field: String,
    },

    /// A rule attachment names a rule missing from the catalog.
    #[error("field `{field}` references unknown rule `{rule}`")]
    UnknownRule {
        /// Field carrying the attachment
        field: String,
        /// Rule identifier
        rule: String,
    },

    /// A rule argument is missing, mistyped, or out of range.
    #[error("rule `{rule}`: argument `{argument}` {reason}")]
    InvalidArgument {
        /// Rule identifier
        rule: Cow<'static, str>,
        /// Argument name
        argument: Cow<'static, str>,
        /// What is wrong with it
        reason: Cow<'static, str>,
    },

    /// A keyed parameter's key is not a compile-time constant of a key kind.
    #[error("parameter `{parameter}` of `{owner}` must use a constant key")]
    NonConstantKey {
        /// Rule or routine declaring the parameter
        owner: String,
        /// Parameter type name
        parameter: String,
    },

    /// A textual type could not be parsed.
    #[error("malformed type `{name}`: {reason}")]
    MalformedType {
        /// The offending text
        name: String,
        /// Parser diagnostic
        reason: String,
    },

    /// A nested field's type was never registered for validation.
    #[error("nested field `{field}` has no validatable type")]
    NestedTypeMissing {
        /// Field name
        field: String,
    },
}

impl CompileError {
    /// Shorthand for [`CompileError::InvalidArgument`].
    pub fn invalid_argument(
        rule: impl Into<Cow<'static, str>>,
        argument: impl Into<Cow<'static, str>>,
        reason: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::InvalidArgument {
            rule: rule.into(),
            argument: argument.into(),
            reason: reason.into(),
        }
    }
}

// ============================================================================
// RESOLVE ERROR
// ============================================================================

/// A capability provider could not supply a dependency.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// Nothing is registered under the type (and key, when keyed).
    #[error("no service registered for `{type_name}`{}", key.as_deref().map(|k| format!(" with key {k}")).unwrap_or_default())]
    ServiceNotFound {
        /// Normalized type name
        type_name: String,
        /// Rendered key, for keyed lookups
        key: Option<String>,
    },

    /// The provider does not support keyed lookups.
    #[error("provider does not support keyed lookup of `{type_name}`")]
    Unsupported {
        /// Normalized type name
        type_name: String,
    },
}

// ============================================================================
// VALIDATE ERROR
// ============================================================================

/// A validation call was aborted before producing an outcome.
///
/// Any partially built outcome is released back to its pools before the
/// error is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidateError {
    /// A declared dependency could not be resolved.
    #[error("configuration error: {0}")]
    Configuration(#[from] ResolveError),

    /// The type (or a nested type) failed to compile.
    #[error("compile error: {0}")]
    Compile(#[from] CompileError),

    /// The cancellation token fired.
    #[error("validation cancelled")]
    Cancelled,

    /// A synchronous entry point was used on a plan that can suspend.
    #[error("validation of `{type_name}` requires an async context")]
    RequiresSuspension {
        /// Root type name
        type_name: String,
    },
}

impl ValidateError {
    /// `true` for dependency resolution failures.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// `true` when the call was cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
