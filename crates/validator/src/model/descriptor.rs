//! Type descriptors
//!
//! Descriptors are the static shape of a [`Validatable`](crate::Validatable)
//! type, written once in its `describe()` and read by the extractor. Types
//! appear as text; they are parsed during extraction so malformed names are
//! reported as [`CompileError`](crate::CompileError)s rather than panics.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{Constant, RuleArgs};
use crate::foundation::{TypeKey, Validatable};
use crate::rule::Rule;

// ============================================================================
// PARAMETERS AND SIGNATURES
// ============================================================================

/// Key of a keyed dependency parameter, as written.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyExpr {
    /// A compile-time constant
    Const(Constant),
    /// A runtime expression; always rejected by plan compilation
    Expr(Cow<'static, str>),
}

/// One declared parameter of a rule or routine.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamDescriptor {
    /// Declared type, as text
    pub type_name: Cow<'static, str>,
    /// Key for keyed lookup
    pub key: Option<KeyExpr>,
}

impl ParamDescriptor {
    /// Unkeyed parameter.
    pub fn of(type_name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            type_name: type_name.into(),
            key: None,
        }
    }

    /// Parameter resolved by type and constant key.
    pub fn keyed(type_name: impl Into<Cow<'static, str>>, key: impl Into<Constant>) -> Self {
        Self {
            type_name: type_name.into(),
            key: Some(KeyExpr::Const(key.into())),
        }
    }

    /// Parameter whose key is a runtime expression.
    pub fn keyed_expr(
        type_name: impl Into<Cow<'static, str>>,
        expr: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            key: Some(KeyExpr::Expr(expr.into())),
        }
    }
}

/// Declared parameters and return type of a rule or routine.
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    /// Parameters in declaration order, excluding the validated value
    pub params: Vec<ParamDescriptor>,
    /// Declared return type, as text
    pub returns: Cow<'static, str>,
}

impl Signature {
    /// Signature with no parameters.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use nebula_validator::model::{ParamDescriptor, Signature};
    ///
    /// let sig = Signature::returning("BoxFuture<'a, Option<Message>>")
    ///     .param(ParamDescriptor::of("Clock"))
    ///     .param(ParamDescriptor::of("CancellationToken"));
    /// assert_eq!(sig.params.len(), 2);
    /// ```
    pub fn returning(returns: impl Into<Cow<'static, str>>) -> Self {
        Self {
            params: Vec::new(),
            returns: returns.into(),
        }
    }

    /// Appends a parameter.
    #[must_use = "builder methods must be chained or built"]
    pub fn param(mut self, param: ParamDescriptor) -> Self {
        self.params.push(param);
        self
    }
}

// ============================================================================
// FIELDS AND ROUTINES
// ============================================================================

/// A catalog rule attached to a field, with its constant arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleAttachment {
    /// Catalog identifier
    pub rule: Cow<'static, str>,
    /// Constant arguments
    pub args: RuleArgs,
}

impl RuleAttachment {
    /// Attachment without arguments.
    pub fn new(rule: impl Into<Cow<'static, str>>) -> Self {
        Self {
            rule: rule.into(),
            args: RuleArgs::new(),
        }
    }

    /// Adds an argument.
    #[must_use = "builder methods must be chained or built"]
    pub fn arg(mut self, name: impl Into<Cow<'static, str>>, value: impl Into<Constant>) -> Self {
        self.args.set(name, value);
        self
    }
}

impl From<&'static str> for RuleAttachment {
    fn from(rule: &'static str) -> Self {
        Self::new(rule)
    }
}

/// A named routine declared on the type itself.
///
/// Routines named `validate_<field>` validate that field when the field is
/// marked [`custom`](FieldDescriptor::custom); `before_validate` and
/// `after_validate` run around the field loop.
#[derive(Clone)]
pub struct RoutineDescriptor {
    /// Routine name
    pub name: Cow<'static, str>,
    /// Implementation; its [`signature`](Rule::signature) is the declared one
    pub routine: Arc<dyn Rule>,
}

impl RoutineDescriptor {
    /// Declares a routine.
    pub fn new(name: impl Into<Cow<'static, str>>, routine: Arc<dyn Rule>) -> Self {
        Self {
            name: name.into(),
            routine,
        }
    }
}

impl fmt::Debug for RoutineDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoutineDescriptor")
            .field("name", &self.name)
            .field("signature", &self.routine.signature())
            .finish()
    }
}

/// One field of a validatable type.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// Field name
    pub name: Cow<'static, str>,
    /// Declared type, as text
    pub declared_type: Cow<'static, str>,
    /// Marked nullable beyond what the declared type says
    pub nullable: bool,
    /// Rule attachments in declaration order
    pub attachments: Vec<RuleAttachment>,
    /// Validated by a `validate_<name>` routine
    pub custom: bool,
    /// Nested validatable type
    pub nested: Option<TypeKey>,
    /// Allowed enumeration members
    pub enumeration: Option<Vec<Cow<'static, str>>>,
}

impl FieldDescriptor {
    /// Field with a declared type and no attachments.
    pub fn new(name: impl Into<Cow<'static, str>>, declared_type: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
            nullable: false,
            attachments: Vec::new(),
            custom: false,
            nested: None,
            enumeration: None,
        }
    }

    /// Field holding a nested validatable object.
    pub fn nested<T: Validatable>(name: impl Into<Cow<'static, str>>) -> Self {
        let key = TypeKey::of::<T>();
        let mut field = Self::new(name, super::type_name::normalize_ident(key.name()).to_string());
        field.nested = Some(key);
        field
    }

    /// Marks the field nullable.
    #[must_use = "builder methods must be chained or built"]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Attaches a catalog rule.
    #[must_use = "builder methods must be chained or built"]
    pub fn rule(mut self, attachment: impl Into<RuleAttachment>) -> Self {
        self.attachments.push(attachment.into());
        self
    }

    /// Validates this field with the type's `validate_<name>` routine.
    #[must_use = "builder methods must be chained or built"]
    pub fn custom(mut self) -> Self {
        self.custom = true;
        self
    }

    /// Restricts the field to enumeration members.
    #[must_use = "builder methods must be chained or built"]
    pub fn enumeration<I, S>(mut self, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Cow<'static, str>>,
    {
        self.enumeration = Some(members.into_iter().map(Into::into).collect());
        self
    }
}

// ============================================================================
// TYPES
// ============================================================================

/// Per-type overrides of the global [`ValidatorOptions`](crate::ValidatorOptions).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSettings {
    /// Attach `required`/`in_enum` automatically
    pub auto_rules: Option<bool>,
    /// Stop at the first failing field
    pub fail_fast: Option<bool>,
}

/// Static description of a validatable type.
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    /// Type name used in messages and logs
    pub name: Cow<'static, str>,
    /// Fields in declaration order
    pub fields: Vec<FieldDescriptor>,
    /// Routines declared on the type
    pub routines: Vec<RoutineDescriptor>,
    /// Overrides of global options
    pub settings: TypeSettings,
}

impl TypeDescriptor {
    /// Empty descriptor.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            routines: Vec::new(),
            settings: TypeSettings::default(),
        }
    }

    /// Adds a field.
    #[must_use = "builder methods must be chained or built"]
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Adds a routine.
    #[must_use = "builder methods must be chained or built"]
    pub fn routine(mut self, name: impl Into<Cow<'static, str>>, routine: Arc<dyn Rule>) -> Self {
        self.routines.push(RoutineDescriptor::new(name, routine));
        self
    }

    /// Overrides fail-fast for this type.
    #[must_use = "builder methods must be chained or built"]
    pub fn fail_fast(mut self, enabled: bool) -> Self {
        self.settings.fail_fast = Some(enabled);
        self
    }

    /// Overrides automatic rule discovery for this type.
    #[must_use = "builder methods must be chained or built"]
    pub fn auto_rules(mut self, enabled: bool) -> Self {
        self.settings.auto_rules = Some(enabled);
        self
    }
}
