//! Compile-time constants: rule arguments and dependency keys

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::foundation::CompileError;

/// A constant value attached to a rule or used as a dependency key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Constant {
    /// Text
    String(Cow<'static, str>),
    /// Integer
    Integer(i64),
    /// Floating point
    Float(f64),
    /// Boolean
    Boolean(bool),
    /// Character
    Character(char),
    /// Enumeration member
    Enum {
        /// Enumeration type name
        ty: Cow<'static, str>,
        /// Member name
        variant: Cow<'static, str>,
    },
    /// Array of constants
    List(Vec<Constant>),
}

impl Constant {
    /// Enumeration member constant.
    pub fn enum_member(
        ty: impl Into<Cow<'static, str>>,
        variant: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::Enum {
            ty: ty.into(),
            variant: variant.into(),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Boolean(_) => "boolean",
            Self::Character(_) => "character",
            Self::Enum { .. } => "enum",
            Self::List(_) => "list",
        }
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "{s:?}"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Character(c) => write!(f, "{c:?}"),
            Self::Enum { ty, variant } => write!(f, "{ty}::{variant}"),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<&'static str> for Constant {
    fn from(value: &'static str) -> Self {
        Self::String(Cow::Borrowed(value))
    }
}

impl From<String> for Constant {
    fn from(value: String) -> Self {
        Self::String(Cow::Owned(value))
    }
}

impl From<i64> for Constant {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for Constant {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<u32> for Constant {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for Constant {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for Constant {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<char> for Constant {
    fn from(value: char) -> Self {
        Self::Character(value)
    }
}

impl<T: Into<Constant>> From<Vec<T>> for Constant {
    fn from(value: Vec<T>) -> Self {
        Self::List(value.into_iter().map(Into::into).collect())
    }
}

// ============================================================================
// RULE ARGUMENTS
// ============================================================================

/// Named constant arguments of a rule attachment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleArgs {
    entries: SmallVec<[(Cow<'static, str>, Constant); 4]>,
}

impl RuleArgs {
    /// No arguments.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an argument.
    #[must_use = "builder methods must be chained or built"]
    pub fn with(mut self, name: impl Into<Cow<'static, str>>, value: impl Into<Constant>) -> Self {
        self.set(name, value);
        self
    }

    /// Adds or replaces an argument in place.
    pub fn set(&mut self, name: impl Into<Cow<'static, str>>, value: impl Into<Constant>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Raw argument.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Constant> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Number of arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no arguments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates arguments in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Constant)> {
        self.entries.iter().map(|(n, v)| (n.as_ref(), v))
    }

    /// Optional non-negative integer argument.
    ///
    /// # Errors
    ///
    /// [`CompileError::InvalidArgument`] when present but not a non-negative integer.
    pub fn count(&self, rule: &'static str, name: &'static str) -> Result<Option<usize>, CompileError> {
        match self.get(name) {
            None => Ok(None),
            Some(Constant::Integer(n)) => usize::try_from(*n)
                .map(Some)
                .map_err(|_| CompileError::invalid_argument(rule, name, "must not be negative")),
            Some(other) => Err(CompileError::invalid_argument(
                rule,
                name,
                format!("must be an integer, got {}", other.kind()),
            )),
        }
    }

    /// Optional list-of-strings argument. Enum members contribute their variant name.
    ///
    /// # Errors
    ///
    /// [`CompileError::InvalidArgument`] when present but not a list of strings.
    pub fn names(&self, rule: &'static str, name: &'static str) -> Result<Option<Vec<String>>, CompileError> {
        let Some(value) = self.get(name) else {
            return Ok(None);
        };
        let Constant::List(items) = value else {
            return Err(CompileError::invalid_argument(
                rule,
                name,
                format!("must be a list, got {}", value.kind()),
            ));
        };
        items
            .iter()
            .map(|item| match item {
                Constant::String(s) => Ok(s.to_string()),
                Constant::Enum { variant, .. } => Ok(variant.to_string()),
                other => Err(CompileError::invalid_argument(
                    rule,
                    name,
                    format!("must contain strings, got {}", other.kind()),
                )),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }
}
