//! Dependency resolution
//!
//! Each declared parameter of a rule is either supplied by the executor
//! itself ([`ArgSource::Context`], [`ArgSource::Outcome`],
//! [`ArgSource::Cancellation`]) or is an external dependency to be fetched
//! from a [`CapabilityProvider`](crate::CapabilityProvider). Dependencies are
//! collected per type by a [`DependencyTracker`], which hands out one slot per
//! distinct `(type, key)` pair; every rule sharing a dependency reads the same
//! slot at runtime.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexSet;
use smallvec::SmallVec;

use crate::foundation::CompileError;
use crate::model::{Constant, KeyExpr, ParsedParam};

/// Parameter types the executor supplies itself.
pub const IMPLICIT_PARAMETERS: &[(&str, ArgSource)] = &[
    ("ValidationContext", ArgSource::Context),
    ("Outcome", ArgSource::Outcome),
    ("CancellationToken", ArgSource::Cancellation),
];

// ============================================================================
// KEYS AND REFERENCES
// ============================================================================

/// Key of a keyed dependency.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DependencyKey {
    /// Text key
    String(Arc<str>),
    /// Integer key
    Integer(i64),
    /// Boolean key
    Boolean(bool),
    /// Character key
    Character(char),
    /// Enumeration member key
    Enum {
        /// Enumeration type
        ty: Arc<str>,
        /// Member name
        variant: Arc<str>,
    },
}

impl DependencyKey {
    /// Converts a constant into a key. Floats and lists are not key kinds.
    #[must_use]
    pub fn from_constant(constant: &Constant) -> Option<Self> {
        Some(match constant {
            Constant::String(s) => Self::String(Arc::from(s.as_ref())),
            Constant::Integer(n) => Self::Integer(*n),
            Constant::Boolean(b) => Self::Boolean(*b),
            Constant::Character(c) => Self::Character(*c),
            Constant::Enum { ty, variant } => Self::Enum {
                ty: Arc::from(ty.as_ref()),
                variant: Arc::from(variant.as_ref()),
            },
            Constant::Float(_) | Constant::List(_) => return None,
        })
    }
}

impl fmt::Display for DependencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "{s:?}"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Character(c) => write!(f, "{c:?}"),
            Self::Enum { ty, variant } => write!(f, "{ty}::{variant}"),
        }
    }
}

impl From<&'static str> for DependencyKey {
    fn from(value: &'static str) -> Self {
        Self::String(Arc::from(value))
    }
}

impl From<i64> for DependencyKey {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for DependencyKey {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<char> for DependencyKey {
    fn from(value: char) -> Self {
        Self::Character(value)
    }
}

/// An external dependency: normalized type name plus optional key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DependencyRef {
    /// Normalized type name
    pub type_name: Arc<str>,
    /// Key for keyed lookup
    pub key: Option<DependencyKey>,
}

impl fmt::Display for DependencyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key {
            Some(key) => write!(f, "{}[{key}]", self.type_name),
            None => f.write_str(&self.type_name),
        }
    }
}

/// Where a declared parameter's value comes from at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgSource {
    /// The validation context
    Context,
    /// The outcome under construction
    Outcome,
    /// The cancellation token
    Cancellation,
    /// A resolved dependency slot
    Dependency(usize),
}

// ============================================================================
// TRACKER
// ============================================================================

/// Collects the distinct dependencies of one type, in first-use order.
#[derive(Debug, Default)]
pub struct DependencyTracker {
    refs: IndexSet<DependencyRef>,
}

impl DependencyTracker {
    /// Empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot for `dependency`, reserving a new one on first sight.
    pub fn reserve(&mut self, dependency: DependencyRef) -> usize {
        self.refs.insert_full(dependency).0
    }

    /// Number of distinct dependencies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.refs.len()
    }

    /// Whether nothing was reserved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }

    /// Dependencies indexed by slot.
    #[must_use]
    pub fn into_dependencies(self) -> Vec<DependencyRef> {
        self.refs.into_iter().collect()
    }
}

/// Resolves every declared parameter of `owner` to its runtime source.
///
/// # Errors
///
/// [`CompileError::NonConstantKey`] when a keyed parameter uses an expression
/// or a constant that is not a key kind.
pub fn resolve_parameters(
    owner: &str,
    params: &[ParsedParam],
    tracker: &mut DependencyTracker,
) -> Result<SmallVec<[ArgSource; 4]>, CompileError> {
    params
        .iter()
        .map(|param| {
            let type_name = param.type_name.name();
            if let Some((_, source)) = IMPLICIT_PARAMETERS.iter().find(|(name, _)| *name == type_name) {
                return Ok(*source);
            }

            let key = match &param.key {
                None => None,
                Some(KeyExpr::Const(constant)) => Some(
                    DependencyKey::from_constant(constant)
                        .ok_or_else(|| non_constant(owner, type_name))?,
                ),
                Some(KeyExpr::Expr(_)) => return Err(non_constant(owner, type_name)),
            };

            let slot = tracker.reserve(DependencyRef {
                type_name: Arc::from(type_name),
                key,
            });
            Ok(ArgSource::Dependency(slot))
        })
        .collect()
}

fn non_constant(owner: &str, parameter: &str) -> CompileError {
    CompileError::NonConstantKey {
        owner: owner.to_string(),
        parameter: parameter.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TypeName;
    use pretty_assertions::assert_eq;

    fn param(ty: &str, key: Option<KeyExpr>) -> ParsedParam {
        ParsedParam {
            type_name: TypeName::parse(ty).unwrap(),
            key,
        }
    }

    #[test]
    fn test_same_dependency_shares_a_slot() {
        let mut tracker = DependencyTracker::new();
        let a = resolve_parameters("r1", &[param("Clock", None)], &mut tracker).unwrap();
        let b = resolve_parameters("r2", &[param("crate::time::Clock", None)], &mut tracker).unwrap();
        assert_eq!(a.as_slice(), &[ArgSource::Dependency(0)]);
        assert_eq!(b.as_slice(), &[ArgSource::Dependency(0)]);
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_keys_distinguish_dependencies() {
        let mut tracker = DependencyTracker::new();
        let args = resolve_parameters(
            "r",
            &[
                param("Clock", Some(KeyExpr::Const("utc".into()))),
                param("Clock", Some(KeyExpr::Const("local".into()))),
                param("Clock", Some(KeyExpr::Const(7.into()))),
                param("Clock", None),
            ],
            &mut tracker,
        )
        .unwrap();
        assert_eq!(
            args.as_slice(),
            &[
                ArgSource::Dependency(0),
                ArgSource::Dependency(1),
                ArgSource::Dependency(2),
                ArgSource::Dependency(3)
            ]
        );
        let deps = tracker.into_dependencies();
        assert_eq!(deps[0].to_string(), "Clock[\"utc\"]");
        assert_eq!(deps[2].key, Some(DependencyKey::Integer(7)));
    }

    #[test]
    fn test_implicit_parameters_are_not_dependencies() {
        let mut tracker = DependencyTracker::new();
        let args = resolve_parameters(
            "r",
            &[
                param("&ValidationContext", None),
                param("&mut Outcome", None),
                param("tokio_util::sync::CancellationToken", None),
            ],
            &mut tracker,
        )
        .unwrap();
        assert_eq!(
            args.as_slice(),
            &[ArgSource::Context, ArgSource::Outcome, ArgSource::Cancellation]
        );
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_expression_key_rejected() {
        let mut tracker = DependencyTracker::new();
        let err = resolve_parameters(
            "validate_email",
            &[param("Clock", Some(KeyExpr::Expr("self.region".into())))],
            &mut tracker,
        )
        .unwrap_err();
        assert_eq!(
            err,
            CompileError::NonConstantKey {
                owner: "validate_email".into(),
                parameter: "Clock".into()
            }
        );
    }

    #[test]
    fn test_float_key_rejected() {
        let mut tracker = DependencyTracker::new();
        let result = resolve_parameters("r", &[param("Clock", Some(KeyExpr::Const(1.5.into())))], &mut tracker);
        assert!(matches!(result, Err(CompileError::NonConstantKey { .. })));
    }
}
