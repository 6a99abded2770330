//! Validatable types and the field values they expose
//!
//! A type opts into validation by implementing [`Validatable`]: it describes
//! its fields and rule attachments once ([`Validatable::describe`]) and hands
//! out field values by name at validation time ([`Validatable::field`]).
//! The executor only ever sees the object-safe [`ValidateObject`] view.

use std::any::{Any, TypeId};
use std::fmt;

use crate::model::TypeDescriptor;

// ============================================================================
// FIELD VALUE
// ============================================================================

/// A borrowed view of one field's value.
#[derive(Clone, Copy)]
pub enum FieldValue<'a> {
    /// Absent value
    Null,
    /// Text
    Str(&'a str),
    /// Integer
    Int(i64),
    /// Floating point
    Float(f64),
    /// Boolean
    Bool(bool),
    /// Character
    Char(char),
    /// Enumeration member, by variant name
    Enum(&'a str),
    /// A nested validatable object
    Object(&'a dyn ValidateObject),
    /// Anything else; rules downcast it themselves
    Other(&'a (dyn Any + Send + Sync)),
}

impl<'a> FieldValue<'a> {
    /// `true` for [`FieldValue::Null`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Text content, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&'a str> {
        match *self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Integer content.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match *self {
            Self::Int(n) => Some(n),
            _ => None,
        }
    }

    /// Nested object.
    #[must_use]
    pub fn as_object(&self) -> Option<&'a dyn ValidateObject> {
        match *self {
            Self::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Downcasts [`FieldValue::Other`] (or a nested object) to a concrete type.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&'a T> {
        match *self {
            Self::Other(any) => any.downcast_ref::<T>(),
            Self::Object(obj) => obj.as_any().downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Wraps a nested validatable value.
    pub fn object<T: Validatable>(value: &'a T) -> Self {
        Self::Object(value)
    }

    /// Wraps an arbitrary value for rules that downcast.
    pub fn other<T: Any + Send + Sync>(value: &'a T) -> Self {
        Self::Other(value)
    }
}

impl fmt::Debug for FieldValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Str(s) => f.debug_tuple("Str").field(s).finish(),
            Self::Int(n) => f.debug_tuple("Int").field(n).finish(),
            Self::Float(x) => f.debug_tuple("Float").field(x).finish(),
            Self::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Self::Char(c) => f.debug_tuple("Char").field(c).finish(),
            Self::Enum(v) => f.debug_tuple("Enum").field(v).finish(),
            Self::Object(obj) => f.debug_tuple("Object").field(&obj.type_key().name()).finish(),
            Self::Other(_) => f.write_str("Other(..)"),
        }
    }
}

impl<'a> From<&'a str> for FieldValue<'a> {
    fn from(value: &'a str) -> Self {
        Self::Str(value)
    }
}

impl<'a> From<&'a String> for FieldValue<'a> {
    fn from(value: &'a String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for FieldValue<'_> {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for FieldValue<'_> {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for FieldValue<'_> {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for FieldValue<'_> {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for FieldValue<'_> {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<char> for FieldValue<'_> {
    fn from(value: char) -> Self {
        Self::Char(value)
    }
}

impl<'a, T> From<Option<T>> for FieldValue<'a>
where
    T: Into<FieldValue<'a>>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl<'a> From<&'a Option<String>> for FieldValue<'a> {
    fn from(value: &'a Option<String>) -> Self {
        value.as_deref().map_or(Self::Null, Self::Str)
    }
}

// ============================================================================
// VALIDATABLE
// ============================================================================

/// A type whose fields can be validated.
///
/// # Examples
///
/// ```rust
/// use nebula_validator::prelude::*;
///
/// struct Contact {
///     phone: Option<String>,
/// }
///
/// impl Validatable for Contact {
///     fn describe() -> TypeDescriptor {
///         TypeDescriptor::new("Contact").field(
///             FieldDescriptor::new("phone", "Option<String>").rule("phone_number"),
///         )
///     }
///
///     fn field(&self, name: &str) -> FieldValue<'_> {
///         match name {
///             "phone" => (&self.phone).into(),
///             _ => FieldValue::Null,
///         }
///     }
/// }
/// ```
pub trait Validatable: Sized + Send + Sync + 'static {
    /// Static description of fields, rule attachments, and routines.
    fn describe() -> TypeDescriptor;

    /// Value of the named field. Unknown names yield [`FieldValue::Null`].
    fn field(&self, name: &str) -> FieldValue<'_>;
}

/// Object-safe view of a [`Validatable`] value.
pub trait ValidateObject: Send + Sync {
    /// Identity of the concrete type.
    fn type_key(&self) -> TypeKey;

    /// Value of the named field.
    fn field_value(&self, name: &str) -> FieldValue<'_>;

    /// The value as [`Any`], for routines that need the concrete type.
    fn as_any(&self) -> &(dyn Any + Send + Sync);
}

impl<T: Validatable> ValidateObject for T {
    fn type_key(&self) -> TypeKey {
        TypeKey::of::<T>()
    }

    fn field_value(&self, name: &str) -> FieldValue<'_> {
        Validatable::field(self, name)
    }

    fn as_any(&self) -> &(dyn Any + Send + Sync) {
        self
    }
}

// ============================================================================
// TYPE KEY
// ============================================================================

/// Runtime identity of a [`Validatable`] type, plus its description hook.
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
    describe: fn() -> TypeDescriptor,
}

impl TypeKey {
    /// Key for `T`.
    #[must_use]
    pub fn of<T: Validatable>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
            describe: T::describe,
        }
    }

    /// [`TypeId`] of the described type.
    #[must_use]
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Full Rust type name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Produces the type's descriptor.
    #[must_use]
    pub fn describe(&self) -> TypeDescriptor {
        (self.describe)()
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl std::hash::Hash for TypeKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeKey").field(&self.name).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Point {
        x: i64,
        label: Option<String>,
    }

    impl Validatable for Point {
        fn describe() -> TypeDescriptor {
            TypeDescriptor::new("Point")
        }

        fn field(&self, name: &str) -> FieldValue<'_> {
            match name {
                "x" => self.x.into(),
                "label" => (&self.label).into(),
                _ => FieldValue::Null,
            }
        }
    }

    #[test]
    fn test_field_access_through_object_view() {
        let p = Point { x: 4, label: None };
        let obj: &dyn ValidateObject = &p;
        assert_eq!(obj.field_value("x").as_int(), Some(4));
        assert!(obj.field_value("label").is_null());
        assert!(obj.field_value("nope").is_null());
        assert_eq!(obj.type_key(), TypeKey::of::<Point>());
    }

    #[test]
    fn test_downcast_nested_object() {
        let p = Point { x: 1, label: Some("a".into()) };
        let value = FieldValue::object(&p);
        assert_eq!(value.downcast_ref::<Point>().map(|p| p.x), Some(1));
        assert!(value.downcast_ref::<String>().is_none());
    }

    #[test]
    fn test_option_conversion() {
        assert!(FieldValue::from(None::<i64>).is_null());
        assert_eq!(FieldValue::from(Some("x")).as_str(), Some("x"));
    }
}
