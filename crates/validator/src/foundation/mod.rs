//! Core types shared by every layer: messages, field values, context, errors.

mod context;
mod error;
mod message;
mod value;

pub use context::ValidationContext;
pub use error::{CompileError, ResolveError, ValidateError};
pub use message::{Message, MessageArg};
pub use value::{FieldValue, TypeKey, Validatable, ValidateObject};
