//! Static type model
//!
//! - [`TypeDescriptor`] and friends: what a type declares about itself
//! - [`TypeName`]: parsed, normalized textual types
//! - [`extract`]: descriptor to [`TypeModel`], ready for plan compilation

mod constant;
mod descriptor;
mod extract;
mod type_name;

pub use constant::{Constant, RuleArgs};
pub use descriptor::{
    FieldDescriptor, KeyExpr, ParamDescriptor, RoutineDescriptor, RuleAttachment, Signature,
    TypeDescriptor, TypeSettings,
};
pub use extract::{
    AFTER_VALIDATE, BEFORE_VALIDATE, FieldSpec, ParsedParam, ParsedSignature, ROUTINE_PREFIX,
    RuleRef, TypeModel, extract,
};
pub use type_name::TypeName;
