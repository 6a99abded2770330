//! Presence validation
//!
//! `required` fails when a field's value is absent. It is attached
//! automatically to non-nullable fields when auto rules are enabled.

use std::sync::Arc;

use crate::foundation::{CompileError, Message};
use crate::model::{RuleArgs, Signature};
use crate::rule::{Call, Rule, RuleOutput};

/// Validates that a value is present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Required;

impl Rule for Required {
    fn signature(&self) -> Signature {
        Signature::returning("Option<Message>")
    }

    fn evaluate<'a>(&'a self, call: Call<'a>) -> RuleOutput<'a> {
        call.value()
            .is_null()
            .then(|| Message::new("Value is required.", "validation.required"))
            .into()
    }
}

pub(super) fn build(_args: &RuleArgs) -> Result<Arc<dyn Rule>, CompileError> {
    Ok(Arc::new(Required))
}
