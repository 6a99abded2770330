//! Enumeration membership
//!
//! `in_enum` checks that a value names one of the field's declared
//! enumeration members. Strings and enum values match by name; integers
//! match by position.

use std::sync::Arc;

use crate::foundation::{CompileError, FieldValue, Message};
use crate::model::{RuleArgs, Signature};
use crate::rule::{Call, Rule, RuleOutput};

/// Validates enumeration membership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InEnum {
    members: Vec<String>,
}

impl InEnum {
    /// Allows exactly `members`.
    pub fn new<I, S>(members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            members: members.into_iter().map(Into::into).collect(),
        }
    }

    fn contains(&self, value: FieldValue<'_>) -> bool {
        match value {
            FieldValue::Null => true,
            FieldValue::Str(name) | FieldValue::Enum(name) => self.members.iter().any(|m| m == name),
            FieldValue::Int(n) => usize::try_from(n).is_ok_and(|i| i < self.members.len()),
            _ => false,
        }
    }
}

impl Rule for InEnum {
    fn signature(&self) -> Signature {
        Signature::returning("Option<Message>")
    }

    fn evaluate<'a>(&'a self, call: Call<'a>) -> RuleOutput<'a> {
        if self.contains(call.value()) {
            return RuleOutput::Nothing;
        }
        Message::new("Value must be one of: {0}.", "validation.in_enum")
            .with_arg(self.members.join(", "))
            .into()
    }
}

pub(super) fn build(args: &RuleArgs) -> Result<Arc<dyn Rule>, CompileError> {
    let members = args
        .names("in_enum", "variants")?
        .ok_or_else(|| CompileError::invalid_argument("in_enum", "variants", "is required"))?;
    Ok(Arc::new(InEnum::new(members)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(FieldValue::Enum("Open"), true)]
    #[case(FieldValue::Str("Closed"), true)]
    #[case(FieldValue::Str("open"), false)]
    #[case(FieldValue::Int(1), true)]
    #[case(FieldValue::Int(2), false)]
    #[case(FieldValue::Int(-1), false)]
    #[case(FieldValue::Null, true)]
    #[case(FieldValue::Bool(true), false)]
    fn test_membership(#[case] value: FieldValue<'static>, #[case] expected: bool) {
        let rule = InEnum::new(["Open", "Closed"]);
        assert_eq!(rule.contains(value), expected);
    }

    #[test]
    fn test_build_requires_variants() {
        assert!(build(&RuleArgs::new()).is_err());
        assert!(build(&RuleArgs::new().with("variants", vec!["A"])).is_ok());
    }
}
