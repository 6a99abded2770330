//! Phone number validator for E.164 format.
//!
//! An E.164 number is a leading `+`, a non-zero first digit, and only ASCII
//! digits after it, 8 to 16 characters in total. Absent values pass.

use std::sync::Arc;

use crate::foundation::{CompileError, Message};
use crate::model::{RuleArgs, Signature};
use crate::rule::{Call, Rule, RuleOutput};

// ============================================================================
// PHONE NUMBER VALIDATOR
// ============================================================================

/// Validates phone numbers in E.164 format.
///
/// # Examples
///
/// ```
/// use nebula_validator::validators::PhoneNumber;
///
/// let phone = PhoneNumber::default();
/// assert!(phone.is_valid("+14155551234"));
/// assert!(!phone.is_valid("14155551234")); // missing +
/// assert!(!phone.is_valid("+0123456789")); // leading zero
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhoneNumber {
    min_len: usize,
    max_len: usize,
}

impl Default for PhoneNumber {
    fn default() -> Self {
        Self {
            min_len: 8,
            max_len: 16,
        }
    }
}

impl PhoneNumber {
    /// Whether `input` is a well-formed E.164 number.
    #[must_use]
    pub fn is_valid(&self, input: &str) -> bool {
        if !(self.min_len..=self.max_len).contains(&input.len()) {
            return false;
        }

        let Some(number_part) = input.strip_prefix('+') else {
            return false;
        };

        let mut digits = number_part.bytes();
        matches!(digits.next(), Some(b'1'..=b'9')) && digits.all(|b| b.is_ascii_digit())
    }
}

impl Rule for PhoneNumber {
    fn signature(&self) -> Signature {
        Signature::returning("Option<Message>")
    }

    fn evaluate<'a>(&'a self, call: Call<'a>) -> RuleOutput<'a> {
        match call.value().as_str() {
            Some(input) if !self.is_valid(input) => Message::new(
                "Must be a phone number in international format (e.g. +14155551234).",
                "validation.phone_number",
            )
            .into(),
            _ => RuleOutput::Nothing,
        }
    }
}

pub(super) fn build(_args: &RuleArgs) -> Result<Arc<dyn Rule>, CompileError> {
    Ok(Arc::new(PhoneNumber::default()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("+1234567890", true)]
    #[case("+12345678", true)]
    #[case("+123456789012345", true)]
    #[case("+0123456789", false)]
    #[case("1234567890", false)]
    #[case("+1234567", true)]
    #[case("+123456", false)]
    #[case("+1234567890123456", false)]
    #[case("+1 415 555 1234", false)]
    #[case("+1415555123a", false)]
    #[case("", false)]
    fn test_e164(#[case] input: &str, #[case] expected: bool) {
        assert_eq!(PhoneNumber::default().is_valid(input), expected);
    }
}
