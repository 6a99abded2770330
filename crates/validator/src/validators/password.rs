//! Password strength
//!
//! `password` reports one message per unmet requirement, always in the
//! order: length, uppercase, digit, special. `strong_password` is `password`
//! with one of each character class required.

use std::sync::Arc;

use crate::foundation::{CompileError, Message};
use crate::model::{RuleArgs, Signature};
use crate::rule::{Call, Rule, RuleOutput};

const DEFAULT_MIN_LENGTH: usize = 7;

/// Validates password composition.
///
/// Length counts chars. Digits are numeric chars; special characters are
/// anything that is neither alphabetic nor numeric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Password {
    min_length: usize,
    required_upper: usize,
    required_digit: usize,
    required_special: usize,
}

impl Password {
    /// Requires `min_length` chars and nothing else.
    #[must_use]
    pub fn new(min_length: usize) -> Self {
        Self {
            min_length,
            required_upper: 0,
            required_digit: 0,
            required_special: 0,
        }
    }

    /// One uppercase letter, one digit, and one special character.
    #[must_use]
    pub fn strong(min_length: usize) -> Self {
        Self::new(min_length).upper(1).digits(1).special(1)
    }

    /// Requires `count` uppercase letters.
    #[must_use = "builder methods must be chained or built"]
    pub fn upper(mut self, count: usize) -> Self {
        self.required_upper = count;
        self
    }

    /// Requires `count` digits.
    #[must_use = "builder methods must be chained or built"]
    pub fn digits(mut self, count: usize) -> Self {
        self.required_digit = count;
        self
    }

    /// Requires `count` special characters.
    #[must_use = "builder methods must be chained or built"]
    pub fn special(mut self, count: usize) -> Self {
        self.required_special = count;
        self
    }

    /// All unmet requirements for `input`; an absent password fails on length only.
    #[must_use]
    pub fn check(&self, input: Option<&str>) -> Vec<Message> {
        let mut messages = Vec::new();
        let Some(input) = input else {
            messages.push(self.length_message());
            return messages;
        };

        let (mut len, mut upper, mut digit, mut special) = (0, 0, 0, 0);
        for c in input.chars() {
            len += 1;
            if c.is_uppercase() {
                upper += 1;
            }
            if c.is_ascii_digit() {
                digit += 1;
            } else if !c.is_alphabetic() {
                special += 1;
            }
        }

        if len < self.min_length {
            messages.push(self.length_message());
        }
        if upper < self.required_upper {
            messages.push(
                Message::new(
                    "Must contain at least {0} uppercase letter(s).",
                    "validation.password.uppercase",
                )
                .with_arg(self.required_upper),
            );
        }
        if digit < self.required_digit {
            messages.push(
                Message::new("Must contain at least {0} digit(s).", "validation.password.digit")
                    .with_arg(self.required_digit),
            );
        }
        if special < self.required_special {
            messages.push(
                Message::new(
                    "Must contain at least {0} special character(s).",
                    "validation.password.special",
                )
                .with_arg(self.required_special),
            );
        }
        messages
    }

    fn length_message(&self) -> Message {
        Message::new("Must be at least {0} characters long.", "validation.password.length")
            .with_arg(self.min_length)
    }
}

impl Default for Password {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_LENGTH)
    }
}

impl Rule for Password {
    fn signature(&self) -> Signature {
        Signature::returning("Vec<Message>")
    }

    fn evaluate<'a>(&'a self, call: Call<'a>) -> RuleOutput<'a> {
        RuleOutput::Messages(self.check(call.value().as_str()))
    }
}

pub(super) fn build(args: &RuleArgs) -> Result<Arc<dyn Rule>, CompileError> {
    let rule = Password::new(args.count("password", "min_length")?.unwrap_or(DEFAULT_MIN_LENGTH))
        .upper(args.count("password", "required_upper")?.unwrap_or(0))
        .digits(args.count("password", "required_digit")?.unwrap_or(0))
        .special(args.count("password", "required_special")?.unwrap_or(0));
    Ok(Arc::new(rule))
}

pub(super) fn build_strong(args: &RuleArgs) -> Result<Arc<dyn Rule>, CompileError> {
    let min_length = args
        .count("strong_password", "min_length")?
        .unwrap_or(DEFAULT_MIN_LENGTH);
    Ok(Arc::new(Password::strong(min_length)))
}
