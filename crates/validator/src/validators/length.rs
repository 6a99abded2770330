//! String length validation
//!
//! By default, length is measured in Unicode scalar values (chars). Pass
//! `mode = "bytes"` to count bytes instead.

use std::sync::Arc;

use crate::foundation::{CompileError, Message};
use crate::model::{Constant, RuleArgs, Signature};
use crate::rule::{Call, Rule, RuleOutput};

// ============================================================================
// LENGTH MODE
// ============================================================================

/// How to count string length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LengthMode {
    /// Count bytes (fastest, ASCII-only correct).
    Bytes,
    /// Count Unicode scalar values (correct for all text).
    #[default]
    Chars,
}

impl LengthMode {
    /// Measures the length of a string according to this mode.
    #[inline]
    fn measure(self, input: &str) -> usize {
        match self {
            LengthMode::Bytes => input.len(),
            LengthMode::Chars => input.chars().count(),
        }
    }
}

// ============================================================================
// LENGTH
// ============================================================================

/// Validates that a string's length lies within bounds.
///
/// Absent values pass; combine with `required` to reject them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Length {
    min: Option<usize>,
    max: Option<usize>,
    mode: LengthMode,
}

impl Length {
    /// Bounds in chars.
    #[must_use]
    pub fn new(min: Option<usize>, max: Option<usize>) -> Self {
        Self {
            min,
            max,
            mode: LengthMode::Chars,
        }
    }

    /// Counts bytes instead of chars.
    #[must_use = "builder methods must be chained or built"]
    pub fn bytes(mut self) -> Self {
        self.mode = LengthMode::Bytes;
        self
    }

    fn check(&self, input: &str) -> Option<Message> {
        let len = self.mode.measure(input);
        if let Some(min) = self.min
            && len < min
        {
            return Some(
                Message::new("Must be at least {0} characters long.", "validation.min_length").with_arg(min),
            );
        }
        if let Some(max) = self.max
            && len > max
        {
            return Some(
                Message::new("Must be at most {0} characters long.", "validation.max_length").with_arg(max),
            );
        }
        None
    }
}

impl Rule for Length {
    fn signature(&self) -> Signature {
        Signature::returning("Option<Message>")
    }

    fn evaluate<'a>(&'a self, call: Call<'a>) -> RuleOutput<'a> {
        call.value().as_str().and_then(|s| self.check(s)).into()
    }
}

pub(super) fn build(args: &RuleArgs) -> Result<Arc<dyn Rule>, CompileError> {
    let min = args.count("length", "min")?;
    let max = args.count("length", "max")?;
    if let (Some(min), Some(max)) = (min, max)
        && min > max
    {
        return Err(CompileError::invalid_argument("length", "min", "must not exceed max"));
    }

    let rule = Length::new(min, max);
    let rule = match args.get("mode") {
        None => rule,
        Some(Constant::String(mode)) if mode == "chars" => rule,
        Some(Constant::String(mode)) if mode == "bytes" => rule.bytes(),
        Some(_) => {
            return Err(CompileError::invalid_argument("length", "mode", "must be \"chars\" or \"bytes\""));
        }
    };
    Ok(Arc::new(rule))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("ab", false)]
    #[case("abc", true)]
    #[case("abcde", true)]
    #[case("abcdef", false)]
    #[case("äöü", true)]
    fn test_bounds_in_chars(#[case] input: &str, #[case] ok: bool) {
        let rule = Length::new(Some(3), Some(5));
        assert_eq!(rule.check(input).is_none(), ok);
    }

    #[test]
    fn test_bytes_mode() {
        let rule = Length::new(None, Some(4)).bytes();
        assert!(rule.check("äöü").is_some());
    }

    #[test]
    fn test_message_carries_bound() {
        let msg = Length::new(Some(3), None).check("a").unwrap();
        assert_eq!(msg.key, "validation.min_length");
        assert_eq!(msg.to_string(), "Must be at least 3 characters long.");
    }

    #[test]
    fn test_build_validates_arguments() {
        assert!(build(&RuleArgs::new().with("min", 5).with("max", 2)).is_err());
        assert!(build(&RuleArgs::new().with("mode", "words")).is_err());
        assert!(build(&RuleArgs::new().with("min", 1).with("mode", "bytes")).is_ok());
    }
}
