//! Validation messages
//!
//! A [`Message`] is a single finding: display text with positional
//! placeholders (`{0}`, `{1}`, ...), a resource key for localization, and the
//! arguments that fill the placeholders.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

// ============================================================================
// MESSAGE ARGUMENT
// ============================================================================

/// A positional message argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageArg {
    /// Absent value
    Null,
    /// Boolean
    Bool(bool),
    /// Signed integer
    Int(i64),
    /// Floating point
    Float(f64),
    /// Text
    Str(Cow<'static, str>),
}

impl fmt::Display for MessageArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<bool> for MessageArg {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for MessageArg {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for MessageArg {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for MessageArg {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<usize> for MessageArg {
    fn from(value: usize) -> Self {
        i64::try_from(value).map_or(Self::Float(value as f64), Self::Int)
    }
}

impl From<f64> for MessageArg {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&'static str> for MessageArg {
    fn from(value: &'static str) -> Self {
        Self::Str(Cow::Borrowed(value))
    }
}

impl From<String> for MessageArg {
    fn from(value: String) -> Self {
        Self::Str(Cow::Owned(value))
    }
}

impl<T: Into<MessageArg>> From<Option<T>> for MessageArg {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

// ============================================================================
// MESSAGE
// ============================================================================

/// A single validation finding.
///
/// # Examples
///
/// ```rust
/// use nebula_validator::Message;
///
/// let msg = Message::new("Must be at least {0} characters long.", "validation.min_length")
///     .with_arg(8);
///
/// assert_eq!(msg.to_string(), "Must be at least 8 characters long.");
/// assert_eq!(msg.args_json(), "[8]");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Display text with `{n}` placeholders
    pub text: Cow<'static, str>,

    /// Resource key for localization
    pub key: Cow<'static, str>,

    /// Positional arguments
    #[serde(default, skip_serializing_if = "SmallVec::is_empty")]
    pub args: SmallVec<[MessageArg; 2]>,
}

impl Message {
    /// Creates a message without arguments.
    pub fn new(text: impl Into<Cow<'static, str>>, key: impl Into<Cow<'static, str>>) -> Self {
        Self {
            text: text.into(),
            key: key.into(),
            args: SmallVec::new(),
        }
    }

    /// Appends a positional argument.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_arg(mut self, arg: impl Into<MessageArg>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Arguments as a JSON array.
    #[must_use]
    pub fn args_json(&self) -> String {
        serde_json::to_string(self.args.as_slice()).unwrap_or_else(|_| String::from("[]"))
    }

    /// Text with placeholders substituted.
    ///
    /// Placeholders without a matching argument are left as written.
    #[must_use]
    pub fn render(&self) -> String {
        if self.args.is_empty() {
            return self.text.to_string();
        }

        let mut out = String::with_capacity(self.text.len() + 8);
        let mut rest = self.text.as_ref();
        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let tail = &rest[open + 1..];
            let arg = tail.find('}').and_then(|close| {
                let index = tail[..close].parse::<usize>().ok()?;
                Some((close, self.args.get(index)?))
            });
            match arg {
                Some((close, value)) => {
                    out.push_str(&value.to_string());
                    rest = &tail[close + 1..];
                }
                None => {
                    out.push('{');
                    rest = tail;
                }
            }
        }
        out.push_str(rest);
        out
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
