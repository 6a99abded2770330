//! Textual type names
//!
//! Signatures and field types are described as text (`"Option<Message>"`,
//! `"BoxFuture<'a, Vec<Message>>"`) and parsed into a small [`TypeName`] tree.
//!
//! Parsing normalizes the text the way classification needs it:
//! - paths keep their last segment (`crate::msg::Message` is `Message`)
//! - `&`, `&mut`, `dyn`, and `impl` prefixes are dropped
//! - lifetime arguments are skipped
//! - `Box`, `Pin`, `Arc`, and `Rc` are transparent
//! - `Option<T>` and a trailing `?` both mark `T` nullable
//! - associated bindings keep their value (`Future<Output = T>` has arg `T`)

use std::fmt;
use std::str::FromStr;

use crate::foundation::CompileError;

const TRANSPARENT: &[&str] = &["Box", "Pin", "Arc", "Rc"];

/// A parsed, normalized type name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeName {
    name: String,
    args: Vec<TypeName>,
    nullable: bool,
}

impl TypeName {
    /// Simple name without arguments.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self {
            name: normalize_ident(name.as_ref()).to_string(),
            args: Vec::new(),
            nullable: false,
        }
    }

    /// The unit type `()`.
    #[must_use]
    pub fn unit() -> Self {
        Self::new("()")
    }

    /// Parses a textual type.
    ///
    /// # Errors
    ///
    /// [`CompileError::MalformedType`] on unbalanced brackets, empty names, or
    /// trailing input.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use nebula_validator::model::TypeName;
    ///
    /// let ty = TypeName::parse("Pin<Box<dyn Future<Output = Option<Message>> + Send>>").unwrap();
    /// assert_eq!(ty.name(), "Future");
    /// let inner = ty.first_arg().unwrap();
    /// assert_eq!(inner.name(), "Message");
    /// assert!(inner.is_nullable());
    /// ```
    pub fn parse(text: &str) -> Result<Self, CompileError> {
        let mut parser = Parser { src: text, pos: 0 };
        let ty = parser.parse_type().map_err(|reason| CompileError::MalformedType {
            name: text.to_string(),
            reason,
        })?;
        parser.skip_ws();
        if parser.pos != text.len() {
            return Err(CompileError::MalformedType {
                name: text.to_string(),
                reason: format!("unexpected input at offset {}", parser.pos),
            });
        }
        Ok(ty)
    }

    /// Adds a generic argument.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_arg(mut self, arg: TypeName) -> Self {
        self.args.push(arg);
        self
    }

    /// Marks the type nullable.
    #[must_use = "builder methods must be chained or built"]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Normalized base name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Generic arguments (lifetimes excluded).
    #[must_use]
    pub fn args(&self) -> &[TypeName] {
        &self.args
    }

    /// First generic argument.
    #[must_use]
    pub fn first_arg(&self) -> Option<&TypeName> {
        self.args.first()
    }

    /// Whether the value may be absent.
    #[must_use]
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Whether this is `()`.
    #[must_use]
    pub fn is_unit(&self) -> bool {
        self.name == "()"
    }

    fn compose(name: &str, mut args: Vec<TypeName>, nullable: bool) -> Self {
        if args.len() == 1 && (name == "Option" || TRANSPARENT.contains(&name)) {
            let mut inner = args.remove(0);
            inner.nullable |= nullable || name == "Option";
            return inner;
        }
        Self {
            name: name.to_string(),
            args,
            nullable,
        }
    }
}

impl FromStr for TypeName {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.args.is_empty() {
            f.write_str("<")?;
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{arg}")?;
            }
            f.write_str(">")?;
        }
        if self.nullable {
            f.write_str("?")?;
        }
        Ok(())
    }
}

/// Strips reference/trait-object prefixes and path qualifiers.
pub(crate) fn normalize_ident(raw: &str) -> &str {
    let mut s = raw.trim();
    loop {
        let stripped = s
            .strip_prefix('&')
            .or_else(|| s.strip_prefix("mut "))
            .or_else(|| s.strip_prefix("dyn "))
            .or_else(|| s.strip_prefix("impl "));
        match stripped {
            Some(rest) => s = rest.trim_start(),
            None => break,
        }
    }
    let base = s.split('<').next().unwrap_or(s);
    base.rsplit("::").next().unwrap_or(base).trim()
}

// ============================================================================
// PARSER
// ============================================================================

struct Parser<'s> {
    src: &'s str,
    pos: usize,
}

impl Parser<'_> {
    fn rest(&self) -> &str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn skip_ws(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.src.len() - trimmed.len();
    }

    fn eat(&mut self, prefix: &str) -> bool {
        if self.rest().starts_with(prefix) {
            self.pos += prefix.len();
            true
        } else {
            false
        }
    }

    fn take_ident(&mut self) -> &str {
        let start = self.pos;
        let len = self
            .rest()
            .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == ':'))
            .unwrap_or(self.rest().len());
        self.pos += len;
        &self.src[start..self.pos]
    }

    fn skip_bounds(&mut self) {
        // `dyn Future<Output = T> + Send + 'a`
        loop {
            self.skip_ws();
            if !self.eat("+") {
                break;
            }
            self.skip_ws();
            self.eat("'");
            self.take_ident();
        }
    }

    fn parse_type(&mut self) -> Result<TypeName, String> {
        loop {
            self.skip_ws();
            if !(self.eat("&") || self.eat("mut ") || self.eat("dyn ") || self.eat("impl ")) {
                break;
            }
            // `&'a T`
            if self.eat("'") {
                self.take_ident();
            }
        }

        if self.eat("()") {
            self.skip_ws();
            let nullable = self.eat("?");
            return Ok(TypeName::compose("()", Vec::new(), nullable));
        }

        let start = self.pos;
        let ident = normalize_ident(self.take_ident()).to_string();
        if ident.is_empty() {
            return Err(format!("expected a type name at offset {start}"));
        }

        self.skip_ws();
        if self.peek() == Some('=') {
            self.pos += 1;
            return self.parse_type();
        }

        let mut args = Vec::new();
        if self.eat("<") {
            loop {
                self.skip_ws();
                if self.eat(">") {
                    break;
                }
                if self.eat("'") {
                    self.take_ident();
                } else {
                    args.push(self.parse_type()?);
                }
                self.skip_bounds();
                if self.eat(",") {
                    continue;
                }
                if self.eat(">") {
                    break;
                }
                return Err(format!("expected `,` or `>` at offset {}", self.pos));
            }
        }

        self.skip_bounds();
        let nullable = self.eat("?");
        Ok(TypeName::compose(&ident, args, nullable))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("Message", "Message")]
    #[case("crate::foundation::Message", "Message")]
    #[case("&'a str", "str")]
    #[case("&mut Vec<Message>", "Vec<Message>")]
    #[case("Option<Message>", "Message?")]
    #[case("Message?", "Message?")]
    #[case("BoxFuture<'a, Vec<Message>>", "BoxFuture<Vec<Message>>")]
    #[case("Pin<Box<dyn Future<Output = Outcome> + Send + 'a>>", "Future<Outcome>")]
    #[case("impl Iterator<Item = Message>", "Iterator<Message>")]
    #[case("()", "()")]
    #[case("HashMap<String, Vec<u8>>", "HashMap<String, Vec<u8>>")]
    fn test_parse_normalizes(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(TypeName::parse(input).unwrap().to_string(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("Vec<")]
    #[case("Vec<Message")]
    #[case("Vec<Message>>")]
    #[case("<Message>")]
    #[case("::")]
    #[case("a::")]
    #[case("Vec<std::>")]
    fn test_parse_rejects_malformed(#[case] input: &str) {
        assert!(matches!(
            TypeName::parse(input),
            Err(CompileError::MalformedType { .. })
        ));
    }

    #[test]
    fn test_option_of_option_stays_nullable() {
        let ty = TypeName::parse("Option<Option<String>>").unwrap();
        assert_eq!(ty.name(), "String");
        assert!(ty.is_nullable());
    }

    #[test]
    fn test_normalize_ident() {
        assert_eq!(normalize_ident("  &dyn my::Clock "), "Clock");
        assert_eq!(normalize_ident("Clock"), "Clock");
    }
}
