//! Return-shape classification
//!
//! A rule's declared return type decides two things: whether invoking it can
//! suspend, and how its output folds into a field outcome. Classification
//! looks only at normalized type names, never at values.
//!
//! | Declared return                     | Wrapper              | Shape             |
//! |-------------------------------------|----------------------|-------------------|
//! | `Outcome`                           | sync                 | composite outcome |
//! | `Message`, `Option<Message>`        | sync                 | single message    |
//! | `Vec<Message>`, `impl Iterator<..>` | sync                 | message sequence  |
//! | `BoxFuture<'_, T>`, `Future<T>`     | suspendable single   | shape of `T`      |
//! | `BoxStream<'_, Message>`            | suspendable sequence | single message    |
//! | anything else                       | as above             | none              |

use serde::Serialize;

use crate::model::TypeName;

/// How invoking a rule completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Wrapper {
    /// Returns directly
    Sync,
    /// Suspends once, then yields one value
    SuspendableSingle,
    /// Suspends between items of a stream
    SuspendableSequence,
}

/// What a rule's (unwrapped) value contributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Shape {
    /// Nothing; the value is ignored
    None,
    /// Zero or one message
    SingleMessage,
    /// Any number of messages
    MessageSequence,
    /// A whole outcome to merge
    CompositeOutcome,
}

/// Classified return type of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ReturnShape {
    /// Suspension behavior
    pub wrapper: Wrapper,
    /// Output shape
    pub shape: Shape,
    /// Whether the unwrapped value may be absent
    pub nullable: bool,
}

impl ReturnShape {
    /// Number of invocation groups.
    pub const GROUPS: usize = 5;

    /// Classifies a declared return type.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use nebula_validator::compile::{ReturnShape, Shape, Wrapper};
    /// use nebula_validator::model::TypeName;
    ///
    /// let ty = TypeName::parse("BoxFuture<'a, Vec<Message>>").unwrap();
    /// let shape = ReturnShape::classify(&ty);
    /// assert_eq!(shape.wrapper, Wrapper::SuspendableSingle);
    /// assert_eq!(shape.shape, Shape::MessageSequence);
    /// assert_eq!(shape.group(), 3);
    /// ```
    #[must_use]
    pub fn classify(ty: &TypeName) -> Self {
        let (wrapper, payload) = match ty.name() {
            "Future" | "BoxFuture" | "LocalBoxFuture" | "Task" => (Wrapper::SuspendableSingle, ty.first_arg()),
            "Stream" | "BoxStream" | "LocalBoxStream" => (Wrapper::SuspendableSequence, ty.first_arg()),
            _ => (Wrapper::Sync, Some(ty)),
        };

        let shape = payload.map_or(Shape::None, payload_shape);
        let nullable = payload.is_some_and(TypeName::is_nullable);

        Self {
            wrapper,
            shape,
            nullable,
        }
    }

    /// Invocation group, in execution order:
    ///
    /// 0. sync composite outcomes
    /// 1. sync single messages (and sync rules producing nothing)
    /// 2. sync message sequences
    /// 3. suspendable single values
    /// 4. suspendable sequences
    #[must_use]
    pub fn group(&self) -> usize {
        match (self.wrapper, self.shape) {
            (Wrapper::Sync, Shape::CompositeOutcome) => 0,
            (Wrapper::Sync, Shape::SingleMessage | Shape::None) => 1,
            (Wrapper::Sync, Shape::MessageSequence) => 2,
            (Wrapper::SuspendableSingle, _) => 3,
            (Wrapper::SuspendableSequence, _) => 4,
        }
    }

    /// Whether invoking the rule can suspend.
    #[must_use]
    pub fn is_suspendable(&self) -> bool {
        self.wrapper != Wrapper::Sync
    }
}

fn payload_shape(payload: &TypeName) -> Shape {
    let is_message = |t: &TypeName| t.name() == "Message";
    match payload.name() {
        "Message" => Shape::SingleMessage,
        "Outcome" => Shape::CompositeOutcome,
        "Messages" => Shape::MessageSequence,
        "Vec" | "SmallVec" | "VecDeque" | "Iterator" | "IntoIterator"
            if payload.first_arg().is_some_and(is_message) =>
        {
            Shape::MessageSequence
        }
        _ => Shape::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn classify(text: &str) -> ReturnShape {
        ReturnShape::classify(&TypeName::parse(text).unwrap())
    }

    #[rstest]
    #[case("Outcome", Wrapper::Sync, Shape::CompositeOutcome, 0)]
    #[case("Message", Wrapper::Sync, Shape::SingleMessage, 1)]
    #[case("Option<Message>", Wrapper::Sync, Shape::SingleMessage, 1)]
    #[case("()", Wrapper::Sync, Shape::None, 1)]
    #[case("bool", Wrapper::Sync, Shape::None, 1)]
    #[case("Vec<Message>", Wrapper::Sync, Shape::MessageSequence, 2)]
    #[case("impl Iterator<Item = Message>", Wrapper::Sync, Shape::MessageSequence, 2)]
    #[case("Vec<String>", Wrapper::Sync, Shape::None, 1)]
    #[case("BoxFuture<'a, Option<Message>>", Wrapper::SuspendableSingle, Shape::SingleMessage, 3)]
    #[case("Pin<Box<dyn Future<Output = Outcome> + Send>>", Wrapper::SuspendableSingle, Shape::CompositeOutcome, 3)]
    #[case("BoxFuture<'a, ()>", Wrapper::SuspendableSingle, Shape::None, 3)]
    #[case("BoxStream<'a, Message>", Wrapper::SuspendableSequence, Shape::SingleMessage, 4)]
    #[case("BoxStream<'a, u8>", Wrapper::SuspendableSequence, Shape::None, 4)]
    fn test_classification(
        #[case] text: &str,
        #[case] wrapper: Wrapper,
        #[case] shape: Shape,
        #[case] group: usize,
    ) {
        let classified = classify(text);
        assert_eq!(classified.wrapper, wrapper);
        assert_eq!(classified.shape, shape);
        assert_eq!(classified.group(), group);
    }

    #[test]
    fn test_nullability_follows_payload() {
        assert!(classify("Option<Message>").nullable);
        assert!(classify("BoxFuture<'a, Option<Message>>").nullable);
        assert!(!classify("Message").nullable);
    }

    #[test]
    fn test_bare_future_has_no_shape() {
        let shape = classify("Future");
        assert_eq!(shape.wrapper, Wrapper::SuspendableSingle);
        assert_eq!(shape.shape, Shape::None);
    }
}
