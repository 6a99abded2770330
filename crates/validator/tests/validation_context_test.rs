use std::sync::Arc;
use std::sync::Mutex;

use nebula_validator::prelude::*;
use pretty_assertions::assert_eq;

#[test]
fn test_context_with_get() {
    let ctx = ValidationContext::new().with("limit", 42usize);

    assert_eq!(ctx.get::<usize>("limit"), Some(&42));
    assert_eq!(ctx.get::<String>("limit"), None); // Wrong type
    assert_eq!(ctx.get::<usize>("missing"), None);
    assert!(ctx.contains("limit"));
    assert!(!ctx.contains("missing"));
}

#[test]
fn test_fresh_context_has_no_position() {
    let ctx = ValidationContext::new();
    assert_eq!(ctx.type_name(), None);
    assert_eq!(ctx.field(), None);
    assert_eq!(ctx.field_path(), "");
    assert_eq!(ctx.depth(), 0);
}

// ----------------------------------------------------------------------------
// Context as seen by rules
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
struct Seen {
    type_name: String,
    field: String,
    path: String,
    depth: usize,
    limit: Option<usize>,
}

struct Team {
    name: String,
    lead: Member,
}

struct Member {
    name: String,
}

impl Validatable for Team {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::new("Team")
            .field(FieldDescriptor::new("name", "String").rule("record"))
            .field(FieldDescriptor::nested::<Member>("lead"))
    }

    fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "name" => (&self.name).into(),
            "lead" => FieldValue::object(&self.lead),
            _ => FieldValue::Null,
        }
    }
}

impl Validatable for Member {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::new("Member").field(FieldDescriptor::new("name", "String").rule("record"))
    }

    fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "name" => (&self.name).into(),
            _ => FieldValue::Null,
        }
    }
}

fn recording_validator(seen: &Arc<Mutex<Vec<Seen>>>) -> Validator {
    let seen = Arc::clone(seen);
    Validator::builder()
        .rule("record", move |_| {
            let seen = Arc::clone(&seen);
            Ok(rule_fn(
                Signature::returning("Option<Message>").param(ParamDescriptor::of("ValidationContext")),
                move |call| {
                    let ctx = call.context();
                    seen.lock().unwrap().push(Seen {
                        type_name: ctx.type_name().unwrap_or_default().to_string(),
                        field: ctx.field().unwrap_or_default().to_string(),
                        path: ctx.field_path(),
                        depth: ctx.depth(),
                        limit: ctx.get::<usize>("limit").copied(),
                    });
                    RuleOutput::Nothing
                },
            ))
        })
        .build()
}

#[tokio::test]
async fn test_rules_see_type_path_and_caller_values() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let validator = recording_validator(&seen);
    let team = Team {
        name: "core".into(),
        lead: Member { name: "ada".into() },
    };

    let outcome = validator
        .validate_in(
            &team,
            &NoServices,
            &CancellationToken::new(),
            ValidationContext::new().with("limit", 3usize),
        )
        .await
        .unwrap();
    assert!(outcome.is_success());

    let seen = seen.lock().unwrap().clone();
    assert_eq!(
        seen,
        vec![
            Seen {
                type_name: "Team".into(),
                field: "name".into(),
                path: "name".into(),
                depth: 0,
                limit: Some(3),
            },
            Seen {
                type_name: "Member".into(),
                field: "name".into(),
                path: "lead.name".into(),
                depth: 1,
                limit: Some(3),
            },
        ]
    );
}

#[test]
fn test_outcome_exposed_to_rules_is_the_object_outcome() {
    struct Pair {
        first: String,
        second: String,
    }

    impl Validatable for Pair {
        fn describe() -> TypeDescriptor {
            TypeDescriptor::new("Pair")
                .field(FieldDescriptor::new("first", "String").rule(RuleAttachment::new("length").arg("max", 2)))
                .field(FieldDescriptor::new("second", "String").rule("after_first"))
        }

        fn field(&self, name: &str) -> FieldValue<'_> {
            match name {
                "first" => (&self.first).into(),
                "second" => (&self.second).into(),
                _ => FieldValue::Null,
            }
        }
    }

    let validator = Validator::builder()
        .rule("after_first", |_| {
            Ok(rule_fn(
                Signature::returning("Option<Message>").param(ParamDescriptor::of("Outcome")),
                |call| {
                    let first_failed = call.outcome().field("first").is_some_and(|f| !f.is_success());
                    first_failed
                        .then(|| Message::new("Fix the first field first.", "pair.order"))
                        .into()
                },
            ))
        })
        .build();

    let outcome = validator
        .validate_now(
            &Pair {
                first: "long".into(),
                second: "x".into(),
            },
            &NoServices,
        )
        .unwrap();
    let second = outcome.field("second").unwrap();
    assert_eq!(second.messages()[0].key, "pair.order");
}
