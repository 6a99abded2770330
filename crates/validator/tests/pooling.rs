//! Outcome pooling tests.
//!
//! Outcomes rent their shells and arrays from pluggable pools. Dropping an
//! outcome, or aborting a validation, hands every buffer back.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use nebula_memory::pool::{ArrayPool, BucketArrayPool, SharedPool};
use nebula_validator::prelude::*;
use nebula_validator::runtime::OutcomeShell;
use pretty_assertions::assert_eq;

// ---------------------------------------------------------------------------
// Tracking pool
// ---------------------------------------------------------------------------

/// Array pool that records the allocation address of every rent and return.
#[derive(Default)]
struct TrackingPool {
    inner: BucketArrayPool<Message>,
    rented: Mutex<Vec<usize>>,
    returned: Mutex<Vec<usize>>,
}

impl TrackingPool {
    fn rented(&self) -> Vec<usize> {
        self.rented.lock().unwrap().clone()
    }

    fn returned(&self) -> Vec<usize> {
        self.returned.lock().unwrap().clone()
    }

    fn reset(&self) {
        self.rented.lock().unwrap().clear();
        self.returned.lock().unwrap().clear();
    }
}

impl ArrayPool<Message> for TrackingPool {
    fn rent(&self, min_len: usize) -> Vec<Message> {
        let array = self.inner.rent(min_len);
        self.rented.lock().unwrap().push(array.as_ptr() as usize);
        array
    }

    fn give_back(&self, array: Vec<Message>) {
        self.returned.lock().unwrap().push(array.as_ptr() as usize);
        self.inner.give_back(array);
    }
}

fn as_set(addresses: Vec<usize>) -> BTreeSet<usize> {
    addresses.into_iter().collect()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

struct Profile {
    bio: String,
}

impl Validatable for Profile {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::new("Profile")
            .field(FieldDescriptor::new("bio", "String").rule(RuleAttachment::new("length").arg("max", 4)))
    }

    fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "bio" => (&self.bio).into(),
            _ => FieldValue::Null,
        }
    }
}

struct Noisy;

impl Validatable for Noisy {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::new("Noisy").field(FieldDescriptor::new("value", "String").rule("flood"))
    }

    fn field(&self, _: &str) -> FieldValue<'_> {
        "noise".into()
    }
}

fn tracked_validator(messages: &Arc<TrackingPool>) -> Validator {
    let options = ValidatorOptions::default();
    let pools = OutcomePools::builder(&options)
        .messages(Arc::clone(messages) as Arc<dyn ArrayPool<Message>>)
        .build();
    Validator::builder().options(options).pools(pools).build()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn test_dropping_outcome_returns_every_buffer() {
    let messages = Arc::new(TrackingPool::default());
    let validator = tracked_validator(&messages);

    let outcome = validator
        .validate_now(&Profile { bio: "too long".into() }, &NoServices)
        .unwrap();
    assert!(!outcome.is_success());
    assert!(messages.returned().is_empty());

    drop(outcome);
    assert_eq!(messages.rented().len(), 2);
    assert_eq!(as_set(messages.rented()), as_set(messages.returned()));
}

#[test]
fn test_next_validation_reuses_returned_buffers() {
    let messages = Arc::new(TrackingPool::default());
    let validator = tracked_validator(&messages);

    validator
        .validate_now(&Profile { bio: "ok".into() }, &NoServices)
        .unwrap()
        .dispose();
    let first_returned = as_set(messages.returned());
    messages.reset();

    let outcome = validator
        .validate_now(&Profile { bio: "fine".into() }, &NoServices)
        .unwrap();
    assert_eq!(as_set(messages.rented()), first_returned);
    assert!(outcome.is_success());
}

#[test]
fn test_shells_are_recycled() {
    let shells = Arc::new(SharedPool::new(8, Box::<OutcomeShell>::default));
    let options = ValidatorOptions::default();
    let validator = Validator::builder()
        .pools(OutcomePools::builder(&options).shells(shells.clone()).build())
        .options(options)
        .build();

    for bio in ["a", "b", "c"] {
        drop(validator.validate_now(&Profile { bio: bio.into() }, &NoServices).unwrap());
    }

    let snap = shells.stats().snapshot();
    assert_eq!(snap.rented, 6);
    assert_eq!(snap.returned, 6);
    assert_eq!(snap.hits, 4);
}

#[test]
fn test_message_buffers_are_bounded() {
    let validator = Validator::builder()
        .rule("flood", |_| {
            Ok(rule_fn(Signature::returning("Vec<Message>"), |_| {
                (0..40)
                    .map(|n| Message::new("noise {0}", "noise").with_arg(n))
                    .collect::<Vec<_>>()
                    .into()
            }))
        })
        .build();

    let outcome = validator.validate_now(&Noisy, &NoServices).unwrap();
    let field = outcome.field("value").unwrap();
    let kept = field.messages().len();

    assert!(kept < 40);
    assert_eq!(kept, field.outcome().message_capacity());
    assert_eq!(field.messages()[0].to_string(), "noise 0");
}

#[test]
fn test_standalone_outcome_dispose() {
    let messages = Arc::new(TrackingPool::default());
    let pools = OutcomePools::builder(&ValidatorOptions::default())
        .messages(Arc::clone(&messages) as Arc<dyn ArrayPool<Message>>)
        .build();

    let mut outcome = pools.create(2);
    let mut field = pools.create_field(Arc::from("name"), 0);
    field.outcome_mut().add_message(Message::new("bad", "bad"));
    assert!(outcome.add_field_outcome(field));
    assert!(!outcome.is_success());

    outcome.dispose();
    assert_eq!(messages.rented().len(), 2);
    assert_eq!(as_set(messages.rented()), as_set(messages.returned()));
}

#[tokio::test]
async fn test_cancelled_validation_returns_partial_buffers() {
    struct Slow;

    impl Validatable for Slow {
        fn describe() -> TypeDescriptor {
            TypeDescriptor::new("Slow")
                .field(FieldDescriptor::new("first", "String").rule(RuleAttachment::new("length").arg("max", 1)))
                .field(FieldDescriptor::new("second", "String").rule("wait"))
        }

        fn field(&self, _: &str) -> FieldValue<'_> {
            "value".into()
        }
    }

    let messages = Arc::new(TrackingPool::default());
    let options = ValidatorOptions::default();
    let pools = OutcomePools::builder(&options)
        .messages(Arc::clone(&messages) as Arc<dyn ArrayPool<Message>>)
        .build();
    let validator = Validator::builder()
        .options(options)
        .pools(pools)
        .rule("wait", |_| {
            Ok(rule_fn(Signature::returning("BoxFuture<'a, Option<Message>>"), |call| {
                let cancel = call.cancellation().clone();
                RuleOutput::Pending(Box::pin(async move {
                    // Cancel mid-flight, then park
                    cancel.cancel();
                    std::future::pending::<()>().await;
                    RuleOutput::Nothing
                }))
            }))
        })
        .build();

    let err = validator
        .validate(&Slow, &NoServices, &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(err.is_cancelled());
    assert!(!messages.rented().is_empty());
    assert_eq!(as_set(messages.rented()), as_set(messages.returned()));
}
