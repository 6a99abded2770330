//! Property-based tests for nebula-validator.

use std::sync::LazyLock;

use nebula_validator::prelude::*;
use proptest::prelude::*;

struct Credentials {
    password: String,
    phone: Option<String>,
}

impl Validatable for Credentials {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::new("Credentials")
            .field(FieldDescriptor::new("password", "String").rule("strong_password"))
            .field(FieldDescriptor::new("phone", "Option<String>").rule("phone_number"))
    }

    fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "password" => (&self.password).into(),
            "phone" => (&self.phone).into(),
            _ => FieldValue::Null,
        }
    }
}

static VALIDATOR: LazyLock<Validator> = LazyLock::new(Validator::new);

fn keys(outcome: &Outcome) -> Vec<String> {
    outcome
        .all_messages()
        .into_iter()
        .map(|m| format!("{}:{}", m.key, m.args_json()))
        .collect()
}

fn is_e164(s: &str) -> bool {
    let Some(digits) = s.strip_prefix('+') else {
        return false;
    };
    (7..=15).contains(&digits.len())
        && digits.bytes().all(|b| b.is_ascii_digit())
        && !digits.starts_with('0')
}

// ============================================================================
// DETERMINISM: validate(x) == validate(x)
// ============================================================================

proptest! {
    #[test]
    fn validation_is_deterministic(password in ".{0,24}", phone in proptest::option::of("\\+?[0-9]{0,18}")) {
        let value = Credentials { password, phone };
        let first = VALIDATOR.validate_now(&value, &NoServices).unwrap();
        let second = VALIDATOR.validate_now(&value, &NoServices).unwrap();

        prop_assert_eq!(first.is_success(), second.is_success());
        prop_assert_eq!(keys(&first), keys(&second));
    }
}

// ============================================================================
// STRUCTURE: every declared field is reported, in order
// ============================================================================

proptest! {
    #[test]
    fn every_field_is_reported(password in ".{0,24}") {
        let outcome = VALIDATOR
            .validate_now(&Credentials { password, phone: None }, &NoServices)
            .unwrap();

        let paths: Vec<&str> = outcome.fields().iter().map(FieldOutcome::path).collect();
        prop_assert_eq!(paths, vec!["password", "phone"]);
        prop_assert!(outcome.field("phone").unwrap().is_success());
        prop_assert!(outcome.field("password").unwrap().messages().len() <= 4);
    }
}

// ============================================================================
// PHONE NUMBERS: accepted iff E.164
// ============================================================================

proptest! {
    #[test]
    fn phone_accepted_iff_e164(phone in "\\+?[0-9]{0,18}") {
        let expected = is_e164(&phone);
        let outcome = VALIDATOR
            .validate_now(
                &Credentials { password: "Str0ng!Password".into(), phone: Some(phone) },
                &NoServices,
            )
            .unwrap();
        prop_assert_eq!(outcome.field("phone").unwrap().is_success(), expected);
    }
}
