//! Basic usage example for nebula-validator

use nebula_validator::prelude::*;

struct Signup {
    email: Option<String>,
    password: String,
    phone: Option<String>,
}

impl Validatable for Signup {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::new("Signup")
            .field(FieldDescriptor::new("email", "String").rule(RuleAttachment::new("length").arg("max", 64)))
            .field(FieldDescriptor::new("password", "String").rule("strong_password"))
            .field(FieldDescriptor::new("phone", "Option<String>").rule("phone_number"))
    }

    fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "email" => (&self.email).into(),
            "password" => (&self.password).into(),
            "phone" => (&self.phone).into(),
            _ => FieldValue::Null,
        }
    }
}

fn main() {
    let validator = Validator::builder()
        .options(ValidatorOptions::default().with_auto_rules(true))
        .build();

    let signup = Signup {
        email: None,
        password: "hunter2".into(),
        phone: Some("+0123456789".into()),
    };

    match validator.validate_now(&signup, &NoServices) {
        Ok(outcome) if outcome.is_success() => println!("✓ signup is valid"),
        Ok(outcome) => {
            for field in outcome.fields().iter().filter(|f| !f.is_success()) {
                for message in field.messages() {
                    println!("✗ {}: {message}", field.path());
                }
            }
        }
        Err(e) => println!("✗ validation aborted: {e}"),
    }
}
