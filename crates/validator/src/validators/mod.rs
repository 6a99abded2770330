//! Built-in rules
//!
//! | Identifier        | Arguments                                                        | Returns           |
//! |-------------------|------------------------------------------------------------------|-------------------|
//! | `required`        |                                                                  | `Option<Message>` |
//! | `in_enum`         | `variants` (list; filled from the field's enumeration)           | `Option<Message>` |
//! | `length`          | `min`, `max`, `mode` (`"chars"` or `"bytes"`)                    | `Option<Message>` |
//! | `password`        | `min_length`, `required_upper`, `required_digit`, `required_special` | `Vec<Message>` |
//! | `strong_password` | `min_length`                                                     | `Vec<Message>`    |
//! | `phone_number`    |                                                                  | `Option<Message>` |

mod enumeration;
mod length;
mod nullable;
mod password;
mod phone;

pub use enumeration::InEnum;
pub use length::{Length, LengthMode};
pub use nullable::Required;
pub use password::Password;
pub use phone::PhoneNumber;

use crate::rule::RuleCatalog;

pub(crate) fn register_builtin(catalog: &mut RuleCatalog) {
    catalog
        .register("required", nullable::build)
        .register("in_enum", enumeration::build)
        .register("length", length::build)
        .register("password", password::build)
        .register("strong_password", password::build_strong)
        .register("phone_number", phone::build);
}
