//! Type model extraction
//!
//! Reads a [`TypeDescriptor`] and produces a [`TypeModel`]: parsed types,
//! instantiated catalog rules, recognized custom routines and hooks, auto
//! rules, and effective settings. Extraction is deterministic: the same
//! descriptor, catalog, and options always yield the same model.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use super::{
    Constant, FieldDescriptor, KeyExpr, RuleArgs, RuleAttachment, Signature, TypeDescriptor,
    TypeName,
};
use crate::foundation::{CompileError, TypeKey};
use crate::options::ValidatorOptions;
use crate::rule::{Rule, RuleCatalog};

/// Routine run before the field loop.
pub const BEFORE_VALIDATE: &str = "before_validate";
/// Routine run after the field loop.
pub const AFTER_VALIDATE: &str = "after_validate";
/// Prefix of per-field custom routines.
pub const ROUTINE_PREFIX: &str = "validate_";

// ============================================================================
// MODEL
// ============================================================================

/// A declared parameter with its type parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedParam {
    /// Normalized type
    pub type_name: TypeName,
    /// Key for keyed lookup
    pub key: Option<KeyExpr>,
}

/// A signature with its types parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSignature {
    /// Parameters in declaration order
    pub params: Vec<ParsedParam>,
    /// Normalized return type
    pub returns: TypeName,
}

impl ParsedSignature {
    fn parse(signature: &Signature) -> Result<Self, CompileError> {
        let params = signature
            .params
            .iter()
            .map(|p| {
                Ok(ParsedParam {
                    type_name: TypeName::parse(&p.type_name)?,
                    key: p.key.clone(),
                })
            })
            .collect::<Result<Vec<_>, CompileError>>()?;
        Ok(Self {
            params,
            returns: TypeName::parse(&signature.returns)?,
        })
    }
}

/// A callable rule bound to a field (or hook slot).
#[derive(Clone)]
pub struct RuleRef {
    /// Catalog identifier or routine name
    pub id: Arc<str>,
    /// Implementation
    pub callee: Arc<dyn Rule>,
    /// Parsed declared signature
    pub signature: ParsedSignature,
}

impl RuleRef {
    fn new(id: &str, callee: Arc<dyn Rule>) -> Result<Self, CompileError> {
        let signature = ParsedSignature::parse(&callee.signature())?;
        Ok(Self {
            id: Arc::from(id),
            callee,
            signature,
        })
    }
}

impl fmt::Debug for RuleRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleRef")
            .field("id", &self.id)
            .field("signature", &self.signature)
            .finish()
    }
}

/// One field with its rules in invocation order.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    /// Field name
    pub name: Arc<str>,
    /// Parsed declared type
    pub declared_type: TypeName,
    /// Whether the value may be absent
    pub nullable: bool,
    /// Auto rules, then attachments, then the custom routine
    pub rules: Vec<RuleRef>,
    /// Nested validatable type
    pub nested: Option<TypeKey>,
}

/// Extracted model of one validatable type.
#[derive(Debug, Clone)]
pub struct TypeModel {
    /// Type name
    pub name: Arc<str>,
    /// Fields in declaration order
    pub fields: Vec<FieldSpec>,
    /// `before_validate` hook
    pub before: Option<RuleRef>,
    /// `after_validate` hook
    pub after: Option<RuleRef>,
    /// Effective fail-fast setting
    pub fail_fast: bool,
    /// Effective auto-rule setting
    pub auto_rules: bool,
}

// ============================================================================
// EXTRACTION
// ============================================================================

/// Builds the model of a described type.
///
/// # Errors
///
/// - [`CompileError::DuplicateField`] for repeated field names
/// - [`CompileError::UnknownRule`] for attachments missing from `catalog`
/// - [`CompileError::MalformedType`] for unparsable declared types
/// - whatever a rule factory reports for its arguments
pub fn extract(
    descriptor: &TypeDescriptor,
    catalog: &RuleCatalog,
    options: &ValidatorOptions,
) -> Result<TypeModel, CompileError> {
    let auto_rules = descriptor.settings.auto_rules.unwrap_or(options.auto_rules);
    let fail_fast = descriptor.settings.fail_fast.unwrap_or(options.fail_fast);

    let routine = |name: &str| descriptor.routines.iter().find(|r| r.name == name);

    let mut seen = HashSet::with_capacity(descriptor.fields.len());
    let mut fields = Vec::with_capacity(descriptor.fields.len());
    for field in &descriptor.fields {
        if !seen.insert(field.name.as_ref()) {
            return Err(CompileError::DuplicateField {
                type_name: descriptor.name.to_string(),
                field: field.name.to_string(),
            });
        }

        let declared_type = TypeName::parse(&field.declared_type)?;
        let nullable = field.nullable || declared_type.is_nullable();

        if field.nested.is_some() {
            if !field.attachments.is_empty() || field.custom {
                tracing::debug!(
                    type_name = %descriptor.name,
                    field = %field.name,
                    "nested field delegates to its own plan; direct rules dropped"
                );
            }
            fields.push(FieldSpec {
                name: Arc::from(field.name.as_ref()),
                declared_type,
                nullable,
                rules: Vec::new(),
                nested: field.nested,
            });
            continue;
        }

        let mut rules = Vec::with_capacity(field.attachments.len() + 2);
        if auto_rules {
            for attachment in auto_attachments(field, nullable) {
                rules.push(instantiate(field, &attachment, catalog)?);
            }
        }
        for attachment in &field.attachments {
            rules.push(instantiate(field, attachment, catalog)?);
        }
        if field.custom {
            let name = format!("{ROUTINE_PREFIX}{}", field.name);
            match routine(&name) {
                Some(found) => rules.push(RuleRef::new(&name, Arc::clone(&found.routine))?),
                None => tracing::debug!(
                    type_name = %descriptor.name,
                    field = %field.name,
                    routine = %name,
                    "custom field has no matching routine"
                ),
            }
        }

        fields.push(FieldSpec {
            name: Arc::from(field.name.as_ref()),
            declared_type,
            nullable,
            rules,
            nested: field.nested,
        });
    }

    let hook = |name: &str| {
        routine(name)
            .map(|r| RuleRef::new(name, Arc::clone(&r.routine)))
            .transpose()
    };

    Ok(TypeModel {
        name: Arc::from(descriptor.name.as_ref()),
        fields,
        before: hook(BEFORE_VALIDATE)?,
        after: hook(AFTER_VALIDATE)?,
        fail_fast,
        auto_rules,
    })
}

fn auto_attachments(field: &FieldDescriptor, nullable: bool) -> Vec<RuleAttachment> {
    let mut auto = Vec::new();
    let declared = |id: &str| field.attachments.iter().any(|a| a.rule == id);
    if !nullable && !declared("required") {
        auto.push(RuleAttachment::new("required"));
    }
    if field.enumeration.is_some() && !declared("in_enum") {
        auto.push(RuleAttachment::new("in_enum"));
    }
    auto
}

fn instantiate(
    field: &FieldDescriptor,
    attachment: &RuleAttachment,
    catalog: &RuleCatalog,
) -> Result<RuleRef, CompileError> {
    let mut args = attachment.args.clone();
    if attachment.rule == "in_enum"
        && args.get("variants").is_none()
        && let Some(members) = &field.enumeration
    {
        args.set(
            "variants",
            Constant::List(members.iter().cloned().map(Constant::String).collect()),
        );
    }

    let callee = instantiate_args(field, &attachment.rule, &args, catalog)?;
    RuleRef::new(&attachment.rule, callee)
}

fn instantiate_args(
    field: &FieldDescriptor,
    id: &str,
    args: &RuleArgs,
    catalog: &RuleCatalog,
) -> Result<Arc<dyn Rule>, CompileError> {
    catalog
        .instantiate(id, args)?
        .ok_or_else(|| CompileError::UnknownRule {
            field: field.name.to_string(),
            rule: id.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FieldDescriptor, TypeDescriptor};
    use crate::rule::{RuleOutput, rule_fn};
    use pretty_assertions::assert_eq;

    fn ids(field: &FieldSpec) -> Vec<&str> {
        field.rules.iter().map(|r| r.id.as_ref()).collect()
    }

    fn noop() -> Arc<dyn Rule> {
        rule_fn(Signature::returning("Option<Message>"), |_| RuleOutput::Nothing)
    }

    #[test]
    fn test_attachments_keep_declaration_order() {
        let desc = TypeDescriptor::new("User").field(
            FieldDescriptor::new("name", "String")
                .rule(RuleAttachment::new("length").arg("max", 10))
                .rule("required"),
        );
        let model = extract(&desc, &RuleCatalog::builtin(), &ValidatorOptions::default()).unwrap();
        assert_eq!(ids(&model.fields[0]), vec!["length", "required"]);
    }

    #[test]
    fn test_auto_rules_for_non_nullable_and_enums() {
        let desc = TypeDescriptor::new("Order")
            .auto_rules(true)
            .field(FieldDescriptor::new("id", "String"))
            .field(FieldDescriptor::new("note", "Option<String>"))
            .field(FieldDescriptor::new("status", "Status").enumeration(["Open", "Closed"]));
        let model = extract(&desc, &RuleCatalog::builtin(), &ValidatorOptions::default()).unwrap();

        assert!(model.auto_rules);
        assert_eq!(ids(&model.fields[0]), vec!["required"]);
        assert!(model.fields[1].nullable);
        assert!(model.fields[1].rules.is_empty());
        assert_eq!(ids(&model.fields[2]), vec!["required", "in_enum"]);
    }

    #[test]
    fn test_auto_rules_off_by_default() {
        let desc = TypeDescriptor::new("Order").field(FieldDescriptor::new("id", "String"));
        let model = extract(&desc, &RuleCatalog::builtin(), &ValidatorOptions::default()).unwrap();
        assert!(model.fields[0].rules.is_empty());
    }

    #[test]
    fn test_settings_override_options() {
        let options = ValidatorOptions::default().with_fail_fast(true);
        let desc = TypeDescriptor::new("T").fail_fast(false);
        assert!(!extract(&desc, &RuleCatalog::builtin(), &options).unwrap().fail_fast);

        let desc = TypeDescriptor::new("T");
        assert!(extract(&desc, &RuleCatalog::builtin(), &options).unwrap().fail_fast);
    }

    #[test]
    fn test_custom_routine_naming() {
        let desc = TypeDescriptor::new("User")
            .field(FieldDescriptor::new("email", "String").custom())
            .field(FieldDescriptor::new("nick", "String").custom())
            .routine("validate_email", noop())
            .routine("check_nick", noop());
        let model = extract(&desc, &RuleCatalog::builtin(), &ValidatorOptions::default()).unwrap();
        assert_eq!(ids(&model.fields[0]), vec!["validate_email"]);
        assert!(model.fields[1].rules.is_empty());
    }

    #[test]
    fn test_hooks_recognized() {
        let desc = TypeDescriptor::new("User")
            .routine(BEFORE_VALIDATE, noop())
            .routine(AFTER_VALIDATE, noop());
        let model = extract(&desc, &RuleCatalog::builtin(), &ValidatorOptions::default()).unwrap();
        assert!(model.before.is_some());
        assert!(model.after.is_some());
    }

    #[test]
    fn test_nested_field_gets_no_direct_rules() {
        struct Inner;
        impl crate::foundation::Validatable for Inner {
            fn describe() -> TypeDescriptor {
                TypeDescriptor::new("Inner")
            }

            fn field(&self, _: &str) -> crate::foundation::FieldValue<'_> {
                crate::foundation::FieldValue::Null
            }
        }

        let desc = TypeDescriptor::new("Outer")
            .auto_rules(true)
            .field(FieldDescriptor::nested::<Inner>("inner").rule("required").custom())
            .routine("validate_inner", noop());
        let model = extract(&desc, &RuleCatalog::builtin(), &ValidatorOptions::default()).unwrap();
        assert!(model.fields[0].rules.is_empty());
        assert!(model.fields[0].nested.is_some());
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let desc = TypeDescriptor::new("User")
            .field(FieldDescriptor::new("a", "String"))
            .field(FieldDescriptor::new("a", "i64"));
        let err = extract(&desc, &RuleCatalog::builtin(), &ValidatorOptions::default()).unwrap_err();
        assert_eq!(
            err,
            CompileError::DuplicateField {
                type_name: "User".into(),
                field: "a".into()
            }
        );
    }

    #[test]
    fn test_unknown_rule_rejected() {
        let desc = TypeDescriptor::new("User").field(FieldDescriptor::new("a", "String").rule("shiny"));
        let err = extract(&desc, &RuleCatalog::builtin(), &ValidatorOptions::default()).unwrap_err();
        assert!(matches!(err, CompileError::UnknownRule { ref rule, .. } if rule == "shiny"));
    }

    #[test]
    fn test_malformed_declared_type_rejected() {
        let desc = TypeDescriptor::new("User").field(FieldDescriptor::new("a", "Vec<"));
        let err = extract(&desc, &RuleCatalog::builtin(), &ValidatorOptions::default()).unwrap_err();
        assert!(matches!(err, CompileError::MalformedType { .. }));
    }
}
