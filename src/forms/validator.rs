//! The canonical form validator.
//!
//! Three surfaces carry admin-form data (batch form_data, bag form_data,
//! submission data) and all three call [`validate_form_data`] with the same
//! semantics and the same fail-fast scan order:
//!
//! 1. absent or null mapping: nothing to check;
//! 2. unexpected keys, all listed in submitted order;
//! 3. required fields, in declaration order;
//! 4. per-field type and rule checks, in declaration order.
//!
//! The first violation found aborts the scan. Accepted mappings pass through
//! unchanged.

use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::errors::{SchemaResult, SchemaViolation};
use crate::forms::field_type::FieldType;
use crate::forms::rules;

/// A form field definition as the validator sees it: name, parsed type tag,
/// required flag, and the stored rule mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: String,
    pub field_type: FieldType,
    pub required: bool,
    pub rules: Option<Value>,
}

/// Validate a submitted mapping against a form's field definitions.
///
/// `fields` must be in declaration order; the caller loads them in one query.
pub fn validate_form_data(fields: &[FieldSpec], submitted: Option<&Value>) -> SchemaResult<()> {
    let Some(submitted) = submitted else {
        return Ok(());
    };
    if submitted.is_null() {
        return Ok(());
    }
    let map = submitted
        .as_object()
        .ok_or(SchemaViolation::NotAnObject)?;

    check_unexpected(fields, map)?;

    for field in fields {
        if field.required && map.get(&field.name).map_or(true, Value::is_null) {
            return Err(SchemaViolation::RequiredMissing {
                field: field.name.clone(),
            });
        }
    }

    for field in fields {
        if let Some(value) = map.get(&field.name) {
            if !value.is_null() {
                rules::check(field, value)?;
            }
        }
    }

    Ok(())
}

fn check_unexpected(fields: &[FieldSpec], map: &Map<String, Value>) -> SchemaResult<()> {
    let declared: HashSet<&str> = fields.iter().map(|f| f.name.as_str()).collect();
    let extra: Vec<&str> = map
        .keys()
        .map(String::as_str)
        .filter(|key| !declared.contains(key))
        .collect();
    if extra.is_empty() {
        Ok(())
    } else {
        Err(SchemaViolation::UnexpectedFields {
            fields: extra.join(", "),
        })
    }
}

/// Gate and normalize a field definition's rule mapping before it is stored.
///
/// Choice types must declare a non-empty `choices` list; entries are
/// stringified, trimmed, blanks dropped, and duplicates removed keeping the
/// first occurrence. Non-choice types shed any stray `choices` key, and a
/// text `regex` rule must compile.
pub fn normalize_rules(
    field_type: FieldType,
    rules: Option<&Value>,
) -> SchemaResult<Option<Value>> {
    let mut obj = match rules {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(map)) => map.clone(),
        Some(_) => return Err(SchemaViolation::NotAnObject),
    };

    if field_type.is_choice() {
        let choices = obj
            .get("choices")
            .and_then(Value::as_array)
            .ok_or(SchemaViolation::ChoicesRequired)?;
        let mut cleaned: Vec<String> = Vec::new();
        for choice in choices {
            let text = match choice {
                Value::String(s) => s.trim().to_string(),
                other => other.to_string(),
            };
            if !text.is_empty() && !cleaned.contains(&text) {
                cleaned.push(text);
            }
        }
        if cleaned.is_empty() {
            return Err(SchemaViolation::ChoicesRequired);
        }
        obj.insert(
            "choices".to_string(),
            Value::Array(cleaned.into_iter().map(Value::String).collect()),
        );
    } else {
        obj.remove("choices");
        if field_type == FieldType::Text {
            if let Some(pattern) = obj.get("regex").and_then(Value::as_str) {
                if regex::Regex::new(pattern).is_err() {
                    return Err(SchemaViolation::InvalidPattern {
                        pattern: pattern.to_string(),
                    });
                }
            }
        }
    }

    if obj.is_empty() {
        Ok(None)
    } else {
        Ok(Some(Value::Object(obj)))
    }
}
