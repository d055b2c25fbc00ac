//! Per-field value checks.
//!
//! `check` is the FieldRule contract: given a field definition and one
//! submitted value, pass or fail with a field-scoped reason. The type check
//! runs first, then the bounds the type supports. Values are validated as
//! parseable but never coerced; the caller persists what was submitted.

use chrono::NaiveDate;
use regex::Regex;
use serde_json::Value;

use crate::errors::{SchemaResult, SchemaViolation};
use crate::forms::field_type::{FieldRules, FieldType};
use crate::forms::validator::FieldSpec;

/// Check one submitted value against its field definition.
///
/// The caller has already handled absence; `value` is present and non-null.
pub fn check(field: &FieldSpec, value: &Value) -> SchemaResult<()> {
    let rules = FieldRules::parse(field.field_type, field.rules.as_ref());
    match field.field_type {
        FieldType::Text => check_text(field, &rules, value),
        FieldType::Number => check_number(field, &rules, value),
        FieldType::Date => check_date(field, value),
        FieldType::Boolean => check_boolean(field, value),
        FieldType::Email => check_email(field, value),
        FieldType::Url => check_url(field, value),
        FieldType::Select | FieldType::Radio => check_single_choice(field, &rules, value),
        FieldType::Checkbox => check_multi_choice(field, &rules, value),
    }
}

fn check_text(field: &FieldSpec, rules: &FieldRules, value: &Value) -> SchemaResult<()> {
    let s = value.as_str().ok_or_else(|| SchemaViolation::NotAString {
        field: field.name.clone(),
    })?;
    let FieldRules::Text {
        min_length,
        max_length,
        regex,
    } = rules
    else {
        return Ok(());
    };

    let len = s.chars().count() as u64;
    if let Some(min) = min_length {
        if len < *min {
            return Err(SchemaViolation::TooShort {
                field: field.name.clone(),
                min: *min,
            });
        }
    }
    if let Some(max) = max_length {
        if len > *max {
            return Err(SchemaViolation::TooLong {
                field: field.name.clone(),
                max: *max,
            });
        }
    }
    if let Some(pattern) = regex {
        if !matches_at_start(pattern, s) {
            return Err(SchemaViolation::PatternMismatch {
                field: field.name.clone(),
            });
        }
    }
    Ok(())
}

/// Match-at-position-zero semantics: the pattern need not cover the whole
/// string, but the match has to begin at the first character.
fn matches_at_start(pattern: &str, value: &str) -> bool {
    match Regex::new(pattern) {
        Ok(re) => re.find(value).is_some_and(|m| m.start() == 0),
        // Definitions gate patterns at authoring time; an uncompilable
        // pattern that slipped through behaves as unenforced.
        Err(_) => true,
    }
}

fn check_number(field: &FieldSpec, rules: &FieldRules, value: &Value) -> SchemaResult<()> {
    let parsed = coerce_number(value).ok_or_else(|| SchemaViolation::NotANumber {
        field: field.name.clone(),
    })?;
    let FieldRules::Number {
        min_value,
        max_value,
    } = rules
    else {
        return Ok(());
    };

    if let Some(min) = min_value {
        if parsed < *min {
            return Err(SchemaViolation::BelowMinimum {
                field: field.name.clone(),
                min: *min,
            });
        }
    }
    if let Some(max) = max_value {
        if parsed > *max {
            return Err(SchemaViolation::AboveMaximum {
                field: field.name.clone(),
                max: *max,
            });
        }
    }
    Ok(())
}

/// Numeric-looking values coerce before bound checks: JSON numbers pass
/// through, strings must parse as a float. Booleans do not count.
fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn check_date(field: &FieldSpec, value: &Value) -> SchemaResult<()> {
    let ok = value
        .as_str()
        .is_some_and(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok());
    if ok {
        Ok(())
    } else {
        Err(SchemaViolation::NotADate {
            field: field.name.clone(),
        })
    }
}

fn check_boolean(field: &FieldSpec, value: &Value) -> SchemaResult<()> {
    if value.is_boolean() {
        Ok(())
    } else {
        Err(SchemaViolation::NotABoolean {
            field: field.name.clone(),
        })
    }
}

const EMAIL_PATTERN: &str =
    r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)+$";

fn check_email(field: &FieldSpec, value: &Value) -> SchemaResult<()> {
    let ok = value.as_str().is_some_and(|s| {
        Regex::new(EMAIL_PATTERN).is_ok_and(|re| re.is_match(s))
    });
    if ok {
        Ok(())
    } else {
        Err(SchemaViolation::InvalidEmail {
            field: field.name.clone(),
        })
    }
}

const URL_SCHEMES: [&str; 4] = ["http", "https", "ftp", "ftps"];

fn check_url(field: &FieldSpec, value: &Value) -> SchemaResult<()> {
    let ok = value.as_str().is_some_and(|s| {
        url::Url::parse(s)
            .map(|u| u.has_host() && URL_SCHEMES.contains(&u.scheme()))
            .unwrap_or(false)
    });
    if ok {
        Ok(())
    } else {
        Err(SchemaViolation::InvalidUrl {
            field: field.name.clone(),
        })
    }
}

fn check_single_choice(field: &FieldSpec, rules: &FieldRules, value: &Value) -> SchemaResult<()> {
    let FieldRules::Choice { choices } = rules else {
        return Ok(());
    };
    if choices.is_empty() {
        return Ok(());
    }
    // Exact match, case-sensitive, no trimming.
    let matched = value
        .as_str()
        .is_some_and(|s| choices.iter().any(|c| c == s));
    if matched {
        Ok(())
    } else {
        Err(SchemaViolation::InvalidChoice {
            field: field.name.clone(),
            choices: choices.join(", "),
        })
    }
}

fn check_multi_choice(field: &FieldSpec, rules: &FieldRules, value: &Value) -> SchemaResult<()> {
    let FieldRules::Choice { choices } = rules else {
        return Ok(());
    };
    if choices.is_empty() {
        return Ok(());
    }

    // An array of selections, or one comma-separated string whose parts get
    // trimmed (blank parts dropped).
    let selected: Vec<String> = match value {
        Value::Array(items) => items.iter().map(render_selection).collect(),
        Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect(),
        other => vec![render_selection(other)],
    };

    let invalid: Vec<&str> = selected
        .iter()
        .map(String::as_str)
        .filter(|item| !choices.iter().any(|c| c == item))
        .collect();
    if invalid.is_empty() {
        Ok(())
    } else {
        Err(SchemaViolation::InvalidChoices {
            field: field.name.clone(),
            invalid: invalid.join(", "),
        })
    }
}

fn render_selection(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
