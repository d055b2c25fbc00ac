//! Field type tags and their typed rule sets.
//!
//! Field definitions are stored with a string type tag and an untyped JSON
//! rule mapping. Validation never branches on those strings directly: the
//! tag parses into [`FieldType`] once, and the rule mapping is lowered into
//! the [`FieldRules`] variant that type supports. Unknown rule keys and
//! ill-typed rule values are ignored, which keeps "rule absent" and "rule
//! unreadable" equivalent to "rule not enforced".

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The nine supported field types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Number,
    Date,
    Boolean,
    Select,
    Radio,
    Checkbox,
    Email,
    Url,
}

impl FieldType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "text" => Some(Self::Text),
            "number" => Some(Self::Number),
            "date" => Some(Self::Date),
            "boolean" => Some(Self::Boolean),
            "select" => Some(Self::Select),
            "radio" => Some(Self::Radio),
            "checkbox" => Some(Self::Checkbox),
            "email" => Some(Self::Email),
            "url" => Some(Self::Url),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Date => "date",
            Self::Boolean => "boolean",
            Self::Select => "select",
            Self::Radio => "radio",
            Self::Checkbox => "checkbox",
            Self::Email => "email",
            Self::Url => "url",
        }
    }

    /// Types whose rule set must declare a non-empty choice list.
    pub fn is_choice(&self) -> bool {
        matches!(self, Self::Select | Self::Radio | Self::Checkbox)
    }
}

/// The rule set a field type supports, lowered from the stored JSON mapping.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldRules {
    Text {
        min_length: Option<u64>,
        max_length: Option<u64>,
        regex: Option<String>,
    },
    Number {
        min_value: Option<f64>,
        max_value: Option<f64>,
    },
    Choice {
        choices: Vec<String>,
    },
    /// date, boolean, email, url: the type check is the whole contract.
    Plain,
}

impl FieldRules {
    /// Lower a stored rule mapping into the rules its field type honours.
    pub fn parse(field_type: FieldType, rules: Option<&Value>) -> Self {
        let obj = rules.and_then(Value::as_object);
        match field_type {
            FieldType::Text => Self::Text {
                min_length: obj
                    .and_then(|o| o.get("min_length"))
                    .and_then(Value::as_u64),
                max_length: obj
                    .and_then(|o| o.get("max_length"))
                    .and_then(Value::as_u64),
                regex: obj
                    .and_then(|o| o.get("regex"))
                    .and_then(Value::as_str)
                    .map(str::to_string),
            },
            FieldType::Number => Self::Number {
                min_value: obj.and_then(|o| o.get("min_value")).and_then(Value::as_f64),
                max_value: obj.and_then(|o| o.get("max_value")).and_then(Value::as_f64),
            },
            FieldType::Select | FieldType::Radio | FieldType::Checkbox => Self::Choice {
                choices: obj
                    .and_then(|o| o.get("choices"))
                    .and_then(Value::as_array)
                    .map(|items| {
                        items
                            .iter()
                            .filter_map(Value::as_str)
                            .map(str::to_string)
                            .collect()
                    })
                    .unwrap_or_default(),
            },
            FieldType::Date | FieldType::Boolean | FieldType::Email | FieldType::Url => Self::Plain,
        }
    }
}
