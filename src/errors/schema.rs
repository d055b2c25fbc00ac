//! Field-scoped validation errors.
//!
//! Every variant carries the offending field name and, for bound violations,
//! the configured bound exactly as the admin entered it. The validator is
//! fail-fast, so a single violation is always the whole story.

use thiserror::Error;

/// A submitted mapping or a field definition failed validation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaViolation {
    /// Submitted keys that no declared field matches, in submitted order.
    #[error("Unexpected fields in form data: {fields}.")]
    UnexpectedFields { fields: String },

    /// A required field is missing or null.
    #[error("Field '{field}' is required.")]
    RequiredMissing { field: String },

    #[error("Field '{field}' must be a string.")]
    NotAString { field: String },

    #[error("Field '{field}' must be a number.")]
    NotANumber { field: String },

    #[error("Field '{field}' must be a valid date (YYYY-MM-DD).")]
    NotADate { field: String },

    #[error("Field '{field}' must be a boolean.")]
    NotABoolean { field: String },

    #[error("Field '{field}' must be a valid email address.")]
    InvalidEmail { field: String },

    #[error("Field '{field}' must be a valid URL.")]
    InvalidUrl { field: String },

    #[error("Field '{field}' must be at least {min} characters long.")]
    TooShort { field: String, min: u64 },

    #[error("Field '{field}' exceeds maximum length of {max}.")]
    TooLong { field: String, max: u64 },

    #[error("Field '{field}' does not match the required pattern.")]
    PatternMismatch { field: String },

    #[error("Field '{field}' must be at least {min}.")]
    BelowMinimum { field: String, min: f64 },

    #[error("Field '{field}' cannot exceed {max}.")]
    AboveMaximum { field: String, max: f64 },

    /// Select/radio value outside the declared choice list.
    #[error("Field '{field}' must be one of: {choices}.")]
    InvalidChoice { field: String, choices: String },

    /// Checkbox selections outside the declared choice list, joined ", ".
    #[error("Field '{field}' has invalid choices: {invalid}.")]
    InvalidChoices { field: String, invalid: String },

    /// The mapping itself was not a JSON object.
    #[error("Form data must be a JSON object.")]
    NotAnObject,

    // Definition-time violations: a FormField is rejected before it can be
    // attached to any form.
    #[error("Choices are required for select, radio, and checkbox fields.")]
    ChoicesRequired,

    #[error("Invalid regex pattern for field definition: {pattern}")]
    InvalidPattern { pattern: String },

    #[error("Invalid field type '{0}'.")]
    UnknownFieldType(String),

    #[error("Invalid association type '{0}'.")]
    UnknownAssociationType(String),

    #[error("Invalid status '{0}'.")]
    UnknownStatus(String),
}
