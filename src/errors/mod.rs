//! Domain error types for batchtrace.
//!
//! Three violation families surface from the write paths:
//!
//! - **SchemaViolation**: submitted form data failed the bound form's field
//!   definitions (unexpected key, missing required, type mismatch, rule bound,
//!   invalid choice), or a field definition itself is invalid.
//! - **AssociationViolation**: a submission's (content type, object id) pair
//!   does not agree with its form's association type.
//! - **RecordError**: the orchestration-level error a service returns. Wraps
//!   the two violation families and adds lifecycle locks, missing records,
//!   and storage failures.

pub mod association;
pub mod record;
pub mod schema;

pub use association::AssociationViolation;
pub use record::RecordError;
pub use schema::SchemaViolation;

/// Result type alias for pure schema validation.
pub type SchemaResult<T> = Result<T, SchemaViolation>;

/// Result type alias for service operations.
pub type RecordResult<T> = Result<T, RecordError>;
