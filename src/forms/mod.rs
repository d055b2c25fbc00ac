//! The dynamic form validation core.
//!
//! An admin authors a form as an ordered list of typed field definitions,
//! each with a small per-type rule set. Submitted mappings are checked
//! against those definitions at write time by one canonical validator,
//! shared by every surface that carries form data (batches, bags,
//! submissions).
//!
//! Everything in this module is pure and synchronous: the caller loads the
//! form's fields in one query and hands them in as [`FieldSpec`]s.

pub mod association;
pub mod field_type;
pub mod lifecycle;
pub mod rules;
pub mod validator;

pub use association::{check_pair, AssociationRef, AssociationType};
pub use field_type::{FieldRules, FieldType};
pub use lifecycle::{batch_code, can_modify, completed_at_for_save, Status};
pub use validator::{normalize_rules, validate_form_data, FieldSpec};
