//! Association errors between submissions, forms, and tracked records.

use thiserror::Error;

/// The (content type, object id) pair on a submission disagrees with the
/// bound form's association type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssociationViolation {
    /// A non-standalone form needs both halves of the weak reference.
    #[error("Content type and object ID are required for non-standalone forms.")]
    PairRequired,

    /// The content type tag names no known record kind.
    #[error("Invalid content type.")]
    InvalidContentType,

    /// Standalone forms may not carry a weak reference at all.
    #[error("Standalone forms cannot be associated with a content object.")]
    StandaloneWithObject,

    /// The referenced record does not exist.
    #[error("No {kind} found with ID {id}.")]
    TargetMissing { kind: &'static str, id: i32 },

    /// The referenced record is not the kind the form declares.
    #[error("Form association type \"{expected}\" does not match the associated object type \"{actual}\".")]
    TypeMismatch { expected: String, actual: String },
}
