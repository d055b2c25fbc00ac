//! Service layer: each service owns a database handle and carries the whole
//! write path for its record kind, including validation and lifecycle rules.

pub mod bag_service;
pub mod batch_service;
pub mod form_service;
pub mod submission_service;

pub use bag_service::{BagInput, BagService};
pub use batch_service::{BatchInput, BatchService};
pub use form_service::{FieldInput, FormInput, FormService, FormWithFields};
pub use submission_service::{SubmissionInput, SubmissionService};

/// Who is performing an operation. Identity and privilege arrive from the
/// transport layer; an absent actor is an anonymous, unprivileged one.
#[derive(Debug, Clone, Copy, Default)]
pub struct Actor {
    pub id: Option<i32>,
    pub privileged: bool,
}

impl Actor {
    pub fn privileged(id: i32) -> Self {
        Self {
            id: Some(id),
            privileged: true,
        }
    }
}
