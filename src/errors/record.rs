//! Orchestration-level errors returned by the services.

use thiserror::Error;

use super::{AssociationViolation, SchemaViolation};

/// Anything that can abort a batch/bag/form/submission write.
///
/// Violations abort the write with nothing persisted; none are fatal to the
/// process. The HTTP layer maps each variant to a status code.
#[derive(Error, Debug)]
pub enum RecordError {
    #[error(transparent)]
    Schema(#[from] SchemaViolation),

    #[error(transparent)]
    Association(#[from] AssociationViolation),

    /// Mutation attempt on a completed record by a non-privileged actor.
    #[error("{kind} {id} is completed and can only be modified by a privileged actor.")]
    CompletedLocked { kind: &'static str, id: i32 },

    #[error("{kind} with ID {id} not found.")]
    NotFound { kind: &'static str, id: i32 },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl RecordError {
    pub fn not_found(kind: &'static str, id: i32) -> Self {
        Self::NotFound { kind, id }
    }

    /// True for the violation families a caller can correct and retry.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::Schema(_) | Self::Association(_) | Self::CompletedLocked { .. }
        )
    }
}
