//! Record lifecycle: status transitions, completion stamping, mutation guard.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a batch or bag. Any status may move to completed;
/// completed is terminal for stamping purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Draft,
    Working,
    Completed,
}

impl Status {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(Self::Draft),
            "working" => Some(Self::Working),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Working => "working",
            Self::Completed => "completed",
        }
    }
}

/// Decide the `completed_at` value for a save.
///
/// The stamp is written exactly once, on the first transition into
/// completed. Once a record has been completed the stored timestamp is kept
/// whatever the save does, so repeated completed saves never re-stamp and a
/// privileged edit away from completed never clears it.
pub fn completed_at_for_save(
    prior_status: Option<Status>,
    prior_completed_at: Option<DateTime<Utc>>,
    next_status: Status,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    match prior_status {
        Some(Status::Completed) => prior_completed_at,
        _ if next_status == Status::Completed => Some(now),
        _ => prior_completed_at,
    }
}

/// Per-object mutation guard: completed records are read-only for
/// non-privileged actors.
pub fn can_modify(current: Status, privileged: bool) -> bool {
    privileged || current != Status::Completed
}

/// The display code a batch gets at creation, derived solely from its
/// allocated id. Assigned once, after the insert, never changed.
pub fn batch_code(id: i32) -> String {
    format!("BATCH{id}")
}
