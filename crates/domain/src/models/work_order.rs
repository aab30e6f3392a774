//! Work order domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status token of urgent work waiting to be handled.
pub const STATUS_HIGH_PRIORITY: &str = "HIGH_PRIORITY";

/// Status token of finished work.
pub const STATUS_COMPLETED: &str = "COMPLETED";

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// A unit of field-service work.
///
/// `status` is kept as the raw token stored by the backend; tokens other
/// than the ones named above are valid and carried verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct WorkOrderRecord {
    pub status: String,
    pub archived: bool,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl WorkOrderRecord {
    pub fn is_high_priority_pending(&self) -> bool {
        self.status == STATUS_HIGH_PRIORITY && !self.archived
    }

    /// Whether this record is completed work finished at or after `since`.
    pub fn is_completed_since(&self, since: DateTime<Utc>) -> bool {
        self.status == STATUS_COMPLETED && self.completed_at.is_some_and(|at| at >= since)
    }
}

/// Timestamps of one completed work order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CompletedWorkRecord {
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl CompletedWorkRecord {
    pub fn new(started_at: Option<DateTime<Utc>>, completed_at: Option<DateTime<Utc>>) -> Self {
        Self {
            started_at,
            completed_at,
        }
    }

    /// Elapsed hours between start and completion, with millisecond precision.
    ///
    /// `None` when either timestamp is missing or completion precedes the start.
    pub fn duration_hours(&self) -> Option<f64> {
        let (start, end) = (self.started_at?, self.completed_at?);
        let millis = (end - start).num_milliseconds();
        if millis < 0 {
            return None;
        }
        Some(millis as f64 / MILLIS_PER_HOUR)
    }
}

impl From<&WorkOrderRecord> for CompletedWorkRecord {
    fn from(record: &WorkOrderRecord) -> Self {
        Self {
            started_at: record.started_at,
            completed_at: record.completed_at,
        }
    }
}
