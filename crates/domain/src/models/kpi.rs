//! Dashboard KPI domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Length of the trailing window for completed work, in days.
pub const DEFAULT_WINDOW_DAYS: i64 = 30;

/// Value reported as the on-time completion rate whenever any work was
/// completed in the window.
///
/// This is a fixed placeholder, not a computed SLA metric: no due date is
/// consulted.
pub const PLACEHOLDER_ON_TIME_RATE: u8 = 85;

/// Operational metrics shown on the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct KpiSummary {
    pub active_technicians: u64,
    pub high_priority_pending: u64,
    /// Percentage in `0..=100`. See [`PLACEHOLDER_ON_TIME_RATE`].
    pub on_time_completion_rate: u8,
    /// Mean duration of completed work in hours, one decimal.
    pub avg_work_duration_hours: f64,
    pub works_by_status: BTreeMap<String, u64>,
}

impl KpiSummary {
    /// Total number of non-archived work orders counted by status.
    pub fn total_open_works(&self) -> u64 {
        self.works_by_status.values().sum()
    }
}

/// One of the independently fetched inputs of the summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KpiSection {
    ActiveTechnicians,
    HighPriorityPending,
    WorksByStatus,
    CompletedWorks,
}

impl KpiSection {
    pub const ALL: [KpiSection; 4] = [
        KpiSection::ActiveTechnicians,
        KpiSection::HighPriorityPending,
        KpiSection::WorksByStatus,
        KpiSection::CompletedWorks,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            KpiSection::ActiveTechnicians => "active_technicians",
            KpiSection::HighPriorityPending => "high_priority_pending",
            KpiSection::WorksByStatus => "works_by_status",
            KpiSection::CompletedWorks => "completed_works",
        }
    }
}

impl fmt::Display for KpiSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A computed summary plus the context it was computed in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DashboardSnapshot {
    pub summary: KpiSummary,
    /// Sections whose fetch failed or timed out and were reported as zero/empty.
    pub degraded_sections: Vec<KpiSection>,
    pub window_start: DateTime<Utc>,
    pub generated_at: DateTime<Utc>,
}

impl DashboardSnapshot {
    /// Whether every section was fetched successfully.
    pub fn is_complete(&self) -> bool {
        self.degraded_sections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kpi_summary_default() {
        let summary = KpiSummary::default();
        assert_eq!(summary.active_technicians, 0);
        assert_eq!(summary.high_priority_pending, 0);
        assert_eq!(summary.on_time_completion_rate, 0);
        assert_eq!(summary.avg_work_duration_hours, 0.0);
        assert!(summary.works_by_status.is_empty());
        assert_eq!(summary.total_open_works(), 0);
    }

    #[test]
    fn test_total_open_works() {
        let mut summary = KpiSummary::default();
        summary.works_by_status.insert("PENDING".to_string(), 4);
        summary.works_by_status.insert("IN_PROGRESS".to_string(), 2);
        assert_eq!(summary.total_open_works(), 6);
    }

    #[test]
    fn test_kpi_summary_serialization() {
        let mut summary = KpiSummary {
            active_technicians: 3,
            high_priority_pending: 1,
            on_time_completion_rate: 85,
            avg_work_duration_hours: 2.5,
            ..Default::default()
        };
        summary.works_by_status.insert("COMPLETED".to_string(), 7);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["active_technicians"], 3);
        assert_eq!(json["high_priority_pending"], 1);
        assert_eq!(json["on_time_completion_rate"], 85);
        assert_eq!(json["avg_work_duration_hours"], 2.5);
        assert_eq!(json["works_by_status"]["COMPLETED"], 7);
    }

    #[test]
    fn test_kpi_section_display() {
        assert_eq!(KpiSection::ActiveTechnicians.to_string(), "active_technicians");
        assert_eq!(KpiSection::CompletedWorks.to_string(), "completed_works");
        let json = serde_json::to_string(&KpiSection::WorksByStatus).unwrap();
        assert_eq!(json, "\"works_by_status\"");
    }

    #[test]
    fn test_snapshot_is_complete() {
        let now = Utc::now();
        let mut snapshot = DashboardSnapshot {
            summary: KpiSummary::default(),
            degraded_sections: vec![],
            window_start: now - chrono::Duration::days(DEFAULT_WINDOW_DAYS),
            generated_at: now,
        };
        assert!(snapshot.is_complete());

        snapshot.degraded_sections.push(KpiSection::HighPriorityPending);
        assert!(!snapshot.is_complete());
    }
}
