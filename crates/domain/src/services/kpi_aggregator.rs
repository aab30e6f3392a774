//! KPI aggregation.
//!
//! Turns the raw record sets fetched from the backend into a [`KpiSummary`].
//! The four inputs are fetched concurrently and joined before the summary is
//! assembled. A section whose fetch fails, times out or returns nothing
//! contributes its zero/empty value; only an unreachable backend aborts the
//! whole computation. A timed-out fetch is followed by a ping, so a backend
//! that hangs instead of refusing connections still counts as unreachable.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use shared::clock::Clock;
use shared::rounding::average_to_tenth;

use crate::models::kpi::{DEFAULT_WINDOW_DAYS, PLACEHOLDER_ON_TIME_RATE};
use crate::models::{CompletedWorkRecord, DashboardSnapshot, KpiSection, KpiSummary};
use crate::services::data_source::{KpiDataSource, SourceError};

/// Default deadline for a single backend fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// The fetch layer could not be used at all; no summary was produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Aggregation failed while fetching {section}: {reason}")]
pub struct AggregationFailed {
    pub section: KpiSection,
    pub reason: String,
}

/// Tuning for [`KpiAggregator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregatorSettings {
    /// Length of the trailing window for completed work.
    pub window_days: i64,
    /// Deadline applied to each fetch independently.
    pub fetch_timeout: Duration,
}

impl Default for AggregatorSettings {
    fn default() -> Self {
        Self {
            window_days: DEFAULT_WINDOW_DAYS,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }
}

/// Raw inputs of a summary, as returned by the data source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KpiInputs {
    pub active_technicians: Option<u64>,
    pub high_priority_pending: Option<u64>,
    pub statuses: Option<Vec<String>>,
    pub completed: Option<Vec<CompletedWorkRecord>>,
}

/// Fold raw inputs into a summary.
///
/// Completed records finished before `window_start` are ignored even if the
/// source returned them.
pub fn summarize(inputs: &KpiInputs, window_start: DateTime<Utc>) -> KpiSummary {
    let completed: Vec<CompletedWorkRecord> = inputs
        .completed
        .as_deref()
        .unwrap_or_default()
        .iter()
        .filter(|r| r.completed_at.is_some_and(|at| at >= window_start))
        .copied()
        .collect();

    KpiSummary {
        active_technicians: inputs.active_technicians.unwrap_or(0),
        high_priority_pending: inputs.high_priority_pending.unwrap_or(0),
        on_time_completion_rate: on_time_completion_rate(&completed),
        avg_work_duration_hours: average_duration_hours(&completed),
        works_by_status: count_by_status(inputs.statuses.as_deref().unwrap_or_default()),
    }
}

/// Occurrences of each status token. Tokens are kept verbatim.
pub fn count_by_status(statuses: &[String]) -> BTreeMap<String, u64> {
    statuses.iter().fold(BTreeMap::new(), |mut acc, status| {
        *acc.entry(status.clone()).or_insert(0) += 1;
        acc
    })
}

/// Mean duration in hours over records that have both timestamps,
/// rounded to one decimal. Records without a usable duration are left out of
/// both the sum and the divisor.
pub fn average_duration_hours(completed: &[CompletedWorkRecord]) -> f64 {
    let (total, count) = completed
        .iter()
        .filter_map(CompletedWorkRecord::duration_hours)
        .fold((0.0_f64, 0_usize), |(sum, n), hours| (sum + hours, n + 1));
    average_to_tenth(total, count)
}

/// Placeholder on-time rate: [`PLACEHOLDER_ON_TIME_RATE`] when any work was
/// completed in the window, otherwise 0.
pub fn on_time_completion_rate(completed: &[CompletedWorkRecord]) -> u8 {
    if completed.is_empty() {
        0
    } else {
        PLACEHOLDER_ON_TIME_RATE
    }
}

/// Outcome of one guarded fetch.
enum Fetched<T> {
    Value(Option<T>),
    Defaulted(String),
    TimedOut(String),
    Fatal(String),
}

impl<T> Fetched<T> {
    fn timed_out(&self) -> bool {
        matches!(self, Fetched::TimedOut(_))
    }
}

/// Computes dashboard KPIs from a data source.
#[derive(Clone)]
pub struct KpiAggregator {
    source: Arc<dyn KpiDataSource>,
    clock: Arc<dyn Clock>,
    settings: AggregatorSettings,
}

impl KpiAggregator {
    pub fn new(
        source: Arc<dyn KpiDataSource>,
        clock: Arc<dyn Clock>,
        settings: AggregatorSettings,
    ) -> Self {
        Self {
            source,
            clock,
            settings,
        }
    }

    pub fn settings(&self) -> AggregatorSettings {
        self.settings
    }

    /// Compute the KPI summary.
    pub async fn compute_summary(&self) -> Result<KpiSummary, AggregationFailed> {
        self.compute_snapshot().await.map(|snapshot| snapshot.summary)
    }

    /// Compute the KPI summary along with the window it covers and the list
    /// of sections that had to be defaulted.
    pub async fn compute_snapshot(&self) -> Result<DashboardSnapshot, AggregationFailed> {
        let generated_at = self.clock.now();
        let window_start = generated_at - ChronoDuration::days(self.settings.window_days);

        // Fan out; dropping this future abandons all four fetches.
        let (technicians, high_priority, statuses, completed) = tokio::join!(
            self.guarded(
                KpiSection::ActiveTechnicians,
                self.source.count_active_technicians()
            ),
            self.guarded(
                KpiSection::HighPriorityPending,
                self.source.count_pending_high_priority()
            ),
            self.guarded(KpiSection::WorksByStatus, self.source.list_active_statuses()),
            self.guarded(
                KpiSection::CompletedWorks,
                self.source.list_completed_since(window_start)
            ),
        );

        let first_timeout = [
            (KpiSection::ActiveTechnicians, technicians.timed_out()),
            (KpiSection::HighPriorityPending, high_priority.timed_out()),
            (KpiSection::WorksByStatus, statuses.timed_out()),
            (KpiSection::CompletedWorks, completed.timed_out()),
        ]
        .into_iter()
        .find_map(|(section, timed_out)| timed_out.then_some(section));
        if let Some(section) = first_timeout {
            self.ensure_reachable(section).await?;
        }

        let mut degraded = Vec::new();
        let inputs = KpiInputs {
            active_technicians: absorb(KpiSection::ActiveTechnicians, technicians, &mut degraded)?,
            high_priority_pending: absorb(
                KpiSection::HighPriorityPending,
                high_priority,
                &mut degraded,
            )?,
            statuses: absorb(KpiSection::WorksByStatus, statuses, &mut degraded)?,
            completed: absorb(KpiSection::CompletedWorks, completed, &mut degraded)?,
        };

        let summary = summarize(&inputs, window_start);

        tracing::debug!(
            active_technicians = summary.active_technicians,
            high_priority_pending = summary.high_priority_pending,
            avg_work_duration_hours = summary.avg_work_duration_hours,
            open_works = summary.total_open_works(),
            degraded_sections = degraded.len(),
            "Computed KPI summary"
        );

        Ok(DashboardSnapshot {
            summary,
            degraded_sections: degraded,
            window_start,
            generated_at,
        })
    }

    async fn guarded<T, F>(&self, section: KpiSection, fetch: F) -> Fetched<T>
    where
        F: Future<Output = Result<Option<T>, SourceError>>,
    {
        match tokio::time::timeout(self.settings.fetch_timeout, fetch).await {
            Ok(Ok(value)) => Fetched::Value(value),
            Ok(Err(err)) if err.is_fatal() => Fetched::Fatal(err.to_string()),
            Ok(Err(err)) => Fetched::Defaulted(err.to_string()),
            Err(_) => Fetched::TimedOut(format!(
                "fetch timed out after {}ms",
                self.settings.fetch_timeout.as_millis()
            )),
        }
    }

    /// Ping the source under the fetch deadline; any failure is fatal.
    async fn ensure_reachable(&self, section: KpiSection) -> Result<(), AggregationFailed> {
        let ping = tokio::time::timeout(self.settings.fetch_timeout, self.source.ping()).await;
        let reason = match ping {
            Ok(Ok(())) => return Ok(()),
            Ok(Err(err)) => err.to_string(),
            Err(_) => format!(
                "ping timed out after {}ms",
                self.settings.fetch_timeout.as_millis()
            ),
        };
        let reason = format!("fetch timed out and backend is unreachable: {}", reason);
        tracing::error!(section = %section, error = %reason, "KPI aggregation failed");
        Err(AggregationFailed { section, reason })
    }
}

fn absorb<T>(
    section: KpiSection,
    fetched: Fetched<T>,
    degraded: &mut Vec<KpiSection>,
) -> Result<Option<T>, AggregationFailed> {
    match fetched {
        Fetched::Value(value) => {
            if value.is_none() {
                tracing::warn!(section = %section, "KPI source returned no value, using default");
            }
            Ok(value)
        }
        Fetched::Defaulted(reason) | Fetched::TimedOut(reason) => {
            tracing::warn!(section = %section, error = %reason, "KPI section defaulted");
            degraded.push(section);
            Ok(None)
        }
        Fetched::Fatal(reason) => {
            tracing::error!(section = %section, error = %reason, "KPI aggregation failed");
            Err(AggregationFailed { section, reason })
        }
    }
}
