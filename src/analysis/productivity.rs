//! Throughput counts per day and per analyst.

use super::normalize::day_bucket;
use super::{checked_total, divide, StatusCounts};
use crate::error::AnalysisError;
use crate::models::{AnalystMetrics, Column, DailyProductivity, RecordSet, Status};
use chrono::{Duration, NaiveDate};
use std::collections::BTreeMap;
use tracing::debug;

/// Queue label used for records whose queue could not be identified.
pub const UNKNOWN_QUEUE: &str = "Desconhecida";

/// Status counts per calendar day.
///
/// Records without a timestamp are dropped. Unknown statuses do not
/// count, so a day holding only those shows up with zeros.
pub fn daily_productivity(set: &RecordSet) -> Vec<DailyProductivity> {
    let mut by_day: BTreeMap<NaiveDate, StatusCounts> = BTreeMap::new();
    let mut unknown = 0usize;

    for record in set.records() {
        let Some(ts) = record.next_timestamp else {
            continue;
        };
        if !record.status.is_known() {
            unknown += 1;
        }
        by_day.entry(day_bucket(ts)).or_default().add(&record.status);
    }

    if unknown > 0 {
        debug!("{} records with an unknown status left out of daily counts", unknown);
    }

    by_day
        .into_iter()
        .map(|(day, counts)| DailyProductivity {
            day,
            in_progress: counts.in_progress,
            completed: counts.completed,
            reclassified: counts.reclassified,
            total: counts.total(),
        })
        .collect()
}

/// Headline counts and mean duration for one analyst.
///
/// Completed and reclassified counts skip records in `unknown_queue`;
/// the in-progress count does not. The mean divides the summed duration
/// of completed and reclassified records by their row count and is zero
/// when there are none, `None` when the sum overflows.
pub fn analyst_metrics(
    analyst_set: &RecordSet,
    unknown_queue: &str,
) -> Result<AnalystMetrics, AnalysisError> {
    debug_assert!(analyst_set.is_single_analyst());

    if !analyst_set.columns().queue {
        return Err(AnalysisError::missing(Column::Queue));
    }

    let closed: Vec<_> = analyst_set
        .records()
        .iter()
        .filter(|r| r.queue.as_deref() != Some(unknown_queue))
        .filter(|r| r.status.is_closed())
        .collect();

    let completed = closed
        .iter()
        .filter(|r| r.status == Status::Completed)
        .count();
    let reclassified = closed.len() - completed;
    let in_progress = analyst_set
        .records()
        .iter()
        .filter(|r| r.status == Status::InProgress)
        .count();

    let total_time = checked_total(closed.iter().filter_map(|r| r.analysis_duration));
    let mean_duration = if closed.is_empty() {
        Some(Duration::zero())
    } else {
        total_time.and_then(|total| divide(total, closed.len()))
    };

    Ok(AnalystMetrics {
        completed,
        reclassified,
        in_progress,
        mean_duration,
    })
}
