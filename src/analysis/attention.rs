//! Outlier protocols ("points of attention").

use super::normalize::{clean_protocol_id, format_minutes_seconds};
use crate::error::AnalysisError;
use crate::models::{Attention, AttentionPoint, Column, ProtocolRecord, RecordSet};
use chrono::Duration;
use tracing::debug;

/// Duration limits above which a protocol needs attention.
#[derive(Debug, Clone, PartialEq)]
pub struct AttentionThresholds {
    /// Queue held to the tighter limit.
    pub priority_queue: String,
    pub priority_threshold: Duration,
    /// Limit for every other queue, empty queue cells included.
    pub default_threshold: Duration,
}

impl Default for AttentionThresholds {
    fn default() -> Self {
        Self {
            priority_queue: "JV ITAU BMG".to_string(),
            priority_threshold: Duration::minutes(2),
            default_threshold: Duration::minutes(5),
        }
    }
}

impl AttentionThresholds {
    fn is_priority(&self, record: &ProtocolRecord) -> bool {
        record.queue.as_deref() == Some(self.priority_queue.as_str())
    }
}

/// Protocols whose analysis took strictly longer than their queue's limit.
///
/// Priority-queue rows come first, then the rest, each in input order.
/// Rows without a protocol id are dropped from the listing.
pub fn points_of_attention(
    set: &RecordSet,
    thresholds: &AttentionThresholds,
) -> Result<Attention, AnalysisError> {
    if !set.columns().queue {
        return Err(AnalysisError::missing(Column::Queue));
    }

    let exceeds = |record: &&ProtocolRecord, limit: Duration| {
        record.analysis_duration.is_some_and(|d| d > limit)
    };

    let priority = set
        .records()
        .iter()
        .filter(|r| thresholds.is_priority(r))
        .filter(|r| exceeds(r, thresholds.priority_threshold));
    let others = set
        .records()
        .iter()
        .filter(|r| !thresholds.is_priority(r))
        .filter(|r| exceeds(r, thresholds.default_threshold));

    let flagged: Vec<&ProtocolRecord> = priority.chain(others).collect();
    if flagged.is_empty() {
        return Ok(Attention::NoData);
    }

    let points: Vec<AttentionPoint> = flagged
        .into_iter()
        .filter_map(|record| {
            let raw_id = record.protocol_id.as_deref()?;
            let duration = record.analysis_duration?;
            Some(AttentionPoint {
                protocol_id: clean_protocol_id(raw_id),
                queue: record.queue.clone(),
                time: format_minutes_seconds(duration),
            })
        })
        .collect();

    debug!("{} protocols over their attention threshold", points.len());
    Ok(Attention::Points(points))
}
