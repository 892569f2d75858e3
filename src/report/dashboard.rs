//! Assembles every aggregation into one report structure.

use crate::analysis::{
    aht_by_analyst, aht_by_day, aht_by_queue, analyst_aht_by_day, analyst_average_duration,
    analyst_metrics, daily_productivity, format_duration, points_of_attention, queue_volume_summary,
    queues_for_analyst, rank_analysts, team_aht, AttentionThresholds,
};
use crate::error::AnalysisError;
use crate::models::{
    duration_secs, AnalystAht, AnalystMetrics, Attention, DailyAht, DailyMeanDuration,
    DailyProductivity, QueueAht, QueueBreakdown, QueueVolume, RankedAnalyst, RecordSet,
};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{debug, warn};

/// A table that may be structurally unavailable.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum Section<T> {
    Available(T),
    Unavailable(String),
}

impl<T> From<Result<T, AnalysisError>> for Section<T> {
    fn from(result: Result<T, AnalysisError>) -> Self {
        match result {
            Ok(value) => Section::Available(value),
            Err(e) => {
                warn!("{}", e);
                Section::Unavailable(e.to_string())
            }
        }
    }
}

/// What to include and how to judge it.
#[derive(Debug, Clone)]
pub struct DashboardOptions {
    /// Where the records came from, for the report header.
    pub source: String,
    /// Analyst to build the individual view for.
    pub analyst: Option<String>,
    /// Leaderboard selection; `None` ranks everyone.
    pub ranked: Option<Vec<String>>,
    pub thresholds: AttentionThresholds,
    pub unknown_queue: String,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            source: String::new(),
            analyst: None,
            ranked: None,
            thresholds: AttentionThresholds::default(),
            unknown_queue: crate::analysis::UNKNOWN_QUEUE.to_string(),
        }
    }
}

/// Metadata about the report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    pub source: String,
    pub generated_at: DateTime<Utc>,
    pub total_records: usize,
    pub analysts: usize,
    #[serde(with = "duration_secs::option")]
    pub team_aht: Option<Duration>,
    pub team_aht_formatted: String,
}

/// Individual view of one analyst.
#[derive(Debug, Clone, Serialize)]
pub struct AnalystView {
    pub analyst: String,
    pub average_duration: String,
    pub metrics: Section<AnalystMetrics>,
    pub aht_by_day: Vec<DailyMeanDuration>,
    pub queues: Vec<QueueBreakdown>,
    pub queue_volumes: Vec<QueueVolume>,
}

/// Everything the rendering layer needs.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub metadata: ReportMetadata,
    pub aht_by_day: Vec<DailyAht>,
    pub daily_productivity: Vec<DailyProductivity>,
    pub aht_by_analyst: Vec<AnalystAht>,
    pub aht_by_queue: Section<Vec<QueueAht>>,
    pub ranking: Vec<RankedAnalyst>,
    pub points_of_attention: Section<Attention>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analyst: Option<AnalystView>,
}

impl Dashboard {
    /// Run every query over `set`.
    pub fn build(set: &RecordSet, options: &DashboardOptions) -> Self {
        let analysts = set.analysts();
        let team = team_aht(set);

        let ranking = match options.ranked {
            Some(ref selected) => rank_analysts(set, selected),
            None => {
                let everyone: Vec<&str> = analysts.iter().copied().collect();
                rank_analysts(set, &everyone)
            }
        };

        let metadata = ReportMetadata {
            source: options.source.clone(),
            generated_at: Utc::now(),
            total_records: set.len(),
            analysts: analysts.len(),
            team_aht: team,
            team_aht_formatted: format_duration(team),
        };

        let analyst = options
            .analyst
            .as_deref()
            .map(|name| build_analyst_view(set, name, &options.unknown_queue));

        debug!(
            "Dashboard built: {} records, {} ranked analysts",
            set.len(),
            ranking.len()
        );

        Dashboard {
            metadata,
            aht_by_day: aht_by_day(set),
            daily_productivity: daily_productivity(set),
            aht_by_analyst: aht_by_analyst(set),
            aht_by_queue: aht_by_queue(set).into(),
            ranking,
            points_of_attention: points_of_attention(set, &options.thresholds).into(),
            analyst,
        }
    }
}

fn build_analyst_view(set: &RecordSet, name: &str, unknown_queue: &str) -> AnalystView {
    let analyst_set = set.for_analyst(name);
    if analyst_set.is_empty() {
        warn!("No records for analyst '{}'", name);
    }

    AnalystView {
        analyst: name.to_string(),
        average_duration: analyst_average_duration(&analyst_set),
        metrics: analyst_metrics(&analyst_set, unknown_queue).into(),
        aht_by_day: analyst_aht_by_day(&analyst_set),
        queues: queues_for_analyst(&analyst_set),
        queue_volumes: queue_volume_summary(&analyst_set),
    }
}
