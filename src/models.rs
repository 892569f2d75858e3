//! Data models for the analytics engine.
//!
//! This module contains the protocol record, the record set the
//! aggregations read from, and the row types they produce.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Processing status of a protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// Case still in progress (`ANDAMENTO_PRE`).
    InProgress,
    /// Case completed (`FINALIZADO`).
    Completed,
    /// Case reclassified to another queue (`RECLASSIFICADO`).
    Reclassified,
    /// Any other value found in the source. Kept, never counted by status.
    Other(String),
}

impl Status {
    /// Whether this is one of the three statuses aggregates partition by.
    pub fn is_known(&self) -> bool {
        !matches!(self, Status::Other(_))
    }

    /// Completed or reclassified: the statuses that close a case.
    pub fn is_closed(&self) -> bool {
        matches!(self, Status::Completed | Status::Reclassified)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::InProgress => write!(f, "ANDAMENTO_PRE"),
            Status::Completed => write!(f, "FINALIZADO"),
            Status::Reclassified => write!(f, "RECLASSIFICADO"),
            Status::Other(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for Status {
    fn from(s: &str) -> Self {
        match s.trim() {
            "ANDAMENTO_PRE" => Status::InProgress,
            "FINALIZADO" => Status::Completed,
            "RECLASSIFICADO" => Status::Reclassified,
            other => Status::Other(other.to_string()),
        }
    }
}

/// A single processed protocol (ticket).
#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolRecord {
    /// Protocol identifier as found in the source, before cleaning.
    pub protocol_id: Option<String>,
    /// Analyst who handled the case.
    pub analyst: String,
    /// Processing status.
    pub status: Status,
    /// Time spent analysing the case. `None` when unparseable or absent.
    pub analysis_duration: Option<Duration>,
    /// When the case moved to its next state. `None` when unparseable.
    pub next_timestamp: Option<NaiveDateTime>,
    /// Work queue ("Carteira"). `None` when the cell is empty.
    pub queue: Option<String>,
}

impl ProtocolRecord {
    /// Creates a record with only the mandatory fields set.
    #[cfg(test)]
    pub fn new(analyst: &str, status: Status) -> Self {
        Self {
            protocol_id: None,
            analyst: analyst.to_string(),
            status,
            analysis_duration: None,
            next_timestamp: None,
            queue: None,
        }
    }
}

/// Optional columns and whether the source carried them at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Columns {
    pub queue: bool,
    pub analysis_duration: bool,
}

impl Default for Columns {
    fn default() -> Self {
        Self {
            queue: true,
            analysis_duration: true,
        }
    }
}

/// Named optional column, used when reporting structural absence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Column {
    Queue,
    AnalysisDuration,
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Column::Queue => write!(f, "Carteira"),
            Column::AnalysisDuration => write!(f, "Tempo de Análise"),
        }
    }
}

/// An immutable, already-loaded batch of records.
#[derive(Debug, Clone, Default)]
pub struct RecordSet {
    records: Vec<ProtocolRecord>,
    columns: Columns,
}

impl RecordSet {
    pub fn new(records: Vec<ProtocolRecord>, columns: Columns) -> Self {
        Self { records, columns }
    }

    /// A record set whose source lacks the queue column.
    #[cfg(test)]
    pub fn without_queue(records: Vec<ProtocolRecord>) -> Self {
        Self::new(
            records,
            Columns {
                queue: false,
                analysis_duration: true,
            },
        )
    }

    pub fn records(&self) -> &[ProtocolRecord] {
        &self.records
    }

    pub fn columns(&self) -> Columns {
        self.columns
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct analyst names, sorted.
    pub fn analysts(&self) -> BTreeSet<&str> {
        self.records.iter().map(|r| r.analyst.as_str()).collect()
    }

    /// The slice of records handled by one analyst, keeping the column layout.
    pub fn for_analyst(&self, analyst: &str) -> RecordSet {
        RecordSet {
            records: self
                .records
                .iter()
                .filter(|r| r.analyst == analyst)
                .cloned()
                .collect(),
            columns: self.columns,
        }
    }

    /// Whether the set holds at most one analyst.
    pub fn is_single_analyst(&self) -> bool {
        self.analysts().len() <= 1
    }
}

/// AHT for one calendar day, in fractional minutes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyAht {
    pub day: NaiveDate,
    pub aht_minutes: f64,
}

/// Mean analysis duration for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyMeanDuration {
    pub day: NaiveDate,
    #[serde(with = "duration_secs::option")]
    pub mean_duration: Option<Duration>,
}

/// Per-analyst AHT row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalystAht {
    pub analyst: String,
    /// `None` when the total overflows.
    #[serde(with = "duration_secs::option")]
    pub total_duration: Option<Duration>,
    /// Records with a parseable duration.
    pub count: usize,
    #[serde(with = "duration_secs::option")]
    pub aht: Option<Duration>,
    pub aht_formatted: String,
}

/// Per-queue AHT row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueueAht {
    pub queue: String,
    pub aht_formatted: String,
}

/// Status counts for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyProductivity {
    pub day: NaiveDate,
    pub in_progress: usize,
    pub completed: usize,
    pub reclassified: usize,
    pub total: usize,
}

/// Headline numbers for one analyst.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalystMetrics {
    pub completed: usize,
    pub reclassified: usize,
    pub in_progress: usize,
    /// `None` when the summed duration overflows.
    #[serde(with = "duration_secs::option")]
    pub mean_duration: Option<Duration>,
}

/// One of the four leaderboard bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QuartileBand {
    First,
    Second,
    Third,
    Fourth,
}

impl QuartileBand {
    /// Band for a 1-based rank position given the band size.
    pub fn for_position(position: usize, size: usize) -> Self {
        if position <= size {
            QuartileBand::First
        } else if position <= 2 * size {
            QuartileBand::Second
        } else if position <= 3 * size {
            QuartileBand::Third
        } else {
            QuartileBand::Fourth
        }
    }

    /// Background color the dashboard paints the band with.
    pub fn color(&self) -> &'static str {
        match self {
            QuartileBand::First => "rgba(135, 206, 250, 0.4)",
            QuartileBand::Second => "rgba(144, 238, 144, 0.4)",
            QuartileBand::Third => "rgba(255, 255, 102, 0.4)",
            QuartileBand::Fourth => "rgba(255, 99, 132, 0.4)",
        }
    }

    /// Returns an emoji representation of the band.
    pub fn emoji(&self) -> &'static str {
        match self {
            QuartileBand::First => "🔵",
            QuartileBand::Second => "🟢",
            QuartileBand::Third => "🟡",
            QuartileBand::Fourth => "🔴",
        }
    }
}

impl fmt::Display for QuartileBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuartileBand::First => write!(f, "Q1"),
            QuartileBand::Second => write!(f, "Q2"),
            QuartileBand::Third => write!(f, "Q3"),
            QuartileBand::Fourth => write!(f, "Q4"),
        }
    }
}

/// Leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedAnalyst {
    /// 1-based rank.
    pub position: usize,
    pub analyst: String,
    pub in_progress: usize,
    pub completed: usize,
    pub reclassified: usize,
    pub total: usize,
    pub band: QuartileBand,
}

/// An outlier protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttentionPoint {
    pub protocol_id: String,
    pub queue: Option<String>,
    /// Analysis time as `M:SS`.
    pub time: String,
}

/// Outcome of the outlier scan when the queue column is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "points", rename_all = "snake_case")]
pub enum Attention {
    Points(Vec<AttentionPoint>),
    /// No protocol crossed its threshold.
    NoData,
}

/// Status counts and AHT for one queue of one analyst.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueBreakdown {
    pub queue: String,
    pub completed: usize,
    pub reclassified: usize,
    pub in_progress: usize,
    pub aht_formatted: String,
}

/// Volume and raw mean duration for one queue of one analyst.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueueVolume {
    pub queue: String,
    pub count: usize,
    #[serde(with = "duration_secs::option")]
    pub mean_duration: Option<Duration>,
}

/// Serializes `chrono::Duration` as fractional seconds.
pub mod duration_secs {
    use chrono::Duration;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.num_milliseconds() as f64 / 1000.0)
    }

    pub mod option {
        use chrono::Duration;
        use serde::Serializer;

        pub fn serialize<S: Serializer>(d: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
            match d {
                Some(d) => super::serialize(d, s),
                None => s.serialize_none(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_str() {
        assert_eq!(Status::from("FINALIZADO"), Status::Completed);
        assert_eq!(Status::from("RECLASSIFICADO"), Status::Reclassified);
        assert_eq!(Status::from(" ANDAMENTO_PRE "), Status::InProgress);
        assert_eq!(
            Status::from("CANCELADO"),
            Status::Other("CANCELADO".to_string())
        );
        assert!(!Status::from("CANCELADO").is_known());
    }

    #[test]
    fn test_status_display_roundtrips_source_labels() {
        for label in ["FINALIZADO", "RECLASSIFICADO", "ANDAMENTO_PRE", "PENDENTE"] {
            assert_eq!(Status::from(label).to_string(), label);
        }
    }

    #[test]
    fn test_quartile_band_for_position() {
        assert_eq!(QuartileBand::for_position(1, 3), QuartileBand::First);
        assert_eq!(QuartileBand::for_position(3, 3), QuartileBand::First);
        assert_eq!(QuartileBand::for_position(4, 3), QuartileBand::Second);
        assert_eq!(QuartileBand::for_position(7, 3), QuartileBand::Third);
        assert_eq!(QuartileBand::for_position(10, 3), QuartileBand::Fourth);
        assert_eq!(QuartileBand::for_position(40, 4), QuartileBand::Fourth);
    }

    #[test]
    fn test_for_analyst_keeps_columns() {
        let set = RecordSet::without_queue(vec![
            ProtocolRecord::new("ana", Status::Completed),
            ProtocolRecord::new("bruno", Status::Completed),
            ProtocolRecord::new("ana", Status::InProgress),
        ]);

        let ana = set.for_analyst("ana");
        assert_eq!(ana.len(), 2);
        assert!(!ana.columns().queue);
        assert!(ana.is_single_analyst());
        assert!(!set.is_single_analyst());
    }

    #[test]
    fn test_attention_serializes_tagged() {
        let json = serde_json::to_string(&Attention::NoData).unwrap();
        assert!(json.contains("no_data"));
    }
}
