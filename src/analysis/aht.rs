//! Average handling time (TMO) by day, analyst and queue.

use super::normalize::{day_bucket, format_duration, format_minutes_seconds};
use super::{divide, mean_duration, sum_durations};
use crate::error::AnalysisError;
use crate::models::{
    AnalystAht, Column, DailyAht, DailyMeanDuration, ProtocolRecord, QueueAht, RecordSet, Status,
};
use chrono::{Duration, NaiveDate};
use std::collections::BTreeMap;
use tracing::debug;

/// Returned by [`analyst_average_duration`] when there is nothing to average.
pub const NO_DATA_FOUND: &str = "no data found";

/// Group records by calendar day, dropping those without a timestamp.
fn group_by_day<'a, I>(records: I) -> BTreeMap<NaiveDate, Vec<&'a ProtocolRecord>>
where
    I: IntoIterator<Item = &'a ProtocolRecord>,
{
    let mut grouped: BTreeMap<NaiveDate, Vec<&ProtocolRecord>> = BTreeMap::new();

    for record in records {
        if let Some(ts) = record.next_timestamp {
            grouped.entry(day_bucket(ts)).or_default().push(record);
        }
    }

    grouped
}

/// Daily AHT of completed cases, in fractional minutes.
///
/// Days with no completed case carrying a duration are left out rather
/// than reported as zero.
pub fn aht_by_day(set: &RecordSet) -> Vec<DailyAht> {
    let completed = set
        .records()
        .iter()
        .filter(|r| r.status == Status::Completed);

    group_by_day(completed)
        .into_iter()
        .filter_map(|(day, records)| {
            let (total, count) = sum_durations(records);
            if count == 0 {
                return None;
            }
            let total = total?;
            let minutes = total.num_milliseconds() as f64 / 60_000.0;
            Some(DailyAht {
                day,
                aht_minutes: minutes / count as f64,
            })
        })
        .collect()
}

/// Daily mean duration of every record of one analyst, whatever the status.
pub fn analyst_aht_by_day(analyst_set: &RecordSet) -> Vec<DailyMeanDuration> {
    debug_assert!(analyst_set.is_single_analyst());

    group_by_day(analyst_set.records())
        .into_iter()
        .map(|(day, records)| DailyMeanDuration {
            day,
            mean_duration: mean_duration(records),
        })
        .collect()
}

/// AHT per analyst over all records, sorted by analyst name.
pub fn aht_by_analyst(set: &RecordSet) -> Vec<AnalystAht> {
    let mut grouped: BTreeMap<&str, Vec<&ProtocolRecord>> = BTreeMap::new();
    for record in set.records() {
        grouped.entry(record.analyst.as_str()).or_default().push(record);
    }

    grouped
        .into_iter()
        .map(|(analyst, records)| {
            let (total_duration, count) = sum_durations(records);
            let aht = total_duration.and_then(|total| divide(total, count));
            AnalystAht {
                analyst: analyst.to_string(),
                total_duration,
                count,
                aht,
                aht_formatted: format_minutes_seconds(aht.unwrap_or_else(Duration::zero)),
            }
        })
        .collect()
}

/// AHT per queue, formatted `M:SS`.
///
/// Records with an empty queue cell are not grouped. Queues with no
/// parseable duration are left out.
pub fn aht_by_queue(set: &RecordSet) -> Result<Vec<QueueAht>, AnalysisError> {
    let columns = set.columns();
    let mut missing = Vec::new();
    if !columns.queue {
        missing.push(Column::Queue);
    }
    if !columns.analysis_duration {
        missing.push(Column::AnalysisDuration);
    }
    if !missing.is_empty() {
        return Err(AnalysisError::MissingColumns { columns: missing });
    }

    let mut grouped: BTreeMap<&str, Vec<&ProtocolRecord>> = BTreeMap::new();
    for record in set.records() {
        if let Some(queue) = record.queue.as_deref() {
            grouped.entry(queue).or_default().push(record);
        }
    }

    Ok(grouped
        .into_iter()
        .filter_map(|(queue, records)| {
            mean_duration(records).map(|aht| QueueAht {
                queue: queue.to_string(),
                aht_formatted: format_minutes_seconds(aht),
            })
        })
        .collect())
}

/// Team AHT: mean duration of completed cases.
pub fn team_aht(set: &RecordSet) -> Option<Duration> {
    let aht = mean_duration(
        set.records()
            .iter()
            .filter(|r| r.status == Status::Completed),
    );
    debug!("Team AHT over {} records: {:?}", set.len(), aht);
    aht
}

/// Mean duration of one analyst over the three known statuses, as
/// `"<m> min <s>s"`, or [`NO_DATA_FOUND`].
pub fn analyst_average_duration(analyst_set: &RecordSet) -> String {
    debug_assert!(analyst_set.is_single_analyst());

    match mean_duration(analyst_set.records().iter().filter(|r| r.status.is_known())) {
        Some(mean) => format_duration(Some(mean)),
        None => NO_DATA_FOUND.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::testing::{on_day, record};
    use crate::models::Columns;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn test_aht_by_day_completed_only() {
        let set = RecordSet::new(
            vec![
                on_day(record("a", "FINALIZADO", "0:02:00", None), "01/03/2024 09:00:00"),
                on_day(record("b", "FINALIZADO", "0:04:00", None), "01/03/2024 17:30:00"),
                on_day(record("a", "RECLASSIFICADO", "0:30:00", None), "01/03/2024 10:00:00"),
                on_day(record("a", "ANDAMENTO_PRE", "0:10:00", None), "02/03/2024 10:00:00"),
                on_day(record("a", "FINALIZADO", "0:01:30", None), "03/03/2024 08:00:00"),
                record("a", "FINALIZADO", "0:09:00", None),
            ],
            Columns::default(),
        );

        let daily = aht_by_day(&set);

        assert_eq!(
            daily,
            vec![
                DailyAht { day: day(1), aht_minutes: 3.0 },
                DailyAht { day: day(3), aht_minutes: 1.5 },
            ]
        );
    }

    #[test]
    fn test_aht_by_day_skips_days_without_durations() {
        let set = RecordSet::new(
            vec![on_day(record("a", "FINALIZADO", "??", None), "01/03/2024 09:00:00")],
            Columns::default(),
        );
        assert!(aht_by_day(&set).is_empty());
    }

    #[test]
    fn test_aggregations_survive_overflowing_durations() {
        let huge = "1388888888888:00:00";
        let set = RecordSet::new(
            vec![
                on_day(record("a", "FINALIZADO", huge, Some("Q1")), "01/03/2024 09:00:00"),
                on_day(record("a", "FINALIZADO", huge, Some("Q1")), "01/03/2024 10:00:00"),
            ],
            Columns::default(),
        );

        assert_eq!(team_aht(&set), None);
        assert!(aht_by_day(&set).is_empty());
        assert!(aht_by_queue(&set).unwrap().is_empty());

        let rows = aht_by_analyst(&set);
        assert_eq!(rows[0].count, 2);
        assert_eq!(rows[0].total_duration, None);
        assert_eq!(rows[0].aht_formatted, "0:00");
    }

    #[test]
    fn test_aht_by_analyst_scenario() {
        let set = RecordSet::new(
            vec![
                record("A", "FINALIZADO", "2:00", Some("Q1")),
                record("A", "FINALIZADO", "4:00", Some("Q1")),
            ],
            Columns::default(),
        );

        let rows = aht_by_analyst(&set);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].analyst, "A");
        assert_eq!(rows[0].count, 2);
        assert_eq!(rows[0].total_duration, Some(Duration::minutes(6)));
        assert_eq!(rows[0].aht, Some(Duration::minutes(3)));
        assert_eq!(rows[0].aht_formatted, "3:00");
    }

    #[test]
    fn test_aht_by_analyst_includes_every_status() {
        let set = RecordSet::new(
            vec![
                record("bia", "ANDAMENTO_PRE", "0:01:00", None),
                record("bia", "PENDENTE", "0:03:00", None),
                record("ana", "FINALIZADO", "bad", None),
            ],
            Columns::default(),
        );

        let rows = aht_by_analyst(&set);

        assert_eq!(rows[0].analyst, "ana");
        assert_eq!(rows[0].count, 0);
        assert_eq!(rows[0].aht, None);
        assert_eq!(rows[0].aht_formatted, "0:00");
        assert_eq!(rows[1].analyst, "bia");
        assert_eq!(rows[1].aht_formatted, "2:00");
    }

    #[test]
    fn test_aht_by_queue() {
        let set = RecordSet::new(
            vec![
                record("a", "FINALIZADO", "0:01:00", Some("JV ITAU BMG")),
                record("b", "RECLASSIFICADO", "0:02:00", Some("JV ITAU BMG")),
                record("a", "FINALIZADO", "0:10:15", Some("CONSIGNADO")),
                record("a", "FINALIZADO", "0:07:00", None),
            ],
            Columns::default(),
        );

        let rows = aht_by_queue(&set).unwrap();

        assert_eq!(
            rows,
            vec![
                QueueAht { queue: "CONSIGNADO".into(), aht_formatted: "10:15".into() },
                QueueAht { queue: "JV ITAU BMG".into(), aht_formatted: "1:30".into() },
            ]
        );
    }

    #[test]
    fn test_aht_by_queue_requires_columns() {
        let set = RecordSet::without_queue(vec![record("a", "FINALIZADO", "0:01:00", None)]);
        assert_eq!(
            aht_by_queue(&set),
            Err(AnalysisError::missing(Column::Queue))
        );

        let set = RecordSet::new(
            vec![],
            Columns { queue: false, analysis_duration: false },
        );
        assert_eq!(
            aht_by_queue(&set),
            Err(AnalysisError::MissingColumns {
                columns: vec![Column::Queue, Column::AnalysisDuration]
            })
        );
    }

    #[test]
    fn test_team_aht() {
        let set = RecordSet::new(
            vec![
                record("a", "FINALIZADO", "0:02:00", None),
                record("b", "FINALIZADO", "0:03:00", None),
                record("b", "RECLASSIFICADO", "0:50:00", None),
            ],
            Columns::default(),
        );
        assert_eq!(team_aht(&set), Some(Duration::seconds(150)));

        let none = RecordSet::new(vec![record("a", "ANDAMENTO_PRE", "0:02:00", None)], Columns::default());
        assert_eq!(team_aht(&none), None);
    }

    #[test]
    fn test_analyst_average_duration() {
        let set = RecordSet::new(
            vec![
                record("a", "FINALIZADO", "0:01:00", None),
                record("a", "ANDAMENTO_PRE", "0:01:30", None),
                record("a", "PENDENTE", "1:00:00", None),
            ],
            Columns::default(),
        );
        assert_eq!(analyst_average_duration(&set), "1 min 15s");

        let empty = RecordSet::new(vec![record("a", "PENDENTE", "0:01:00", None)], Columns::default());
        assert_eq!(analyst_average_duration(&empty), NO_DATA_FOUND);
    }

    #[test]
    fn test_analyst_aht_by_day() {
        let set = RecordSet::new(
            vec![
                on_day(record("a", "FINALIZADO", "0:01:00", None), "04/03/2024 09:00:00"),
                on_day(record("a", "ANDAMENTO_PRE", "0:03:00", None), "04/03/2024 11:00:00"),
                on_day(record("a", "FINALIZADO", "x", None), "05/03/2024 11:00:00"),
            ],
            Columns::default(),
        );

        let rows = analyst_aht_by_day(&set);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].mean_duration, Some(Duration::minutes(2)));
        assert_eq!(rows[1].day, day(5));
        assert_eq!(rows[1].mean_duration, None);
    }
}
