//! Per-queue views of a single analyst's work.

use super::normalize::format_duration;
use super::{mean_duration, StatusCounts};
use crate::models::{ProtocolRecord, QueueBreakdown, QueueVolume, RecordSet};
use std::collections::{BTreeMap, HashSet};

/// Known-status records grouped by non-empty queue, with their row index
/// in the analyst set.
fn group_by_queue(analyst_set: &RecordSet) -> BTreeMap<&str, Vec<(usize, &ProtocolRecord)>> {
    let mut grouped: BTreeMap<&str, Vec<(usize, &ProtocolRecord)>> = BTreeMap::new();

    for (idx, record) in analyst_set.records().iter().enumerate() {
        if !record.status.is_known() {
            continue;
        }
        if let Some(queue) = record.queue.as_deref() {
            grouped.entry(queue).or_default().push((idx, record));
        }
    }

    grouped
}

/// Status counts and AHT per queue for one analyst.
///
/// The AHT of a queue averages the rows of that queue whose row index is
/// also in the completed-or-reclassified subset of the whole analyst set.
/// Without a queue column the table is empty.
pub fn queues_for_analyst(analyst_set: &RecordSet) -> Vec<QueueBreakdown> {
    debug_assert!(analyst_set.is_single_analyst());

    if !analyst_set.columns().queue {
        return Vec::new();
    }

    let closed_rows: HashSet<usize> = analyst_set
        .records()
        .iter()
        .enumerate()
        .filter(|(_, r)| r.status.is_closed())
        .map(|(idx, _)| idx)
        .collect();

    group_by_queue(analyst_set)
        .into_iter()
        .map(|(queue, rows)| {
            let mut counts = StatusCounts::default();
            for (_, record) in &rows {
                counts.add(&record.status);
            }
            let aht = mean_duration(
                rows.iter()
                    .filter(|(idx, _)| closed_rows.contains(idx))
                    .map(|(_, record)| *record),
            );
            QueueBreakdown {
                queue: queue.to_string(),
                completed: counts.completed,
                reclassified: counts.reclassified,
                in_progress: counts.in_progress,
                aht_formatted: format_duration(aht),
            }
        })
        .collect()
}

/// Row count and raw mean duration per queue for one analyst.
pub fn queue_volume_summary(analyst_set: &RecordSet) -> Vec<QueueVolume> {
    debug_assert!(analyst_set.is_single_analyst());

    if !analyst_set.columns().queue {
        return Vec::new();
    }

    group_by_queue(analyst_set)
        .into_iter()
        .map(|(queue, rows)| QueueVolume {
            queue: queue.to_string(),
            count: rows.len(),
            mean_duration: mean_duration(rows.iter().map(|(_, record)| *record)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::testing::record;
    use crate::models::Columns;
    use chrono::Duration;

    fn analyst_set() -> RecordSet {
        RecordSet::new(
            vec![
                record("a", "FINALIZADO", "0:02:00", Some("CONSIGNADO")),
                record("a", "RECLASSIFICADO", "0:04:00", Some("CONSIGNADO")),
                record("a", "ANDAMENTO_PRE", "0:30:00", Some("CONSIGNADO")),
                record("a", "ANDAMENTO_PRE", "0:01:00", Some("CARTAO")),
                record("a", "FINALIZADO", "0:03:10", Some("CARTAO")),
                record("a", "CANCELADO", "0:50:00", Some("CARTAO")),
                record("a", "FINALIZADO", "0:07:00", None),
            ],
            Columns::default(),
        )
    }

    #[test]
    fn test_queues_for_analyst() {
        let rows = queues_for_analyst(&analyst_set());

        assert_eq!(
            rows,
            vec![
                QueueBreakdown {
                    queue: "CARTAO".into(),
                    completed: 1,
                    reclassified: 0,
                    in_progress: 1,
                    aht_formatted: "3 min 10s".into(),
                },
                QueueBreakdown {
                    queue: "CONSIGNADO".into(),
                    completed: 1,
                    reclassified: 1,
                    in_progress: 1,
                    aht_formatted: "3 min 0s".into(),
                },
            ]
        );
    }

    #[test]
    fn test_queue_without_closed_rows_renders_zero() {
        let set = RecordSet::new(
            vec![record("a", "ANDAMENTO_PRE", "0:10:00", Some("FILA"))],
            Columns::default(),
        );

        let rows = queues_for_analyst(&set);

        assert_eq!(rows[0].in_progress, 1);
        assert_eq!(rows[0].aht_formatted, "0 min");
    }

    #[test]
    fn test_queue_volume_summary() {
        let rows = queue_volume_summary(&analyst_set());

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].queue, "CARTAO");
        assert_eq!(rows[0].count, 2);
        assert_eq!(rows[0].mean_duration, Some(Duration::seconds(125)));
        assert_eq!(rows[1].count, 3);
        assert_eq!(rows[1].mean_duration, Some(Duration::seconds(720)));
    }

    #[test]
    fn test_missing_queue_gives_empty_tables() {
        let set = RecordSet::without_queue(vec![record("a", "FINALIZADO", "0:02:00", None)]);
        assert!(queues_for_analyst(&set).is_empty());
        assert!(queue_volume_summary(&set).is_empty());
    }
}
