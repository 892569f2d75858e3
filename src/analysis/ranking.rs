//! Analyst leaderboard with quartile banding.

use super::StatusCounts;
use crate::models::{QuartileBand, RankedAnalyst, RecordSet};
use std::collections::{BTreeMap, HashSet};

/// Cohorts larger than this always use bands of [`MAX_BAND_SIZE`].
const LARGE_COHORT: usize = 12;
const MAX_BAND_SIZE: usize = 4;

/// Number of positions per band for a cohort of `ranked` analysts.
pub fn quartile_band_size(ranked: usize) -> usize {
    if ranked > LARGE_COHORT {
        MAX_BAND_SIZE
    } else {
        ranked.div_ceil(4)
    }
}

/// Rank the selected analysts by total handled cases, highest first.
///
/// Analysts are grouped in name order and sorted stably, so ties keep
/// name order. Selected names without records are absent from the result.
pub fn rank_analysts<S: AsRef<str>>(set: &RecordSet, selected: &[S]) -> Vec<RankedAnalyst> {
    let selected: HashSet<&str> = selected.iter().map(|s| s.as_ref()).collect();

    let mut grouped: BTreeMap<&str, StatusCounts> = BTreeMap::new();
    for record in set.records() {
        if selected.contains(record.analyst.as_str()) {
            grouped
                .entry(record.analyst.as_str())
                .or_default()
                .add(&record.status);
        }
    }

    let mut rows: Vec<(&str, StatusCounts)> = grouped.into_iter().collect();
    rows.sort_by_key(|(_, counts)| std::cmp::Reverse(counts.total()));

    let band_size = quartile_band_size(rows.len());

    rows.into_iter()
        .enumerate()
        .map(|(i, (analyst, counts))| {
            let position = i + 1;
            RankedAnalyst {
                position,
                analyst: analyst.to_string(),
                in_progress: counts.in_progress,
                completed: counts.completed,
                reclassified: counts.reclassified,
                total: counts.total(),
                band: QuartileBand::for_position(position, band_size),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::testing::record;
    use crate::models::{Columns, ProtocolRecord};

    fn cohort(totals: &[usize]) -> (RecordSet, Vec<String>) {
        let mut records: Vec<ProtocolRecord> = Vec::new();
        let mut names = Vec::new();
        for (i, total) in totals.iter().enumerate() {
            let name = format!("analyst{:02}", i);
            for _ in 0..*total {
                records.push(record(&name, "FINALIZADO", "0:01:00", None));
            }
            names.push(name);
        }
        (RecordSet::new(records, Columns::default()), names)
    }

    #[test]
    fn test_quartile_band_size() {
        assert_eq!(quartile_band_size(0), 0);
        assert_eq!(quartile_band_size(3), 1);
        assert_eq!(quartile_band_size(5), 2);
        assert_eq!(quartile_band_size(12), 3);
        assert_eq!(quartile_band_size(13), 4);
        assert_eq!(quartile_band_size(40), 4);
    }

    #[test]
    fn test_rank_sorted_and_contiguous() {
        let (set, names) = cohort(&[3, 9, 1, 9, 5, 2, 7]);

        let ranked = rank_analysts(&set, &names);

        assert_eq!(ranked.len(), 7);
        for (i, row) in ranked.iter().enumerate() {
            assert_eq!(row.position, i + 1);
        }
        for pair in ranked.windows(2) {
            assert!(pair[0].total >= pair[1].total);
        }
        // tie on 9 keeps name order
        assert_eq!(ranked[0].analyst, "analyst01");
        assert_eq!(ranked[1].analyst, "analyst03");
    }

    #[test]
    fn test_rank_counts_statuses_and_restricts_selection() {
        let set = RecordSet::new(
            vec![
                record("ana", "FINALIZADO", "", None),
                record("ana", "RECLASSIFICADO", "", None),
                record("ana", "ANDAMENTO_PRE", "", None),
                record("ana", "CANCELADO", "", None),
                record("bruno", "FINALIZADO", "", None),
                record("carla", "FINALIZADO", "", None),
            ],
            Columns::default(),
        );

        let ranked = rank_analysts(&set, &["ana", "bruno", "nobody"]);

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].analyst, "ana");
        assert_eq!(
            (ranked[0].in_progress, ranked[0].completed, ranked[0].reclassified, ranked[0].total),
            (1, 1, 1, 3)
        );
        assert_eq!(ranked[1].analyst, "bruno");
    }

    #[test]
    fn test_bands_for_twelve_analysts() {
        let totals: Vec<usize> = (1..=12).rev().collect();
        let (set, names) = cohort(&totals);

        let bands: Vec<QuartileBand> = rank_analysts(&set, &names).iter().map(|r| r.band).collect();

        use QuartileBand::*;
        assert_eq!(
            bands,
            vec![First, First, First, Second, Second, Second, Third, Third, Third, Fourth, Fourth, Fourth]
        );
    }

    #[test]
    fn test_bands_for_large_cohort() {
        let totals: Vec<usize> = (1..=15).rev().collect();
        let (set, names) = cohort(&totals);

        let ranked = rank_analysts(&set, &names);

        assert_eq!(ranked[3].band, QuartileBand::First);
        assert_eq!(ranked[4].band, QuartileBand::Second);
        assert_eq!(ranked[11].band, QuartileBand::Third);
        assert_eq!(ranked[12].band, QuartileBand::Fourth);
        assert_eq!(ranked[14].band, QuartileBand::Fourth);
    }

    #[test]
    fn test_bands_for_small_cohort() {
        let (set, names) = cohort(&[4, 2, 1]);

        let bands: Vec<QuartileBand> = rank_analysts(&set, &names).iter().map(|r| r.band).collect();

        assert_eq!(
            bands,
            vec![QuartileBand::First, QuartileBand::Second, QuartileBand::Third]
        );
    }
}
