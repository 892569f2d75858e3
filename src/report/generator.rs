//! Markdown and JSON report generation.
//!
//! This module renders a [`Dashboard`] as a Markdown report for humans or
//! as JSON for downstream dashboards.

use super::dashboard::{AnalystView, Dashboard, ReportMetadata, Section};
use crate::analysis::{format_duration, format_minutes_seconds};
use crate::models::{
    AnalystAht, Attention, DailyAht, DailyProductivity, QueueAht, QuartileBand, RankedAnalyst,
};
use anyhow::Result;

/// Shown where a query ran but matched nothing.
const NO_DATA: &str = "_No data to display._";

/// Generate a complete Markdown report.
pub fn generate_markdown_report(dashboard: &Dashboard) -> String {
    let mut output = String::new();

    output.push_str("# AHTBoard Report\n\n");
    output.push_str(&generate_metadata_section(&dashboard.metadata));
    output.push_str(&generate_daily_section(
        &dashboard.aht_by_day,
        &dashboard.daily_productivity,
    ));
    output.push_str(&generate_analyst_aht_section(&dashboard.aht_by_analyst));
    output.push_str(&generate_queue_aht_section(&dashboard.aht_by_queue));
    output.push_str(&generate_ranking_section(&dashboard.ranking));
    output.push_str(&generate_attention_section(&dashboard.points_of_attention));

    if let Some(ref view) = dashboard.analyst {
        output.push_str(&generate_analyst_view_section(view));
    }

    output.push_str("---\n\n*Report generated by AHTBoard*\n");

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    if !metadata.source.is_empty() {
        section.push_str(&format!("- **Source:** `{}`\n", metadata.source));
    }
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Records:** {}\n", metadata.total_records));
    section.push_str(&format!("- **Analysts:** {}\n", metadata.analysts));
    section.push_str(&format!(
        "- **Team AHT:** {}\n\n",
        metadata.team_aht_formatted
    ));

    section
}

/// Generate the per-day AHT and productivity section.
fn generate_daily_section(aht: &[DailyAht], productivity: &[DailyProductivity]) -> String {
    let mut section = String::new();

    section.push_str("## Daily Overview\n\n");

    section.push_str("### AHT per Day (completed)\n\n");
    if aht.is_empty() {
        section.push_str(NO_DATA);
        section.push_str("\n\n");
    } else {
        section.push_str("| Day | AHT (min) |\n");
        section.push_str("|:---|---:|\n");
        for row in aht {
            section.push_str(&format!(
                "| {} | {:.2} |\n",
                row.day.format("%d/%m/%Y"),
                row.aht_minutes
            ));
        }
        section.push('\n');
    }

    section.push_str("### Productivity per Day\n\n");
    if productivity.is_empty() {
        section.push_str(NO_DATA);
        section.push_str("\n\n");
    } else {
        section.push_str("| Day | In Progress | Completed | Reclassified | Total |\n");
        section.push_str("|:---|:---:|:---:|:---:|:---:|\n");
        for row in productivity {
            section.push_str(&format!(
                "| {} | {} | {} | {} | **{}** |\n",
                row.day.format("%d/%m/%Y"),
                row.in_progress,
                row.completed,
                row.reclassified,
                row.total
            ));
        }
        section.push('\n');
    }

    section
}

/// Generate the per-analyst AHT section.
fn generate_analyst_aht_section(rows: &[AnalystAht]) -> String {
    let mut section = String::new();

    section.push_str("## AHT by Analyst\n\n");
    if rows.is_empty() {
        section.push_str(NO_DATA);
        section.push_str("\n\n");
        return section;
    }

    section.push_str("| Analyst | Protocols | Total Time | AHT |\n");
    section.push_str("|:---|:---:|---:|---:|\n");
    for row in rows {
        section.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            row.analyst,
            row.count,
            row.total_duration
                .map(format_minutes_seconds)
                .unwrap_or_else(|| "-".to_string()),
            row.aht_formatted
        ));
    }
    section.push('\n');

    section
}

/// Generate the per-queue AHT section.
fn generate_queue_aht_section(rows: &Section<Vec<QueueAht>>) -> String {
    let mut section = String::new();

    section.push_str("## AHT by Queue\n\n");
    match rows {
        Section::Unavailable(reason) => {
            section.push_str(&format!("> ⚠️ Unavailable: {}\n\n", reason));
        }
        Section::Available(rows) if rows.is_empty() => {
            section.push_str(NO_DATA);
            section.push_str("\n\n");
        }
        Section::Available(rows) => {
            section.push_str("| Queue | AHT |\n");
            section.push_str("|:---|---:|\n");
            for row in rows {
                section.push_str(&format!("| {} | {} |\n", row.queue, row.aht_formatted));
            }
            section.push('\n');
        }
    }

    section
}

/// Generate the leaderboard section.
fn generate_ranking_section(rows: &[RankedAnalyst]) -> String {
    let mut section = String::new();

    section.push_str("## Ranking\n\n");
    if rows.is_empty() {
        section.push_str(NO_DATA);
        section.push_str("\n\n");
        return section;
    }

    section.push_str("| # | Band | Analyst | In Progress | Completed | Reclassified | Total |\n");
    section.push_str("|:---:|:---:|:---|:---:|:---:|:---:|:---:|\n");
    for row in rows {
        section.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | **{}** |\n",
            row.position,
            band_badge(row.band),
            row.analyst,
            row.in_progress,
            row.completed,
            row.reclassified,
            row.total
        ));
    }
    section.push('\n');

    section.push_str("<sub>Bands: ");
    let legend: Vec<String> = [
        QuartileBand::First,
        QuartileBand::Second,
        QuartileBand::Third,
        QuartileBand::Fourth,
    ]
    .iter()
    .map(|band| format!("{} = `{}`", band_badge(*band), band.color()))
    .collect();
    section.push_str(&legend.join(" · "));
    section.push_str("</sub>\n\n");

    section
}

fn band_badge(band: QuartileBand) -> String {
    format!("{} {}", band.emoji(), band)
}

/// Generate the points-of-attention section.
fn generate_attention_section(attention: &Section<Attention>) -> String {
    let mut section = String::new();

    section.push_str("## Points of Attention\n\n");
    match attention {
        Section::Unavailable(reason) => {
            section.push_str(&format!("> ⚠️ Unavailable: {}\n\n", reason));
        }
        Section::Available(Attention::NoData) => {
            section.push_str(NO_DATA);
            section.push_str("\n\n");
        }
        Section::Available(Attention::Points(points)) if points.is_empty() => {
            section.push_str(NO_DATA);
            section.push_str("\n\n");
        }
        Section::Available(Attention::Points(points)) => {
            section.push_str("| Protocol | Queue | Time |\n");
            section.push_str("|:---|:---|---:|\n");
            for point in points {
                section.push_str(&format!(
                    "| {} | {} | {} |\n",
                    point.protocol_id,
                    point.queue.as_deref().unwrap_or("-"),
                    point.time
                ));
            }
            section.push('\n');
        }
    }

    section
}

/// Generate the individual analyst section.
fn generate_analyst_view_section(view: &AnalystView) -> String {
    let mut section = String::new();

    section.push_str(&format!("## Analyst: {}\n\n", view.analyst));
    section.push_str(&format!(
        "- **Average Analysis Time:** {}\n",
        view.average_duration
    ));

    match view.metrics {
        Section::Available(ref m) => {
            section.push_str(&format!("- **Completed:** {}\n", m.completed));
            section.push_str(&format!("- **Reclassified:** {}\n", m.reclassified));
            section.push_str(&format!("- **In Progress:** {}\n", m.in_progress));
            section.push_str(&format!(
                "- **AHT (closed cases):** {}\n\n",
                format_duration(m.mean_duration)
            ));
        }
        Section::Unavailable(ref reason) => {
            section.push_str(&format!("\n> ⚠️ Metrics unavailable: {}\n\n", reason));
        }
    }

    section.push_str("### AHT per Day\n\n");
    if view.aht_by_day.is_empty() {
        section.push_str(NO_DATA);
        section.push_str("\n\n");
    } else {
        section.push_str("| Day | Mean Time |\n");
        section.push_str("|:---|---:|\n");
        for row in &view.aht_by_day {
            section.push_str(&format!(
                "| {} | {} |\n",
                row.day.format("%d/%m/%Y"),
                format_duration(row.mean_duration)
            ));
        }
        section.push('\n');
    }

    section.push_str("### Queues\n\n");
    if view.queues.is_empty() {
        section.push_str(NO_DATA);
        section.push_str("\n\n");
    } else {
        section.push_str("| Queue | Completed | Reclassified | In Progress | AHT | Volume | Mean Time |\n");
        section.push_str("|:---|:---:|:---:|:---:|---:|:---:|---:|\n");
        for row in &view.queues {
            let volume = view.queue_volumes.iter().find(|v| v.queue == row.queue);
            section.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} | {} |\n",
                row.queue,
                row.completed,
                row.reclassified,
                row.in_progress,
                row.aht_formatted,
                volume.map_or(0, |v| v.count),
                format_duration(volume.and_then(|v| v.mean_duration))
            ));
        }
        section.push('\n');
    }

    section
}

/// Generate a JSON report.
pub fn generate_json_report(dashboard: &Dashboard) -> Result<String> {
    serde_json::to_string_pretty(dashboard).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::testing::{on_day, record, with_protocol};
    use crate::models::{Columns, RecordSet};
    use crate::report::DashboardOptions;

    fn create_test_dashboard(analyst: Option<&str>) -> Dashboard {
        let set = RecordSet::new(
            vec![
                on_day(
                    with_protocol(record("ana", "FINALIZADO", "0:06:10", Some("CARTAO")), "55,123.0"),
                    "04/03/2024 09:00:00",
                ),
                on_day(record("ana", "ANDAMENTO_PRE", "0:01:00", Some("CARTAO")), "04/03/2024 10:00:00"),
                on_day(record("bruno", "RECLASSIFICADO", "0:01:00", Some("JV ITAU BMG")), "05/03/2024 10:00:00"),
            ],
            Columns::default(),
        );
        let options = DashboardOptions {
            source: "dados_acumulados_ana.json".to_string(),
            analyst: analyst.map(String::from),
            ..DashboardOptions::default()
        };
        Dashboard::build(&set, &options)
    }

    #[test]
    fn test_generate_markdown_report() {
        let markdown = generate_markdown_report(&create_test_dashboard(None));

        assert!(markdown.contains("# AHTBoard Report"));
        assert!(markdown.contains("## Metadata"));
        assert!(markdown.contains("dados_acumulados_ana.json"));
        assert!(markdown.contains("| 04/03/2024 | 6.17 |"));
        assert!(markdown.contains("## Ranking"));
        assert!(markdown.contains("🔵 Q1"));
        assert!(markdown.contains("rgba(255, 99, 132, 0.4)"));
        assert!(markdown.contains("| 55123 | CARTAO | 6:10 |"));
        assert!(!markdown.contains("## Analyst:"));
    }

    #[test]
    fn test_generate_analyst_section() {
        let markdown = generate_markdown_report(&create_test_dashboard(Some("ana")));

        assert!(markdown.contains("## Analyst: ana"));
        assert!(markdown.contains("- **Completed:** 1"));
        assert!(markdown.contains("| CARTAO | 1 | 0 | 1 | 6 min 10s | 2 |"));
    }

    #[test]
    fn test_unavailable_and_empty_render_differently() {
        let unavailable = generate_attention_section(&Section::Unavailable("no queue".into()));
        let empty = generate_attention_section(&Section::Available(Attention::NoData));

        assert!(unavailable.contains("Unavailable: no queue"));
        assert!(empty.contains(NO_DATA));
        assert!(!empty.contains("Unavailable"));
    }

    #[test]
    fn test_attention_without_rows_shows_no_data() {
        let section = generate_attention_section(&Section::Available(Attention::Points(vec![])));

        assert!(section.contains(NO_DATA));
        assert!(!section.contains("| Protocol |"));
    }

    #[test]
    fn test_generate_json_report() {
        let json = generate_json_report(&create_test_dashboard(Some("ana"))).unwrap();

        assert!(json.contains("\"metadata\""));
        assert!(json.contains("\"ranking\""));
        assert!(json.contains("\"band\": \"first\""));
        assert!(json.contains("\"points_of_attention\""));
        assert!(json.contains("\"analyst\""));
    }
}
