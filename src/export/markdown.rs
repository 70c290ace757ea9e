use std::fmt::Write as _;

use chrono::NaiveDate;

use crate::api::types::{
    ColumnStats, ComparisonAnalysisResponse, DatasetAnalysis, DatasetComparisonResponse, DatasetDetail,
    DatasetRef, DatasetStats, MetricMap,
};
use crate::util::fmt::{fixed_1dp, percent, signed_1dp, signed_int};
use crate::util::time::display_timestamp;

use super::{export_filename, ExportFile, MARKDOWN_MIME};

fn cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

pub fn column_summary(col: &ColumnStats) -> String {
    if let Some(n) = &col.numeric {
        return format!("min={}, avg={}, max={}", n.min, fixed_1dp(n.avg), n.max);
    }
    match &col.top_values {
        Some(top) if !top.is_empty() => top
            .iter()
            .map(|t| format!("{} ({})", t.value, t.count))
            .collect::<Vec<_>>()
            .join(", "),
        _ => String::new(),
    }
}

/// Dataset metadata, column statistics (when loaded) and the generated analysis.
pub fn analysis_markdown(
    detail: Option<&DatasetDetail>,
    stats: Option<&DatasetStats>,
    analysis: Option<&DatasetAnalysis>,
    date: NaiveDate,
) -> Option<ExportFile> {
    let (detail, analysis) = (detail?, analysis?);
    let mut out = String::new();

    let _ = writeln!(out, "# Dataset analysis: {}\n", detail.filename);
    let _ = writeln!(out, "- Dataset ID: {}", detail.dataset_id);
    let _ = writeln!(out, "- Filename: {}", detail.filename);
    let _ = writeln!(out, "- Created at: {}", display_timestamp(&detail.created_at));
    let _ = writeln!(out, "- Rows: {}\n", detail.rows);

    if let Some(stats) = stats {
        out.push_str("## Columns\n\n");
        out.push_str("| Column | Kind | Present | Non-empty | Summary |\n");
        out.push_str("|---|---|---|---|---|\n");
        for col in &stats.columns {
            let _ = writeln!(
                out,
                "| {} | {} | {} | {} | {} |",
                cell(&col.name),
                col.kind.as_str(),
                col.present_count,
                col.non_empty_count,
                cell(&column_summary(col))
            );
        }
        out.push('\n');
    }

    out.push_str("## Analysis\n\n");
    let _ = writeln!(out, "Generated at: {}\n", display_timestamp(&analysis.generated_at));
    out.push_str(&analysis.analysis_text);
    out.push('\n');

    Some(ExportFile {
        filename: export_filename("analysis", &[detail.dataset_id], date, "md"),
        mime: MARKDOWN_MIME,
        bytes: out.into_bytes(),
    })
}

fn dataset_section(out: &mut String, title: &str, d: &DatasetRef) {
    let _ = writeln!(out, "## {title}\n");
    let _ = writeln!(out, "- Dataset ID: {}", d.dataset_id);
    let _ = writeln!(out, "- Filename: {}", d.filename);
    let _ = writeln!(out, "- Created at: {}", display_timestamp(&d.created_at));
    let _ = writeln!(out, "- Rows: {}\n", d.rows);
}

struct MinAvgMax {
    min: f64,
    avg: f64,
    max: f64,
}

fn min_avg_max(m: Option<&MetricMap>) -> Option<MinAvgMax> {
    let m = m?;
    let get = |key: &str| m.get(key).copied().flatten();
    Some(MinAvgMax { min: get("min")?, avg: get("avg")?, max: get("max")? })
}

/// Both the statistics diff and the transition analysis are required.
pub fn comparison_markdown(
    comparison: Option<&DatasetComparisonResponse>,
    analysis: Option<&ComparisonAnalysisResponse>,
    date: NaiveDate,
) -> Option<ExportFile> {
    let (cmp, analysis) = (comparison?, analysis?);
    let mut out = String::new();

    out.push_str("# Comparison analysis\n\n");
    dataset_section(&mut out, "Base dataset", &cmp.base_dataset);
    dataset_section(&mut out, "Target dataset", &cmp.target_dataset);

    out.push_str("## Statistics diff\n\n");
    out.push_str("### Row count\n\n");
    let rc = &cmp.comparison.rows_change;
    let _ = writeln!(out, "- Base: {}", rc.base);
    let _ = writeln!(out, "- Target: {}", rc.target);
    let _ = writeln!(out, "- Diff: {} ({})\n", signed_int(rc.diff), percent(rc.percent));

    out.push_str("### Column changes\n\n");
    if cmp.comparison.columns_change.is_empty() {
        out.push_str("No column changes.\n");
    }
    for col in &cmp.comparison.columns_change {
        let _ = writeln!(out, "- **{}** ({})", col.name, col.kind);
        if col.kind != "number" {
            continue;
        }
        let (Some(b), Some(t), Some(d)) = (
            min_avg_max(col.base.as_ref()),
            min_avg_max(col.target.as_ref()),
            min_avg_max(col.diff.as_ref()),
        ) else {
            continue;
        };
        let _ = writeln!(out, "  - Base: min={}, avg={}, max={}", b.min, fixed_1dp(b.avg), b.max);
        let _ = writeln!(out, "  - Target: min={}, avg={}, max={}", t.min, fixed_1dp(t.avg), t.max);
        let _ = writeln!(
            out,
            "  - Diff: min={}, avg={}, max={}",
            signed_1dp(d.min),
            signed_1dp(d.avg),
            signed_1dp(d.max)
        );
    }
    out.push('\n');

    let significant = &analysis.comparison_summary.significant_changes;
    if !significant.is_empty() {
        out.push_str("### Significant changes\n\n");
        for s in significant {
            let _ = writeln!(
                out,
                "- {} ({}): {} -> {} ({}, {})",
                s.column_name,
                s.change_type,
                s.base_value,
                s.target_value,
                signed_1dp(s.diff),
                percent(s.percent)
            );
        }
        out.push('\n');
    }

    out.push_str("## Transition analysis\n\n");
    let _ = writeln!(out, "Generated at: {}\n", display_timestamp(&analysis.generated_at));
    out.push_str(&analysis.analysis_text);
    out.push('\n');

    Some(ExportFile {
        filename: export_filename(
            "comparison",
            &[cmp.base_dataset.dataset_id, cmp.target_dataset.dataset_id],
            date,
            "md",
        ),
        mime: MARKDOWN_MIME,
        bytes: out.into_bytes(),
    })
}
