use ::csv::{QuoteStyle, WriterBuilder};
use chrono::NaiveDate;

use crate::api::types::{DatasetComparisonResponse, DatasetDetail, DatasetStats, MetricMap};

use super::{export_filename, ExportFile, CSV_MIME};

const BOM: &[u8] = b"\xEF\xBB\xBF";

// Metrics listed first, in this order; anything else follows alphabetically.
const METRIC_ORDER: [&str; 3] = ["min", "avg", "max"];

/// BOM-prefixed, every field quoted. `None` only if the writer fails.
fn write_rows(header: &[String], rows: &[Vec<String>]) -> Option<Vec<u8>> {
    let mut wtr = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_writer(BOM.to_vec());
    wtr.write_record(header).ok()?;
    for row in rows {
        wtr.write_record(row).ok()?;
    }
    wtr.into_inner().ok()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn stats_csv(stats: Option<&DatasetStats>, date: NaiveDate) -> Option<ExportFile> {
    let stats = stats?;
    let header = strings(&[
        "column", "kind", "present_count", "non_empty_count", "count", "min", "max", "avg", "top_values",
    ]);
    let rows: Vec<Vec<String>> = stats
        .columns
        .iter()
        .map(|col| {
            let (count, min, max, avg) = match &col.numeric {
                Some(n) => (n.count.to_string(), n.min.to_string(), n.max.to_string(), n.avg.to_string()),
                None => Default::default(),
            };
            let top = col
                .top_values
                .as_ref()
                .map(|tv| {
                    tv.iter()
                        .map(|t| format!("{} ({})", t.value, t.count))
                        .collect::<Vec<_>>()
                        .join("; ")
                })
                .unwrap_or_default();
            vec![
                col.name.clone(),
                col.kind.as_str().to_string(),
                col.present_count.to_string(),
                col.non_empty_count.to_string(),
                count,
                min,
                max,
                avg,
                top,
            ]
        })
        .collect();

    Some(ExportFile {
        filename: export_filename("stats", &[stats.dataset_id], date, "csv"),
        mime: CSV_MIME,
        bytes: write_rows(&header, &rows)?,
    })
}

/// Sample rows as a table. Column order follows `stats` when given; keys the
/// stats do not mention are appended in name order.
pub fn samples_csv(detail: Option<&DatasetDetail>, stats: Option<&DatasetStats>, date: NaiveDate) -> Option<ExportFile> {
    let detail = detail?;
    let mut columns: Vec<String> = stats
        .map(|s| s.columns.iter().map(|c| c.name.clone()).collect())
        .unwrap_or_default();
    for sample in &detail.samples {
        for key in sample.data.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }

    let mut header = vec!["row_index".to_string()];
    header.extend(columns.iter().cloned());
    let rows: Vec<Vec<String>> = detail
        .samples
        .iter()
        .map(|sample| {
            let mut row = vec![sample.row_index.to_string()];
            row.extend(
                columns
                    .iter()
                    .map(|c| sample.data.get(c).map(|v| v.to_string()).unwrap_or_default()),
            );
            row
        })
        .collect();

    Some(ExportFile {
        filename: export_filename("samples", &[detail.dataset_id], date, "csv"),
        mime: CSV_MIME,
        bytes: write_rows(&header, &rows)?,
    })
}

pub fn comparison_csv(comparison: Option<&DatasetComparisonResponse>, date: NaiveDate) -> Option<ExportFile> {
    let cmp = comparison?;
    let header = strings(&["column", "kind", "metric", "base", "target", "diff"]);
    let rc = &cmp.comparison.rows_change;
    let mut rows = vec![
        strings(&["(rows)", "", "count", &rc.base.to_string(), &rc.target.to_string(), &rc.diff.to_string()]),
        strings(&["(rows)", "", "percent", "", "", &rc.percent.to_string()]),
    ];

    for col in &cmp.comparison.columns_change {
        let metrics = metric_names([col.base.as_ref(), col.target.as_ref(), col.diff.as_ref()]);
        if metrics.is_empty() {
            rows.push(vec![col.name.clone(), col.kind.clone(), String::new(), String::new(), String::new(), String::new()]);
            continue;
        }
        for metric in metrics {
            let cell = |m: Option<&MetricMap>| {
                m.and_then(|m| m.get(&metric).copied().flatten()).map(|v| v.to_string()).unwrap_or_default()
            };
            rows.push(vec![
                col.name.clone(),
                col.kind.clone(),
                metric.clone(),
                cell(col.base.as_ref()),
                cell(col.target.as_ref()),
                cell(col.diff.as_ref()),
            ]);
        }
    }

    Some(ExportFile {
        filename: export_filename(
            "comparison",
            &[cmp.base_dataset.dataset_id, cmp.target_dataset.dataset_id],
            date,
            "csv",
        ),
        mime: CSV_MIME,
        bytes: write_rows(&header, &rows)?,
    })
}

fn metric_names(maps: [Option<&MetricMap>; 3]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for m in maps.into_iter().flatten() {
        for key in m.keys() {
            if !names.contains(key) {
                names.push(key.clone());
            }
        }
    }
    names.sort_by_key(|n| {
        let rank = METRIC_ORDER.iter().position(|m| m == n).unwrap_or(METRIC_ORDER.len());
        (rank, n.clone())
    });
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 31).unwrap()
    }

    fn stats() -> DatasetStats {
        serde_json::from_value(json!({
            "dataset_id": 3, "rows": 3,
            "columns": [
                {"name": "price", "kind": "number", "present_count": 3, "non_empty_count": 3,
                 "numeric": {"count": 3, "min": 100.0, "max": 300.0, "avg": 200.0}, "top_values": null},
                {"name": "category", "kind": "string", "present_count": 3, "non_empty_count": 3,
                 "numeric": null, "top_values": [{"value": "A", "count": 2}, {"value": "B", "count": 1}]}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn stats_csv_has_bom_and_quotes_everything() {
        let file = stats_csv(Some(&stats()), date()).unwrap();
        assert_eq!(file.filename, "stats_3_20250131.csv");
        assert_eq!(file.mime, CSV_MIME);
        assert!(file.bytes.starts_with(BOM));

        let text = file.text();
        let lines: Vec<&str> = text.trim_start_matches('\u{feff}').lines().collect();
        assert_eq!(
            lines[0],
            r#""column","kind","present_count","non_empty_count","count","min","max","avg","top_values""#
        );
        assert_eq!(lines[1], r#""price","number","3","3","3","100","300","200","""#);
        assert_eq!(lines[2], r#""category","string","3","3","","","","","A (2); B (1)""#);
    }

    #[test]
    fn missing_inputs_produce_nothing() {
        assert!(stats_csv(None, date()).is_none());
        assert!(samples_csv(None, Some(&stats()), date()).is_none());
        assert!(comparison_csv(None, date()).is_none());
    }

    #[test]
    fn samples_follow_stats_column_order() {
        let detail: DatasetDetail = serde_json::from_value(json!({
            "dataset_id": 3, "filename": "a.csv", "created_at": "2025-01-01T00:00:00", "rows": 3,
            "samples": [
                {"row_index": 0, "data": {"category": "A", "price": 100, "note": "say \"hi\""}},
                {"row_index": 1, "data": {"category": null, "price": 200}}
            ]
        }))
        .unwrap();

        let file = samples_csv(Some(&detail), Some(&stats()), date()).unwrap();
        assert_eq!(file.filename, "samples_3_20250131.csv");
        let text = file.text();
        let lines: Vec<&str> = text.trim_start_matches('\u{feff}').lines().collect();
        assert_eq!(lines[0], r#""row_index","price","category","note""#);
        assert_eq!(lines[1], r#""0","100","A","say ""hi""""#);
        assert_eq!(lines[2], r#""1","200","","""#);
    }

    #[test]
    fn comparison_rows_list_metrics_in_reading_order() {
        let cmp: DatasetComparisonResponse = serde_json::from_value(json!({
            "base_dataset": {"dataset_id": 1, "filename": "a.csv", "created_at": "2025-01-01T00:00:00", "rows": 3},
            "target_dataset": {"dataset_id": 2, "filename": "b.csv", "created_at": "2025-01-02T00:00:00", "rows": 4},
            "comparison": {
                "rows_change": {"base": 3, "target": 4, "diff": 1, "percent": 33.33},
                "columns_change": [
                    {"name": "price", "kind": "number",
                     "base": {"min": 100.0, "max": 300.0, "avg": 200.0},
                     "target": {"min": 150.0, "max": 400.0, "avg": 287.5},
                     "diff": {"min": 50.0, "max": 100.0, "avg": 87.5}},
                    {"name": "category", "kind": "string", "base": null, "target": null, "diff": null}
                ]
            }
        }))
        .unwrap();

        let file = comparison_csv(Some(&cmp), date()).unwrap();
        assert_eq!(file.filename, "comparison_1_2_20250131.csv");
        let text = file.text();
        let lines: Vec<&str> = text.trim_start_matches('\u{feff}').lines().collect();
        assert_eq!(lines[1], r#""(rows)","","count","3","4","1""#);
        assert_eq!(lines[2], r#""(rows)","","percent","","","33.33""#);
        assert_eq!(lines[3], r#""price","number","min","100","150","50""#);
        assert_eq!(lines[4], r#""price","number","avg","200","287.5","87.5""#);
        assert_eq!(lines[5], r#""price","number","max","300","400","100""#);
        assert_eq!(lines[6], r#""category","string","","","","""#);
    }

    #[test]
    fn null_metrics_become_empty_cells() {
        let cmp: DatasetComparisonResponse = serde_json::from_value(json!({
            "base_dataset": {"dataset_id": 1, "filename": "a.csv", "created_at": "2025-01-01T00:00:00", "rows": 0},
            "target_dataset": {"dataset_id": 2, "filename": "b.csv", "created_at": "2025-01-02T00:00:00", "rows": 2},
            "comparison": {
                "rows_change": {"base": 0, "target": 2, "diff": 2, "percent": 0.0},
                "columns_change": [
                    {"name": "price", "kind": "number",
                     "base": {"min": null, "max": null, "avg": null},
                     "target": {"min": 1.0, "max": 3.0, "avg": 2.0},
                     "diff": {"min": null, "max": null, "avg": null}}
                ]
            }
        }))
        .unwrap();

        let text = comparison_csv(Some(&cmp), date()).unwrap().text();
        let lines: Vec<&str> = text.trim_start_matches('\u{feff}').lines().collect();
        assert_eq!(lines[3], r#""price","number","min","","1","""#);
        assert_eq!(lines[4], r#""price","number","avg","","2","""#);
        assert_eq!(lines[5], r#""price","number","max","","3","""#);
    }
}
