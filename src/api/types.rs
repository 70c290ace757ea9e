use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Number;

pub type DatasetId = i64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadDatasetResponse {
    pub dataset_id: DatasetId,
    pub rows: i64,
    pub filename: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub dataset_id: DatasetId,
    pub filename: String,
    pub created_at: String,
    pub row_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetDatasetsResponse {
    pub datasets: Vec<Dataset>,
}

/// One raw CSV cell as the backend reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Number(n) => write!(f, "{n}"),
            CellValue::String(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleRow {
    pub row_index: i64,
    pub data: BTreeMap<String, CellValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetDetail {
    pub dataset_id: DatasetId,
    pub filename: String,
    pub created_at: String,
    pub rows: i64,
    pub samples: Vec<SampleRow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Number,
    String,
    Mixed,
    Empty,
}

impl ColumnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::Number => "number",
            ColumnKind::String => "string",
            ColumnKind::Mixed => "mixed",
            ColumnKind::Empty => "empty",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericSummary {
    pub count: i64,
    pub min: f64,
    pub max: f64,
    pub avg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopValue {
    pub value: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnStats {
    pub name: String,
    pub kind: ColumnKind,
    pub present_count: i64,
    pub non_empty_count: i64,
    pub numeric: Option<NumericSummary>,
    pub top_values: Option<Vec<TopValue>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetStats {
    pub dataset_id: DatasetId,
    pub rows: i64,
    pub columns: Vec<ColumnStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetAnalysis {
    pub dataset_id: DatasetId,
    pub generated_at: String,
    pub analysis_text: String,
}

/// Dataset summary embedded in comparison responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetRef {
    pub dataset_id: DatasetId,
    pub filename: String,
    pub created_at: String,
    pub rows: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowsChange {
    pub base: i64,
    pub target: i64,
    pub diff: i64,
    pub percent: f64,
}

/// Per-metric values for one side of a column change. The backend emits `null` for metrics it could not compute.
pub type MetricMap = BTreeMap<String, Option<f64>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnChange {
    pub name: String,
    pub kind: String,
    pub base: Option<MetricMap>,
    pub target: Option<MetricMap>,
    pub diff: Option<MetricMap>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub rows_change: RowsChange,
    pub columns_change: Vec<ColumnChange>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetComparisonResponse {
    pub base_dataset: DatasetRef,
    pub target_dataset: DatasetRef,
    pub comparison: Comparison,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignificantChange {
    pub column_name: String,
    pub change_type: String,
    pub base_value: f64,
    pub target_value: f64,
    pub diff: f64,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonSummary {
    pub rows_change: RowsChange,
    pub significant_changes: Vec<SignificantChange>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonAnalysisResponse {
    pub base_dataset: DatasetRef,
    pub target_dataset: DatasetRef,
    pub comparison_summary: ComparisonSummary,
    pub analysis_text: String,
    pub generated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}
