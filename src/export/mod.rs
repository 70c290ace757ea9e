use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::ValueEnum;

use crate::api::types::DatasetId;
use crate::util::time::date_stamp;

pub mod csv;
pub mod markdown;

pub const CSV_MIME: &str = "text/csv;charset=utf-8";
pub const MARKDOWN_MIME: &str = "text/markdown;charset=utf-8";

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Md,
}

/// A finished export: name, MIME type and payload. Saving it is someone else's job.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportFile {
    pub filename: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl ExportFile {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

/// `{kind}_{id}[_{id}]_{YYYYMMDD}.{ext}`
pub fn export_filename(kind: &str, ids: &[DatasetId], date: NaiveDate, ext: &str) -> String {
    let ids: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
    format!("{}_{}_{}.{}", kind, ids.join("_"), date_stamp(date), ext)
}

pub trait ExportSink {
    fn save(&self, file: &ExportFile) -> io::Result<PathBuf>;
}

/// Writes exports into a directory, creating it on first use.
pub struct DirSink {
    dir: PathBuf,
}

impl DirSink {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self { dir: dir.as_ref().to_path_buf() }
    }
}

impl ExportSink for DirSink {
    fn save(&self, file: &ExportFile) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(&file.filename);
        fs::write(&path, &file.bytes)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_pattern() {
        let d = NaiveDate::from_ymd_opt(2025, 12, 1).unwrap();
        assert_eq!(export_filename("stats", &[4], d, "csv"), "stats_4_20251201.csv");
        assert_eq!(export_filename("comparison", &[1, 2], d, "md"), "comparison_1_2_20251201.md");
    }

    #[test]
    fn dir_sink_writes_bytes() {
        let dir = std::env::temp_dir().join(format!("prism-export-{}", uuid::Uuid::new_v4()));
        let sink = DirSink::new(&dir);
        let file = ExportFile { filename: "x_1_20250101.md".into(), mime: MARKDOWN_MIME, bytes: b"# hi\n".to_vec() };

        let path = sink.save(&file).unwrap();
        assert_eq!(path, dir.join("x_1_20250101.md"));
        assert_eq!(fs::read(&path).unwrap(), b"# hi\n");
        fs::remove_dir_all(&dir).unwrap();
    }
}
