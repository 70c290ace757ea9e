use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::export::{DirSink, ExportFile, ExportSink};

pub mod compare;
pub mod health;
pub mod list;
pub mod open;
pub mod remove;
pub mod show;
pub mod upload;

/// Saves whichever exports could be built; missing ones are skipped.
pub fn save_exports<I>(dir: &Path, files: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator<Item = Option<ExportFile>>,
{
    let sink = DirSink::new(dir);
    files
        .into_iter()
        .flatten()
        .map(|f| sink.save(&f).with_context(|| format!("write {}", f.filename)))
        .collect()
}
