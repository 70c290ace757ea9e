use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::api::types::DatasetId;
use crate::api::{CallOptions, DatasetsClient};
use crate::export::csv::{samples_csv, stats_csv};
use crate::export::markdown::{analysis_markdown, column_summary};
use crate::export::ExportFormat;
use crate::telemetry::{self};
use crate::telemetry::ctx::LogCtx;
use crate::telemetry::ops::detail::{Detail, Phase as DetailPhase};
use crate::util::time::{display_timestamp, today};
use crate::views::detail::{DetailBundle, DetailView};

/// `prism show <id>`
#[derive(Args, Debug)]
pub struct ShowCmd {
    pub id: DatasetId,
    /// Write export files into this directory
    #[arg(long, value_name = "DIR")]
    pub export: Option<PathBuf>,
    /// csv: column statistics and sample rows; md: analysis report
    #[arg(long, value_enum, default_value_t = ExportFormat::Csv)]
    pub format: ExportFormat,
}

#[derive(Serialize)]
struct ShowResult<'a> {
    #[serde(flatten)]
    bundle: &'a DetailBundle,
    exported: Vec<PathBuf>,
}

pub async fn run(client: &DatasetsClient, opts: &CallOptions, args: ShowCmd) -> Result<ExitCode> {
    let log = telemetry::detail();
    let _g = log
        .root_span_kv([
            ("id", args.id.to_string()),
            ("export", format!("{:?}", args.export)),
            ("format", format!("{:?}", args.format)),
        ])
        .entered();

    let mut view = DetailView::new(args.id);
    {
        let _s = log.span(&DetailPhase::Fetch).entered();
        view.load(client, opts).await;
    }
    view.unmount();
    if let Some(failure) = view.state.failure() {
        log.fail(&failure.message, failure.status)?;
        return Ok(ExitCode::FAILURE);
    }
    let Some(bundle) = view.state.data() else {
        return Ok(ExitCode::FAILURE);
    };

    let exported = match &args.export {
        Some(dir) => {
            let _s = log.span_kv(&DetailPhase::Export, [("dir", dir.display().to_string())]).entered();
            let date = today();
            let files = match args.format {
                ExportFormat::Csv => vec![
                    stats_csv(Some(&bundle.stats), date),
                    samples_csv(Some(&bundle.detail), Some(&bundle.stats), date),
                ],
                ExportFormat::Md => vec![analysis_markdown(
                    Some(&bundle.detail),
                    Some(&bundle.stats),
                    Some(&bundle.analysis),
                    date,
                )],
            };
            super::save_exports(dir, files)?
        }
        None => Vec::new(),
    };

    let _r = log.span(&DetailPhase::Render).entered();
    if telemetry::config::json_mode() {
        log.result(&ShowResult { bundle, exported })?;
        return Ok(ExitCode::SUCCESS);
    }
    render(&log, bundle);
    for path in &exported {
        log.info(format!("💾 Wrote {}", path.display()));
    }
    Ok(ExitCode::SUCCESS)
}

fn render(log: &LogCtx<Detail>, b: &DetailBundle) {
    let d = &b.detail;
    log.info(format!("📄 Dataset #{}  {}", d.dataset_id, d.filename));
    log.info(format!("   Uploaded: {}", display_timestamp(&d.created_at)));
    log.info(format!("   Rows: {}", d.rows));

    log.info(format!("📊 Columns ({}):", b.stats.columns.len()));
    for col in &b.stats.columns {
        log.info(format!(
            "  {:20} {:7} present={} non_empty={}  {}",
            col.name,
            col.kind.as_str(),
            col.present_count,
            col.non_empty_count,
            column_summary(col)
        ));
    }

    log.info(format!("🔎 Samples ({}):", d.samples.len()));
    for s in &d.samples {
        let cells: Vec<String> = s.data.iter().map(|(k, v)| format!("{k}={v}")).collect();
        log.info(format!("  [{}] {}", s.row_index, cells.join("  ")));
    }

    log.info(format!("🧠 Analysis (generated {}):", display_timestamp(&b.analysis.generated_at)));
    for line in b.analysis.analysis_text.lines() {
        log.info(format!("  {line}"));
    }
}
