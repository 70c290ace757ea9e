use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::api::types::{DatasetId, MetricMap};
use crate::api::{CallOptions, DatasetsClient};
use crate::export::csv::comparison_csv;
use crate::export::markdown::comparison_markdown;
use crate::export::ExportFormat;
use crate::telemetry::{self};
use crate::telemetry::ctx::LogCtx;
use crate::telemetry::ops::compare::{Compare, Phase as ComparePhase};
use crate::util::fmt::{fixed_1dp, percent, signed_1dp, signed_int};
use crate::util::time::{display_timestamp, today};
use crate::views::compare::{CompareBundle, CompareView};
use crate::views::route::parse_id;

/// `prism compare <base> <target>`
#[derive(Args, Debug)]
pub struct CompareCmd {
    pub base: String,
    pub target: String,
    /// Write export files into this directory
    #[arg(long, value_name = "DIR")]
    pub export: Option<PathBuf>,
    /// csv: statistics diff; md: diff plus transition analysis
    #[arg(long, value_enum, default_value_t = ExportFormat::Csv)]
    pub format: ExportFormat,
}

#[derive(Serialize)]
struct CompareResult<'a> {
    #[serde(flatten)]
    bundle: &'a CompareBundle,
    exported: Vec<PathBuf>,
}

pub async fn run(client: &DatasetsClient, opts: &CallOptions, args: CompareCmd) -> Result<ExitCode> {
    let (base, target) = (parse_id(&args.base), parse_id(&args.target));
    compare_ids(client, opts, base, target, args.export.as_deref(), args.format).await
}

pub async fn compare_ids(
    client: &DatasetsClient,
    opts: &CallOptions,
    base: Option<DatasetId>,
    target: Option<DatasetId>,
    export: Option<&Path>,
    format: ExportFormat,
) -> Result<ExitCode> {
    let log = telemetry::compare();
    let _g = log
        .root_span_kv([
            ("base", format!("{:?}", base)),
            ("target", format!("{:?}", target)),
            ("export", format!("{:?}", export)),
            ("format", format!("{:?}", format)),
        ])
        .entered();

    let mut view = CompareView::new(base, target);
    {
        let phase = if view.ids().is_some() { ComparePhase::Fetch } else { ComparePhase::Validate };
        let _s = log.span(&phase).entered();
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

    let exported = match export {
        Some(dir) => {
            let _s = log.span_kv(&ComparePhase::Export, [("dir", dir.display().to_string())]).entered();
            let date = today();
            let file = match format {
                ExportFormat::Csv => comparison_csv(Some(&bundle.comparison), date),
                ExportFormat::Md => comparison_markdown(Some(&bundle.comparison), Some(&bundle.analysis), date),
            };
            super::save_exports(dir, [file])?
        }
        None => Vec::new(),
    };

    let _r = log.span(&ComparePhase::Render).entered();
    if telemetry::config::json_mode() {
        log.result(&CompareResult { bundle, exported })?;
        return Ok(ExitCode::SUCCESS);
    }
    render(&log, bundle);
    for path in &exported {
        log.info(format!("💾 Wrote {}", path.display()));
    }
    Ok(ExitCode::SUCCESS)
}

fn render(log: &LogCtx<Compare>, b: &CompareBundle) {
    let (base, target) = (&b.comparison.base_dataset, &b.comparison.target_dataset);
    log.info(format!("⚖️  #{} {} ({} rows) -> #{} {} ({} rows)", base.dataset_id, base.filename, base.rows, target.dataset_id, target.filename, target.rows));

    let rc = &b.comparison.comparison.rows_change;
    log.info(format!("   Rows: {} -> {}  {} ({})", rc.base, rc.target, signed_int(rc.diff), percent(rc.percent)));

    log.info("📊 Columns:");
    for col in &b.comparison.comparison.columns_change {
        let metric = |m: Option<&MetricMap>, key: &str| m.and_then(|m| m.get(key).copied().flatten());
        match (metric(col.base.as_ref(), "avg"), metric(col.target.as_ref(), "avg"), metric(col.diff.as_ref(), "avg")) {
            (Some(b), Some(t), Some(d)) => log.info(format!(
                "  {:20} {:7} avg {} -> {} ({})",
                col.name,
                col.kind,
                fixed_1dp(b),
                fixed_1dp(t),
                signed_1dp(d)
            )),
            _ => log.info(format!("  {:20} {}", col.name, col.kind)),
        }
    }

    let significant = &b.analysis.comparison_summary.significant_changes;
    if !significant.is_empty() {
        log.info("❗ Significant changes:");
        for s in significant {
            log.info(format!(
                "  {} ({}): {} -> {}  {} ({})",
                s.column_name,
                s.change_type,
                s.base_value,
                s.target_value,
                signed_1dp(s.diff),
                percent(s.percent)
            ));
        }
    }

    log.info(format!("🧠 Transition analysis (generated {}):", display_timestamp(&b.analysis.generated_at)));
    for line in b.analysis.analysis_text.lines() {
        log.info(format!("  {line}"));
    }
}
