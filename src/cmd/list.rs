use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::api::types::{Dataset, DatasetId};
use crate::api::{CallOptions, DatasetsClient};
use crate::telemetry::{self};
use crate::telemetry::ops::list::Phase as ListPhase;
use crate::util::time::display_timestamp;
use crate::views::list::{ListView, MAX_SELECTION, NO_DATASETS};

/// `prism ls`
#[derive(Args, Debug, Default)]
pub struct ListCmd {
    /// Mark a dataset for comparison; the first becomes the base, the second the target
    #[arg(long = "select", value_name = "ID")]
    pub select: Vec<DatasetId>,
}

#[derive(Serialize)]
struct ListResult<'a> {
    datasets: &'a [Dataset],
    selection: &'a [DatasetId],
    compare_route: Option<String>,
}

pub async fn run(client: &DatasetsClient, opts: &CallOptions, args: ListCmd) -> Result<ExitCode> {
    let log = telemetry::list();
    let _g = log.root_span_kv([("select", format!("{:?}", args.select))]).entered();

    let mut view = ListView::new();
    {
        let _s = log.span(&ListPhase::Fetch).entered();
        view.load(client, opts).await;
    }
    view.unmount();
    if let Some(failure) = view.state.failure() {
        log.fail(&failure.message, failure.status)?;
        return Ok(ExitCode::FAILURE);
    }

    for id in &args.select {
        if !view.datasets().iter().any(|d| d.dataset_id == *id) {
            log.warn(format!("⚠️  dataset {id} is not in the list; not selected"));
            continue;
        }
        if view.selection().len() == MAX_SELECTION && !view.selection().contains(id) {
            log.warn(format!("⚠️  at most {MAX_SELECTION} datasets can be selected; ignoring {id}"));
            continue;
        }
        view.toggle(*id);
    }

    let _r = log.span(&ListPhase::Render).entered();
    let compare_route = view.compare_route().map(|r| r.to_string());
    if telemetry::config::json_mode() {
        log.result(&ListResult { datasets: view.datasets(), selection: view.selection(), compare_route })?;
        return Ok(ExitCode::SUCCESS);
    }

    if view.is_empty() {
        log.info(format!("ℹ️  {NO_DATASETS}; upload one with `prism upload <file.csv>`"));
        return Ok(ExitCode::SUCCESS);
    }
    log.info(format!("📂 Datasets ({}):", view.datasets().len()));
    for d in view.datasets() {
        let mark = if view.selection().contains(&d.dataset_id) { "[x]" } else { "[ ]" };
        log.info(format!(
            "  {mark} #{}  {}  rows={}  uploaded={}",
            d.dataset_id,
            d.filename,
            d.row_count,
            display_timestamp(&d.created_at)
        ));
    }
    match compare_route {
        Some(route) => log.info(format!("➡️  compare: prism open '{route}'")),
        None if !view.selection().is_empty() => log.info("ℹ️  select one more dataset to compare"),
        None => {}
    }
    Ok(ExitCode::SUCCESS)
}
