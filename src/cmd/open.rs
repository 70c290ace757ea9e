use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::api::{CallOptions, DatasetsClient};
use crate::export::ExportFormat;
use crate::telemetry::{self};
use crate::telemetry::ops::open::Phase as OpenPhase;
use crate::views::Route;

use super::{compare, list, show, upload};

/// `prism open <route>`: `/`, `/upload?file=..`, `/datasets/{id}`, `/compare?base=..&target=..`
#[derive(Args, Debug)]
pub struct OpenCmd {
    pub route: String,
}

pub async fn run(client: &DatasetsClient, opts: &CallOptions, args: OpenCmd) -> Result<ExitCode> {
    let log = telemetry::open();
    let _g = log.root_span_kv([("route", args.route.clone())]).entered();

    let route = {
        let _s = log.span(&OpenPhase::Resolve).entered();
        match Route::parse(&args.route) {
            Ok(route) => route,
            Err(err) => {
                log.fail(&err.to_string(), None)?;
                return Ok(ExitCode::FAILURE);
            }
        }
    };
    log.info_kv(&format!("🧭 {route}"), [("route", route.to_string())]);

    let _s = log.span(&OpenPhase::Dispatch).entered();
    match route {
        Route::List => list::run(client, opts, list::ListCmd::default()).await,
        Route::Upload { file } => upload::upload_path(client, opts, file).await,
        Route::Detail(id) => {
            let cmd = show::ShowCmd { id, export: None, format: ExportFormat::Csv };
            show::run(client, opts, cmd).await
        }
        Route::Compare { base, target } => {
            compare::compare_ids(client, opts, base, target, None, ExportFormat::Csv).await
        }
    }
}
