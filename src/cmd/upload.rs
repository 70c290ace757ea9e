use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::api::types::UploadDatasetResponse;
use crate::api::{CallOptions, DatasetsClient, UploadFile};
use crate::telemetry::{self};
use crate::telemetry::ops::upload::Phase as UploadPhase;
use crate::views::upload::UploadView;

/// `prism upload <file.csv>`
#[derive(Args, Debug)]
pub struct UploadCmd {
    /// CSV file to upload
    pub path: PathBuf,
}

#[derive(Serialize)]
struct UploadResult<'a> {
    #[serde(flatten)]
    upload: &'a UploadDatasetResponse,
    detail_route: Option<String>,
}

pub async fn run(client: &DatasetsClient, opts: &CallOptions, args: UploadCmd) -> Result<ExitCode> {
    upload_path(client, opts, Some(args.path)).await
}

/// Shared with `prism open /upload[?file=...]`, where the file is optional.
pub async fn upload_path(client: &DatasetsClient, opts: &CallOptions, path: Option<PathBuf>) -> Result<ExitCode> {
    let log = telemetry::upload();
    let _g = log.root_span_kv([("path", format!("{:?}", path))]).entered();

    let mut view = UploadView::new();
    if let Some(path) = &path {
        let _s = log.span(&UploadPhase::Read).entered();
        match UploadFile::from_path(path).await {
            Ok(file) => view.select(Some(file)),
            Err(err) => {
                log.fail(&err.to_string(), None)?;
                return Ok(ExitCode::FAILURE);
            }
        }
    }
    if let Some(file) = view.selected() {
        log.info_kv(
            &format!("⬆️  Uploading {} ({} bytes)", file.filename, file.bytes.len()),
            [("filename", file.filename.clone()), ("bytes", file.bytes.len().to_string())],
        );
    }

    let ok = {
        let _s = log.span(&UploadPhase::Send).entered();
        view.upload(client, opts).await
    };
    if !ok {
        let (msg, status) = view.failure().map(|f| (f.message.as_str(), f.status)).unwrap_or(("", None));
        log.fail(msg, status)?;
        return Ok(ExitCode::FAILURE);
    }

    let _r = log.span(&UploadPhase::Render).entered();
    let detail_route = view.detail_route().map(|r| r.to_string());
    let Some(resp) = view.result.as_ref() else {
        return Ok(ExitCode::FAILURE);
    };
    if telemetry::config::json_mode() {
        log.result(&UploadResult { upload: resp, detail_route })?;
        return Ok(ExitCode::SUCCESS);
    }
    log.info(format!("✅ Uploaded {} as dataset #{} ({} rows)", resp.filename, resp.dataset_id, resp.rows));
    if let Some(route) = detail_route {
        log.info(format!("➡️  details: prism open {route}"));
    }
    Ok(ExitCode::SUCCESS)
}
