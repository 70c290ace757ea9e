use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::api::{CallOptions, DatasetsClient};
use crate::telemetry::{self};
use crate::telemetry::ops::health::Phase as HealthPhase;

/// `prism health`
#[derive(Args, Debug)]
pub struct HealthCmd {}

pub async fn run(client: &DatasetsClient, opts: &CallOptions, _args: HealthCmd) -> Result<ExitCode> {
    let log = telemetry::health();
    let base_url = client.base_url(opts);
    let _g = log.root_span_kv([("base_url", base_url.clone())]).entered();

    let _s = log.span(&HealthPhase::Check).entered();
    match client.health(opts).await {
        Ok(resp) => {
            if telemetry::config::json_mode() {
                log.result(&resp)?;
            } else {
                log.info(format!("💚 {base_url}: {}", resp.status));
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            log.fail(&err.to_string(), err.status().map(|s| s.as_u16()))?;
            Ok(ExitCode::FAILURE)
        }
    }
}
