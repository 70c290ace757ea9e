use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::api::types::DatasetId;
use crate::api::{CallOptions, DatasetsClient};
use crate::telemetry::{self};
use crate::telemetry::ops::remove::Phase as RemovePhase;
use crate::views::detail::{DeleteOutcome, DetailView};

/// `prism rm <id>`
#[derive(Args, Debug)]
pub struct RemoveCmd {
    pub id: DatasetId,
    /// Skip the confirmation prompt
    #[arg(long, default_value_t = false)]
    pub yes: bool,
}

#[derive(Serialize)]
struct RemovePlan<'a> {
    dataset_id: DatasetId,
    filename: &'a str,
    rows: i64,
}

#[derive(Serialize)]
struct RemoveResult {
    dataset_id: DatasetId,
    deleted: bool,
    next: Option<String>,
}

pub async fn run(client: &DatasetsClient, opts: &CallOptions, args: RemoveCmd) -> Result<ExitCode> {
    let log = telemetry::remove();
    let _g = log
        .root_span_kv([("id", args.id.to_string()), ("yes", args.yes.to_string())])
        .entered();

    // Deletion is offered from the loaded detail view only.
    let mut view = DetailView::new(args.id);
    {
        let _s = log.span(&RemovePhase::Fetch).entered();
        view.load(client, opts).await;
    }
    view.unmount();
    if let Some(failure) = view.state.failure() {
        log.fail(&failure.message, failure.status)?;
        return Ok(ExitCode::FAILURE);
    }

    // JSON mode never prompts: without --yes it only reports what would go.
    if telemetry::config::json_mode() && !args.yes {
        if let Some(b) = view.state.data() {
            log.plan(&RemovePlan { dataset_id: args.id, filename: &b.detail.filename, rows: b.detail.rows })?;
        }
        return Ok(ExitCode::SUCCESS);
    }

    let confirmed = {
        let _s = log.span(&RemovePhase::Confirm).entered();
        confirm(view.delete_prompt(), args.yes).await
    };
    let outcome = {
        let _s = log.span(&RemovePhase::Delete).entered();
        view.delete(client, opts, &move |_: &str| confirmed).await
    };

    match outcome {
        DeleteOutcome::Declined => {
            log.info("ℹ️  Cancelled; nothing was deleted");
            if telemetry::config::json_mode() {
                log.result(&RemoveResult { dataset_id: args.id, deleted: false, next: None })?;
            }
            Ok(ExitCode::SUCCESS)
        }
        DeleteOutcome::Deleted { next } => {
            log.info(format!("🗑️  Deleted dataset #{}", args.id));
            if telemetry::config::json_mode() {
                log.result(&RemoveResult { dataset_id: args.id, deleted: true, next: Some(next.to_string()) })?;
            } else {
                log.info(format!("➡️  back to the list: prism open {next}"));
            }
            Ok(ExitCode::SUCCESS)
        }
        DeleteOutcome::Failed(failure) => {
            log.fail(&failure.message, failure.status)?;
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Reads the answer on the blocking pool so the runtime keeps serving the Ctrl-C watcher.
async fn confirm(prompt: String, assume_yes: bool) -> bool {
    if assume_yes {
        return true;
    }
    tokio::task::spawn_blocking(move || prompt_stdin(&prompt)).await.unwrap_or(false)
}

fn prompt_stdin(prompt: &str) -> bool {
    eprint!("{prompt} [y/N] ");
    let _ = io::stderr().flush();
    let mut line = String::new();
    match io::stdin().lock().read_line(&mut line) {
        Ok(_) => is_yes(&line),
        Err(_) => false,
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_explicit_yes_confirms() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes("\n"));
        assert!(!is_yes("no"));
        assert!(!is_yes("yep"));
    }

    #[tokio::test]
    async fn yes_flag_confirms_without_reading_stdin() {
        assert!(confirm("Delete dataset 1? This cannot be undone.".into(), true).await);
    }
}
