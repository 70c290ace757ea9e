use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use tokio_util::sync::CancellationToken;

use prism_client::api::{CallOptions, ClientConfig, DatasetsClient};
use prism_client::{cmd, telemetry};

#[derive(Parser)]
#[command(name = "prism", about = "Prism dataset client")]
struct Cli {
    /// Backend base URL for this run; overrides PRISM_API_BASE_URL
    #[arg(global = true, long)]
    base_url: Option<String>,
    /// Emit a single JSON envelope to stdout; logs go to stderr
    #[arg(global = true, long, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List uploaded datasets
    Ls(cmd::list::ListCmd),
    /// Upload a CSV file
    Upload(cmd::upload::UploadCmd),
    /// Show a dataset: metadata, column statistics, samples and analysis
    Show(cmd::show::ShowCmd),
    /// Compare two datasets
    Compare(cmd::compare::CompareCmd),
    /// Delete a dataset
    Rm(cmd::remove::RemoveCmd),
    /// Open an app route such as /datasets/3
    Open(cmd::open::OpenCmd),
    /// Check that the backend is up
    Health(cmd::health::HealthCmd),
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenv().ok();
    let cli = Cli::parse();
    telemetry::config::set_json_mode(cli.json);

    // initialize logging/tracing (stderr). Respect RUST_LOG and PRISM_LOG_FORMAT
    telemetry::config::init_tracing();

    let client = DatasetsClient::new(ClientConfig::from_env())?;

    // Ctrl-C aborts whatever request is in flight.
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_signal.cancel();
        }
    });
    let opts = CallOptions { base_url: cli.base_url, cancel: Some(cancel) };

    match cli.command {
        Commands::Ls(args) => cmd::list::run(&client, &opts, args).await,
        Commands::Upload(args) => cmd::upload::run(&client, &opts, args).await,
        Commands::Show(args) => cmd::show::run(&client, &opts, args).await,
        Commands::Compare(args) => cmd::compare::run(&client, &opts, args).await,
        Commands::Rm(args) => cmd::remove::run(&client, &opts, args).await,
        Commands::Open(args) => cmd::open::run(&client, &opts, args).await,
        Commands::Health(args) => cmd::health::run(&client, &opts, args).await,
    }
}
