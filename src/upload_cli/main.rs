use anyhow::Context;
use clap::Parser;
use lionheart_strava::common::config::{Args, Config};
use lionheart_strava::{RunOutcome, WorkoutUpload};
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    if json {
        builder.json().with_current_span(false).init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let args = Args::parse();
    init_tracing(args.json_logs);

    let config = Config::from_args(&args);
    let missing = config.missing_session_settings();
    if !missing.is_empty() {
        warn!("Missing session settings: {}", missing.join(", "));
    }

    match run(&config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: &Config) -> anyhow::Result<()> {
    let upload = WorkoutUpload::from_config(config)
        .context("Failed to build HTTP clients")?;

    match upload.run().await {
        Ok(RunOutcome::Uploaded(response)) => {
            info!("Upload Response: {}", serde_json::to_string(&response)?);
        }
        Ok(RunOutcome::DryRun { session, profile }) => {
            info!(
                "Lionheart Data: {} {}",
                serde_json::to_string(&session)?,
                serde_json::to_string(&profile)?
            );
        }
        Err(e) => {
            let stage = e.stage();
            return Err(anyhow::Error::new(e).context(format!("{stage} stage failed")));
        }
    }

    Ok(())
}
