mod cli;
mod config;
mod error;
mod poller;
mod transcriber;
mod transcription;
mod ui;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, Command};
use config::VoxpollConfig;
use poller::PollOutcome;
use transcriber::Transcriber;
use transcription::{StatusChecker, TranscriptionClient};
use ui::PollProgress;

/// Exit code for configuration, I/O and submission errors.
const EXIT_ERROR: u8 = 3;
/// Conventional exit code after SIGINT.
const EXIT_INTERRUPTED: u8 = 130;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("  {} {e:#}", console::style("✗").red().bold());
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "voxpoll=debug" } else { "voxpoll=warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(cli: Cli) -> Result<u8> {
    let mut config = VoxpollConfig::load().context("failed to load voxpoll.toml")?;
    config.apply_cli(&cli);
    config.validate()?;
    if config.api_key.is_empty() {
        warn!("no API key configured; requests are sent unauthenticated");
    }

    let client = TranscriptionClient::with_base_url(config.api_key.clone(), config.base_url.clone());
    let transcriber = Transcriber::new(client, config.poll.clone());
    let max_attempts = transcriber.policy().max_attempts;

    match cli.command {
        Command::Status { job_id } => {
            let report = transcriber
                .client()
                .check_status(&job_id)
                .await
                .with_context(|| format!("status check for {job_id} failed"))?;
            ui::print_status(&job_id, &report, cli.json);
            Ok(0)
        }
        Command::Wait { job_id } => {
            let progress = PollProgress::start(&job_id, max_attempts);
            let polled = transcriber.await_job(&job_id, |a| progress.attempt(a));
            let outcome = tokio::select! {
                outcome = polled => outcome,
                _ = tokio::signal::ctrl_c() => {
                    progress.abandon();
                    return Ok(EXIT_INTERRUPTED);
                }
            };
            Ok(report(&progress, &outcome, cli.json))
        }
        Command::Transcribe { file } => {
            let progress = PollProgress::start(&file.display().to_string(), max_attempts);
            let polled = transcriber.transcribe_file(&file, |a| progress.attempt(a));
            let result = tokio::select! {
                result = polled => result,
                _ = tokio::signal::ctrl_c() => {
                    progress.abandon();
                    return Ok(EXIT_INTERRUPTED);
                }
            };
            let outcome = match result {
                Ok(outcome) => outcome,
                Err(e) => {
                    progress.abandon();
                    return Err(e).with_context(|| format!("could not transcribe {}", file.display()));
                }
            };
            Ok(report(&progress, &outcome, cli.json))
        }
    }
}

fn report(progress: &PollProgress, outcome: &PollOutcome, json: bool) -> u8 {
    if json {
        progress.abandon();
        ui::print_json(outcome);
    } else {
        progress.complete(outcome);
    }
    outcome.exit_code()
}
