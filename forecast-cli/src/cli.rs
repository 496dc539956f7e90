use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use forecast_core::{
    Config, ExtremesPolicy, ForecastPipeline, Phase, Projector, provider_from_config,
};
use inquire::{Password, PasswordDisplayMode, Text};
use tracing::{info, warn};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "forecast", version, about = "Five-day forecast strip")]
pub struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the API key and a default location.
    Configure,

    /// Fetch once and print the five-day strip.
    Show {
        /// Place name or "lat,lon"; falls back to the configured default.
        location: Option<String>,

        /// Print the day summaries as JSON.
        #[arg(long)]
        json: bool,

        /// Fill max/min from the provider instead of 0.
        #[arg(long)]
        extremes: bool,
    },

    /// Refresh periodically and print every new strip until Ctrl-C.
    Watch {
        /// Place name or "lat,lon"; falls back to the configured default.
        location: Option<String>,

        /// Seconds between refreshes.
        #[arg(long, default_value_t = 300)]
        every: u64,

        /// Fill max/min from the provider instead of 0.
        #[arg(long)]
        extremes: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { location, json, extremes } => show(location, json, extremes).await,
            Command::Watch { location, every, extremes } => watch(location, every, extremes).await,
        }
    }
}

pub fn log_filter_from_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn extremes_policy(flag: bool, config: &Config) -> ExtremesPolicy {
    if flag { ExtremesPolicy::FromSource } else { config.extremes }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("Tomorrow.io API key:")
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .prompt()
        .context("Failed to read API key")?;

    let location = Text::new("Default location (blank for none):")
        .with_initial_value(config.default_location.as_deref().unwrap_or(""))
        .prompt()
        .context("Failed to read default location")?;

    config.set_api_key(api_key.trim().to_string());
    config.default_location = Some(location.trim().to_string()).filter(|l| !l.is_empty());
    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn show(location: Option<String>, json: bool, extremes: bool) -> anyhow::Result<()> {
    let config = Config::load()?.with_env_overrides();
    let location = config.resolve_location(location)?;
    let policy = extremes_policy(extremes, &config);

    let pipeline = ForecastPipeline::new(provider_from_config(&config)?, Projector::new(policy));

    if let Err(err) = pipeline.refresh(&location).await {
        let kind = err.kind();
        return Err(anyhow::Error::new(err)
            .context(format!("Could not load the forecast for '{location}' ({kind})")));
    }

    let state = pipeline.snapshot();
    if json {
        println!("{}", render::render_json(&state.days)?);
    } else {
        print!("{}", render::render_strip(&location, &state.days, policy));
    }

    Ok(())
}

async fn watch(location: Option<String>, every: u64, extremes: bool) -> anyhow::Result<()> {
    let config = Config::load()?.with_env_overrides();
    let location = config.resolve_location(location)?;
    let policy = extremes_policy(extremes, &config);

    let pipeline = ForecastPipeline::new(provider_from_config(&config)?, Projector::new(policy));

    let mut updates = pipeline.subscribe();
    let heading = location.clone();
    let printer = tokio::spawn(async move {
        let mut shown = 0;
        while updates.changed().await.is_ok() {
            let state = updates.borrow_and_update().clone();
            if state.phase == Phase::Idle && state.revision > shown {
                shown = state.revision;
                println!("[{}]", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));
                print!("{}", render::render_strip(&heading, &state.days, policy));
            }
        }
    });

    info!(%location, every, "Watching forecast");
    let shutdown = async {
        let _ = tokio::signal::ctrl_c().await;
    };
    run_watch_loop(&pipeline, &location, Duration::from_secs(every.max(1)), shutdown).await;

    printer.abort();
    Ok(())
}

/// Refresh on every tick until `shutdown` resolves, which also interrupts a
/// refresh that is still in flight.
async fn run_watch_loop<F>(pipeline: &ForecastPipeline, location: &str, every: Duration, shutdown: F)
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut ticker = tokio::time::interval(every);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            () = &mut shutdown => break,
        }

        tokio::select! {
            result = pipeline.refresh(location) => {
                if let Err(err) = result {
                    warn!(kind = %err.kind(), "Refresh failed, keeping previous forecast");
                    eprintln!("Update failed ({}): {err}", err.kind());
                }
            }
            () = &mut shutdown => break,
        }
    }
}
