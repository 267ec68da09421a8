//! Headless arena runner.
//!
//! Loads a scenario and its tuning, drives the runtime for a fixed number of
//! ticks (or until one side is wiped out) and prints a JSON report.
mod config;
mod summary;

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use game_content::{ConfigLoader, ScenarioLoader};
use game_core::{GameConfig, Team};
use runtime::{Runtime, RuntimeConfig, Topic};

use config::CliConfig;
use summary::{Summary, Tally};

/// Ticks run between two survivor checks.
const BATCH: u64 = 60;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = CliConfig::from_env();
    let _guard = setup_logging(config.log_dir.as_deref())?;

    let seed = config.seed.unwrap_or_else(rand::random);
    let game_config = load_game_config(&config.config)?;
    let scenario = ScenarioLoader::load(&config.scenario)?;
    let (world, roster) = scenario.build_world()?;

    let runtime = Runtime::builder()
        .config(RuntimeConfig {
            tick_ms: config.tick_ms,
            seed,
            pathfinding: config.pathfinding,
            ..RuntimeConfig::default()
        })
        .world(world)
        .game_config(game_config)
        .build()
        .await?;
    let handle = runtime.handle();

    let combat = tokio::spawn(Tally::default().collect(handle.subscribe(Topic::Combat)));
    let control = tokio::spawn(Tally::default().collect(handle.subscribe(Topic::Control)));

    info!(
        scenario = %config.scenario.display(),
        seed,
        ticks = config.ticks,
        "running arena"
    );

    let mut remaining = config.ticks;
    while remaining > 0 {
        let batch = remaining.min(BATCH);
        handle.step(batch).await?;
        remaining -= batch;

        let snapshot = handle.snapshot().await?;
        if snapshot.survivors(Team::Friendly) == 0 || snapshot.survivors(Team::Hostile) == 0 {
            info!(tick = snapshot.tick, "one side has been wiped out");
            break;
        }
    }

    let snapshot = handle.snapshot().await?;
    drop(handle);
    runtime.shutdown().await?;

    let tally = combat
        .await
        .context("combat collector panicked")?
        .merge(control.await.context("control collector panicked")?);
    let summary = Summary::new(
        config.scenario.display().to_string(),
        seed,
        roster,
        tally,
        snapshot,
    );
    info!(outcome = summary.outcome, elapsed_ms = summary.elapsed_ms, "run finished");

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn load_game_config(path: &Path) -> Result<GameConfig> {
    if path.exists() {
        return ConfigLoader::load(path);
    }
    warn!(path = %path.display(), "tuning file not found, using defaults");
    Ok(GameConfig::default())
}

/// Logs to stderr, and to `arena.log` in `log_dir` when one is given. The
/// returned guard flushes the file writer when dropped.
fn setup_logging(log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());
    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let Some(log_dir) = log_dir else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
        return Ok(None);
    };

    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("creating log directory {}", log_dir.display()))?;
    let file_appender = tracing_appender::rolling::never(log_dir, "arena.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    info!("Log file: {}/arena.log", log_dir.display());
    Ok(Some(guard))
}
