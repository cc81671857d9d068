use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use roomd::Config;
use roomd::Engine;
use roomd::LogLevel;
use roomd::RoomController;
use roomd::engine::Clock;
use roomd::engine::SensorSource;
use roomd::engine::TracingSink;
use roomd::sources::ReplaySource;
use roomd::sources::SimulatedRoom;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Simulated room-automation controller
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Replay readings from a JSON-lines recording instead of simulating them
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Number of simulated hours (overrides the configuration)
    #[arg(long)]
    hours: Option<u32>,

    /// Default log level (overrides the configuration)
    #[arg(long, value_parser = parse_log_level)]
    log_level: Option<LogLevel>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }
    if let Some(hours) = args.hours {
        config.simulation.hours = hours;
        config.validate()?;
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(config.logging.filter())
        .init();

    tracing::info!("roomd starting");
    if let Some(path) = &args.config {
        tracing::info!("Loaded config from: {}", path.display());
    }

    let mut engine = Engine::new(TracingSink);
    for room in &config.rooms {
        engine.add_room(RoomController::new(room.name.clone()))?;
    }

    let mut hours = config.simulation.hours;
    let mut sources: Vec<Box<dyn SensorSource>> = Vec::new();
    match &args.replay {
        Some(path) => {
            let source = ReplaySource::load(path)
                .await
                .with_context(|| format!("Failed to load recording {}", path.display()))?;
            // Without an explicit --hours, play the whole recording. Recorded
            // hours are below MAX_HOURS, so this stays within the config bound.
            if args.hours.is_none() {
                if let Some(last) = source.last_hour() {
                    hours = last + 1;
                }
            }
            sources.push(Box::new(source));
        }
        None => {
            for room in &config.rooms {
                sources.push(Box::new(SimulatedRoom::new(
                    room,
                    config.simulation.amplitude,
                )));
            }
        }
    }

    let tick_interval = Duration::from_millis(config.simulation.tick_interval_ms);
    let mut clock = Clock::new(hours, tick_interval);
    for source in sources {
        clock.add_source(source);
    }

    // Start the status API if enabled
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let api_handle = if config.api.enabled {
        let listen = config.api.listen.clone();
        let port = config.api.port;
        let engine_state = engine.subscribe();
        Some(tokio::spawn(async move {
            if let Err(e) = roomd::api::serve(listen, port, engine_state, shutdown_rx).await {
                tracing::error!("HTTP API server failed: {}", e);
            }
        }))
    } else {
        None
    };

    let tx = engine.sender();
    let engine_handle = tokio::spawn(engine.run());

    let interrupted = tokio::select! {
        result = clock.run(tx) => {
            result?;
            tracing::info!("Simulation complete");
            false
        }
        result = tokio::signal::ctrl_c() => {
            match result {
                Ok(()) => tracing::info!("Received shutdown signal"),
                Err(e) => tracing::error!("Failed to listen for shutdown signal: {}", e),
            }
            true
        }
    };

    // The clock's sender is gone either way, so the engine drains and stops
    engine_handle.await.context("Engine task failed")?;

    if let Some(handle) = api_handle {
        if !interrupted {
            tracing::info!("Status API stays up until Ctrl+C");
            tokio::signal::ctrl_c().await.ok();
        }
        shutdown_tx.send(()).ok();
        handle.await.ok();
    }

    tracing::info!("roomd shutdown complete");

    Ok(())
}

fn parse_log_level(level: &str) -> Result<LogLevel, String> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(LogLevel::Trace),
        "debug" => Ok(LogLevel::Debug),
        "info" => Ok(LogLevel::Info),
        "warn" | "warning" => Ok(LogLevel::Warn),
        "error" => Ok(LogLevel::Error),
        _ => Err(format!("invalid log level '{}'", level)),
    }
}
