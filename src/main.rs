// Main entry point - Pipeline wiring and server setup
use anyhow::Context;
use std::{net::SocketAddr, sync::Arc};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use magfield_telemetry::application::classifier::ReadingClassifier;
use magfield_telemetry::application::consumer::{run_consumer, TelemetryConsumer};
use magfield_telemetry::application::ingestion_queue::ingestion_queue;
use magfield_telemetry::application::reader_loop::run_reader_loop;
use magfield_telemetry::domain::color::ColorScale;
use magfield_telemetry::domain::history::HistoryBuffer;
use magfield_telemetry::domain::status::RenderFrame;
use magfield_telemetry::infrastructure::config::load_app_config;
use magfield_telemetry::infrastructure::serial_line_source::open_serial;
use magfield_telemetry::presentation::app_state::AppState;
use magfield_telemetry::presentation::router::serve;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let app_config = load_app_config().context("Failed to load configuration")?;
    let pipeline = &app_config.pipeline;

    // A port that cannot be opened aborts startup before any reading begins
    let source = open_serial(&app_config.serial).context("Serial port error")?;

    let (queue_tx, queue_rx) = ingestion_queue();
    let consumer = TelemetryConsumer::new(
        queue_rx,
        ReadingClassifier::new(pipeline.gate_threshold_volts),
        ColorScale::new(pipeline.strength_min, pipeline.strength_max),
        HistoryBuffer::new(pipeline.history_capacity),
    );
    let (frames_tx, frames_rx) = watch::channel(RenderFrame::default());
    let shutdown = CancellationToken::new();

    tokio::spawn(run_reader_loop(
        source,
        queue_tx,
        app_config.serial.error_backoff(),
    ));
    tokio::spawn(run_consumer(
        consumer,
        pipeline.tick_interval(),
        frames_tx,
        shutdown.clone(),
    ));
    tokio::spawn(shutdown_signal(shutdown.clone()));

    let state = Arc::new(AppState {
        frames: frames_rx,
        shutdown,
    });

    let addr: SocketAddr = app_config
        .server
        .bind_addr
        .parse()
        .with_context(|| format!("Invalid server.bind_addr '{}'", app_config.server.bind_addr))?;
    tracing::info!("Starting magfield-telemetry service on {}", addr);

    serve(tokio::net::TcpListener::bind(addr).await?, state).await?;

    Ok(())
}

async fn shutdown_signal(shutdown: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutting down");
    shutdown.cancel();
}
