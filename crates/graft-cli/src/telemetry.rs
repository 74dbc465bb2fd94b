//! Subscriber setup for the `graft` binary.

use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use graft_execution::{MigrationEvent, MigrationEventLayer};

use crate::LogFormat;

/// Installed subscriber plus the task draining outcome events.
pub struct Telemetry {
    guard: DefaultGuard,
    events: Option<JoinHandle<Result<()>>>,
}

impl Telemetry {
    /// Uninstalls the subscriber and waits until every event is on disk.
    ///
    /// Dropping the subscriber drops the event sender, which ends the writer
    /// task once the channel is empty.
    pub async fn finish(self) -> Result<()> {
        drop(self.guard);
        match self.events {
            Some(handle) => handle.await.context("Event writer task panicked")?,
            None => Ok(()),
        }
    }
}

/// Installs the subscriber for the current thread.
///
/// `RUST_LOG` controls the stderr output (default `info`). The event file,
/// when requested, receives every migration outcome regardless of `RUST_LOG`.
pub async fn init(format: LogFormat, events_path: Option<&Path>) -> Result<Telemetry> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = match format {
        LogFormat::Human => fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_filter(filter)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_filter(filter)
            .boxed(),
    };

    let (event_layer, events) = match events_path {
        Some(path) => {
            let file = File::create(path)
                .await
                .with_context(|| format!("Failed to create event file {}", path.display()))?;
            let (sender, receiver) = mpsc::unbounded_channel();
            let handle = tokio::spawn(write_events(file, receiver));
            (Some(MigrationEventLayer::new(sender)), Some(handle))
        }
        None => (None, None),
    };

    let subscriber = tracing_subscriber::registry()
        .with(fmt_layer)
        .with(event_layer);
    let guard = tracing::subscriber::set_default(subscriber);

    Ok(Telemetry { guard, events })
}

async fn write_events(file: File, mut receiver: mpsc::UnboundedReceiver<MigrationEvent>) -> Result<()> {
    let mut writer = BufWriter::new(file);
    while let Some(event) = receiver.recv().await {
        let mut line = serde_json::to_vec(&event)?;
        line.push(b'\n');
        writer.write_all(&line).await?;
    }
    writer.flush().await?;
    Ok(())
}
