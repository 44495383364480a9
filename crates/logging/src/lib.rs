//! This crate provides logging initialization for the jslint-builder tools.
//!
//! It supports two modes:
//! - Cli mode: logs to STDOUT.
//! - Background mode: logs JSON to a rolling file in the data directory, for builds
//!   triggered by an IDE or a file watcher where nobody reads the terminal.
//!
//! Background logs are rolled over when they reach 5 MB. Rotated logs are
//! compressed. The maximum number of rotated logs is 20.

use anyhow::Result;
use file_rotate::{ContentLimit, FileRotate, compression::Compression, suffix::AppendCount};
use marker_store::DataDirectory;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt::writer::MakeWriterExt};

const LOG_FILE_NAME: &str = "jslint-builder.log";
const MAX_LOG_BYTES: usize = 5 * 1024 * 1024;
const MAX_ROTATED_LOGS: usize = 20;

pub enum LogMode {
    Cli,
    Background(DataDirectory),
}

/// Guard that keeps background logging workers alive.
pub struct LoggingGuards {
    _guards: Vec<WorkerGuard>,
}

fn env_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

pub fn init(mode: LogMode, verbose: bool) -> Result<Option<LoggingGuards>> {
    let filter = env_filter(verbose);

    match mode {
        LogMode::Cli => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .try_init()
                .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;
            Ok(None)
        }
        LogMode::Background(data_directory) => {
            let writer = FileRotate::new(
                data_directory.logs_dir.join(LOG_FILE_NAME),
                AppendCount::new(MAX_ROTATED_LOGS),
                ContentLimit::Bytes(MAX_LOG_BYTES),
                Compression::OnRotate(1),
                None,
            );

            let (non_blocking, guard) = tracing_appender::non_blocking(writer);

            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(non_blocking.with_max_level(tracing::Level::INFO))
                .with_ansi(false)
                .json()
                .try_init()
                .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;

            Ok(Some(LoggingGuards {
                _guards: vec![guard],
            }))
        }
    }
}
