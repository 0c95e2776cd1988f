//! # Structured Logging Module
//!
//! Environment-aware structured logging to the console and, optionally, a JSON log file,
//! plus helpers for the handful of discovery events worth a structured record.

use chrono::Utc;
use std::fs;
use std::path::PathBuf;
use std::process;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize console-only structured logging
pub fn init_structured_logging() {
    init_logging(None);
}

/// Initialize structured logging with an additional JSON file layer under `log_dir`
pub fn init_structured_logging_with_file(log_dir: impl Into<PathBuf>) {
    init_logging(Some(log_dir.into()));
}

fn init_logging(log_dir: Option<PathBuf>) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let log_level = get_log_level(&environment);

        let console_layer = fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_level(true)
            .with_ansi(true)
            .with_filter(build_filter(&log_level));

        let file_layer = log_dir.and_then(|dir| {
            if let Err(e) = fs::create_dir_all(&dir) {
                eprintln!("Failed to create log directory {}: {e}", dir.display());
                return None;
            }

            let file_name = format!(
                "{}.{}.{}.log",
                environment,
                process::id(),
                Utc::now().format("%Y%m%d_%H%M%S")
            );
            let file_appender = tracing_appender::rolling::never(&dir, file_name);
            let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
            // The writer must outlive every span, so the guard lives for the process
            std::mem::forget(guard);

            Some(
                fmt::layer()
                    .with_writer(file_writer)
                    .with_target(true)
                    .with_level(true)
                    .with_ansi(false)
                    .json()
                    .with_filter(build_filter(&log_level)),
            )
        });

        let subscriber = tracing_subscriber::registry()
            .with(console_layer)
            .with(file_layer);

        if subscriber.try_init().is_err() {
            tracing::debug!("Global tracing subscriber already initialized - continuing with existing subscriber");
        }

        tracing::info!(
            pid = process::id(),
            environment = %environment,
            "Structured logging initialized"
        );
    });
}

/// RUST_LOG wins over the environment default
fn build_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

fn get_environment() -> String {
    std::env::var("DISCOVERY_ENV")
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

fn get_log_level(environment: &str) -> String {
    match environment {
        "production" => "info".to_string(),
        _ => "debug".to_string(),
    }
}

/// Informational note for a unit that was not stale
pub fn log_unit_skipped(unit: &str, update_time: i64, low_watermark: i64) {
    tracing::info!(
        unit = %unit,
        update_time = update_time,
        low_watermark = low_watermark,
        "Not creating work unit: update time is not after the low watermark"
    );
}

/// Record an emitted work unit
pub fn log_work_unit_created(unit: &str, dataset_urn: &str, low_watermark: i64, expected_high: i64) {
    tracing::debug!(
        unit = %unit,
        dataset_urn = %dataset_urn,
        low_watermark = low_watermark,
        expected_high_watermark = expected_high,
        "Work unit created"
    );
}

/// Log error with full context
pub fn log_error(component: &str, operation: &str, error: &str, context: Option<&str>) {
    tracing::error!(
        component = %component,
        operation = %operation,
        error = %error,
        context = context,
        timestamp = %Utc::now().to_rfc3339(),
        "Discovery error"
    );
}
