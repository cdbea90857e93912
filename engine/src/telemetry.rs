//! Logging setup for binaries and tests embedding the engine.
//!
//! The engine only emits `tracing` events; installing a subscriber is up to
//! the caller. [`TelemetryBuilder`] wires up the usual one.

use anyhow::{Context, Result};
use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Builder for the global `tracing` subscriber.
#[derive(Debug, Clone)]
pub struct TelemetryBuilder {
    service_name: String,
    log_level: String,
    json: bool,
    span_events: bool,
}

impl TelemetryBuilder {
    /// Creates a builder logging at `info` in plain text.
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            log_level: "info".to_string(),
            json: false,
            span_events: false,
        }
    }

    /// Default filter directive, used when `RUST_LOG` is unset.
    #[must_use]
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Emits JSON lines instead of plain text.
    #[must_use]
    pub fn with_json(mut self) -> Self {
        self.json = true;
        self
    }

    /// Logs a line when each pipeline span closes, with its timing.
    #[must_use]
    pub fn with_span_events(mut self) -> Self {
        self.span_events = true;
        self
    }

    /// Name reported in the startup event.
    #[must_use]
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.log_level))
    }

    /// Installs the subscriber globally.
    ///
    /// # Errors
    ///
    /// Returns an error if a global subscriber is already installed.
    pub fn init(self) -> Result<()> {
        let span_events = if self.span_events { FmtSpan::CLOSE } else { FmtSpan::NONE };
        let fmt_layer = if self.json {
            fmt::layer().json().with_span_events(span_events).boxed()
        } else {
            fmt::layer().with_span_events(span_events).boxed()
        };

        Registry::default()
            .with(self.env_filter())
            .with(fmt_layer)
            .try_init()
            .context("Failed to init subscriber")?;

        tracing::info!(service = %self.service_name, "telemetry initialized");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_settings() {
        let builder = TelemetryBuilder::new("linediff")
            .with_log_level("debug")
            .with_json()
            .with_span_events();
        assert_eq!(builder.service_name(), "linediff");
        assert_eq!(builder.log_level, "debug");
        assert!(builder.json);
        assert!(builder.span_events);
    }

    #[test]
    fn test_second_init_fails() {
        // Another test may have installed the global subscriber already.
        let first = TelemetryBuilder::new("linediff").init();
        let second = TelemetryBuilder::new("linediff").init();
        assert!(first.is_err() || second.is_err());
    }
}
