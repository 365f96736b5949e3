//! # smartpdf-telemetry
//!
//! Logging setup for the smartpdf binaries and a tracing layer that records
//! how long each pipeline stage took.
//!
//! ```rust,ignore
//! use smartpdf_telemetry::{LogFormat, TelemetryConfig, init_telemetry};
//!
//! let timings = init_telemetry(&TelemetryConfig::default().with_format(LogFormat::Json))?;
//! // ... run the pipeline ...
//! for (stage, elapsed) in timings.totals() {
//!     println!("{stage}: {elapsed:?}");
//! }
//! ```
//!
//! `RUST_LOG` takes precedence over the configured level:
//!
//! ```bash
//! RUST_LOG=smartpdf_rag=debug smartpdf report.pdf
//! ```

pub mod timings;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

pub use timings::{STAGE_PREFIX, StageTiming, StageTimingLayer, StageTimings};

/// Output format of the log layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable single-line records.
    #[default]
    Plain,
    /// One JSON object per record.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Filter directives used when `RUST_LOG` is unset, e.g. `info` or
    /// `warn,smartpdf_rag=debug`.
    pub default_directives: String,
    /// Output format of the log layer.
    pub format: LogFormat,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self { default_directives: "info".to_string(), format: LogFormat::Plain }
    }
}

impl TelemetryConfig {
    /// Set the output format.
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the directives used when `RUST_LOG` is unset.
    pub fn with_directives(mut self, directives: impl Into<String>) -> Self {
        self.default_directives = directives.into();
        self
    }

    /// The filter for the log layer. `RUST_LOG` wins over the defaults.
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&self.default_directives))
    }
}

/// Error returned when a global subscriber is already installed.
#[derive(Debug, thiserror::Error)]
#[error("failed to install tracing subscriber: {0}")]
pub struct TelemetryError(String);

/// Install the global subscriber: a filtered log layer writing to stderr
/// plus a [`StageTimingLayer`].
///
/// The filter applies to the log layer only, so stage timings are recorded
/// even when their spans are below the log level.
///
/// # Errors
///
/// Returns [`TelemetryError`] if a global subscriber was already set.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<StageTimings, TelemetryError> {
    let timings = StageTimings::new();
    let filter = config.env_filter();

    let log_layer = match config.format {
        LogFormat::Plain => tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_current_span(true)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(StageTimingLayer::new(timings.clone()))
        .with(log_layer.with_filter(filter))
        .try_init()
        .map_err(|e| TelemetryError(e.to_string()))?;

    Ok(timings)
}
