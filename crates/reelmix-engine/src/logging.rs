//! Tracing setup and structured export logging.

use tracing::{error, info, warn, Span};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global tracing subscriber.
///
/// JSON output when `LOG_FORMAT=json`, colored text otherwise. `RUST_LOG`
/// overrides the default `reelmix=info` directive.
pub fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("reelmix=info"));

    if use_json {
        let _ = tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .try_init();
    } else {
        let _ = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .try_init();
    }
}

/// Export logger with consistent structured fields.
///
/// Tags every event with the export scope (`batch` or `sequence`) and the
/// identifier it refers to.
#[derive(Debug, Clone)]
pub struct ExportLogger {
    export_id: String,
    scope: &'static str,
}

impl ExportLogger {
    /// Logger for a single-sequence export.
    pub fn for_sequence(sequence_id: impl ToString) -> Self {
        Self {
            export_id: sequence_id.to_string(),
            scope: "sequence",
        }
    }

    /// Logger for a batch export.
    pub fn for_batch(batch_id: impl ToString) -> Self {
        Self {
            export_id: batch_id.to_string(),
            scope: "batch",
        }
    }

    pub fn log_start(&self, message: &str) {
        info!(export_id = %self.export_id, scope = self.scope, "Export started: {}", message);
    }

    pub fn log_progress(&self, message: &str) {
        info!(export_id = %self.export_id, scope = self.scope, "Export progress: {}", message);
    }

    pub fn log_warning(&self, message: &str) {
        warn!(export_id = %self.export_id, scope = self.scope, "Export warning: {}", message);
    }

    pub fn log_error(&self, message: &str) {
        error!(export_id = %self.export_id, scope = self.scope, "Export error: {}", message);
    }

    pub fn log_completion(&self, message: &str) {
        info!(export_id = %self.export_id, scope = self.scope, "Export completed: {}", message);
    }

    pub fn export_id(&self) -> &str {
        &self.export_id
    }

    pub fn scope(&self) -> &str {
        self.scope
    }

    /// Create a tracing span for this export.
    pub fn create_span(&self) -> Span {
        tracing::info_span!("export", export_id = %self.export_id, scope = self.scope)
    }
}
