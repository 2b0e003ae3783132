//! Engine configuration.

use std::path::PathBuf;

use crate::error::{EngineError, EngineResult};

/// Default cap on sequences per generation run.
pub const DEFAULT_MAX_SEQUENCES: usize = 10;
/// Default number of sampling attempts per generation run.
pub const DEFAULT_ATTEMPT_BUDGET: usize = 100;
/// Default maximum selling points per sequence.
pub const DEFAULT_MAX_SELLING_POINTS: usize = 3;
/// Default output container extension.
pub const DEFAULT_OUTPUT_EXTENSION: &str = "mp4";
/// Default FFmpeg timeout in seconds.
pub const DEFAULT_FFMPEG_TIMEOUT_SECS: u64 = 600;

/// Engine configuration.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub generator: GeneratorConfig,
    pub export: ExportConfig,
    pub ingest: IngestConfig,
}

impl EngineConfig {
    /// Create config from environment variables.
    ///
    /// Unset variables fall back to defaults; set but unparseable ones are
    /// rejected.
    pub fn from_env() -> EngineResult<Self> {
        Ok(Self {
            generator: GeneratorConfig::from_env()?,
            export: ExportConfig::from_env()?,
            ingest: IngestConfig::from_env(),
        })
    }
}

/// Sequence generator limits.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Upper bound on sequences returned by one run
    pub max_sequences: usize,
    /// Sampling attempts per run, successful or not
    pub attempt_budget: usize,
    /// Upper bound on selling points per sequence
    pub max_selling_points: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_sequences: DEFAULT_MAX_SEQUENCES,
            attempt_budget: DEFAULT_ATTEMPT_BUDGET,
            max_selling_points: DEFAULT_MAX_SELLING_POINTS,
        }
    }
}

impl GeneratorConfig {
    pub fn from_env() -> EngineResult<Self> {
        Ok(Self {
            max_sequences: env_parse("REELMIX_MAX_SEQUENCES", DEFAULT_MAX_SEQUENCES)?,
            attempt_budget: env_parse("REELMIX_ATTEMPT_BUDGET", DEFAULT_ATTEMPT_BUDGET)?,
            max_selling_points: env_parse(
                "REELMIX_MAX_SELLING_POINTS",
                DEFAULT_MAX_SELLING_POINTS,
            )?,
        })
    }
}

/// Export pipeline settings.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Parent directory for per-export staging areas
    pub work_dir: PathBuf,
    /// Container extension of produced artifacts
    pub output_extension: String,
    /// FFmpeg timeout in seconds (0 disables)
    pub ffmpeg_timeout_secs: u64,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            work_dir: default_work_dir(),
            output_extension: DEFAULT_OUTPUT_EXTENSION.to_string(),
            ffmpeg_timeout_secs: DEFAULT_FFMPEG_TIMEOUT_SECS,
        }
    }
}

impl ExportConfig {
    pub fn from_env() -> EngineResult<Self> {
        Ok(Self {
            work_dir: std::env::var("REELMIX_WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_work_dir()),
            output_extension: std::env::var("REELMIX_OUTPUT_EXTENSION")
                .ok()
                .map(|s| s.trim().trim_start_matches('.').to_lowercase())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_OUTPUT_EXTENSION.to_string()),
            ffmpeg_timeout_secs: env_parse(
                "REELMIX_FFMPEG_TIMEOUT_SECS",
                DEFAULT_FFMPEG_TIMEOUT_SECS,
            )?,
        })
    }

    /// Use a different staging parent directory.
    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = dir.into();
        self
    }
}

/// Clip ingest settings.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Extensions whose container is rewrapped before use
    pub rewrap_extensions: Vec<String>,
    /// Container extension that rewrapped clips are written as
    pub rewrap_target: String,
    /// Where rewrapped clips are kept
    pub normalized_dir: PathBuf,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            rewrap_extensions: vec!["mov".to_string(), "mkv".to_string(), "webm".to_string()],
            rewrap_target: DEFAULT_OUTPUT_EXTENSION.to_string(),
            normalized_dir: default_work_dir().join("normalized"),
        }
    }
}

impl IngestConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            rewrap_extensions: std::env::var("REELMIX_REWRAP_EXTENSIONS")
                .map(|s| parse_extension_list(&s))
                .unwrap_or(defaults.rewrap_extensions),
            rewrap_target: std::env::var("REELMIX_REWRAP_TARGET")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(|s| s.trim().trim_start_matches('.').to_lowercase())
                .unwrap_or(defaults.rewrap_target),
            normalized_dir: std::env::var("REELMIX_WORK_DIR")
                .map(|d| PathBuf::from(d).join("normalized"))
                .unwrap_or(defaults.normalized_dir),
        }
    }

    /// Whether a file with this extension needs rewrapping.
    pub fn needs_rewrap(&self, extension: &str) -> bool {
        let ext = extension.to_lowercase();
        ext != self.rewrap_target && self.rewrap_extensions.iter().any(|e| *e == ext)
    }
}

fn default_work_dir() -> PathBuf {
    std::env::temp_dir().join("reelmix")
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> EngineResult<T> {
    parse_value(key, std::env::var(key).ok(), default)
}

fn parse_value<T: std::str::FromStr>(
    key: &str,
    raw: Option<String>,
    default: T,
) -> EngineResult<T> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| EngineError::config(format!("{} has invalid value {:?}", key, value))),
    }
}

fn parse_extension_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(|e| e.trim().trim_start_matches('.').to_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}
