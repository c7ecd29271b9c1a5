//! Runtime settings read from the environment.

use std::path::PathBuf;

use crate::adapters::sanitize::DEFAULT_SANITIZE_MAX_BYTES;

/// Where log output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogMode {
    /// File when stdout is a terminal, stdout otherwise
    Auto,
    File,
    Stdout,
}

impl LogMode {
    fn parse(value: &str) -> Self {
        match value {
            "file" => Self::File,
            "stdout" => Self::Stdout,
            _ => Self::Auto,
        }
    }

    /// Resolve `Auto` against whether stdout is interactive.
    #[must_use]
    pub fn use_file(self, interactive: bool) -> bool {
        match self {
            Self::File => true,
            Self::Stdout => false,
            Self::Auto => interactive,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Directory holding `forest.json`, `scaler.json` and optionally `manifest.json`
    pub model_path: PathBuf,
    pub require_manifest: bool,
    pub log_mode: LogMode,
    pub log_file: PathBuf,
    /// Per-line byte limit for log sanitization; longer lines are truncated
    pub sanitize_max_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models"),
            require_manifest: false,
            log_mode: LogMode::Auto,
            log_file: PathBuf::from("healthai.log"),
            sanitize_max_bytes: DEFAULT_SANITIZE_MAX_BYTES,
        }
    }
}

impl AppConfig {
    /// Read `HEALTHAI_*` variables, falling back to defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            model_path: lookup("HEALTHAI_MODEL_PATH")
                .filter(|v| !v.is_empty())
                .map_or(defaults.model_path, PathBuf::from),
            require_manifest: lookup("HEALTHAI_REQUIRE_MANIFEST")
                .is_some_and(|v| parse_bool(&v)),
            log_mode: lookup("HEALTHAI_LOG_MODE").map_or(defaults.log_mode, |v| LogMode::parse(&v)),
            log_file: lookup("HEALTHAI_LOG_FILE")
                .filter(|v| !v.is_empty())
                .map_or(defaults.log_file, PathBuf::from),
            sanitize_max_bytes: lookup("HEALTHAI_SANITIZE_MAX_BYTES")
                .and_then(|v| v.parse::<usize>().ok())
                .filter(|&v| v > 0)
                .unwrap_or(defaults.sanitize_max_bytes),
        }
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(value, "1" | "true" | "TRUE" | "yes" | "YES")
}
