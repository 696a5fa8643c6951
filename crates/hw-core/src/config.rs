//! Configuration system for hlsl-weaver

use crate::error::WeaverError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Default scratch arena size for one translation call (128 KiB)
pub const DEFAULT_ARENA_CAPACITY: usize = 128 * 1024;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub translator: TranslatorConfig,
    pub paths: PathConfig,
    /// Polymorphic name to atom name, applied at every call site
    pub bindings: BTreeMap<String, String>,
    pub debug: DebugConfig,
}

/// Translation settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TranslatorConfig {
    /// Capacity in bytes of the per-call scratch arena
    pub arena_capacity: usize,
}

/// Definition and output file locations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PathConfig {
    pub semantics: PathBuf,
    pub atoms: PathBuf,
    pub combinators: PathBuf,
    pub output: Option<PathBuf>,
}

/// Debug settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DebugConfig {
    pub log_level: LogLevel,
}

/// Logging level
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Directive string understood by `tracing_subscriber::EnvFilter`
    pub fn as_filter(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = WeaverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "off" => Ok(Self::Off),
            "error" => Ok(Self::Error),
            "warn" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            other => Err(WeaverError::Config(format!("Unknown log level: {}", other))),
        }
    }
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            arena_capacity: DEFAULT_ARENA_CAPACITY,
        }
    }
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            semantics: PathBuf::from("semantics.txt"),
            atoms: PathBuf::from("atoms.txt"),
            combinators: PathBuf::from("combinators.txt"),
            output: None,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, or the defaults if it doesn't exist
    pub fn load() -> Result<Self, WeaverError> {
        Self::load_or_default(Self::config_path())
    }

    /// Load configuration from `path`, or the defaults if it doesn't exist
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, WeaverError> {
        let path = path.as_ref();

        if path.exists() {
            tracing::debug!("Loading config from {}", path.display());
            Self::load_from(path)
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, WeaverError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        toml::from_str(&content).map_err(|e| WeaverError::Config(e.to_string()))
    }

    /// Save configuration to a specific file
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), WeaverError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| WeaverError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the path to the default configuration file
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("hlsl-weaver")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_or_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        assert_eq!(Config::load_or_default(&path).unwrap(), Config::default());

        std::fs::write(&path, "[translator]\narena_capacity = 2048\n").unwrap();
        let config = Config::load_or_default(&path).unwrap();
        assert_eq!(config.translator.arena_capacity, 2048);
        assert_eq!(config.paths, PathConfig::default());
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.translator.arena_capacity, 128 * 1024);
        assert_eq!(config.paths.semantics, PathBuf::from("semantics.txt"));
        assert!(config.paths.output.is_none());
        assert!(config.bindings.is_empty());
        assert_eq!(config.debug.log_level, LogLevel::Info);
    }

    #[test]
    fn test_config_serialization() {
        let mut config = Config::default();
        config
            .bindings
            .insert("GetAlbedo".to_string(), "AlbedoFromMap".to_string());
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed: Config = toml::from_str(
            r#"
            [translator]
            arena_capacity = 4096

            [bindings]
            MakeDepth = "CalculateProjectionDepth"

            [debug]
            log_level = "trace"
            "#,
        )
        .unwrap();
        assert_eq!(parsed.translator.arena_capacity, 4096);
        assert_eq!(parsed.paths, PathConfig::default());
        assert_eq!(
            parsed.bindings.get("MakeDepth").map(String::as_str),
            Some("CalculateProjectionDepth")
        );
        assert_eq!(parsed.debug.log_level, LogLevel::Trace);
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.translator.arena_capacity = 1024;
        config.paths.output = Some(PathBuf::from("out.hlsl"));
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_invalid_config_reports_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[translator]\narena_capacity = \"big\"\n").unwrap();

        assert!(matches!(Config::load_from(&path), Err(WeaverError::Config(_))));
    }

    #[test]
    fn test_log_level_parse() {
        assert_eq!("DEBUG".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert_eq!(LogLevel::Warn.as_filter(), "warn");
        assert!("loud".parse::<LogLevel>().is_err());
    }
}
