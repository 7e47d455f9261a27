//! Configuration for the interop resolver, loaded from TOML.
//!
//! ```toml
//! [resolver]
//! abi_version = 7
//! not_null_annotations = ["org.jetbrains.annotations.NotNull"]
//! alternative_signatures = true
//!
//! [logging]
//! level = "debug"
//! ```

#![forbid(unsafe_code)]

use std::path::Path;
use std::sync::Once;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// ABI version written by the native compiler this resolver understands.
pub const CURRENT_ABI_VERSION: i32 = 7;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteropConfig {
    #[serde(default)]
    pub resolver: ResolverConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResolverConfig {
    /// Declarations whose metadata carries a different ABI version are excluded.
    #[serde(default = "ResolverConfig::default_abi_version")]
    pub abi_version: i32,

    /// Annotations that make an annotated foreign type not-null.
    #[serde(default = "ResolverConfig::default_not_null_annotations")]
    pub not_null_annotations: Vec<String>,

    /// Apply alternative signatures found on foreign members.
    #[serde(default = "ResolverConfig::default_alternative_signatures")]
    pub alternative_signatures: bool,
}

impl ResolverConfig {
    fn default_abi_version() -> i32 {
        CURRENT_ABI_VERSION
    }

    fn default_not_null_annotations() -> Vec<String> {
        vec!["org.jetbrains.annotations.NotNull".to_owned()]
    }

    fn default_alternative_signatures() -> bool {
        true
    }

    pub fn is_not_null_annotation(&self, fq_name: &str) -> bool {
        self.not_null_annotations.iter().any(|name| name == fq_name)
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            abi_version: Self::default_abi_version(),
            not_null_annotations: Self::default_not_null_annotations(),
            alternative_signatures: Self::default_alternative_signatures(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Level for all interop crates, or a full `EnvFilter` directive string.
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,

    /// Emit logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_owned()
    }

    pub(crate) fn normalize_level_directives(input: &str) -> String {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Self::default_level();
        }

        match trimmed.to_ascii_lowercase().as_str() {
            "trace" => "trace".to_owned(),
            "debug" => "debug".to_owned(),
            "info" => "info".to_owned(),
            "warn" | "warning" => "warn".to_owned(),
            "error" => "error".to_owned(),
            _ => trimmed.to_owned(),
        }
    }

    fn config_env_filter(&self) -> tracing_subscriber::EnvFilter {
        let directives = Self::normalize_level_directives(&self.level);
        tracing_subscriber::EnvFilter::try_new(directives).unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::default()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
        })
    }

    /// Effective filter: the configured level, with `RUST_LOG` merged in when set.
    pub fn env_filter(&self) -> tracing_subscriber::EnvFilter {
        self.filter_with_env(std::env::var("RUST_LOG").ok().as_deref())
    }

    fn filter_with_env(&self, env: Option<&str>) -> tracing_subscriber::EnvFilter {
        let env_directives = env.map(str::trim).filter(|value| !value.is_empty());
        let config_directives = Self::normalize_level_directives(&self.level);

        match env_directives {
            Some(env_directives) => {
                let combined = format!("{config_directives},{env_directives}");
                tracing_subscriber::EnvFilter::try_new(combined)
                    .or_else(|_| tracing_subscriber::EnvFilter::try_new(env_directives))
                    .unwrap_or_else(|_| self.config_env_filter())
            }
            None => self.config_env_filter(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            json: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse toml config: {0}")]
    Toml(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Toml(err.message().to_owned())
    }
}

impl InteropConfig {
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::load_from_str(&text)?;
        tracing::debug!(
            target: "nova.interop.config",
            path = %path.display(),
            abi_version = config.resolver.abi_version,
            "loaded interop config"
        );
        Ok(config)
    }

    pub fn load_from_str(text: &str) -> Result<Self, ConfigError> {
        let config: InteropConfig = toml::from_str(text)?;
        if config.resolver.not_null_annotations.is_empty() {
            tracing::warn!(
                target: "nova.interop.config",
                "no not-null annotations configured; every foreign reference type is nullable"
            );
        }
        Ok(config)
    }
}

static TRACING_INIT: Once = Once::new();

/// Installs the global subscriber. Only the first call has an effect.
pub fn init_tracing(config: &LoggingConfig) {
    TRACING_INIT.call_once(|| {
        let filter = config.env_filter();
        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(true);
        let result = if config.json {
            builder.json().try_init()
        } else {
            builder.try_init()
        };
        if result.is_err() {
            tracing::debug!(
                target: "nova.interop.config",
                "a global tracing subscriber is already installed"
            );
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_directives_are_normalized() {
        assert_eq!(LoggingConfig::normalize_level_directives(" WARNING "), "warn");
        assert_eq!(LoggingConfig::normalize_level_directives(""), "info");
        assert_eq!(
            LoggingConfig::normalize_level_directives("nova.interop.resolve=trace"),
            "nova.interop.resolve=trace"
        );
    }

    #[test]
    fn rust_log_directives_extend_the_configured_level() {
        use tracing_subscriber::filter::LevelFilter;

        let config = LoggingConfig {
            level: "WARNING".to_owned(),
            json: false,
        };
        assert_eq!(config.filter_with_env(None).max_level_hint(), Some(LevelFilter::WARN));
        assert_eq!(config.filter_with_env(Some("  ")).max_level_hint(), Some(LevelFilter::WARN));

        let merged = config.filter_with_env(Some("nova.interop.resolve=trace"));
        assert_eq!(merged.max_level_hint(), Some(LevelFilter::TRACE));

        // A quieter env directive does not lower the configured level.
        let config = LoggingConfig {
            level: "debug".to_owned(),
            json: false,
        };
        let merged = config.filter_with_env(Some("nova.interop.resolve=error"));
        assert_eq!(merged.max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn init_tracing_is_idempotent() {
        let config = LoggingConfig::default();
        init_tracing(&config);
        init_tracing(&config);
    }
}
