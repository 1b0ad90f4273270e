//! Configuration
//!
//! Load order (later sources win):
//! 1. Built-in defaults
//! 2. TOML file (explicit path, or `RECOURSE_CONFIG_PATH`)
//! 3. Environment variables `RECOURSE_<SECTION>__<KEY>`, e.g. `RECOURSE_WARNINGS__POLICY=escalate`
//! 4. Builder overrides
//!
//! A `.env` file in the working directory is read before the environment.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::level_filters::LevelFilter;

pub const ENV_PREFIX: &str = "RECOURSE";
pub const CONFIG_PATH_ENV: &str = "RECOURSE_CONFIG_PATH";

const DEFAULT_MAX_DEFERRED: usize = 50;

/* ===================== Settings ===================== */

/// What an unhandled warning does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WarningPolicy {
    /// Buffer until the invocation ends
    #[default]
    Defer,
    /// Write to the sink at raise time
    Immediate,
    /// Raise an error in its place
    Escalate,
    /// Drop silently
    Ignore,
}

impl FromStr for WarningPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "defer" => Ok(WarningPolicy::Defer),
            "immediate" => Ok(WarningPolicy::Immediate),
            "escalate" => Ok(WarningPolicy::Escalate),
            "ignore" => Ok(WarningPolicy::Ignore),
            other => Err(ConfigError::Invalid(format!(
                "Unknown warning policy '{}'. Must be one of: defer, immediate, escalate, ignore",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarningSettings {
    #[serde(default)]
    pub policy: WarningPolicy,

    /// Deferred warnings kept per invocation; the rest are only counted
    #[serde(default = "default_max_deferred")]
    pub max_deferred: usize,
}

fn default_max_deferred() -> usize {
    DEFAULT_MAX_DEFERRED
}

impl Default for WarningSettings {
    fn default() -> Self {
        Self {
            policy: WarningPolicy::default(),
            max_deferred: default_max_deferred(),
        }
    }
}

/// Where default actions write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    #[default]
    Stderr,
    Tracing,
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Level filter: trace, debug, info, warn, error, off
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/* ===================== Config ===================== */

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub warnings: WarningSettings,

    #[serde(default)]
    pub sink: SinkKind,

    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Load from the default file/env search with no overrides
    pub fn load() -> Result<Self, ConfigError> {
        Self::builder().build()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.warnings.policy == WarningPolicy::Defer && self.warnings.max_deferred == 0 {
            return Err(ConfigError::Invalid(
                "warnings.max_deferred must be at least 1 when warnings are deferred".to_string(),
            ));
        }
        LevelFilter::from_str(&self.logging.level).map_err(|_| {
            ConfigError::Invalid(format!(
                "Unknown log level '{}'. Must be one of: trace, debug, info, warn, error, off",
                self.logging.level
            ))
        })?;
        Ok(())
    }

    /// Effective configuration as TOML
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/* ===================== Builder ===================== */

#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config_path: Option<PathBuf>,
    read_env: bool,
    warning_policy: Option<WarningPolicy>,
    max_deferred: Option<usize>,
    sink: Option<SinkKind>,
    env_vars: Option<::config::Map<String, String>>,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config_path: None,
            read_env: true,
            warning_policy: None,
            max_deferred: None,
            sink: None,
            env_vars: None,
        }
    }

    /// Config file path (overrides `RECOURSE_CONFIG_PATH`)
    pub fn config_path(mut self, path: Option<PathBuf>) -> Self {
        self.config_path = path;
        self
    }

    /// Whether `.env` and `RECOURSE_*` variables are consulted
    pub fn read_env(mut self, read: bool) -> Self {
        self.read_env = read;
        self
    }

    pub fn warning_policy(mut self, policy: Option<WarningPolicy>) -> Self {
        self.warning_policy = policy;
        self
    }

    pub fn max_deferred(mut self, max: Option<usize>) -> Self {
        self.max_deferred = max;
        self
    }

    pub fn sink(mut self, sink: Option<SinkKind>) -> Self {
        self.sink = sink;
        self
    }

    /// Read the environment layer from `vars` instead of the process environment
    ///
    /// Keys keep their full names, e.g. `RECOURSE_WARNINGS__POLICY`.
    pub fn env_vars(mut self, vars: ::config::Map<String, String>) -> Self {
        self.env_vars = Some(vars);
        self
    }

    pub fn build(self) -> Result<Config, ConfigError> {
        if self.read_env {
            let _ = dotenvy::dotenv();
        }

        let mut builder = ::config::Config::builder()
            .set_default("warnings.policy", "defer")?
            .set_default("warnings.max_deferred", DEFAULT_MAX_DEFERRED as i64)?
            .set_default("sink", "stderr")?
            .set_default("logging.level", default_log_level())?
            .set_default("logging.format", "text")?;

        let path = match self.config_path {
            Some(path) => Some(path),
            None if self.read_env => std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from),
            None => None,
        };
        if let Some(path) = path {
            tracing::debug!(config_path = %path.display(), "loading configuration file");
            builder = builder.add_source(::config::File::from(path.as_path()).required(true));
        }

        if self.read_env || self.env_vars.is_some() {
            builder = builder.add_source(environment(self.env_vars));
        }

        let mut config: Config = builder.build()?.try_deserialize()?;

        if let Some(policy) = self.warning_policy {
            config.warnings.policy = policy;
        }
        if let Some(max) = self.max_deferred {
            config.warnings.max_deferred = max;
        }
        if let Some(sink) = self.sink {
            config.sink = sink;
        }

        config.validate()?;
        Ok(config)
    }
}

/// `RECOURSE_<SECTION>__<KEY>` variables, from `vars` when given
fn environment(vars: Option<::config::Map<String, String>>) -> ::config::Environment {
    ::config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
        .source(vars)
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maplit::hashmap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::builder().read_env(false).build().unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.warnings.policy, WarningPolicy::Defer);
        assert_eq!(config.warnings.max_deferred, 50);
        assert_eq!(config.sink, SinkKind::Stderr);
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_builder_overrides() {
        let config = Config::builder()
            .read_env(false)
            .warning_policy(Some(WarningPolicy::Escalate))
            .max_deferred(Some(3))
            .sink(Some(SinkKind::Null))
            .build()
            .unwrap();
        assert_eq!(config.warnings.policy, WarningPolicy::Escalate);
        assert_eq!(config.warnings.max_deferred, 3);
        assert_eq!(config.sink, SinkKind::Null);
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
sink = "tracing"

[warnings]
policy = "immediate"
max_deferred = 7

[logging]
level = "debug"
format = "json"
"#
        )
        .unwrap();

        let config = Config::builder()
            .read_env(false)
            .config_path(Some(file.path().to_path_buf()))
            .build()
            .unwrap();
        assert_eq!(config.warnings.policy, WarningPolicy::Immediate);
        assert_eq!(config.warnings.max_deferred, 7);
        assert_eq!(config.sink, SinkKind::Tracing);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_builder_override_beats_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[warnings]\npolicy = \"ignore\"").unwrap();

        let config = Config::builder()
            .read_env(false)
            .config_path(Some(file.path().to_path_buf()))
            .warning_policy(Some(WarningPolicy::Defer))
            .build()
            .unwrap();
        assert_eq!(config.warnings.policy, WarningPolicy::Defer);
    }

    #[test]
    fn test_env_beats_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "sink = \"null\"\n\n[warnings]\npolicy = \"immediate\"\nmax_deferred = 10").unwrap();

        let config = Config::builder()
            .read_env(false)
            .config_path(Some(file.path().to_path_buf()))
            .env_vars(hashmap! {
                "RECOURSE_WARNINGS__POLICY".to_string() => "escalate".to_string(),
                "RECOURSE_WARNINGS__MAX_DEFERRED".to_string() => "7".to_string(),
            })
            .build()
            .unwrap();
        assert_eq!(config.warnings.policy, WarningPolicy::Escalate);
        assert_eq!(config.warnings.max_deferred, 7);
        // Untouched by the environment
        assert_eq!(config.sink, SinkKind::Null);
    }

    #[test]
    fn test_builder_beats_env() {
        let config = Config::builder()
            .read_env(false)
            .env_vars(hashmap! {
                "RECOURSE_WARNINGS__POLICY".to_string() => "escalate".to_string(),
                "RECOURSE_SINK".to_string() => "tracing".to_string(),
            })
            .warning_policy(Some(WarningPolicy::Ignore))
            .build()
            .unwrap();
        assert_eq!(config.warnings.policy, WarningPolicy::Ignore);
        assert_eq!(config.sink, SinkKind::Tracing);
    }

    #[test]
    fn test_invalid_env_value_is_an_error() {
        let result = Config::builder()
            .read_env(false)
            .env_vars(hashmap! {
                "RECOURSE_WARNINGS__POLICY".to_string() => "loud".to_string(),
            })
            .build();
        assert!(matches!(result, Err(ConfigError::Load(_))));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = Config::builder()
            .read_env(false)
            .config_path(Some(PathBuf::from("/nonexistent/recourse.toml")))
            .build();
        assert!(matches!(result, Err(ConfigError::Load(_))));
    }

    #[test]
    fn test_validate_rejects_zero_cap_when_deferring() {
        let mut config = Config::default();
        config.warnings.max_deferred = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.warnings.policy = WarningPolicy::Immediate;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unknown_level() {
        let mut config = Config::default();
        config.logging.level = "chatty".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("Escalate".parse::<WarningPolicy>().unwrap(), WarningPolicy::Escalate);
        assert!("loud".parse::<WarningPolicy>().is_err());
    }

    #[test]
    fn test_toml_rendering_reloads() {
        let config = Config {
            sink: SinkKind::Null,
            ..Config::default()
        };
        let rendered = config.to_toml_string().unwrap();
        let parsed: Config = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, config);
    }
}
