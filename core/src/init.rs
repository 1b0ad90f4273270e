//! Initialization
//!
//! Builds a `Runtime` from configuration and installs logging.
//!
//! # Example
//!
//! ```rust
//! use recourse_core::config::WarningPolicy;
//! use recourse_core::init::InitBuilder;
//!
//! let runtime = InitBuilder::new()
//!     .read_env(false)
//!     .logging(false)
//!     .warning_policy(WarningPolicy::Immediate)
//!     .init()
//!     .expect("runtime");
//! assert_eq!(runtime.config().warnings.policy, WarningPolicy::Immediate);
//! ```

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::rc::Rc;

use crate::config::{Config, SinkKind, WarningPolicy};
use crate::logging;
use crate::runtime::Runtime;
use crate::sink::DiagnosticSink;

/// Options for initializing a runtime
#[derive(Debug, Clone)]
pub struct InitOptions {
    /// Config file path (overrides `RECOURSE_CONFIG_PATH`)
    pub config_path: Option<PathBuf>,

    /// Ready-made configuration; skips file and environment loading
    pub config: Option<Config>,

    /// Whether `.env` and `RECOURSE_*` variables are consulted
    pub read_env: bool,

    pub warning_policy: Option<WarningPolicy>,

    pub sink_kind: Option<SinkKind>,

    /// Sink instance; takes precedence over `sink_kind`
    pub sink: Option<Rc<dyn DiagnosticSink>>,

    /// Whether to install the global tracing subscriber
    pub init_logging: bool,
}

impl Default for InitOptions {
    fn default() -> Self {
        Self {
            config_path: None,
            config: None,
            read_env: true,
            warning_policy: None,
            sink_kind: None,
            sink: None,
            init_logging: true,
        }
    }
}

/// Builder for constructing InitOptions
pub struct InitBuilder {
    options: InitOptions,
}

impl InitBuilder {
    pub fn new() -> Self {
        Self {
            options: InitOptions::default(),
        }
    }

    pub fn config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.options.config_path = Some(path.into());
        self
    }

    pub fn config(mut self, config: Config) -> Self {
        self.options.config = Some(config);
        self
    }

    pub fn read_env(mut self, read: bool) -> Self {
        self.options.read_env = read;
        self
    }

    pub fn warning_policy(mut self, policy: WarningPolicy) -> Self {
        self.options.warning_policy = Some(policy);
        self
    }

    pub fn sink_kind(mut self, kind: SinkKind) -> Self {
        self.options.sink_kind = Some(kind);
        self
    }

    pub fn sink(mut self, sink: Rc<dyn DiagnosticSink>) -> Self {
        self.options.sink = Some(sink);
        self
    }

    pub fn logging(mut self, enabled: bool) -> Self {
        self.options.init_logging = enabled;
        self
    }

    pub fn init(self) -> Result<Runtime> {
        initialize(self.options)
    }
}

impl Default for InitBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Load configuration, install logging and build a runtime
pub fn initialize(options: InitOptions) -> Result<Runtime> {
    let mut config = match options.config {
        Some(config) => config,
        None => Config::builder()
            .config_path(options.config_path)
            .read_env(options.read_env)
            .build()
            .context("Failed to load configuration")?,
    };

    if let Some(policy) = options.warning_policy {
        config.warnings.policy = policy;
    }
    if let Some(kind) = options.sink_kind {
        config.sink = kind;
    }
    config.validate().context("Invalid configuration")?;

    if options.init_logging {
        logging::init_logging(&config.logging).context("Failed to initialize logging")?;
    }

    tracing::debug!(
        policy = ?config.warnings.policy,
        sink = ?config.sink,
        "runtime initialized"
    );

    Ok(match options.sink {
        Some(sink) => Runtime::with_sink(config, sink),
        None => Runtime::new(config),
    })
}
