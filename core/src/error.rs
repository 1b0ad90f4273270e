//! Error types for recourse.

use crate::condition::Condition;
use crate::runtime::DeferredWarning;
use thiserror::Error;

/// Abnormal end of a top-level invocation
#[derive(Debug, Error)]
pub enum Failure {
    /// An error condition reached its default action
    #[error("invocation aborted: {}", .condition.describe())]
    Aborted {
        condition: Condition,
        /// Deferred warnings flushed at abort time
        warnings: Vec<DeferredWarning>,
        dropped_warnings: usize,
    },

    /// An interrupt condition reached its default action; deferred warnings are discarded
    #[error("invocation interrupted: {}", .condition.describe())]
    Interrupted { condition: Condition },

    /// An exit or restart unwind reached the top level without meeting its target
    #[error("unwind escaped its target construct: {0}")]
    StrayUnwind(String),
}

impl Failure {
    /// The condition that ended the invocation
    pub fn condition(&self) -> Option<&Condition> {
        match self {
            Failure::Aborted { condition, .. } | Failure::Interrupted { condition } => {
                Some(condition)
            }
            Failure::StrayUnwind(_) => None,
        }
    }

    pub fn warnings(&self) -> &[DeferredWarning] {
        match self {
            Failure::Aborted { warnings, .. } => warnings,
            _ => &[],
        }
    }

    pub fn is_interrupt(&self) -> bool {
        matches!(self, Failure::Interrupted { .. })
    }
}

/// Configuration loading and validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to render configuration: {0}")]
    Render(#[from] toml::ser::Error),
}
