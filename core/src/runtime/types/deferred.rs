//! Deferred warning records

use crate::condition::Condition;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unhandled warning waiting for the end of its invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeferredWarning {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl From<&Condition> for DeferredWarning {
    fn from(condition: &Condition) -> Self {
        DeferredWarning {
            message: condition.message().to_string(),
            context: condition.context().map(str::to_string),
        }
    }
}

impl fmt::Display for DeferredWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.context {
            Some(context) => write!(f, "In {}: {}", context, self.message),
            None => f.write_str(&self.message),
        }
    }
}
