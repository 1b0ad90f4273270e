//! Test helpers for runtime tests
//!
//! Runtimes wired to a `MemorySink` and a shared event log

use crate::config::{Config, WarningPolicy, WarningSettings};
use crate::runtime::Runtime;
use crate::sink::MemorySink;
use std::cell::RefCell;
use std::rc::Rc;

/// Runtime with default settings recording into a fresh `MemorySink`
pub fn memory_runtime() -> (Runtime, Rc<MemorySink>) {
    runtime_with(WarningSettings::default())
}

pub fn runtime_with_policy(policy: WarningPolicy) -> (Runtime, Rc<MemorySink>) {
    runtime_with(WarningSettings {
        policy,
        ..WarningSettings::default()
    })
}

pub fn runtime_with(warnings: WarningSettings) -> (Runtime, Rc<MemorySink>) {
    let sink = Rc::new(MemorySink::new());
    let config = Config {
        warnings,
        ..Config::default()
    };
    (Runtime::with_sink(config, sink.clone()), sink)
}

/// Ordered event log shareable with `'static` calling handlers
#[derive(Debug, Clone, Default)]
pub struct EventLog(Rc<RefCell<Vec<String>>>);

impl EventLog {
    pub fn push(&self, event: impl Into<String>) {
        self.0.borrow_mut().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.0.borrow().clone()
    }
}
