//! Top-level invocations
//!
//! A `Runtime` is reusable; every `invoke` gets a fresh dispatcher with empty
//! stacks and an empty deferred-warning buffer, torn down when the body ends.

use super::dispatcher::Dispatcher;
use super::types::{DeferredWarning, Flow, FrameId, Unwind};
use crate::condition::tags;
use crate::config::Config;
use crate::error::Failure;
use crate::sink::DiagnosticSink;
use std::rc::Rc;
use tracing::{debug, debug_span};

/// Value of a completed invocation plus its flushed warnings
#[derive(Debug, Clone, PartialEq)]
pub struct Completion<T> {
    pub value: T,
    pub warnings: Vec<DeferredWarning>,
    /// Warnings beyond the deferred cap, counted but not kept
    pub dropped_warnings: usize,
}

impl<T> Completion<T> {
    pub fn into_value(self) -> T {
        self.value
    }
}

#[derive(Debug, Clone)]
pub struct Runtime {
    config: Config,
    sink: Rc<dyn DiagnosticSink>,
}

impl Runtime {
    /// Runtime writing to the sink named by `config.sink`
    pub fn new(config: Config) -> Self {
        let sink = config.sink.build();
        Self { config, sink }
    }

    pub fn with_sink(config: Config, sink: Rc<dyn DiagnosticSink>) -> Self {
        Self { config, sink }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sink(&self) -> &Rc<dyn DiagnosticSink> {
        &self.sink
    }

    /// Run `body` as one top-level invocation
    pub fn invoke<T, B>(&self, body: B) -> Result<Completion<T>, Failure>
    where
        B: FnOnce(&mut Dispatcher) -> Flow<T>,
    {
        let span = debug_span!("invocation", policy = ?self.config.warnings.policy);
        let _enter = span.enter();

        let mut dispatcher = Dispatcher::new(self.config.warnings.clone(), Rc::clone(&self.sink));
        let outcome = body(&mut dispatcher);
        dispatcher.abandon(FrameId::ROOT);

        match outcome {
            Ok(value) => {
                let (warnings, dropped_warnings) = self.flush(&mut dispatcher);
                debug!(warnings = warnings.len(), "invocation completed");
                Ok(Completion {
                    value,
                    warnings,
                    dropped_warnings,
                })
            }
            Err(Unwind::Abort(condition)) if condition.inherits(&tags::DISCARDED_UNWIND) => {
                let _ = dispatcher.take_deferred();
                Err(Failure::StrayUnwind(condition.message().to_string()))
            }
            Err(Unwind::Abort(condition)) => {
                let (warnings, dropped_warnings) = self.flush(&mut dispatcher);
                debug!(message = condition.message(), "invocation aborted");
                Err(Failure::Aborted {
                    condition,
                    warnings,
                    dropped_warnings,
                })
            }
            Err(Unwind::Interrupt(condition)) => {
                let _ = dispatcher.take_deferred();
                debug!("invocation interrupted");
                Err(Failure::Interrupted { condition })
            }
            Err(stray) => {
                let _ = dispatcher.take_deferred();
                Err(Failure::StrayUnwind(stray.to_string()))
            }
        }
    }

    fn flush(&self, dispatcher: &mut Dispatcher) -> (Vec<DeferredWarning>, usize) {
        let (warnings, dropped) = dispatcher.take_deferred();
        if !warnings.is_empty() || dropped > 0 {
            self.sink.flush_warnings(&warnings, dropped);
        }
        (warnings, dropped)
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
