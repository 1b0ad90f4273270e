//! Diagnostic sinks
//!
//! Default actions that produce output (messages, immediate warnings and the
//! end-of-invocation warning flush) write through a `DiagnosticSink`.

use crate::condition::Condition;
use crate::config::SinkKind;
use crate::runtime::DeferredWarning;
use std::cell::RefCell;
use std::fmt;
use std::io::Write;
use std::rc::Rc;

pub trait DiagnosticSink: fmt::Debug {
    /// Unhandled `message` condition
    fn message(&self, condition: &Condition);

    /// Unhandled warning under the immediate policy
    fn warning(&self, warning: &DeferredWarning);

    /// Deferred warnings at the end of an invocation; `dropped` counts those over the cap
    fn flush_warnings(&self, warnings: &[DeferredWarning], dropped: usize);
}

impl SinkKind {
    pub fn build(self) -> Rc<dyn DiagnosticSink> {
        match self {
            SinkKind::Stderr => Rc::new(StderrSink),
            SinkKind::Tracing => Rc::new(TracingSink),
            SinkKind::Null => Rc::new(NullSink),
        }
    }
}

/* ===================== Stderr ===================== */

/// Writes to standard error; write failures are ignored
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrSink;

impl DiagnosticSink for StderrSink {
    fn message(&self, condition: &Condition) {
        let _ = writeln!(std::io::stderr().lock(), "{}", condition.message());
    }

    fn warning(&self, warning: &DeferredWarning) {
        let _ = writeln!(std::io::stderr().lock(), "Warning: {}", warning);
    }

    fn flush_warnings(&self, warnings: &[DeferredWarning], dropped: usize) {
        let mut err = std::io::stderr().lock();
        match warnings {
            [] => {}
            [only] => {
                let _ = writeln!(err, "Warning message:\n{}", only);
            }
            many => {
                let _ = writeln!(err, "Warning messages:");
                for (i, warning) in many.iter().enumerate() {
                    let _ = writeln!(err, "{}: {}", i + 1, warning);
                }
            }
        }
        if dropped > 0 {
            let _ = writeln!(err, "... {} more warning(s) were not kept", dropped);
        }
    }
}

/* ===================== Tracing ===================== */

/// Forwards diagnostics as `tracing` events
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn message(&self, condition: &Condition) {
        tracing::info!(target: "recourse::message", context = condition.context(), "{}", condition.message());
    }

    fn warning(&self, warning: &DeferredWarning) {
        tracing::warn!(target: "recourse::warning", context = warning.context.as_deref(), "{}", warning.message);
    }

    fn flush_warnings(&self, warnings: &[DeferredWarning], dropped: usize) {
        for warning in warnings {
            self.warning(warning);
        }
        if dropped > 0 {
            tracing::warn!(target: "recourse::warning", dropped, "deferred warnings over the cap were dropped");
        }
    }
}

/* ===================== Null ===================== */

#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn message(&self, _condition: &Condition) {}

    fn warning(&self, _warning: &DeferredWarning) {}

    fn flush_warnings(&self, _warnings: &[DeferredWarning], _dropped: usize) {}
}

/* ===================== Memory ===================== */

/// What a `MemorySink` saw, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkRecord {
    Message(String),
    Warning(DeferredWarning),
    Flushed {
        warnings: Vec<DeferredWarning>,
        dropped: usize,
    },
}

/// Records everything for later inspection
#[derive(Debug, Default)]
pub struct MemorySink {
    records: RefCell<Vec<SinkRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<SinkRecord> {
        self.records.borrow().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.records
            .borrow()
            .iter()
            .filter_map(|record| match record {
                SinkRecord::Message(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// Warnings from every flush, in order
    pub fn flushed_warnings(&self) -> Vec<DeferredWarning> {
        self.records
            .borrow()
            .iter()
            .filter_map(|record| match record {
                SinkRecord::Flushed { warnings, .. } => Some(warnings.clone()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    pub fn clear(&self) {
        self.records.borrow_mut().clear();
    }
}

impl DiagnosticSink for MemorySink {
    fn message(&self, condition: &Condition) {
        self.records
            .borrow_mut()
            .push(SinkRecord::Message(condition.message().to_string()));
    }

    fn warning(&self, warning: &DeferredWarning) {
        self.records
            .borrow_mut()
            .push(SinkRecord::Warning(warning.clone()));
    }

    fn flush_warnings(&self, warnings: &[DeferredWarning], dropped: usize) {
        self.records.borrow_mut().push(SinkRecord::Flushed {
            warnings: warnings.to_vec(),
            dropped,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_records_in_order() {
        let sink = MemorySink::new();
        sink.message(&Condition::simple_message("hello"));
        let warning = DeferredWarning {
            message: "careful".to_string(),
            context: Some("load()".to_string()),
        };
        sink.warning(&warning);
        sink.flush_warnings(std::slice::from_ref(&warning), 2);

        assert_eq!(
            sink.records(),
            vec![
                SinkRecord::Message("hello".to_string()),
                SinkRecord::Warning(warning.clone()),
                SinkRecord::Flushed {
                    warnings: vec![warning.clone()],
                    dropped: 2
                },
            ]
        );
        assert_eq!(sink.messages(), vec!["hello".to_string()]);
        assert_eq!(sink.flushed_warnings(), vec![warning]);

        sink.clear();
        assert!(sink.records().is_empty());
    }

    #[test]
    fn test_deferred_warning_display() {
        let warning = DeferredWarning {
            message: "careful".to_string(),
            context: Some("load()".to_string()),
        };
        assert_eq!(warning.to_string(), "In load(): careful");
    }
}
