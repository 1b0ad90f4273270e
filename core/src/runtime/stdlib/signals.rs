//! Raising conveniences
//!
//! Conditions raised here get the Rust call site as their context unless one
//! was set already.

use super::{MUFFLE_MESSAGE, MUFFLE_WARNING};
use crate::condition::Condition;
use crate::runtime::{Dispatcher, Flow, FrameId, Signal, Unwind};
use std::panic::Location;

#[track_caller]
fn locate(condition: Condition) -> Condition {
    if condition.has_context() {
        condition
    } else {
        let caller = Location::caller();
        condition.with_context(format!("{}:{}:{}", caller.file(), caller.line(), caller.column()))
    }
}

/// Raise with no muffle restart; for bare conditions and custom families
#[track_caller]
pub fn signal(d: &mut Dispatcher, condition: Condition) -> Flow<Signal> {
    d.raise(locate(condition))
}

/// Raise `condition` and never resume
///
/// If every handler declines and the condition's family lets execution
/// continue, the invocation is aborted anyway.
#[track_caller]
pub fn abort<T>(d: &mut Dispatcher, condition: Condition) -> Flow<T> {
    let condition = locate(condition);
    match d.raise(condition.clone()) {
        Err(unwind) => Err(unwind),
        Ok(_) => {
            d.abandon(FrameId::ROOT);
            Err(Unwind::Abort(condition))
        }
    }
}

/// Raise a simple error
#[track_caller]
pub fn stop<T>(d: &mut Dispatcher, message: impl Into<String>) -> Flow<T> {
    abort(d, Condition::simple_error(message))
}

/// Raise a warning inside a `muffle_warning` restart
#[track_caller]
pub fn warn(d: &mut Dispatcher, condition: Condition) -> Flow<Signal> {
    let condition = locate(condition);
    d.establish_restart(MUFFLE_WARNING, |_, _| Ok(Signal::Suppressed), |d| d.raise(condition))
}

#[track_caller]
pub fn warning(d: &mut Dispatcher, message: impl Into<String>) -> Flow<Signal> {
    warn(d, Condition::simple_warning(message))
}

/// Raise a message inside a `muffle_message` restart
#[track_caller]
pub fn inform(d: &mut Dispatcher, condition: Condition) -> Flow<Signal> {
    let condition = locate(condition);
    d.establish_restart(MUFFLE_MESSAGE, |_, _| Ok(Signal::Suppressed), |d| d.raise(condition))
}

#[track_caller]
pub fn message(d: &mut Dispatcher, text: impl Into<String>) -> Flow<Signal> {
    inform(d, Condition::simple_message(text))
}

/// Raise an interrupt; resumes only if a calling handler redirects elsewhere
#[track_caller]
pub fn interrupt<T>(d: &mut Dispatcher) -> Flow<T> {
    let condition = locate(Condition::simple_interrupt("interrupted"));
    match d.raise(condition.clone()) {
        Err(unwind) => Err(unwind),
        Ok(_) => {
            d.abandon(FrameId::ROOT);
            Err(Unwind::Interrupt(condition))
        }
    }
}

/// From a calling handler: stop the warning being handled
pub fn muffle_warning(d: &mut Dispatcher) -> Flow<()> {
    d.invoke_restart(MUFFLE_WARNING, Vec::new())
}

/// From a calling handler: stop the message being handled
pub fn muffle_message(d: &mut Dispatcher) -> Flow<()> {
    d.invoke_restart(MUFFLE_MESSAGE, Vec::new())
}
