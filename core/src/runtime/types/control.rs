//! Control flow types
//!
//! Non-local exits travel as `Err(Unwind)` through ordinary `Result`
//! propagation. Each scoped construct inspects the unwind passing through it,
//! catches the one addressed to its own frame and re-propagates the rest.

use crate::condition::Condition;
use serde_json::Value;
use std::fmt;

/* ===================== Frame Identity ===================== */

/// Identity of an established construct
///
/// Ids increase monotonically across both stacks, so every frame pushed
/// after a construct has a larger id than the construct itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameId(u64);

impl FrameId {
    /// Below every real frame; abandoning from here clears both stacks
    pub(crate) const ROOT: FrameId = FrameId(0);

    pub(crate) fn next(self) -> FrameId {
        FrameId(self.0 + 1)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/* ===================== Control Flow ===================== */

/// Result of any code running under a dispatcher
///
/// An `Err` must be handed back to the caller (usually with `?`). Dropping it
/// leaves constructs running whose frames the dispatcher already abandoned.
pub type Flow<T> = Result<T, Unwind>;

/// Value returned by `raise` when the raiser resumes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// Calling handlers (if any) declined and the default action let execution continue
    NoOverride,
    /// A handler invoked the muffle restart established around the raise
    Suppressed,
}

/// Non-local transfer of control in flight
#[derive(Debug, Clone, PartialEq)]
pub enum Unwind {
    /// Return to the exiting construct `frame` and run its handler `entry`
    Exit {
        frame: FrameId,
        entry: usize,
        condition: Condition,
    },

    /// Return to the restart construct `owner` and run its recovery `index`
    Restart {
        owner: FrameId,
        index: usize,
        name: String,
        args: Vec<Value>,
    },

    /// Unhandled error: leave the whole invocation
    Abort(Condition),

    /// Unhandled interrupt: leave the whole invocation without flushing warnings
    Interrupt(Condition),
}

impl Unwind {
    /// Frames with an id at or above this are abandoned by the unwind
    pub(crate) fn cutoff(&self) -> FrameId {
        match self {
            Unwind::Exit { frame, .. } => *frame,
            Unwind::Restart { owner, .. } => *owner,
            Unwind::Abort(_) | Unwind::Interrupt(_) => FrameId::ROOT,
        }
    }

    /// Condition carried by the unwind, if any
    pub fn condition(&self) -> Option<&Condition> {
        match self {
            Unwind::Exit { condition, .. } => Some(condition),
            Unwind::Abort(condition) | Unwind::Interrupt(condition) => Some(condition),
            Unwind::Restart { .. } => None,
        }
    }
}

impl fmt::Display for Unwind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unwind::Exit { frame, entry, condition } => {
                write!(f, "exit to {} entry {} with '{}'", frame, entry, condition)
            }
            Unwind::Restart { owner, name, .. } => write!(f, "restart '{}' at {}", name, owner),
            Unwind::Abort(condition) => write!(f, "abort: {}", condition),
            Unwind::Interrupt(condition) => write!(f, "interrupt: {}", condition),
        }
    }
}
