//! Type definitions for the runtime
//!
//! - Control flow (Flow, Unwind, Signal, FrameId)
//! - Handler and restart frames
//! - Deferred warnings

pub mod control;
pub mod deferred;
pub mod frames;

pub use control::{Flow, FrameId, Signal, Unwind};
pub use deferred::DeferredWarning;
pub use frames::{HandlerInfo, HandlerKind, RestartInfo};
pub(crate) use frames::{CallingFn, Entries, HandlerFrame, RestartFrame};
