//! # Runtime - Condition Dispatch over an Explicit Dynamic Scope
//!
//! ## Core Principles
//!
//! 1. **Explicit scope**: handler and restart frames live in owned stacks on the
//!    `Dispatcher`, one dispatcher per top-level invocation.
//! 2. **Unwinding as values**: non-local exits are `Err(Unwind)` carried by
//!    `?`, caught only by the construct they are addressed to.
//! 3. **Two disciplines**: exiting handlers unwind to their construct, calling
//!    handlers run in place and let the raiser continue.
//! 4. **Guaranteed cleanup**: every construct pops its own frames on every
//!    exit path; `with_finally` runs its cleanup exactly once.

pub mod constructs;
pub mod dispatch;
pub mod dispatcher;
pub mod invocation;
pub mod stdlib;
pub mod types;

#[cfg(test)]
mod tests;

pub use constructs::{Calling, Exiting, Restarts};
pub use dispatcher::Dispatcher;
pub use invocation::{Completion, Runtime};
pub use types::{DeferredWarning, Flow, FrameId, HandlerInfo, HandlerKind, RestartInfo, Signal, Unwind};
