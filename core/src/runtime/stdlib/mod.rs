//! Standard conveniences built on the scoped constructs
//!
//! - `signals`: raisers for each family, with muffle restarts where the family allows it
//! - `compose`: default substitution, `try`, suppression and silent execution

pub mod compose;
pub mod signals;

pub use compose::{quietly, suppress_messages, suppress_warnings, try_condition, try_or};
pub use signals::{
    abort, inform, interrupt, message, muffle_message, muffle_warning, signal, stop, warn, warning,
};

/// Restart established around every warning raised through `warn`/`warning`
pub const MUFFLE_WARNING: &str = "muffle_warning";

/// Restart established around every message raised through `inform`/`message`
pub const MUFFLE_MESSAGE: &str = "muffle_message";
