//! Structured condition signaling with exiting and calling handlers,
//! restarts and finally guards.
//!
//! ```rust
//! use recourse_core::runtime::stdlib::{stop, warning};
//! use recourse_core::{tags, Exiting, Runtime};
//!
//! let runtime = Runtime::default();
//! let completion = runtime
//!     .invoke(|d| {
//!         warning(d, "low disk")?;
//!         d.establish_exiting(
//!             Exiting::new().on(tags::ERROR, |_, condition| Ok(condition.message().len())),
//!             |d| stop(d, "boom"),
//!         )
//!     })
//!     .unwrap();
//! assert_eq!(completion.value, 4);
//! assert_eq!(completion.warnings[0].message, "low disk");
//! ```

pub mod classes;
pub mod condition;
pub mod config;
pub mod error;
pub mod init;
pub mod logging;
pub mod runtime;
pub mod sink;

// Re-export main types
pub use classes::Family;
pub use condition::{classes_of, make_condition, tags, Condition, Tag};
pub use config::{Config, WarningPolicy};
pub use error::{ConfigError, Failure};
pub use runtime::{
    Calling, Completion, Dispatcher, Exiting, Flow, Restarts, Runtime, Signal, Unwind,
};

// Re-export init API for convenience
pub use init::{initialize, InitBuilder, InitOptions};
