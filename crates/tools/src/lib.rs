//! Driver library for the edgebus command-line tools.
//!
//! The binaries are thin: they parse a CLI, load the app config, and hand
//! off to [`publisher::run`] or [`subscriber::run`]. Everything here is
//! orchestration over the client and config crates.

pub mod error;
pub mod publisher;
pub mod shutdown;
pub mod subscriber;
pub mod watch;

pub use error::ToolError;
