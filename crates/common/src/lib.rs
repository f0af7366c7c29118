//! Shared error and logging utilities for the readiness workspace.

pub mod error;
pub mod logging;

pub use error::{Error, Result};
pub use logging::LogFormat;
