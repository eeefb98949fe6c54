//! Java-specific helpers for Nova's type model.
//!
//! The formatters here are "Java-like" and stable, intended for diagnostics and log output.

pub mod format;
pub mod helpers;
