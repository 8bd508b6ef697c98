//! # aw-observability
//!
//! Logging infrastructure for Access Warden.
//!
//! This crate sets up structured logging with tracing and provides span
//! macros used by the inspection engine.

pub mod logging;

pub use logging::{init_logging, init_logging_with_config, LoggingConfig};
