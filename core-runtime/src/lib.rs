//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the remote-content client:
//! - Logging and tracing infrastructure
//! - Client configuration with fail-fast validation
//!
//! ## Overview
//!
//! This crate contains the runtime utilities every other crate depends on. It
//! establishes the logging conventions (structured `tracing` fields, token
//! redaction) and the single configuration type the client is built from.

pub mod config;
pub mod error;
pub mod logging;

pub use config::{ClientConfig, ClientConfigBuilder};
pub use error::{Error, Result};
pub use logging::{init_logging, LogFormat, LogLevel, LoggingConfig};
