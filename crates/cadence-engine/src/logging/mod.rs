//! Logging setup.
//!
//! The engine logs through the `log` facade; the binary installs an
//! `env_logger` backend once at startup.

mod init;

pub use init::{init_logging, LoggingConfig, DEFAULT_FILTER};
