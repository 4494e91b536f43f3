//! GRC workflow daemon library
//!
//! This module provides the pieces the `grc-workflowd` binary wires up:
//! - Layered configuration (defaults, file, environment)
//! - Store snapshot persistence between runs
//! - Daemon lifecycle around the engine's sweep scheduler

pub mod config;
pub mod error;
pub mod server;
pub mod state;

pub use config::{DaemonConfig, LoggingConfig};
pub use error::{DaemonError, DaemonResult};
pub use server::Daemon;
pub use state::StateFile;
