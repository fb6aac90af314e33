//! hdrscan Core
//!
//! Shared types, configuration and errors for the hdrscan header extractor.

pub mod config;
pub mod error;
pub mod types;

pub use config::{Config, DanglingOutputFlag, LogConfig, ScanConfig};
pub use error::{Error, Result};
pub use types::*;
