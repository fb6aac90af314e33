//! Configuration types

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// hdrscan configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Scan configuration
    pub scan: ScanConfig,

    /// Logging configuration
    pub log: LogConfig,
}

impl Config {
    /// Load a configuration from a JSON file.
    ///
    /// Missing fields take their default values.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }
}

/// What to do when the output flag is the last token of a command
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DanglingOutputFlag {
    /// Drop the flag and keep going
    #[default]
    Drop,
    /// Treat the entry as malformed
    Reject,
}

/// Scan configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Flag whose operand names the compiler output (removed with its value)
    pub output_flag: String,

    /// Flag selecting preprocess-only mode with line markers
    pub preprocess_flag: String,

    /// Path fragments marking system headers
    pub system_roots: Vec<String>,

    /// Replace the compiler of every entry with this program
    pub compiler: Option<PathBuf>,

    /// Skip entries whose source file is assembly
    pub skip_assembly: bool,

    /// Policy for an output flag with no value after it
    pub dangling_output: DanglingOutputFlag,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            output_flag: "-o".into(),
            preprocess_flag: "-E".into(),
            system_roots: vec!["/usr/".into()],
            compiler: None,
            skip_assembly: false,
            dangling_output: DanglingOutputFlag::Drop,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default filter directive (overridden by `RUST_LOG`)
    pub level: String,

    /// Write diagnostics to this file instead of stderr
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            file: None,
        }
    }
}
