//! Preprocessor Integration
//!
//! Runs normalized compile commands and captures the preprocessed output.

pub mod runner;

pub use runner::{CommandRunner, ProcessRunner, RunOutput};
