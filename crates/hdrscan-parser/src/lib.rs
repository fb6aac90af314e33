//! hdrscan Parser
//!
//! Turns compile commands into preprocessor runs and reads the headers
//! they include back out of the line markers.
//!
//! ## Modules
//!
//! - `compdb` - Compilation database loading and shape detection
//! - `normalize` - Rewriting compile commands into `-E` runs
//! - `linemarker` - Line-marker parsing and header extraction
//! - `preprocessor` - Subprocess execution
//! - `scan` - The per-database driver

pub mod compdb;
pub mod linemarker;
pub mod normalize;
pub mod preprocessor;
pub mod scan;

pub use compdb::CompilationDatabase;
pub use linemarker::{IncludeExtractor, LineMarker, LineOutcome, LineParseError};
pub use normalize::{tokenize_command, Normalizer};
pub use preprocessor::{CommandRunner, ProcessRunner, RunOutput};
pub use scan::{HeaderScanner, ScanStats};
