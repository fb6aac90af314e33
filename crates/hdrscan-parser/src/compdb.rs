//! Compilation database loading
//!
//! Reads `compile_commands.json` and decides, from its first record, whether
//! the database spells commands as argument lists or as single strings.

use hdrscan_core::{CommandShape, CompileEntry, Error, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// An in-memory compilation database
#[derive(Debug, Clone, Default)]
pub struct CompilationDatabase {
    entries: Vec<CompileEntry>,
}

impl CompilationDatabase {
    /// Load a database from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let db = Self::from_json(&content)?;
        debug!("Loaded {} entries from {}", db.len(), path.display());
        Ok(db)
    }

    /// Parse a database from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        let entries: Vec<CompileEntry> = serde_json::from_str(json)?;
        Ok(Self { entries })
    }

    /// Build a database from records already in memory
    pub fn from_entries(entries: Vec<CompileEntry>) -> Self {
        Self { entries }
    }

    /// Determine the command shape from the first record.
    ///
    /// Returns `Ok(None)` for an empty database.
    pub fn shape(&self) -> Result<Option<CommandShape>> {
        let Some(first) = self.entries.first() else {
            return Ok(None);
        };

        match first.shape() {
            Some(shape) => {
                info!("Compilation database has {} data", shape);
                Ok(Some(shape))
            }
            None => Err(Error::Format(
                "first entry must have exactly one of `command` or `arguments`".into(),
            )),
        }
    }

    pub fn entries(&self) -> &[CompileEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
