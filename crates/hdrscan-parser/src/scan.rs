//! Header Scanner
//!
//! Drives one run: every database entry is normalized, preprocessed and
//! scanned in order, and the user headers it entered are written out.

use hdrscan_core::{Result, ScanConfig};
use std::io::Write;
use tracing::{debug, error, info, warn};

use crate::compdb::CompilationDatabase;
use crate::linemarker::{IncludeExtractor, LineOutcome};
use crate::normalize::Normalizer;
use crate::preprocessor::{CommandRunner, ProcessRunner};

/// Counters collected over one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Entries that were preprocessed
    pub entries: usize,
    /// Entries skipped without running anything
    pub skipped: usize,
    /// Header paths written
    pub headers: usize,
    /// Line markers that could not be parsed
    pub malformed_lines: usize,
}

/// Scans a compilation database for user headers
pub struct HeaderScanner<R = ProcessRunner> {
    config: ScanConfig,
    extractor: IncludeExtractor,
    runner: R,
}

impl HeaderScanner<ProcessRunner> {
    /// Create a scanner that spawns real preprocessor processes
    pub fn new(config: ScanConfig) -> Self {
        Self::with_runner(config, ProcessRunner::new())
    }
}

impl<R: CommandRunner> HeaderScanner<R> {
    /// Create a scanner with a custom runner
    pub fn with_runner(config: ScanConfig, runner: R) -> Self {
        let extractor = IncludeExtractor::new(config.system_roots.clone());
        Self {
            config,
            extractor,
            runner,
        }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Scan every entry, writing one header path per line to `out`.
    ///
    /// Stops at the first entry that cannot be normalized or whose
    /// preprocessor run fails.
    pub fn scan<W: Write>(&self, db: &CompilationDatabase, out: &mut W) -> Result<ScanStats> {
        let mut stats = ScanStats::default();

        let Some(shape) = db.shape()? else {
            warn!("Compilation database is empty, nothing to do");
            return Ok(stats);
        };
        let normalizer = Normalizer::with_config(shape, &self.config);

        for (index, entry) in db.entries().iter().enumerate() {
            if self.config.skip_assembly && entry.is_assembly() {
                warn!("Skipping assembly source {:?}", entry.file);
                stats.skipped += 1;
                continue;
            }

            let invocation = normalizer.normalize(index, entry)?;
            debug!(
                "will run '{}' in directory {:?}",
                invocation, invocation.directory
            );

            let output = self.runner.run(&invocation)?;
            stats.entries += 1;

            for outcome in self.extractor.extract(&output.stdout) {
                match outcome {
                    LineOutcome::Header(path) => {
                        writeln!(out, "{}", path)?;
                        stats.headers += 1;
                    }
                    LineOutcome::Skipped => {}
                    LineOutcome::Malformed(e) => {
                        error!("{}", e);
                        stats.malformed_lines += 1;
                    }
                }
            }
        }
        out.flush()?;

        info!(
            "Scanned {} entries ({} skipped): {} headers, {} malformed lines",
            stats.entries, stats.skipped, stats.headers, stats.malformed_lines
        );
        Ok(stats)
    }
}
