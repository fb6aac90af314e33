//! Preprocessor Line-Marker Parsing
//!
//! `cc -E` annotates its output with line markers of the form
//!
//! ```text
//! # 1 "/path/to/file.h" 1 3
//! ```
//!
//! where the trailing flags say what happened at that point: `1` means a
//! new file was entered, `2` means we returned to a file, `3` marks a system
//! header. The extractor walks these markers and yields the user headers
//! that were entered.

use std::str::Lines;
use thiserror::Error;
use tracing::error;

/// First character of every line marker
pub const MARKER_PREFIX: char = '#';

/// Flag emitted when the preprocessor enters a new file
pub const ENTER_FILE_FLAG: &str = "1";

/// A candidate line that could not be read as a line marker
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("bad/unhandled line ({reason}): '{line}'")]
pub struct LineParseError {
    /// The offending line
    pub line: String,
    /// What was wrong with it
    pub reason: &'static str,
}

impl LineParseError {
    fn new(line: &str, reason: &'static str) -> Self {
        Self {
            line: line.to_string(),
            reason,
        }
    }
}

/// A parsed line marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineMarker {
    /// Line number token, kept verbatim
    pub line_number: String,
    /// File path with quotes removed and escapes resolved
    pub path: String,
    /// Whether the path was quoted in the output
    pub quoted: bool,
    /// Flags following the path
    pub flags: Vec<String>,
}

impl LineMarker {
    /// Parse a line starting with the marker prefix.
    ///
    /// The line is split on single spaces into prefix, line number, path and
    /// flags. A quoted path runs to its closing quote, so paths containing
    /// spaces stay whole.
    pub fn parse(line: &str) -> Result<Self, LineParseError> {
        let mut parts = line.splitn(3, ' ');
        let _prefix = parts.next();
        let (Some(line_number), Some(rest)) = (parts.next(), parts.next()) else {
            return Err(LineParseError::new(line, "fewer than 3 tokens"));
        };

        let (path, quoted, rest) = match rest.strip_prefix('"') {
            Some(quoted_rest) => {
                let (path, rest) = split_quoted(quoted_rest)
                    .ok_or_else(|| LineParseError::new(line, "unterminated file name"))?;
                (path, true, rest)
            }
            None => {
                let (path, rest) = rest.split_once(' ').unwrap_or((rest, ""));
                (path.to_string(), false, rest)
            }
        };

        if path.is_empty() {
            return Err(LineParseError::new(line, "empty file name"));
        }

        let flags = rest
            .split(' ')
            .filter(|flag| !flag.is_empty())
            .map(ToString::to_string)
            .collect();

        Ok(Self {
            line_number: line_number.to_string(),
            path,
            quoted,
            flags,
        })
    }

    /// Whether this marker enters a new file
    pub fn enters_file(&self) -> bool {
        self.flags.iter().any(|flag| flag == ENTER_FILE_FLAG)
    }

    /// Whether the name is a pseudo-file such as `<built-in>`
    pub fn is_angle_bracketed(&self) -> bool {
        self.path.starts_with('<')
    }
}

/// Split `text` (just past an opening quote) at its closing quote.
///
/// Returns the unescaped contents and whatever follows the closing quote.
fn split_quoted(text: &str) -> Option<(String, &str)> {
    let mut path = String::new();
    let mut chars = text.char_indices();

    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => path.push(chars.next()?.1),
            '"' => return Some((path, &text[i + 1..])),
            _ => path.push(c),
        }
    }

    None
}

/// Result of looking at one candidate line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// The line entered a user header
    Header(String),
    /// A well-formed line that names no user header
    Skipped,
    /// The line could not be parsed
    Malformed(LineParseError),
}

/// Decides which entered files count as user headers
#[derive(Debug, Clone)]
pub struct IncludeExtractor {
    system_roots: Vec<String>,
}

impl Default for IncludeExtractor {
    fn default() -> Self {
        Self::new(vec!["/usr/".to_string()])
    }
}

impl IncludeExtractor {
    /// Create an extractor excluding paths that contain any of `system_roots`
    pub fn new(system_roots: Vec<String>) -> Self {
        Self { system_roots }
    }

    /// Whether a path lies under a system include root
    pub fn is_system_path(&self, path: &str) -> bool {
        self.system_roots.iter().any(|root| path.contains(root.as_str()))
    }

    /// Classify one line of preprocessor output.
    ///
    /// Returns `None` for lines that are not line markers at all.
    pub fn classify(&self, line: &str) -> Option<LineOutcome> {
        if !line.starts_with(MARKER_PREFIX) {
            return None;
        }

        let outcome = match LineMarker::parse(line) {
            Ok(marker)
                if marker.enters_file()
                    && !self.is_system_path(&marker.path)
                    && !marker.is_angle_bracketed() =>
            {
                LineOutcome::Header(marker.path)
            }
            Ok(_) => LineOutcome::Skipped,
            Err(e) => LineOutcome::Malformed(e),
        };
        Some(outcome)
    }

    /// Lazily scan raw preprocessor output
    pub fn extract<'a>(&'a self, raw: &'a str) -> Extract<'a> {
        Extract {
            extractor: self,
            lines: raw.lines(),
        }
    }
}

/// Iterator over the outcomes of every line marker in some output
pub struct Extract<'a> {
    extractor: &'a IncludeExtractor,
    lines: Lines<'a>,
}

impl<'a> Extract<'a> {
    /// Only the header paths; malformed lines are logged and skipped
    pub fn paths(self) -> impl Iterator<Item = String> + 'a {
        self.filter_map(|outcome| match outcome {
            LineOutcome::Header(path) => Some(path),
            LineOutcome::Skipped => None,
            LineOutcome::Malformed(e) => {
                error!("{}", e);
                None
            }
        })
    }
}

impl Iterator for Extract<'_> {
    type Item = LineOutcome;

    fn next(&mut self) -> Option<Self::Item> {
        let extractor = self.extractor;
        self.lines.by_ref().find_map(|line| extractor.classify(line))
    }
}
