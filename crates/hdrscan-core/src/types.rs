//! Core type definitions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// One record of a compilation database
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileEntry {
    /// Working directory of the compile
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
    /// Whole command line as one string (old style)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// Command line as separate tokens (new style)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Vec<String>>,
    /// Main source file of the translation unit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    /// Output produced by the compile
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
}

impl CompileEntry {
    /// Entry carrying an argument list
    pub fn with_arguments<I, S>(arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            arguments: Some(arguments.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    /// Entry carrying a single command string
    pub fn with_command(command: impl Into<String>) -> Self {
        Self {
            command: Some(command.into()),
            ..Self::default()
        }
    }

    /// Set the working directory
    pub fn in_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = Some(directory.into());
        self
    }

    /// Shape of this single record, if it is unambiguous
    pub fn shape(&self) -> Option<CommandShape> {
        match (&self.arguments, &self.command) {
            (Some(_), None) => Some(CommandShape::Arguments),
            (None, Some(_)) => Some(CommandShape::Command),
            _ => None,
        }
    }

    /// Whether the source file is assembly (`.s`, `.S`, `.asm`)
    pub fn is_assembly(&self) -> bool {
        self.file
            .as_deref()
            .and_then(Path::extension)
            .and_then(|ext| ext.to_str())
            .map(|ext| matches!(ext, "s" | "S" | "asm"))
            .unwrap_or(false)
    }
}

/// How the records of a compilation database spell their command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandShape {
    /// `"arguments": [...]`
    Arguments,
    /// `"command": "..."`
    Command,
}

impl fmt::Display for CommandShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandShape::Arguments => write!(f, "new-style (arguments)"),
            CommandShape::Command => write!(f, "old-style (command)"),
        }
    }
}

/// A compile command rewritten to only run the preprocessor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedInvocation {
    /// Program followed by its arguments
    pub argv: Vec<String>,
    /// Directory to run in; `None` means the current directory
    pub directory: Option<PathBuf>,
}

impl NormalizedInvocation {
    /// The program to execute
    pub fn program(&self) -> &str {
        self.argv.first().map(String::as_str).unwrap_or_default()
    }

    /// Arguments after the program
    pub fn args(&self) -> &[String] {
        self.argv.get(1..).unwrap_or_default()
    }
}

impl fmt::Display for NormalizedInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.argv.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_shape() {
        assert_eq!(
            CompileEntry::with_arguments(["cc", "-c", "a.c"]).shape(),
            Some(CommandShape::Arguments)
        );
        assert_eq!(
            CompileEntry::with_command("cc -c a.c").shape(),
            Some(CommandShape::Command)
        );
        assert_eq!(CompileEntry::default().shape(), None);

        let both = CompileEntry {
            command: Some("cc".into()),
            arguments: Some(vec!["cc".into()]),
            ..CompileEntry::default()
        };
        assert_eq!(both.shape(), None);
    }

    #[test]
    fn test_entry_deserialize() {
        let entry: CompileEntry = serde_json::from_str(
            r#"{"directory": "/tmp", "arguments": ["cc", "-c", "a.c"], "file": "a.c"}"#,
        )
        .unwrap();

        assert_eq!(entry.directory, Some(PathBuf::from("/tmp")));
        assert_eq!(entry.arguments.as_ref().map(Vec::len), Some(3));
        assert!(entry.command.is_none());
    }

    #[test]
    fn test_is_assembly() {
        let mut entry = CompileEntry::with_arguments(["cc"]);
        assert!(!entry.is_assembly());

        entry.file = Some(PathBuf::from("boot/start.S"));
        assert!(entry.is_assembly());

        entry.file = Some(PathBuf::from("src/main.c"));
        assert!(!entry.is_assembly());
    }

    #[test]
    fn test_invocation_accessors() {
        let inv = NormalizedInvocation {
            argv: vec!["cc".into(), "-c".into(), "a.c".into(), "-E".into()],
            directory: None,
        };
        assert_eq!(inv.program(), "cc");
        assert_eq!(inv.args().len(), 3);
        assert_eq!(inv.to_string(), "cc -c a.c -E");

        let empty = NormalizedInvocation {
            argv: vec![],
            directory: None,
        };
        assert_eq!(empty.program(), "");
        assert!(empty.args().is_empty());
    }
}
