//! Compile Command Normalizer
//!
//! Rewrites a compile command into a preprocessor-only run: the output
//! flag and its operand are removed so nothing gets overwritten, and the
//! preprocess flag is appended so line markers land on stdout.

use hdrscan_core::{
    CommandShape, CompileEntry, DanglingOutputFlag, Error, NormalizedInvocation, Result,
    ScanConfig,
};
use std::path::PathBuf;
use tracing::warn;

/// Split a shell-style command line into tokens.
///
/// Quotes and backslash escapes are honored. A line the lexer rejects
/// (unbalanced quotes) falls back to plain whitespace splitting.
pub fn tokenize_command(command: &str) -> Vec<String> {
    shlex::split(command).unwrap_or_else(|| {
        warn!("Could not lex command, splitting on whitespace: {}", command);
        command.split_whitespace().map(ToString::to_string).collect()
    })
}

/// Normalizer for the entries of one compilation database
#[derive(Debug, Clone)]
pub struct Normalizer {
    shape: CommandShape,
    output_flag: String,
    preprocess_flag: String,
    compiler: Option<PathBuf>,
    dangling_output: DanglingOutputFlag,
}

impl Normalizer {
    /// Create a normalizer with default flags
    pub fn new(shape: CommandShape) -> Self {
        Self::with_config(shape, &ScanConfig::default())
    }

    /// Create a normalizer from a scan configuration
    pub fn with_config(shape: CommandShape, config: &ScanConfig) -> Self {
        Self {
            shape,
            output_flag: config.output_flag.clone(),
            preprocess_flag: config.preprocess_flag.clone(),
            compiler: config.compiler.clone(),
            dangling_output: config.dangling_output,
        }
    }

    /// Normalize the entry at `index` of the database
    pub fn normalize(&self, index: usize, entry: &CompileEntry) -> Result<NormalizedInvocation> {
        let tokens = match self.shape {
            CommandShape::Arguments => entry.arguments.clone().ok_or_else(|| {
                Error::Format(format!("entry {} has no `arguments` field", index))
            })?,
            CommandShape::Command => {
                let command = entry.command.as_deref().ok_or_else(|| {
                    Error::Format(format!("entry {} has no `command` field", index))
                })?;
                tokenize_command(command)
            }
        };

        let mut argv = self.strip_output(index, tokens)?;
        if argv.is_empty() {
            return Err(Error::MalformedCommand {
                index,
                reason: "no compiler to run".into(),
            });
        }

        if let Some(compiler) = &self.compiler {
            argv[0] = compiler.to_string_lossy().into_owned();
        }
        argv.push(self.preprocess_flag.clone());

        Ok(NormalizedInvocation {
            argv,
            directory: entry.directory.clone(),
        })
    }

    /// Drop every output flag along with the token after the last one.
    ///
    /// A flag directly following another flag re-arms the skip, so
    /// `-o -o x` drops all three tokens.
    fn strip_output(&self, index: usize, tokens: Vec<String>) -> Result<Vec<String>> {
        let mut kept = Vec::with_capacity(tokens.len() + 1);
        let mut skip_value = false;

        for token in tokens {
            if token == self.output_flag {
                skip_value = true;
            } else if skip_value {
                skip_value = false;
            } else {
                kept.push(token);
            }
        }

        if skip_value {
            match self.dangling_output {
                DanglingOutputFlag::Drop => {
                    warn!(
                        "Entry {}: `{}` has no value, dropping it",
                        index, self.output_flag
                    );
                }
                DanglingOutputFlag::Reject => {
                    return Err(Error::MalformedCommand {
                        index,
                        reason: format!("`{}` is missing its value", self.output_flag),
                    });
                }
            }
        }

        Ok(kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn args(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_strips_output_and_value() {
        let normalizer = Normalizer::new(CommandShape::Arguments);
        let entry = CompileEntry::with_arguments(["cc", "-o", "out.o", "-c", "f.c"]);

        let inv = normalizer.normalize(0, &entry).unwrap();

        assert_eq!(inv.argv, args(&["cc", "-c", "f.c", "-E"]));
        assert_eq!(inv.directory, None);
    }

    #[test]
    fn test_strips_every_output_flag() {
        let normalizer = Normalizer::new(CommandShape::Arguments);
        let entry =
            CompileEntry::with_arguments(["cc", "-o", "a.o", "-c", "a.c", "-o", "b.o", "-Wall"]);

        let inv = normalizer.normalize(0, &entry).unwrap();

        assert_eq!(inv.argv, args(&["cc", "-c", "a.c", "-Wall", "-E"]));
    }

    #[test]
    fn test_repeated_output_flag_drops_following_value() {
        let normalizer = Normalizer::new(CommandShape::Arguments);
        let entry = CompileEntry::with_arguments(["cc", "-c", "a.c", "-o", "-o", "x"]);

        let inv = normalizer.normalize(0, &entry).unwrap();

        assert_eq!(inv.argv, args(&["cc", "-c", "a.c", "-E"]));
    }

    #[test]
    fn test_joined_output_flag_is_kept() {
        // Only the exact token is recognized
        let normalizer = Normalizer::new(CommandShape::Arguments);
        let entry = CompileEntry::with_arguments(["cc", "-oa.o", "-c", "a.c"]);

        let inv = normalizer.normalize(0, &entry).unwrap();

        assert_eq!(inv.argv, args(&["cc", "-oa.o", "-c", "a.c", "-E"]));
    }

    #[test]
    fn test_directory_is_carried() {
        let normalizer = Normalizer::new(CommandShape::Arguments);
        let entry = CompileEntry::with_arguments(["cc", "-c", "a.c"]).in_directory("/tmp");

        let inv = normalizer.normalize(0, &entry).unwrap();

        assert_eq!(inv.directory, Some(PathBuf::from("/tmp")));
    }

    #[test]
    fn test_command_string_matches_whitespace_split() {
        let command = "cc -Iinclude -DFOO=1 -c src/a.c -o build/a.o";
        let from_string = Normalizer::new(CommandShape::Command)
            .normalize(0, &CompileEntry::with_command(command))
            .unwrap();
        let from_tokens = Normalizer::new(CommandShape::Arguments)
            .normalize(
                0,
                &CompileEntry::with_arguments(command.split_whitespace()),
            )
            .unwrap();

        assert_eq!(from_string, from_tokens);
    }

    #[test]
    fn test_command_string_honors_quotes() {
        let normalizer = Normalizer::new(CommandShape::Command);
        let entry = CompileEntry::with_command(r#"cc "-DNAME=\"a b\"" -c "my file.c" -o a.o"#);

        let inv = normalizer.normalize(0, &entry).unwrap();

        assert_eq!(
            inv.argv,
            args(&["cc", r#"-DNAME="a b""#, "-c", "my file.c", "-E"])
        );
    }

    #[test]
    fn test_unbalanced_quotes_fall_back_to_whitespace() {
        assert_eq!(
            tokenize_command(r#"cc -c "a.c"#),
            args(&["cc", "-c", "\"a.c"])
        );
    }

    #[test]
    fn test_dangling_output_dropped() {
        let normalizer = Normalizer::new(CommandShape::Arguments);
        let entry = CompileEntry::with_arguments(["cc", "-c", "a.c", "-o"]);

        let inv = normalizer.normalize(0, &entry).unwrap();

        assert_eq!(inv.argv, args(&["cc", "-c", "a.c", "-E"]));
    }

    #[test]
    fn test_dangling_output_rejected() {
        let config = ScanConfig {
            dangling_output: DanglingOutputFlag::Reject,
            ..ScanConfig::default()
        };
        let normalizer = Normalizer::with_config(CommandShape::Arguments, &config);
        let entry = CompileEntry::with_arguments(["cc", "-c", "a.c", "-o"]);

        let err = normalizer.normalize(3, &entry).unwrap_err();

        assert!(matches!(err, Error::MalformedCommand { index: 3, .. }));
    }

    #[test]
    fn test_compiler_override_and_custom_flags() {
        let config = ScanConfig {
            compiler: Some(PathBuf::from("/opt/llvm/bin/clang")),
            output_flag: "/Fo".into(),
            preprocess_flag: "-E".into(),
            ..ScanConfig::default()
        };
        let normalizer = Normalizer::with_config(CommandShape::Arguments, &config);
        let entry = CompileEntry::with_arguments(["gcc", "/Fo", "a.obj", "-c", "a.c"]);

        let inv = normalizer.normalize(0, &entry).unwrap();

        assert_eq!(inv.argv, args(&["/opt/llvm/bin/clang", "-c", "a.c", "-E"]));
    }

    #[test]
    fn test_missing_field_for_shape() {
        let normalizer = Normalizer::new(CommandShape::Arguments);
        let err = normalizer
            .normalize(2, &CompileEntry::with_command("cc -c a.c"))
            .unwrap_err();
        assert!(matches!(err, Error::Format(_)));
    }

    #[test]
    fn test_empty_command_is_malformed() {
        let normalizer = Normalizer::new(CommandShape::Command);
        let err = normalizer
            .normalize(0, &CompileEntry::with_command("   "))
            .unwrap_err();
        assert!(matches!(err, Error::MalformedCommand { index: 0, .. }));
    }
}
