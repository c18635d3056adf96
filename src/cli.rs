//! Command-line argument parsing
//!
//! Supports:
//! - Stripping leftover markers from markdown files
//! - Printing a file the way the overlay displays it
//! - Inspecting and editing the settings file

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Hidden-marker maintenance for markdown inline math
#[derive(Parser, Debug)]
#[command(name = "mathveil", version, about = "Hidden-marker maintenance for markdown inline math")]
pub struct CliArgs {
    /// Settings file to use instead of the one in the config directory
    #[arg(long, global = true, value_name = "PATH")]
    pub settings: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Subcommand, Debug)]
pub enum CliCommand {
    /// Remove markers from markdown files
    Clean {
        /// Files to clean
        #[arg(value_name = "FILES", required = true)]
        files: Vec<PathBuf>,

        /// Report files that contain markers without changing them
        #[arg(long, conflicts_with = "stdout")]
        check: bool,

        /// Print cleaned text instead of writing the files back
        #[arg(long)]
        stdout: bool,
    },

    /// Print a file with its markers hidden, as the overlay shows it
    Render {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Inspect or edit settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum SettingsAction {
    /// Print the effective settings as JSON
    Show,
    /// Print the settings file location
    Path,
    /// Restore all settings to their defaults
    Reset,
    /// Set one setting, e.g. `set disableInTables false`
    Set {
        /// Setting name as stored (camelCase)
        key: String,
        /// New value as JSON
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_clean_flags() {
        let args = parse(&["mathveil", "clean", "a.md", "b.md", "--check"]);
        match args.command {
            CliCommand::Clean {
                files,
                check,
                stdout,
            } => {
                assert_eq!(files, vec![PathBuf::from("a.md"), PathBuf::from("b.md")]);
                assert!(check);
                assert!(!stdout);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_clean_requires_files() {
        assert!(CliArgs::try_parse_from(["mathveil", "clean"]).is_err());
        assert!(
            CliArgs::try_parse_from(["mathveil", "clean", "a.md", "--check", "--stdout"]).is_err()
        );
    }

    #[test]
    fn test_settings_subcommands() {
        let args = parse(&[
            "mathveil",
            "settings",
            "set",
            "disableInTables",
            "false",
            "--settings",
            "/tmp/s.json",
        ]);
        assert_eq!(args.settings, Some(PathBuf::from("/tmp/s.json")));
        match args.command {
            CliCommand::Settings { action } => assert_eq!(
                action,
                SettingsAction::Set {
                    key: "disableInTables".into(),
                    value: "false".into()
                }
            ),
            other => panic!("unexpected {:?}", other),
        }
    }
}
