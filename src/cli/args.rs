//! CLI argument definitions using clap
//!
//! This module defines all command-line arguments for curlsharp.

use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;

/// curlsharp - convert curl commands into C# HttpClient code
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "curlsharp", version, about, long_about = None)]
pub struct Args {
    // =========================================================================
    // INPUT
    // =========================================================================

    /// The curl command to convert (quote it, or pass it after `--`)
    ///
    /// Without a command and without --file, the command is read from stdin.
    #[arg(value_name = "COMMAND", trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,

    /// Read the curl command from a file
    #[arg(short = 'f', long = "file", value_name = "PATH", conflicts_with = "command")]
    pub file: Option<PathBuf>,

    // =========================================================================
    // CONVERSION
    // =========================================================================

    /// Maximum number of files one -T list or range may expand to
    #[arg(long = "max-upload-files", value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub max_upload_files: Option<u32>,

    /// Print the parsed curl options as JSON instead of generating code
    #[arg(long = "parse-only", action = ArgAction::SetTrue)]
    pub parse_only: bool,

    // =========================================================================
    // OUTPUT
    // =========================================================================

    /// Write the generated code to a file instead of stdout
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Print {"data", "warnings"} / {"errors"} JSON instead of plain code
    #[arg(long = "json", action = ArgAction::SetTrue)]
    pub json: bool,

    /// Force disable colors in warnings
    #[arg(long = "no-color", action = ArgAction::SetTrue)]
    pub no_color: bool,

    // =========================================================================
    // TROUBLESHOOTING
    // =========================================================================

    /// Output format for diagnostic logging: json (JSON Lines) or text (default)
    #[arg(long = "log-format", value_name = "FORMAT", value_enum)]
    pub log_format: Option<LogFormat>,

    /// Debug mode: verbose logging and detailed errors
    #[arg(long = "debug", action = ArgAction::SetTrue)]
    pub debug: bool,

    // =========================================================================
    // GENERATION (hidden)
    // =========================================================================

    /// Generate shell completions for the specified shell
    #[arg(long = "generate-completions", value_name = "SHELL", value_enum, hide = true)]
    pub generate_completions: Option<Shell>,

    /// Generate man page to stdout
    #[arg(long = "generate-manpage", action = ArgAction::SetTrue, hide = true)]
    pub generate_manpage: bool,
}

impl Args {
    /// Positional words joined back into one command line
    pub fn command_text(&self) -> Option<String> {
        if self.command.is_empty() {
            None
        } else {
            Some(self.command.join(" "))
        }
    }
}

/// Shell types for completion generation
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

/// Log format for diagnostic output
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Plain text output (default)
    #[default]
    Text,
    /// JSON Lines format for parsing
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_quoted_command() {
        let args = Args::try_parse_from(["curlsharp", "curl -X POST http://x.com"]).unwrap();
        assert_eq!(args.command_text().as_deref(), Some("curl -X POST http://x.com"));
    }

    #[test]
    fn test_trailing_words_are_joined() {
        let args =
            Args::try_parse_from(["curlsharp", "--json", "curl", "-X", "POST", "http://x.com"])
                .unwrap();
        assert!(args.json);
        assert_eq!(args.command_text().as_deref(), Some("curl -X POST http://x.com"));
    }

    #[test]
    fn test_file_and_options() {
        let args = Args::try_parse_from([
            "curlsharp",
            "-f",
            "cmd.txt",
            "--max-upload-files",
            "5",
            "--log-format",
            "json",
        ])
        .unwrap();
        assert_eq!(args.file, Some(PathBuf::from("cmd.txt")));
        assert_eq!(args.max_upload_files, Some(5));
        assert_eq!(args.log_format, Some(LogFormat::Json));
        assert!(args.command_text().is_none());
    }

    #[test]
    fn test_zero_upload_files_rejected() {
        assert!(Args::try_parse_from(["curlsharp", "--max-upload-files", "0"]).is_err());
    }
}
