use std::io::{Read, Write};

use clap::Parser as _;
use indexmap::IndexSet;
use serde_json::json;
use tracing::info;

use crate::cli::Args;
use crate::codegen;
use crate::config::Config;
use crate::context::Environment;
use crate::errors::{CurlsharpError, Result};
use crate::logging::init_logging;
use crate::parser::Parser;
use crate::status::ExitStatus;

/// Longest command accepted, in characters
pub const MAX_COMMAND_LENGTH: usize = 10_000;

/// Main entry point for the CLI.
///
/// Handles argument parsing, configuration loading and logging setup, then
/// converts one curl command.
pub fn run(args: Vec<String>, mut env: Environment) -> ExitStatus {
    if let Some(name) = args.first() {
        if let Some(basename) = std::path::Path::new(name).file_stem() {
            env.program_name = basename.to_string_lossy().to_string();
        }
    }

    let config = match Config::load(&env) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: Failed to load config: {}", e);
            Config::default()
        }
    };

    let merged_args = merge_default_options(args, &config);

    let parsed = match Args::try_parse_from(&merged_args) {
        Ok(args) => args,
        Err(e) => {
            e.print().ok();
            return if e.kind() == clap::error::ErrorKind::DisplayHelp
                || e.kind() == clap::error::ErrorKind::DisplayVersion
            {
                ExitStatus::Success
            } else {
                ExitStatus::Error
            };
        }
    };

    init_logging(parsed.log_format.unwrap_or_default(), parsed.debug);

    if let Some(shell) = &parsed.generate_completions {
        generate_completions(shell, &env.program_name);
        return ExitStatus::Success;
    }

    if parsed.generate_manpage {
        return match generate_manpage() {
            Ok(()) => ExitStatus::Success,
            Err(e) => handle_error(e, parsed.debug),
        };
    }

    match program(&parsed, &env, &config) {
        Ok(status) => status,
        Err(e) => handle_error(e, parsed.debug),
    }
}

/// Convert the command selected by `args` and write the result
pub fn program(args: &Args, env: &Environment, config: &Config) -> Result<ExitStatus> {
    let (command, source) = read_command(args, env)?;
    let length = command.chars().count();
    if length > MAX_COMMAND_LENGTH {
        return Err(CurlsharpError::Argument(format!(
            "command is {} characters long, the limit is {}",
            length, MAX_COMMAND_LENGTH
        )));
    }
    info!(source, length, "converting curl command");

    let mut settings = config.parsing_options();
    if let Some(max) = args.max_upload_files {
        settings.max_upload_files = max as usize;
    }
    let json_output = args.json || config.json_output;
    let colors = env.colors && !args.no_color;

    let parsed = Parser::new(settings).parse(&command);
    let mut warnings = parsed.warnings;
    let options = match parsed.data {
        Some(options) if parsed.errors.is_empty() => options,
        _ => {
            info!(errors = parsed.errors.len(), "conversion failed");
            if json_output {
                let body = json!({ "errors": parsed.errors });
                write_output(args, &serde_json::to_string_pretty(&body)?)?;
                return Ok(ExitStatus::Error);
            }
            print_warnings(&warnings, colors);
            return Err(CurlsharpError::Conversion(parsed.errors.into_iter().collect()));
        }
    };

    let data = if args.parse_only {
        serde_json::to_value(&options)?
    } else {
        let generated = codegen::generate(&options);
        warnings.extend(generated.warnings);
        serde_json::Value::String(generated.data.unwrap_or_default())
    };
    info!(warnings = warnings.len(), "conversion finished");

    if json_output {
        let body = json!({ "data": data, "warnings": warnings });
        write_output(args, &serde_json::to_string_pretty(&body)?)?;
    } else {
        let text = match data {
            serde_json::Value::String(code) => code,
            other => serde_json::to_string_pretty(&other)?,
        };
        write_output(args, &text)?;
        print_warnings(&warnings, colors);
    }

    Ok(ExitStatus::Success)
}

/// The command text and a label for where it came from
fn read_command(args: &Args, env: &Environment) -> Result<(String, &'static str)> {
    if let Some(command) = args.command_text() {
        return Ok((command, "argument"));
    }

    if let Some(path) = &args.file {
        let command = std::fs::read_to_string(path).map_err(|e| {
            CurlsharpError::Argument(format!("cannot read {}: {}", path.display(), e))
        })?;
        return Ok((command, "file"));
    }

    if env.stdin_isatty {
        return Err(CurlsharpError::Argument(format!(
            "no curl command given; pass it as an argument, with --file, or on stdin (see {} --help)",
            env.program_name
        )));
    }

    let mut command = String::new();
    std::io::stdin().read_to_string(&mut command)?;
    Ok((command, "stdin"))
}

fn write_output(args: &Args, text: &str) -> Result<()> {
    match &args.output {
        Some(path) => {
            let mut file = std::fs::File::create(path)?;
            writeln!(file, "{}", text)?;
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", text)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

fn print_warnings(warnings: &IndexSet<String>, colors: bool) {
    for warning in warnings {
        let line = format!("Warning: {}", warning);
        if colors {
            eprintln!("{}", console::style(line).yellow().for_stderr().force_styling(true));
        } else {
            eprintln!("{}", line);
        }
    }
}

fn merge_default_options(args: Vec<String>, config: &Config) -> Vec<String> {
    if config.default_options.is_empty() {
        return args;
    }

    let (flags, positional): (Vec<_>, Vec<_>) = config
        .default_options
        .iter()
        .partition(|opt| opt.starts_with('-'));

    if !positional.is_empty() {
        let line = format!(
            "Warning: Positional arguments in default_options are ignored: {:?}",
            positional
        );
        eprintln!("{}", console::style(line).yellow().for_stderr());
        eprintln!("Only flags (starting with -) can be used in default_options.");
    }

    if flags.is_empty() {
        return args;
    }

    let mut merged = Vec::with_capacity(args.len() + flags.len());

    if let Some(program) = args.first() {
        merged.push(program.clone());
    }

    merged.extend(flags.into_iter().cloned());
    merged.extend(args.into_iter().skip(1));

    merged
}

fn handle_error(error: CurlsharpError, debug: bool) -> ExitStatus {
    if debug {
        eprintln!("Error: {:?}", error);
    } else {
        eprintln!("Error: {}", error);
    }

    ExitStatus::Error
}

fn generate_completions(shell: &crate::cli::Shell, program_name: &str) {
    use clap::CommandFactory;
    use clap_complete::{generate, Shell as ClapShell};

    let mut cmd = Args::command();
    let shell = match shell {
        crate::cli::Shell::Bash => ClapShell::Bash,
        crate::cli::Shell::Zsh => ClapShell::Zsh,
        crate::cli::Shell::Fish => ClapShell::Fish,
        crate::cli::Shell::PowerShell => ClapShell::PowerShell,
        crate::cli::Shell::Elvish => ClapShell::Elvish,
    };

    generate(shell, &mut cmd, program_name, &mut std::io::stdout());
}

fn generate_manpage() -> Result<()> {
    use clap::CommandFactory;

    let cmd = Args::command();
    let man = clap_mangen::Man::new(cmd);
    man.render(&mut std::io::stdout())?;
    Ok(())
}
