//! curlsharp library interface
//!
//! Converts curl command lines into C# code that performs the same request
//! with `System.Net.Http.HttpClient`.
//!
//! # Module Organization
//!
//! - [`parser`] - curl command parsing (scanner, flag evaluators, normalization)
//! - [`models`] - Parsed options and conversion results
//! - [`codegen`] - C# syntax tree, printer and generator
//! - [`errors`] - Error types (CurlsharpError, Result)
//! - [`status`] - Exit status codes (ExitStatus)
//! - [`core`] - Command line driver
//!
//! ```
//! let result = curlsharp::convert("curl -X POST -d 'a=b' https://example.com");
//! assert!(result.is_success());
//! assert!(result.data.unwrap().contains("HttpMethod(\"POST\")"));
//! ```

pub mod cli;
pub mod codegen;
pub mod config;
pub mod context;
pub mod core;
pub mod errors;
pub mod logging;
pub mod models;
pub mod parser;
pub mod status;

pub use codegen::generate;
pub use errors::{CurlsharpError, Result};
pub use models::{ConvertResult, CurlOptions};
pub use parser::{Parser, ParsingOptions};

/// Parse a curl command with default settings
pub fn parse(command: &str) -> ConvertResult<CurlOptions> {
    Parser::default().parse(command)
}

/// Parse a curl command and generate C# code for it
///
/// Warnings from both steps are merged; parse errors are returned as-is.
pub fn convert(command: &str) -> ConvertResult<String> {
    let parsed = parse(command);
    let options = match parsed.data {
        Some(options) if parsed.errors.is_empty() => options,
        _ => return ConvertResult::failure(parsed.errors, parsed.warnings),
    };

    let mut generated = generate(&options);
    let mut warnings = parsed.warnings;
    warnings.extend(generated.warnings);
    generated.warnings = warnings;
    generated
}
