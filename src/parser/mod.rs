//! curl command line parser
//!
//! Single pass over the input: flags are dispatched to the evaluator
//! registry, bare words are checked for the request URL. A normalization
//! step then fills in what curl would infer (method, content type, URL
//! without a scheme).

pub mod evaluators;
pub mod scanner;

use indexmap::IndexSet;
use tracing::{debug, warn};
use url::{Host, Url};

use crate::models::options::{header_names, methods, CONTENT_TYPE_WWW_FORM};
use crate::models::{ConvertResult, CurlOptions};
use evaluators::Flag;
use scanner::Cursor;

/// Name of the tool itself; ignored when it appears as a bare word
const TOOL_NAME: &str = "curl";
/// Shell prompt marker copied along with the command
const PROMPT_MARKER: &str = "$";

pub const DEFAULT_MAX_UPLOAD_FILES: usize = 10;

pub const URL_ERROR: &str = "Unable to parse URL";

/// Parser settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsingOptions {
    /// Cap on files produced by one `-T` list or range
    pub max_upload_files: usize,
}

impl Default for ParsingOptions {
    fn default() -> Self {
        Self {
            max_upload_files: DEFAULT_MAX_UPLOAD_FILES,
        }
    }
}

/// Mutable state threaded through the evaluators
pub(crate) struct ParseState {
    pub options: CurlOptions,
    pub warnings: IndexSet<String>,
    pub max_upload_files: usize,
}

impl ParseState {
    pub(crate) fn new(settings: &ParsingOptions) -> Self {
        Self {
            options: CurlOptions::default(),
            warnings: IndexSet::new(),
            max_upload_files: settings.max_upload_files,
        }
    }

    pub(crate) fn warn(&mut self, message: String) {
        warn!("{}", message);
        self.warnings.insert(message);
    }
}

#[derive(Debug, Clone, Default)]
pub struct Parser {
    settings: ParsingOptions,
}

impl Parser {
    pub fn new(settings: ParsingOptions) -> Self {
        Self { settings }
    }

    /// Parse one curl invocation
    ///
    /// The result only fails when no request URL could be found; every
    /// other problem is reported as a warning.
    pub fn parse(&self, command: &str) -> ConvertResult<CurlOptions> {
        let mut state = ParseState::new(&self.settings);
        let mut cursor = Cursor::new(command);
        let mut last_unknown: Option<String> = None;

        loop {
            cursor.trim_leading();
            if cursor.is_empty() {
                break;
            }

            if cursor.at_parameter() {
                dispatch_parameter(&mut cursor, &mut state);
            } else {
                let value = cursor.read_value();
                evaluate_bare_value(&value, &mut state, &mut last_unknown);
            }
        }

        let ParseState {
            mut options,
            warnings,
            ..
        } = state;
        normalize(&mut options, last_unknown.as_deref());

        if options.url.is_none() {
            debug!("no request URL found");
            let mut errors = IndexSet::new();
            errors.insert(URL_ERROR.to_string());
            return ConvertResult::failure(errors, warnings);
        }

        ConvertResult::success(options, warnings)
    }
}

fn dispatch_parameter(cursor: &mut Cursor<'_>, state: &mut ParseState) {
    let token = cursor.peek_token();

    if let Some(flag) = Flag::lookup(token) {
        cursor.read_parameter();
        flag.evaluate(cursor, state);
        return;
    }

    // Clustered short options: -XPOST, -d@file, -kI
    if !token.starts_with("--") && token.len() > 2 {
        let letters = &token[1..];
        if let Some(flag) = letters.chars().next().and_then(Flag::from_short) {
            if flag.takes_value() {
                debug!(token, "value attached to short option");
                cursor.advance(2);
                flag.evaluate(cursor, state);
                return;
            }

            let flags: Option<Vec<Flag>> = letters
                .chars()
                .map(|c| Flag::from_short(c).filter(|f| !f.takes_value()))
                .collect();
            if let Some(flags) = flags {
                cursor.read_parameter();
                for flag in flags {
                    flag.evaluate(cursor, state);
                }
                return;
            }
        }
    }

    let token = cursor.read_parameter();
    state.warn(format!("Parameter \"{}\" is not supported", token));
}

fn evaluate_bare_value(value: &str, state: &mut ParseState, last_unknown: &mut Option<String>) {
    if value.eq_ignore_ascii_case(TOOL_NAME) || value == PROMPT_MARKER {
        return;
    }

    if state.options.url.is_none() {
        if let Some(url) = parse_absolute_url(value) {
            debug!(url = %url, "request URL found");
            state.options.url = Some(url);
            return;
        }
    }

    *last_unknown = Some(value.to_string());
}

/// Absolute URL with a usable host
///
/// Domain names may end with a single dot but must not contain empty labels.
pub(crate) fn parse_absolute_url(value: &str) -> Option<Url> {
    let url = Url::parse(value).ok()?;
    let valid = match url.host()? {
        Host::Domain(domain) => {
            let domain = domain.strip_suffix('.').unwrap_or(domain);
            !domain.is_empty() && !domain.split('.').any(str::is_empty)
        }
        Host::Ipv4(_) | Host::Ipv6(_) => true,
    };

    valid.then_some(url)
}

/// Fill in what curl infers from the parsed flags
///
/// Safe to run more than once on the same options.
pub fn normalize(options: &mut CurlOptions, last_unknown: Option<&str>) {
    if options.url.is_none() {
        if let Some(url) = last_unknown.and_then(|v| parse_absolute_url(&format!("http://{}", v))) {
            debug!(url = %url, "request URL recovered from bare value");
            options.url = Some(url);
        }
    }

    if options.has_data_payload() {
        options.upload_files.clear();
        options.form_data.clear();
    } else if options.has_form_payload() {
        options.upload_files.clear();
    }

    if options.force_get && options.method.as_deref() != Some(methods::HEAD) {
        options.method = Some(methods::GET.to_string());
    }

    if options.method.is_none() {
        let method = if options.has_data_payload() || options.has_form_payload() {
            methods::POST
        } else if options.has_file_payload() {
            methods::PUT
        } else {
            methods::GET
        };
        debug!(method, "method inferred");
        options.method = Some(method.to_string());
    }

    if options.has_data_payload() && !options.headers.contains(header_names::CONTENT_TYPE) {
        options
            .headers
            .set(header_names::CONTENT_TYPE, CONTENT_TYPE_WWW_FORM);
    }
}
