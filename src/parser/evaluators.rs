//! Flag evaluator registry
//!
//! Every supported curl flag maps to one [`Flag`] variant. The registry is a
//! static table in dispatch order; lookup returns the first entry whose
//! spellings contain the token.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;
use url::Url;

use super::scanner::Cursor;
use super::{parse_absolute_url, ParseState};
use crate::models::options::{header_names, methods};
use crate::models::{CertificateType, FormData, HttpVersion, KeyType, UploadData, UploadDataType};

const FILE_MARKER: char = '@';
const FORM_SEPARATOR: char = '=';
const INLINE_FILE_MARKER: char = '<';
const AUTO_REFERER: &str = ";auto";
const DEFAULT_PROXY_PORT: u16 = 1080;
const APPLICATION_JSON: &str = "application/json";

/// One supported flag (or flag family)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag {
    Request,
    Header,
    Cookie,
    Data,
    DataRaw,
    DataBinary,
    DataUrlEncode,
    Json,
    User,
    UploadFile,
    Url,
    Proxy,
    Head,
    Insecure,
    Form,
    CertificateType,
    Certificate,
    KeyType,
    Key,
    UserAgent,
    ProxyUser,
    Get,
    Compressed,
    Referer,
    OAuth2Bearer,
    MaxTime,
    Http09,
    Http10,
    Http11,
    Http20,
    Http30,
}

struct FlagSpec {
    flag: Flag,
    short: Option<char>,
    long: &'static [&'static str],
    /// May run with nothing left on the command line
    can_be_empty: bool,
}

const fn spec(
    flag: Flag,
    short: Option<char>,
    long: &'static [&'static str],
    can_be_empty: bool,
) -> FlagSpec {
    FlagSpec {
        flag,
        short,
        long,
        can_be_empty,
    }
}

static REGISTRY: &[FlagSpec] = &[
    spec(Flag::Request, Some('X'), &["--request"], false),
    spec(Flag::Header, Some('H'), &["--header"], false),
    spec(Flag::Cookie, Some('b'), &["--cookie"], false),
    spec(Flag::Data, Some('d'), &["--data", "--data-ascii"], false),
    spec(Flag::DataRaw, None, &["--data-raw"], false),
    spec(Flag::DataBinary, None, &["--data-binary"], false),
    spec(Flag::DataUrlEncode, None, &["--data-urlencode"], false),
    spec(Flag::Json, None, &["--json"], false),
    spec(Flag::User, Some('u'), &["--user"], false),
    spec(Flag::UploadFile, Some('T'), &["--upload-file"], false),
    spec(Flag::Url, None, &["--url"], false),
    spec(Flag::Proxy, Some('x'), &["--proxy"], false),
    spec(Flag::Head, Some('I'), &["--head"], true),
    spec(Flag::Insecure, Some('k'), &["--insecure"], true),
    spec(Flag::Form, Some('F'), &["--form"], false),
    spec(Flag::CertificateType, None, &["--cert-type"], false),
    spec(Flag::Certificate, Some('E'), &["--cert"], false),
    spec(Flag::KeyType, None, &["--key-type"], false),
    spec(Flag::Key, None, &["--key"], false),
    spec(Flag::UserAgent, Some('A'), &["--user-agent"], false),
    spec(Flag::ProxyUser, Some('U'), &["--proxy-user"], false),
    spec(Flag::Get, Some('G'), &["--get"], true),
    spec(Flag::Compressed, None, &["--compressed"], true),
    spec(Flag::Referer, Some('e'), &["--referer"], true),
    spec(Flag::OAuth2Bearer, None, &["--oauth2-bearer"], false),
    spec(Flag::MaxTime, Some('m'), &["--max-time"], false),
    spec(Flag::Http09, None, &["--http0.9"], true),
    spec(Flag::Http10, Some('0'), &["--http1.0"], true),
    spec(Flag::Http11, None, &["--http1.1"], true),
    spec(Flag::Http20, None, &["--http2"], true),
    spec(Flag::Http30, None, &["--http3"], true),
];

static RANGE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[(\d+)-(\d+)\]").expect("Invalid range regex"));

static PORT_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r":\d+$").expect("Invalid port regex"));

impl Flag {
    /// Find the evaluator for a complete flag token (`-X`, `--request`)
    pub fn lookup(token: &str) -> Option<Flag> {
        let entry = if let Some(long) = token.strip_prefix("--") {
            REGISTRY
                .iter()
                .find(|s| s.long.iter().any(|l| &l[2..] == long))
        } else {
            let mut chars = token.strip_prefix('-')?.chars();
            let short = chars.next()?;
            if chars.next().is_some() {
                return None;
            }
            REGISTRY.iter().find(|s| s.short == Some(short))
        }?;
        Some(entry.flag)
    }

    /// Find the evaluator for a single-letter option
    pub fn from_short(short: char) -> Option<Flag> {
        REGISTRY
            .iter()
            .find(|s| s.short == Some(short))
            .map(|s| s.flag)
    }

    fn spec(self) -> &'static FlagSpec {
        REGISTRY
            .iter()
            .find(|s| s.flag == self)
            .unwrap_or(&REGISTRY[0])
    }

    pub fn can_be_empty(self) -> bool {
        self.spec().can_be_empty
    }

    /// Whether the flag consumes the following word
    pub fn takes_value(self) -> bool {
        !matches!(
            self,
            Flag::Head
                | Flag::Insecure
                | Flag::Get
                | Flag::Compressed
                | Flag::Http09
                | Flag::Http10
                | Flag::Http11
                | Flag::Http20
                | Flag::Http30
        )
    }

    /// Long spelling, used in diagnostics
    pub fn name(self) -> &'static str {
        self.spec().long[0]
    }

    /// Apply the flag, reading its value from `cursor` when it takes one
    pub(crate) fn evaluate(self, cursor: &mut Cursor<'_>, state: &mut ParseState) {
        cursor.trim_leading();
        if !self.can_be_empty() && cursor.is_empty() {
            debug!(flag = self.name(), "flag without a value ignored");
            return;
        }

        debug!(flag = self.name(), "evaluating flag");
        match self {
            Flag::Request => state.options.method = Some(cursor.read_value().into_owned()),
            Flag::Header => evaluate_header(&cursor.read_value(), state),
            Flag::Cookie => state.options.cookie = Some(cursor.read_value().into_owned()),
            Flag::Data => evaluate_data(&cursor.read_value(), state, true, false),
            Flag::DataRaw => evaluate_data(&cursor.read_value(), state, false, false),
            Flag::DataBinary => evaluate_data(&cursor.read_value(), state, true, true),
            Flag::DataUrlEncode => evaluate_data_urlencode(&cursor.read_value(), state),
            Flag::Json => {
                evaluate_data(&cursor.read_value(), state, true, true);
                let headers = &mut state.options.headers;
                headers.set(header_names::CONTENT_TYPE, APPLICATION_JSON);
                headers.set(header_names::ACCEPT, APPLICATION_JSON);
            }
            Flag::User => state.options.user_password = Some(cursor.read_value().into_owned()),
            Flag::UploadFile => evaluate_upload_file(&cursor.read_value(), state),
            Flag::Url => evaluate_url(&cursor.read_value(), state),
            Flag::Proxy => evaluate_proxy(&cursor.read_value(), state),
            Flag::Head => state.options.method = Some(methods::HEAD.to_string()),
            Flag::Insecure => state.options.insecure = true,
            Flag::Form => evaluate_form(&cursor.read_value(), state),
            Flag::CertificateType => {
                let value = cursor.read_value();
                let kind = CertificateType::parse(&value);
                if kind.is_none() {
                    state.warn(format!(
                        "Unable to parse certificate type {}, PEM type will be used",
                        value
                    ));
                }
                state.options.certificate.kind = kind.unwrap_or_default();
            }
            Flag::Certificate => evaluate_certificate(&cursor.read_value(), state),
            Flag::KeyType => {
                let value = cursor.read_value();
                let kind = KeyType::parse(&value);
                if kind.is_none() {
                    state.warn(format!(
                        "Unable to parse key type {}, PEM type will be used",
                        value
                    ));
                }
                state.options.key.kind = kind.unwrap_or_default();
            }
            Flag::Key => {
                let value = cursor.read_value();
                if value.is_empty() {
                    state.warn("Unable to parse key".to_string());
                } else {
                    state.options.key.file = Some(value.into_owned());
                }
            }
            Flag::UserAgent => state.options.user_agent = Some(cursor.read_value().into_owned()),
            Flag::ProxyUser => evaluate_proxy_user(&cursor.read_value(), state),
            Flag::Get => state.options.force_get = true,
            Flag::Compressed => state.options.compressed = true,
            Flag::Referer => evaluate_referer(&cursor.read_value(), state),
            Flag::OAuth2Bearer => {
                let token = cursor.read_value();
                state
                    .options
                    .headers
                    .set(header_names::AUTHORIZATION, format!("Bearer {}", token));
            }
            Flag::MaxTime => {
                let value = cursor.read_value();
                match value.trim().parse::<f64>() {
                    Ok(seconds) if seconds.is_finite() && seconds >= 0.0 => {
                        state.options.max_time = Some(seconds)
                    }
                    _ => state.warn(format!("Unable to parse timeout \"{}\"", value)),
                }
            }
            Flag::Http09 => state.options.http_version = HttpVersion::Http09,
            Flag::Http10 => state.options.http_version = HttpVersion::Http10,
            Flag::Http11 => state.options.http_version = HttpVersion::Http11,
            Flag::Http20 => state.options.http_version = HttpVersion::Http20,
            Flag::Http30 => state.options.http_version = HttpVersion::Http30,
        }
    }
}

// =============================================================================
// HEADERS
// =============================================================================

fn evaluate_header(input: &str, state: &mut ParseState) {
    let Some((name, value)) = input.split_once(':') else {
        state.warn(format!("Unable to parse header \"{}\"", input));
        return;
    };

    let name = name.trim();
    if name.is_empty() {
        state.warn(format!("Unable to parse header \"{}\"", input));
        return;
    }

    let value = value.trim();
    if name.eq_ignore_ascii_case(header_names::COOKIE) {
        state.options.cookie = Some(value.to_string());
    } else if name.eq_ignore_ascii_case(header_names::USER_AGENT) {
        state.options.user_agent = Some(value.to_string());
    } else {
        state.options.headers.set(name, value);
    }
}

fn evaluate_referer(input: &str, state: &mut ParseState) {
    let mut value = input;
    if let Some(index) = value.find(AUTO_REFERER) {
        state.warn(format!("`{}` is not supported", AUTO_REFERER));
        value = &value[..index];
    }

    if !value.is_empty() {
        state.options.headers.set(header_names::REFERER, value);
    }
}

// =============================================================================
// PAYLOADS
// =============================================================================

/// `-d` family; `parse_files` enables the `@file` form
fn evaluate_data(input: &str, state: &mut ParseState, parse_files: bool, binary: bool) {
    let data = match input.strip_prefix(FILE_MARKER) {
        Some(file) if parse_files => {
            let kind = if binary {
                UploadDataType::BinaryFile
            } else {
                UploadDataType::InlineFile
            };
            UploadData::new(None, file, kind, false)
        }
        _ => UploadData::inline(input),
    };

    state.options.upload_data.push(data);
}

fn evaluate_data_urlencode(input: &str, state: &mut ParseState) {
    if input.is_empty() {
        return;
    }

    let data = if let Some((name, content)) = input.split_once(FORM_SEPARATOR) {
        UploadData::new(Some(name.to_string()), content, UploadDataType::Inline, true)
    } else if let Some((name, file)) = input.split_once(FILE_MARKER) {
        UploadData::new(Some(name.to_string()), file, UploadDataType::BinaryFile, true)
    } else {
        UploadData::new(None, input, UploadDataType::Inline, true)
    };

    state.options.upload_data.push(data);
}

fn evaluate_form(input: &str, state: &mut ParseState) {
    let Some((name, value)) = input.split_once(FORM_SEPARATOR) else {
        state.warn(format!("Unable to parse form value \"{}\"", input));
        return;
    };

    let (content, properties) = match value.find(';') {
        Some(index) if index > 0 => (&value[..index], parse_form_properties(value, state)),
        _ => (value, FormProperties::default()),
    };

    let kind = if content.starts_with(INLINE_FILE_MARKER) {
        UploadDataType::InlineFile
    } else if content.starts_with(FILE_MARKER) {
        UploadDataType::BinaryFile
    } else {
        state.options.form_data.push(FormData::inline(name, content));
        return;
    };

    state.options.form_data.push(FormData {
        name: name.to_string(),
        content: trim_property_value(&content[1..]).to_string(),
        kind,
        content_type: properties.content_type,
        file_name: properties.file_name,
    });
}

#[derive(Default)]
struct FormProperties {
    content_type: Option<String>,
    file_name: Option<String>,
}

/// `;type=..;filename=..` modifiers; the first occurrence of each wins
fn parse_form_properties(value: &str, state: &mut ParseState) -> FormProperties {
    let mut properties = FormProperties::default();

    for part in value.split(';').skip(1) {
        let pieces: Vec<&str> = part.split('=').collect();
        if pieces.len() != 2 {
            state.warn(format!("Unable to parse part of form value \"{}\"", part));
            continue;
        }

        let slot = match pieces[0].trim().to_ascii_lowercase().as_str() {
            "type" => &mut properties.content_type,
            "filename" => &mut properties.file_name,
            _ => continue,
        };
        if slot.is_none() {
            *slot = Some(trim_property_value(pieces[1]).to_string());
        }
    }

    properties
}

fn trim_property_value(value: &str) -> &str {
    value.trim_matches(|c| c == ' ' || c == '"' || c == '\'')
}

/// `-T`: a single file, a `{a,b}` list or a `name[1-10].ext` range
fn evaluate_upload_file(input: &str, state: &mut ParseState) {
    if input.is_empty() {
        return;
    }

    let max = state.max_upload_files;

    if let Some(list) = input
        .strip_prefix('{')
        .and_then(|rest| rest.strip_suffix('}'))
    {
        let files: Vec<&str> = list
            .split(',')
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .collect();
        if files.len() > max {
            state.warn(format!("Only first {} files were parsed", max));
        }
        state
            .options
            .upload_files
            .extend(files.into_iter().take(max).map(str::to_string));
        return;
    }

    if let Some(captures) = RANGE_REGEX.captures(input) {
        let (Some(whole), Some(start_digits), Some(end_digits)) =
            (captures.get(0), captures.get(1), captures.get(2))
        else {
            return;
        };
        let (Ok(start), Ok(end)) = (
            start_digits.as_str().parse::<u64>(),
            end_digits.as_str().parse::<u64>(),
        ) else {
            state.warn("Invalid upload files range".to_string());
            return;
        };

        if start >= end {
            state.warn("Invalid upload files range".to_string());
            return;
        }

        let prefix = &input[..whole.start()];
        let suffix = &input[whole.end()..];
        // Leading zeros fix the width: [01-10] gives 01, 02, ...
        let width = if start_digits.as_str().starts_with('0') {
            start_digits.as_str().len()
        } else {
            0
        };

        if end - start >= max as u64 {
            state.warn(format!("Only first {} files were parsed", max));
        }
        state.options.upload_files.extend(
            (start..=end)
                .take(max)
                .map(|n| format!("{}{:0width$}{}", prefix, n, suffix, width = width)),
        );
        return;
    }

    state.options.upload_files.push(input.to_string());
}

// =============================================================================
// CONNECTION
// =============================================================================

fn evaluate_url(input: &str, state: &mut ParseState) {
    let url = parse_absolute_url(input).or_else(|| parse_absolute_url(&format!("http://{}", input)));
    match url {
        Some(url) => state.options.url = Some(url),
        None => state.warn(format!("Unable to parse URL \"{}\"", input)),
    }
}

fn evaluate_proxy(input: &str, state: &mut ParseState) {
    // No scheme means an HTTP proxy
    let literal = if input.contains("://") {
        input.to_string()
    } else {
        format!("http://{}", input)
    };

    let Ok(mut uri) = Url::parse(&literal) else {
        state.warn("Unable to parse proxy URI".to_string());
        return;
    };
    if uri.host_str().is_none_or(str::is_empty) {
        state.warn("Unable to parse proxy URI".to_string());
        return;
    }

    if !PORT_REGEX.is_match(literal_authority(&literal)) {
        // Userinfo does not survive the rebuild; `-U` still takes precedence
        if !uri.username().is_empty() && state.options.proxy.username.is_none() {
            let proxy = &mut state.options.proxy;
            proxy.username = Some(decode_userinfo(uri.username()));
            proxy.password = Some(uri.password().map(decode_userinfo).unwrap_or_default());
        }
        let rebuilt = format!(
            "{}://{}:{}",
            uri.scheme(),
            uri.host_str().unwrap_or_default(),
            DEFAULT_PROXY_PORT
        );
        match Url::parse(&rebuilt) {
            Ok(with_port) => uri = with_port,
            Err(_) => {
                state.warn("Unable to parse proxy URI".to_string());
                return;
            }
        }
    }

    state.options.proxy.uri = Some(uri);
}

fn decode_userinfo(raw: &str) -> String {
    urlencoding::decode(raw).map_or_else(|_| raw.to_string(), |decoded| decoded.into_owned())
}

/// `host[:port]` part of a URL literal, without credentials
fn literal_authority(literal: &str) -> &str {
    let after_scheme = literal.split_once("://").map_or(literal, |(_, rest)| rest);
    let authority = after_scheme
        .split(['/', '?', '#'])
        .next()
        .unwrap_or(after_scheme);
    authority.rsplit('@').next().unwrap_or(authority)
}

fn evaluate_proxy_user(input: &str, state: &mut ParseState) {
    if input == ":" {
        state.options.proxy.use_default_credentials = true;
        return;
    }

    match input.split_once(':') {
        Some((username, password)) => {
            state.options.proxy.username = Some(username.to_string());
            state.options.proxy.password = Some(password.to_string());
        }
        None => state.warn("Unable to parse proxy credentials".to_string()),
    }
}

/// `file[:password]`; a colon at index 0 or 1 belongs to a drive letter
fn evaluate_certificate(input: &str, state: &mut ParseState) {
    if input.is_empty() {
        state.warn("Unable to parse certificate".to_string());
        return;
    }

    let certificate = &mut state.options.certificate;
    match input.rfind(':') {
        Some(index) if index > 1 => {
            certificate.file = Some(input[..index].to_string());
            certificate.password = Some(input[index + 1..].to_string());
        }
        _ => certificate.file = Some(input.to_string()),
    }
}
