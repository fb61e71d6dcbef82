//! The parsed curl invocation
//!
//! [`CurlOptions`] is filled in flag by flag while the parser walks the
//! command line and is handed to the code generator once normalization has
//! run. Apart from a few derived predicates it carries no behavior.
//!
//! # Why IndexMap?
//!
//! Header order is user-visible in the generated code, so headers keep the
//! order in which they first appeared on the command line.

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;
use url::Url;

// =============================================================================
// CONSTANTS
// =============================================================================

pub mod header_names {
    pub const ACCEPT: &str = "Accept";
    pub const AUTHORIZATION: &str = "Authorization";
    pub const CONTENT_TYPE: &str = "Content-Type";
    pub const COOKIE: &str = "Cookie";
    pub const REFERER: &str = "Referer";
    pub const USER_AGENT: &str = "User-Agent";
}

pub mod methods {
    pub const GET: &str = "GET";
    pub const HEAD: &str = "HEAD";
    pub const POST: &str = "POST";
    pub const PUT: &str = "PUT";
}

/// Content type curl sends with `-d` when none was given explicitly
pub const CONTENT_TYPE_WWW_FORM: &str = "application/x-www-form-urlencoded";

// =============================================================================
// PAYLOAD TYPES
// =============================================================================

/// Where the content of a payload entry comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum UploadDataType {
    /// Literal text taken from the command line
    Inline,
    /// File read verbatim
    BinaryFile,
    /// File read as text with line breaks removed
    InlineFile,
}

impl UploadDataType {
    pub fn is_file(self) -> bool {
        matches!(self, UploadDataType::BinaryFile | UploadDataType::InlineFile)
    }
}

/// One `-d`/`--data*` fragment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadData {
    pub name: Option<String>,
    pub content: String,
    pub kind: UploadDataType,
    pub url_encoded: bool,
}

impl UploadData {
    pub fn inline(content: impl Into<String>) -> Self {
        Self::new(None, content, UploadDataType::Inline, false)
    }

    pub fn new(
        name: Option<String>,
        content: impl Into<String>,
        kind: UploadDataType,
        url_encoded: bool,
    ) -> Self {
        Self {
            name: name.filter(|n| !n.trim().is_empty()),
            content: content.into(),
            kind,
            url_encoded,
        }
    }

    pub fn is_file(&self) -> bool {
        self.kind.is_file()
    }

    /// Render as a query string parameter for `-G`
    ///
    /// URL-encoded entries are percent-encoded; the query is fixed when the
    /// code is generated.
    pub fn to_query_parameter(&self) -> String {
        let content = if self.url_encoded {
            urlencoding::encode(&self.content).into_owned()
        } else {
            self.content.clone()
        };

        match &self.name {
            Some(name) => format!("{}={}", name, content),
            None => content,
        }
    }
}

/// One `-F`/`--form` multipart field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormData {
    pub name: String,
    pub content: String,
    pub kind: UploadDataType,
    pub content_type: Option<String>,
    pub file_name: Option<String>,
}

impl FormData {
    pub fn inline(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            kind: UploadDataType::Inline,
            content_type: None,
            file_name: None,
        }
    }
}

// =============================================================================
// TLS / PROTOCOL ENUMS
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CertificateType {
    #[default]
    Pem,
    Der,
    Eng,
    P12,
}

impl CertificateType {
    /// Case-insensitive parse of a `--cert-type` value
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_uppercase().as_str() {
            "PEM" => Some(CertificateType::Pem),
            "DER" => Some(CertificateType::Der),
            "ENG" => Some(CertificateType::Eng),
            "P12" => Some(CertificateType::P12),
            _ => None,
        }
    }
}

impl fmt::Display for CertificateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CertificateType::Pem => "PEM",
            CertificateType::Der => "DER",
            CertificateType::Eng => "ENG",
            CertificateType::P12 => "P12",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum KeyType {
    #[default]
    Pem,
    Der,
    Eng,
}

impl KeyType {
    /// Case-insensitive parse of a `--key-type` value
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_uppercase().as_str() {
            "PEM" => Some(KeyType::Pem),
            "DER" => Some(KeyType::Der),
            "ENG" => Some(KeyType::Eng),
            _ => None,
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            KeyType::Pem => "PEM",
            KeyType::Der => "DER",
            KeyType::Eng => "ENG",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum HttpVersion {
    #[default]
    #[serde(rename = "default")]
    Default,
    #[serde(rename = "0.9")]
    Http09,
    #[serde(rename = "1.0")]
    Http10,
    #[serde(rename = "1.1")]
    Http11,
    #[serde(rename = "2.0")]
    Http20,
    #[serde(rename = "3.0")]
    Http30,
}

impl HttpVersion {
    /// `(major, minor)` for an explicit version
    pub fn numbers(self) -> Option<(u8, u8)> {
        match self {
            HttpVersion::Default => None,
            HttpVersion::Http09 => Some((0, 9)),
            HttpVersion::Http10 => Some((1, 0)),
            HttpVersion::Http11 => Some((1, 1)),
            HttpVersion::Http20 => Some((2, 0)),
            HttpVersion::Http30 => Some((3, 0)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Certificate {
    pub file: Option<String>,
    pub password: Option<String>,
    #[serde(rename = "type")]
    pub kind: CertificateType,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Key {
    pub file: Option<String>,
    #[serde(rename = "type")]
    pub kind: KeyType,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Proxy {
    pub uri: Option<Url>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub use_default_credentials: bool,
}

// =============================================================================
// HEADERS
// =============================================================================

/// Ordered header map with case-insensitive names
///
/// The spelling of the first occurrence is kept; later writes only replace
/// the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: IndexMap<String, (String, String)>,
}

impl Headers {
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.entries.get_mut(&name.to_ascii_lowercase()) {
            Some(entry) => entry.1 = value,
            None => {
                self.entries
                    .insert(name.to_ascii_lowercase(), (name.to_string(), value));
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&name.to_ascii_lowercase())
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&name.to_ascii_lowercase())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `(name, value)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .values()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

impl Serialize for Headers {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

// =============================================================================
// OPTIONS
// =============================================================================

/// Semantic model of one curl invocation
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CurlOptions {
    /// `None` until set by `-X`/`-I` or inferred during normalization
    pub method: Option<String>,
    pub url: Option<Url>,
    pub headers: Headers,
    pub cookie: Option<String>,
    pub user_agent: Option<String>,
    pub upload_data: Vec<UploadData>,
    pub form_data: Vec<FormData>,
    pub upload_files: Vec<String>,
    pub certificate: Certificate,
    pub key: Key,
    pub proxy: Proxy,
    pub user_password: Option<String>,
    pub force_get: bool,
    pub insecure: bool,
    pub compressed: bool,
    pub http_version: HttpVersion,
    /// Seconds, from `-m`/`--max-time`
    pub max_time: Option<f64>,
}

impl CurlOptions {
    pub fn method(&self) -> &str {
        self.method.as_deref().unwrap_or(methods::GET)
    }

    pub fn has_data_payload(&self) -> bool {
        !self.upload_data.is_empty()
    }

    pub fn has_form_payload(&self) -> bool {
        !self.form_data.is_empty()
    }

    pub fn has_file_payload(&self) -> bool {
        !self.upload_files.is_empty()
    }

    pub fn has_cookies(&self) -> bool {
        self.cookie.as_deref().is_some_and(|c| !c.trim().is_empty())
    }

    pub fn has_proxy(&self) -> bool {
        self.proxy.uri.is_some()
    }

    pub fn has_proxy_username(&self) -> bool {
        self.proxy.username.as_deref().is_some_and(|u| !u.is_empty())
    }

    pub fn has_certificate(&self) -> bool {
        self.certificate.file.as_deref().is_some_and(|f| !f.is_empty())
    }

    pub fn has_certificate_password(&self) -> bool {
        self.certificate.password.as_deref().is_some_and(|p| !p.is_empty())
    }

    pub fn has_key(&self) -> bool {
        self.key.file.as_deref().is_some_and(|f| !f.is_empty())
    }

    pub fn has_user_password(&self) -> bool {
        self.user_password.as_deref().is_some_and(|u| !u.is_empty())
    }

    pub fn http_version_specified(&self) -> bool {
        self.http_version != HttpVersion::Default
    }

    /// URL the request is sent to
    ///
    /// With `-G` the data entries become the query string; it is appended
    /// to whatever query the URL already had.
    pub fn full_url(&self) -> Option<Url> {
        let mut url = self.url.clone()?;
        if !self.force_get || self.upload_data.is_empty() {
            return Some(url);
        }

        let data_query = self
            .upload_data
            .iter()
            .map(UploadData::to_query_parameter)
            .collect::<Vec<_>>()
            .join("&");

        let query = match url.query() {
            Some(existing) if !existing.is_empty() => format!("{}&{}", existing, data_query),
            _ => data_query,
        };
        url.set_query(Some(&query));

        Some(url)
    }

    /// Target URL for one `-T` file
    ///
    /// When the URL path ends with `/` the file name is appended, the way
    /// curl does.
    pub fn url_for_file_upload(&self, file: &str) -> Option<Url> {
        let url = self.url.as_ref()?;
        if !url.path().ends_with('/') {
            return Some(url.clone());
        }

        url.join(file_name(file)).ok().or_else(|| Some(url.clone()))
    }
}

/// Last path component, accepting both `/` and `\` separators
pub fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options_with_url(url: &str) -> CurlOptions {
        CurlOptions {
            url: Some(Url::parse(url).unwrap()),
            ..CurlOptions::default()
        }
    }

    #[test]
    fn test_headers_case_insensitive_last_write_wins() {
        let mut headers = Headers::default();
        headers.set("Content-Type", "text/plain");
        headers.set("content-type", "application/json");
        headers.set("Accept", "*/*");

        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get("CONTENT-TYPE"), Some("application/json"));
        let names: Vec<_> = headers.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["Content-Type", "Accept"]);
    }

    #[test]
    fn test_full_url_without_force_get() {
        let mut options = options_with_url("https://example.com/a?x=1");
        options.upload_data.push(UploadData::inline("b=2"));

        assert_eq!(options.full_url().unwrap().as_str(), "https://example.com/a?x=1");
    }

    #[test]
    fn test_full_url_force_get_appends_query() {
        let mut options = options_with_url("https://example.com:443/a?x=1");
        options.force_get = true;
        options.upload_data.push(UploadData::inline("b=2"));
        options.upload_data.push(UploadData::new(
            Some("q".to_string()),
            "a b&c",
            UploadDataType::Inline,
            true,
        ));

        assert_eq!(
            options.full_url().unwrap().as_str(),
            "https://example.com/a?x=1&b=2&q=a%20b%26c"
        );
    }

    #[test]
    fn test_url_for_file_upload() {
        let options = options_with_url("http://example.com/upload/");
        assert_eq!(
            options.url_for_file_upload("dir/img1.png").unwrap().as_str(),
            "http://example.com/upload/img1.png"
        );

        let options = options_with_url("http://example.com/upload");
        assert_eq!(
            options.url_for_file_upload("img1.png").unwrap().as_str(),
            "http://example.com/upload"
        );
    }

    #[test]
    fn test_file_name() {
        assert_eq!(file_name("D:\\files\\a.txt"), "a.txt");
        assert_eq!(file_name("/tmp/b.txt"), "b.txt");
        assert_eq!(file_name("c.txt"), "c.txt");
    }

    #[test]
    fn test_certificate_type_parse() {
        assert_eq!(CertificateType::parse("p12"), Some(CertificateType::P12));
        assert_eq!(CertificateType::parse("Pem"), Some(CertificateType::Pem));
        assert_eq!(CertificateType::parse("pfx"), None);
        assert_eq!(KeyType::parse("der"), Some(KeyType::Der));
    }
}
