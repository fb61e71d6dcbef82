//! C# HttpClient code generator
//!
//! Turns normalized [`CurlOptions`] into a `HttpClient` snippet. Generation
//! never fails: combinations the target API cannot express become warnings
//! and are left out of the output.
//!
//! The output has two parts:
//!
//! 1. An optional `HttpClientHandler` block for cookies, proxy, compression,
//!    client certificates and certificate validation.
//! 2. A `using` block around the client with one request block per send.

pub mod printer;
pub mod syntax;

use indexmap::IndexSet;
use tracing::debug;

use crate::models::options::header_names;
use crate::models::{CertificateType, ConvertResult, CurlOptions, FormData, KeyType, UploadData, UploadDataType};
use syntax::{ident, interpolated, invoke, new_object, number, path, string, Expr, Interpolation, Stmt};

const HANDLER: &str = "handler";
const HTTP_CLIENT: &str = "httpClient";
const REQUEST: &str = "request";
const BASE64_AUTHORIZATION: &str = "base64authorization";
const MULTIPART_CONTENT: &str = "multipartContent";
const CONTENT_LIST: &str = "contentList";
const X509_CERTIFICATE2: &str = "X509Certificate2";

const CLIENT_COMMENTS: [&str; 3] = [
    "In production code, don't destroy the HttpClient through using, but better use IHttpClientFactory factory or at least reuse an existing HttpClient instance",
    "https://docs.microsoft.com/en-us/aspnet/core/fundamentals/http-requests",
    "https://www.aspnetmonsters.com/2016/08/2016-08-27-httpclientwrong/",
];
const DECOMPRESSION_COMMENT: &str =
    "If you are using .NET Core 3.0+ you can replace `~DecompressionMethods.None` to `DecompressionMethods.All`";
const PEM_COMMENTS: [&str; 2] = [
    "PEM certificates support requires .NET 5 and higher",
    "Export to PFX is needed because of this bug https://github.com/dotnet/runtime/issues/23749#issuecomment-747407051",
];
const NEW_LINES_PATTERN: &str = r"(?:\r\n|\n|\r)";

/// Generate C# source for the given options
pub fn generate(options: &CurlOptions) -> ConvertResult<String> {
    let warnings = collect_warnings(options);
    let program = build_program(options);
    ConvertResult::success(printer::print(&program), warnings)
}

/// Statement tree for the given options
pub fn build_program(options: &CurlOptions) -> Vec<Stmt> {
    let mut program = Vec::new();

    let with_handler = should_generate_handler(options);
    if with_handler {
        program.extend(handler_statements(options));
        program.push(Stmt::Blank);
    }

    program.extend(CLIENT_COMMENTS.iter().map(|line| Stmt::comment(line)));

    let client_args = if with_handler {
        vec![ident(HANDLER)]
    } else {
        Vec::new()
    };

    let mut client_body = Vec::new();
    if let Some(seconds) = options.max_time {
        client_body.push(Stmt::assign(
            path("httpClient.Timeout"),
            invoke("TimeSpan.FromSeconds", vec![number(seconds)]),
        ));
        client_body.push(Stmt::Blank);
    }
    for (i, block) in request_blocks(options).into_iter().enumerate() {
        if i > 0 {
            client_body.push(Stmt::Blank);
        }
        client_body.push(block);
    }

    program.push(Stmt::using(
        HTTP_CLIENT,
        new_object("HttpClient", client_args),
        client_body,
    ));
    program
}

// =============================================================================
// WARNINGS
// =============================================================================

fn is_supported_proxy(options: &CurlOptions) -> bool {
    options
        .proxy
        .uri
        .as_ref()
        .is_some_and(|uri| matches!(uri.scheme(), "http" | "https"))
}

fn is_supported_certificate(kind: CertificateType) -> bool {
    matches!(kind, CertificateType::Pem | CertificateType::P12)
}

fn collect_warnings(options: &CurlOptions) -> IndexSet<String> {
    let mut warnings = IndexSet::new();

    if let Some(uri) = &options.proxy.uri {
        if !is_supported_proxy(options) {
            warnings.insert(format!("Proxy scheme \"{}\" is not supported", uri.scheme()));
        }
    }

    if options.has_certificate() {
        if !is_supported_certificate(options.certificate.kind) {
            warnings.insert(format!(
                "Certificate type \"{}\" is not supported",
                options.certificate.kind
            ));
        }
        if options.certificate.kind == CertificateType::P12 && options.has_key() {
            warnings.insert(
                "Key parameter is not supported when using a P12 certificate. The key parameter will be ignored"
                    .to_string(),
            );
        }
    }

    if options.has_key() && !options.has_certificate() {
        warnings.insert(
            "Key parameter cannot be used without a certificate. The key parameter will be ignored"
                .to_string(),
        );
    }

    if options.has_key() && options.key.kind != KeyType::Pem {
        warnings.insert(format!("Key type \"{}\" is not supported", options.key.kind));
    }

    for warning in &warnings {
        debug!(%warning, "generator warning");
    }
    warnings
}

// =============================================================================
// HANDLER
// =============================================================================

fn should_generate_handler(options: &CurlOptions) -> bool {
    options.has_cookies()
        || is_supported_proxy(options)
        || (options.has_certificate() && is_supported_certificate(options.certificate.kind))
        || options.insecure
        || options.compressed
}

fn handler_member(name: &str) -> Expr {
    ident(HANDLER).member(name)
}

fn handler_statements(options: &CurlOptions) -> Vec<Stmt> {
    let mut statements = vec![Stmt::var(HANDLER, new_object("HttpClientHandler", vec![]))];

    if options.has_cookies() {
        statements.push(Stmt::assign(handler_member("UseCookies"), Expr::Bool(false)));
    }

    if is_supported_proxy(options) {
        statements.push(Stmt::assign(handler_member("Proxy"), proxy_expression(options)));
    }

    if options.compressed {
        statements.push(Stmt::Blank);
        statements.push(Stmt::comment(DECOMPRESSION_COMMENT));
        statements.push(Stmt::assign(
            handler_member("AutomaticDecompression"),
            Expr::BitwiseNot(Box::new(path("DecompressionMethods.None"))),
        ));
    }

    if options.has_certificate() && is_supported_certificate(options.certificate.kind) {
        statements.extend(certificate_statements(options));
    }

    if options.insecure {
        let parameters = ["requestMessage", "certificate", "chain", "policyErrors"]
            .iter()
            .map(|p| p.to_string())
            .collect();
        statements.push(Stmt::assign(
            handler_member("ServerCertificateCustomValidationCallback"),
            Expr::Lambda(parameters, Box::new(Expr::Bool(true))),
        ));
    }

    statements
}

/// `new WebProxy("uri") { Credentials = ... }`
fn proxy_expression(options: &CurlOptions) -> Expr {
    let proxy = &options.proxy;
    let uri = proxy.uri.as_ref().map_or("", |uri| uri.as_str());
    let web_proxy = new_object("WebProxy", vec![string(uri)]);

    if options.has_proxy_username() {
        let credentials = new_object(
            "NetworkCredential",
            vec![
                string(proxy.username.clone().unwrap_or_default()),
                string(proxy.password.clone().unwrap_or_default()),
            ],
        );
        web_proxy.with_initializer("Credentials", credentials)
    } else if proxy.use_default_credentials {
        web_proxy.with_initializer("UseDefaultCredentials", Expr::Bool(true))
    } else {
        web_proxy
    }
}

fn certificate_statements(options: &CurlOptions) -> Vec<Stmt> {
    let certificate = &options.certificate;
    let file = string(certificate.file.clone().unwrap_or_default());
    let password = options
        .has_certificate_password()
        .then(|| string(certificate.password.clone().unwrap_or_default()));

    let mut statements = vec![Stmt::assign(
        handler_member("ClientCertificateOptions"),
        path("ClientCertificateOption.Manual"),
    )];

    let created = if certificate.kind == CertificateType::Pem {
        let method = if password.is_some() {
            "X509Certificate2.CreateFromEncryptedPemFile"
        } else {
            "X509Certificate2.CreateFromPemFile"
        };
        let mut args = vec![file];
        args.extend(password);
        if options.has_key() && options.key.kind == KeyType::Pem {
            args.push(string(options.key.file.clone().unwrap_or_default()));
        }

        statements.push(Stmt::Blank);
        statements.extend(PEM_COMMENTS.iter().map(|line| Stmt::comment(line)));

        let exported = invoke(method, args)
            .member("Export")
            .call(vec![path("X509ContentType.Pfx")]);
        new_object(X509_CERTIFICATE2, vec![exported])
    } else {
        let mut args = vec![file];
        args.extend(password);
        new_object(X509_CERTIFICATE2, args)
    };

    statements.push(Stmt::Expr(
        handler_member("ClientCertificates")
            .member("Add")
            .call(vec![created]),
    ));
    statements
}

// =============================================================================
// REQUESTS
// =============================================================================

fn request_member(name: &str) -> Expr {
    ident(REQUEST).member(name)
}

fn request_using(method: &str, url: &str, body: Vec<Stmt>) -> Stmt {
    let message = new_object(
        "HttpRequestMessage",
        vec![new_object("HttpMethod", vec![string(method)]), string(url)],
    );
    Stmt::using(REQUEST, message, body)
}

fn send_statement() -> Stmt {
    Stmt::var(
        "response",
        invoke("httpClient.SendAsync", vec![ident(REQUEST)]).await_(),
    )
}

fn try_add_header(name: &str, value: Expr) -> Stmt {
    Stmt::Expr(invoke(
        "request.Headers.TryAddWithoutValidation",
        vec![string(name), value],
    ))
}

/// Headers, then user agent and cookie, then basic authorization
fn header_statements(options: &CurlOptions) -> Vec<Stmt> {
    let mut statements: Vec<Stmt> = options
        .headers
        .iter()
        .filter(|(name, _)| !name.eq_ignore_ascii_case(header_names::CONTENT_TYPE))
        .map(|(name, value)| try_add_header(name, string(value)))
        .collect();

    if let Some(user_agent) = &options.user_agent {
        statements.push(try_add_header(header_names::USER_AGENT, string(user_agent.as_str())));
    }
    if let Some(cookie) = options.cookie.as_deref().filter(|_| options.has_cookies()) {
        statements.push(try_add_header(header_names::COOKIE, string(cookie)));
    }
    if !statements.is_empty() {
        statements.push(Stmt::Blank);
    }

    if let Some(user_password) = options.user_password.as_deref().filter(|_| options.has_user_password()) {
        statements.push(Stmt::var(
            BASE64_AUTHORIZATION,
            invoke(
                "Convert.ToBase64String",
                vec![invoke("Encoding.ASCII.GetBytes", vec![string(user_password)])],
            ),
        ));
        statements.push(try_add_header(
            header_names::AUTHORIZATION,
            interpolated(vec![
                Interpolation::Text("Basic ".to_string()),
                Interpolation::Hole(ident(BASE64_AUTHORIZATION)),
            ]),
        ));
        statements.push(Stmt::Blank);
    }

    statements
}

fn content_type_statement(content_type: &str) -> Stmt {
    Stmt::assign(
        request_member("Content").member("Headers").member("ContentType"),
        invoke("MediaTypeHeaderValue.Parse", vec![string(content_type)]),
    )
}

fn request_blocks(options: &CurlOptions) -> Vec<Stmt> {
    let method = options.method();
    let url = options
        .full_url()
        .map(|url| url.to_string())
        .unwrap_or_default();
    let common = header_statements(options);
    let content_type = options.headers.get(header_names::CONTENT_TYPE);

    if options.has_data_payload() && !options.force_get {
        debug!(items = options.upload_data.len(), "string content body");
        let mut body = common;
        body.extend(string_content_statements(&options.upload_data, content_type));
        body.push(Stmt::Blank);
        body.push(send_statement());
        return vec![request_using(method, &url, body)];
    }

    if options.has_form_payload() {
        debug!(parts = options.form_data.len(), "multipart body");
        let mut body = common;
        body.extend(multipart_statements(&options.form_data));
        body.push(Stmt::Blank);
        body.push(send_statement());
        return vec![request_using(method, &url, body)];
    }

    if options.has_file_payload() {
        debug!(files = options.upload_files.len(), "one request per uploaded file");
        return options
            .upload_files
            .iter()
            .map(|file| {
                let target = options
                    .url_for_file_upload(file)
                    .map(|url| url.to_string())
                    .unwrap_or_else(|| url.clone());
                let mut body = common.clone();
                body.push(Stmt::assign(request_member("Content"), byte_array_content(file)));
                if let Some(content_type) = content_type {
                    body.push(content_type_statement(content_type));
                }
                body.push(Stmt::Blank);
                body.push(send_statement());
                request_using(method, &target, body)
            })
            .collect();
    }

    let mut body = common;
    if let Some((major, minor)) = options.http_version.numbers() {
        debug!(major, minor, "explicit HTTP version");
        body.push(Stmt::assign(
            request_member("Version"),
            new_object("Version", vec![number(major), number(minor)]),
        ));
    }
    body.push(send_statement());
    vec![request_using(method, &url, body)]
}

fn read_all_text(file: &str) -> Expr {
    invoke("File.ReadAllText", vec![string(file)])
}

/// `new ByteArrayContent(File.ReadAllBytes("file"))`
fn byte_array_content(file: &str) -> Expr {
    new_object(
        "ByteArrayContent",
        vec![invoke("File.ReadAllBytes", vec![string(file)])],
    )
}

fn upload_data_expression(data: &UploadData) -> Expr {
    if data.url_encoded {
        let source = if data.is_file() {
            read_all_text(&data.content)
        } else {
            string(data.content.as_str())
        };
        let escaped = invoke("Uri.EscapeDataString", vec![source]);

        return match &data.name {
            Some(name) => interpolated(vec![
                Interpolation::Text(format!("{}=", name)),
                Interpolation::Hole(escaped),
            ]),
            None => escaped,
        };
    }

    match data.kind {
        UploadDataType::BinaryFile => read_all_text(&data.content),
        UploadDataType::InlineFile => invoke(
            "Regex.Replace",
            vec![
                read_all_text(&data.content),
                string(NEW_LINES_PATTERN),
                path("string.Empty"),
            ],
        ),
        UploadDataType::Inline => string(data.content.as_str()),
    }
}

fn string_content_statements(items: &[UploadData], content_type: Option<&str>) -> Vec<Stmt> {
    let mut expressions: Vec<Expr> = items.iter().map(upload_data_expression).collect();
    let mut statements = Vec::new();

    let content = if expressions.len() > 1 {
        statements.push(Stmt::var(CONTENT_LIST, new_object("List<string>", vec![])));
        statements.extend(expressions.drain(..).map(|expression| {
            Stmt::Expr(ident(CONTENT_LIST).member("Add").call(vec![expression]))
        }));
        invoke("string.Join", vec![string("&"), ident(CONTENT_LIST)])
    } else {
        expressions.pop().unwrap_or_else(|| string(""))
    };

    statements.push(Stmt::assign(
        request_member("Content"),
        new_object("StringContent", vec![content]),
    ));
    if let Some(content_type) = content_type {
        statements.push(content_type_statement(content_type));
    }
    statements
}

fn multipart_statements(parts: &[FormData]) -> Vec<Stmt> {
    let mut statements = vec![Stmt::var(
        MULTIPART_CONTENT,
        new_object("MultipartFormDataContent", vec![]),
    )];
    let add = |args: Vec<Expr>| Stmt::Expr(ident(MULTIPART_CONTENT).member("Add").call(args));
    let mut file_counter = 0;

    for part in parts {
        match part.kind {
            UploadDataType::Inline => statements.push(add(vec![
                new_object("StringContent", vec![string(part.content.as_str())]),
                string(part.name.as_str()),
            ])),
            UploadDataType::InlineFile => statements.push(add(vec![
                new_object("StringContent", vec![read_all_text(&part.content)]),
                string(part.name.as_str()),
            ])),
            UploadDataType::BinaryFile => {
                let file_name_arg = match part.file_name.as_deref().filter(|f| !f.is_empty()) {
                    Some(file_name) => string(file_name),
                    None => invoke("Path.GetFileName", vec![string(part.content.as_str())]),
                };

                let content = match part.content_type.as_deref().filter(|t| !t.is_empty()) {
                    Some(content_type) => {
                        file_counter += 1;
                        let variable = format!("file{}", file_counter);
                        statements.push(Stmt::var(&variable, byte_array_content(&part.content)));
                        statements.push(Stmt::Expr(invoke(
                            &format!("{}.Headers.Add", variable),
                            vec![string(header_names::CONTENT_TYPE), string(content_type)],
                        )));
                        ident(&variable)
                    }
                    None => byte_array_content(&part.content),
                };

                statements.push(add(vec![content, string(part.name.as_str()), file_name_arg]));
            }
        }
    }

    statements.push(Stmt::assign(request_member("Content"), ident(MULTIPART_CONTENT)));
    statements
}
