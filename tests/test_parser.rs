//! curl command parsing through the library API

use curlsharp::models::{CertificateType, HttpVersion, UploadDataType};
use curlsharp::parser::URL_ERROR;
use curlsharp::{parse, CurlOptions, Parser, ParsingOptions};

fn options(command: &str) -> CurlOptions {
    let result = parse(command);
    assert!(result.is_success(), "errors: {:?}", result.errors);
    result.data.expect("parsed options")
}

// ============================================================================
// Basic Requests
// ============================================================================

#[test]
fn test_simple_get() {
    let options = options("curl https://example.com");

    assert_eq!(options.method(), "GET");
    assert_eq!(options.url.as_ref().map(|u| u.as_str()), Some("https://example.com/"));
    assert!(options.upload_data.is_empty());
    assert!(options.form_data.is_empty());
    assert!(options.headers.is_empty());
}

#[test]
fn test_post_json_body() {
    let options = options(r#"curl -X POST -d '{"a":1}' https://example.com"#);

    assert_eq!(options.method(), "POST");
    assert_eq!(options.upload_data.len(), 1);
    assert_eq!(options.upload_data[0].content, r#"{"a":1}"#);
    assert_eq!(
        options.headers.get("Content-Type"),
        Some("application/x-www-form-urlencoded")
    );
}

#[test]
fn test_method_is_taken_verbatim() {
    assert_eq!(options("curl -X purge http://x.com").method(), "purge");
    assert_eq!(options("curl --request PATCH http://x.com").method(), "PATCH");
}

#[test]
fn test_windows_style_double_quotes() {
    let options = options(r#"curl "http://x.com/a" -H "Accept: */*" -d "{\"k\":\"v\"}""#);

    assert_eq!(options.headers.get("Accept"), Some("*/*"));
    assert_eq!(options.upload_data[0].content, r#"{"k":"v"}"#);
}

#[test]
fn test_single_quote_reopening() {
    let options = options(r#"curl -d 'it'\''s' http://x.com"#);
    assert_eq!(options.upload_data[0].content, "it's");
}

#[test]
fn test_multiline_with_prompt() {
    let options = options("$ curl 'https://api.example.com/v1/items' \\\n  -H 'Accept: application/json' \\\n  --compressed");

    assert_eq!(options.url.unwrap().path(), "/v1/items");
    assert!(options.compressed);
    assert_eq!(options.headers.get("accept"), Some("application/json"));
}

// ============================================================================
// Headers
// ============================================================================

#[test]
fn test_header_key_and_value_trimmed() {
    let options = options("curl -H '  X-Trace :  abc ' http://x.com");
    assert_eq!(options.headers.get("X-Trace"), Some("abc"));
}

#[test]
fn test_header_without_key_warns() {
    let result = parse("curl -H ': value' http://x.com");

    assert!(result.is_success());
    assert!(result.warnings.contains("Unable to parse header \": value\""));
    assert!(result.data.unwrap().headers.is_empty());
}

#[test]
fn test_cookie_header_routes_to_cookie_field() {
    let options = options("curl -H 'cookie: a=1' http://x.com");

    assert_eq!(options.cookie.as_deref(), Some("a=1"));
    assert!(!options.headers.contains("Cookie"));
}

#[test]
fn test_cookie_user_agent_referer_flags() {
    let options = options("curl -b 'x=y' -A 'agent/1.0' -e 'http://ref.com/;auto' http://x.com");

    assert_eq!(options.cookie.as_deref(), Some("x=y"));
    assert_eq!(options.user_agent.as_deref(), Some("agent/1.0"));
    assert_eq!(options.headers.get("Referer"), Some("http://ref.com/"));
}

#[test]
fn test_json_and_bearer_shortcuts() {
    let options = options(r#"curl --json '{"a":1}' --oauth2-bearer tok http://x.com"#);

    assert_eq!(options.method(), "POST");
    assert_eq!(options.headers.get("Content-Type"), Some("application/json"));
    assert_eq!(options.headers.get("Accept"), Some("application/json"));
    assert_eq!(options.headers.get("Authorization"), Some("Bearer tok"));
}

// ============================================================================
// Data
// ============================================================================

#[test]
fn test_data_family_file_markers() {
    let options = options("curl -d @a.txt --data-binary @b.bin --data-raw @c http://x.com");

    let kinds: Vec<_> = options.upload_data.iter().map(|d| d.kind).collect();
    assert_eq!(
        kinds,
        vec![
            UploadDataType::InlineFile,
            UploadDataType::BinaryFile,
            UploadDataType::Inline
        ]
    );
    assert_eq!(options.upload_data[2].content, "@c");
}

#[test]
fn test_data_urlencode_forms() {
    let options = options(
        "curl --data-urlencode 'a=b c' --data-urlencode 'n@f.txt' --data-urlencode '=v' --data-urlencode '@g.txt' --data-urlencode plain http://x.com",
    );
    let data = &options.upload_data;

    assert!(data.iter().all(|d| d.url_encoded));
    assert_eq!((data[0].name.as_deref(), data[0].content.as_str()), (Some("a"), "b c"));
    assert_eq!((data[1].name.as_deref(), data[1].kind), (Some("n"), UploadDataType::BinaryFile));
    assert_eq!((data[2].name.as_deref(), data[2].content.as_str()), (None, "v"));
    assert_eq!((data[3].name.as_deref(), data[3].kind), (None, UploadDataType::BinaryFile));
    assert_eq!((data[4].name.as_deref(), data[4].content.as_str()), (None, "plain"));
}

#[test]
fn test_force_get_query() {
    let options = options("curl -G -d a=1 --data-urlencode 'b=c d' http://x.com/p?z=0");

    assert_eq!(options.method(), "GET");
    assert_eq!(
        options.full_url().unwrap().as_str(),
        "http://x.com/p?z=0&a=1&b=c%20d"
    );
}

// ============================================================================
// Forms and Upload Files
// ============================================================================

#[test]
fn test_form_items() {
    let options = options(
        r#"curl -F name=John -F 'story=<story.txt' -F 'pic=@a.png;type=image/png;filename="me.png"' http://x.com"#,
    );
    let form = &options.form_data;

    assert_eq!(form.len(), 3);
    assert_eq!(form[0].kind, UploadDataType::Inline);
    assert_eq!(form[1].kind, UploadDataType::InlineFile);
    assert_eq!(form[1].content, "story.txt");
    assert_eq!(form[2].kind, UploadDataType::BinaryFile);
    assert_eq!(form[2].content_type.as_deref(), Some("image/png"));
    assert_eq!(form[2].file_name.as_deref(), Some("me.png"));
}

#[test]
fn test_upload_file_range_and_list() {
    let options = options(r#"curl -T "img[1-3].png" http://x"#);
    assert_eq!(options.upload_files, vec!["img1.png", "img2.png", "img3.png"]);

    let options = self::options(r#"curl --upload-file "{file1,file2}" http://x"#);
    assert_eq!(options.upload_files, vec!["file1", "file2"]);
    assert_eq!(options.method(), "PUT");
}

#[test]
fn test_invalid_upload_range_warns() {
    let result = parse("curl -T 'f[5-1]' http://x.com");

    assert!(result.warnings.contains("Invalid upload files range"));
    assert!(result.data.unwrap().upload_files.is_empty());
}

#[test]
fn test_huge_upload_range_is_capped() {
    let result = parse("curl -T 'f[0-18446744073709551615]' http://x.com");

    assert!(result.warnings.contains("Only first 10 files were parsed"));
    assert_eq!(result.data.unwrap().upload_files.len(), 10);
}

#[test]
fn test_empty_upload_and_urlencode_values_ignored() {
    let options = options("curl -T '' --data-urlencode '' http://x.com");

    assert!(options.upload_files.is_empty());
    assert!(options.upload_data.is_empty());
    assert_eq!(options.method(), "GET");
    assert!(!options.headers.contains("Content-Type"));
}

#[test]
fn test_upload_cap_from_settings() {
    let parser = Parser::new(ParsingOptions { max_upload_files: 3 });
    let result = parser.parse("curl -T '{a,b,c,d,e}' http://x.com");

    assert_eq!(result.data.unwrap().upload_files, vec!["a", "b", "c"]);
    assert!(result.warnings.contains("Only first 3 files were parsed"));
}

// ============================================================================
// Proxy, Certificates, Flags
// ============================================================================

#[test]
fn test_proxy_port_handling() {
    let options = options("curl -x 123.0.4.3:1234 http://x.com");
    assert_eq!(options.proxy.uri.unwrap().as_str(), "http://123.0.4.3:1234/");

    let options = self::options("curl -x localhost http://x.com");
    assert_eq!(options.proxy.uri.unwrap().as_str(), "http://localhost:1080/");
}

#[test]
fn test_proxy_userinfo_kept_as_credentials() {
    let options = options("curl -x http://u:p@proxy http://x.com");
    assert_eq!(options.proxy.uri.unwrap().as_str(), "http://proxy:1080/");
    assert_eq!(options.proxy.username.as_deref(), Some("u"));
    assert_eq!(options.proxy.password.as_deref(), Some("p"));

    let options = self::options("curl -U me:pw -x http://u:p@proxy http://x.com");
    assert_eq!(options.proxy.username.as_deref(), Some("me"));
    assert_eq!(options.proxy.password.as_deref(), Some("pw"));
}

#[test]
fn test_proxy_user() {
    let options = options("curl -x p.local:3128 -U me:secret http://x.com");
    assert_eq!(options.proxy.username.as_deref(), Some("me"));
    assert_eq!(options.proxy.password.as_deref(), Some("secret"));

    let options = self::options("curl -x p.local -U : http://x.com");
    assert!(options.proxy.use_default_credentials);

    let result = parse("curl -x p.local -U nobody http://x.com");
    assert!(result.warnings.contains("Unable to parse proxy credentials"));
}

#[test]
fn test_certificate_drive_letter() {
    let options = options(r#"curl -E 'D:\\cert.p12:123' --cert-type p12 http://x.com"#);
    assert_eq!(options.certificate.file.as_deref(), Some(r"D:\cert.p12"));
    assert_eq!(options.certificate.password.as_deref(), Some("123"));
    assert_eq!(options.certificate.kind, CertificateType::P12);

    let options = self::options(r#"curl --cert 'D:\\cert.p12' http://x.com"#);
    assert_eq!(options.certificate.file.as_deref(), Some(r"D:\cert.p12"));
    assert!(options.certificate.password.is_none());
}

#[test]
fn test_unknown_cert_type_defaults_to_pem() {
    let result = parse("curl --cert c.pem --cert-type XYZ http://x.com");

    assert!(result
        .warnings
        .contains("Unable to parse certificate type XYZ, PEM type will be used"));
    assert_eq!(result.data.unwrap().certificate.kind, CertificateType::Pem);
}

#[test]
fn test_boolean_flags_at_end_of_input() {
    let cases: [(&str, fn(&CurlOptions) -> bool); 5] = [
        ("-k", |o| o.insecure),
        ("--compressed", |o| o.compressed),
        ("-G", |o| o.force_get),
        ("--http2", |o| o.http_version == HttpVersion::Http20),
        ("-I", |o| o.method() == "HEAD"),
    ];
    for (flag, check) in cases {
        let result = parse(&format!("curl http://x.com {}", flag));
        assert!(result.warnings.is_empty(), "{}: {:?}", flag, result.warnings);
        assert!(check(&result.data.unwrap()), "{}", flag);
    }
}

#[test]
fn test_max_time() {
    assert_eq!(options("curl -m 2.5 http://x.com").max_time, Some(2.5));

    let result = parse("curl --max-time soon http://x.com");
    assert!(result.warnings.contains("Unable to parse timeout \"soon\""));
}

// ============================================================================
// Errors and Warnings
// ============================================================================

#[test]
fn test_unsupported_flag_single_warning() {
    let result = parse("curl -O https://example.com");

    assert!(result.is_success());
    assert_eq!(result.warnings.len(), 1);
    assert!(result.warnings.contains("Parameter \"-O\" is not supported"));
}

#[test]
fn test_unresolvable_host_is_single_error() {
    let result = parse("curl -H 'A: b' ya...");

    assert!(!result.is_success());
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors.contains(URL_ERROR));
}

#[test]
fn test_url_without_scheme_recovered() {
    let options = options("curl -d a=b example.org/path");
    assert_eq!(options.url.unwrap().as_str(), "http://example.org/path");
}
