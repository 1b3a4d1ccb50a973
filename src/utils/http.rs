// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use encoding_rs::{Encoding, UTF_8};
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, HeaderMap, HeaderValue};

use crate::error::{AppError, Result};
use crate::models::SessionConfig;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Bytes searched for a `<meta>` charset declaration.
const META_SNIFF_LEN: usize = 1024;

/// Create a configured HTTP client that keeps session cookies.
pub fn create_client(config: &SessionConfig) -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
    let language = HeaderValue::from_str(&config.accept_language)
        .map_err(|e| AppError::config(format!("session.accept_language: {e}")))?;
    headers.insert(ACCEPT_LANGUAGE, language);

    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .default_headers(headers)
        .cookie_store(true)
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()?;
    Ok(client)
}

/// Fetch a page, returning its final URL (after redirects) and body text.
///
/// Error statuses are not failures: the registry's error pages are
/// recognized by their content.
pub async fn fetch_text(client: &reqwest::Client, url: &str) -> Result<(String, String)> {
    let response = client.get(url).send().await?;
    read_page(response).await
}

/// Final URL and decoded body of a response.
pub async fn read_page(response: reqwest::Response) -> Result<(String, String)> {
    let final_url = response.url().to_string();
    let header_charset = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(charset_param)
        .map(str::to_string);
    let bytes = response.bytes().await?;
    Ok((final_url, decode_page(header_charset.as_deref(), &bytes)))
}

/// Decode a page body the way a browser picks its encoding.
///
/// A byte order mark wins, then the `Content-Type` charset, then a
/// `<meta>` declaration near the top of the page, then UTF-8.
pub fn decode_page(header_charset: Option<&str>, bytes: &[u8]) -> String {
    let encoding = header_charset
        .and_then(|label| Encoding::for_label(label.trim().as_bytes()))
        .or_else(|| meta_charset(bytes))
        .unwrap_or(UTF_8);

    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        log::debug!("Page had bytes invalid in {}", used.name());
    }
    text.into_owned()
}

/// `charset` parameter of a `Content-Type` value.
fn charset_param(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches(['"', '\'']))
    })
}

/// Encoding declared by `<meta charset>` or `<meta http-equiv="Content-Type">`.
fn meta_charset(bytes: &[u8]) -> Option<&'static Encoding> {
    let head = &bytes[..bytes.len().min(META_SNIFF_LEN)];
    let head = String::from_utf8_lossy(head).to_ascii_lowercase();

    head.match_indices("<meta").find_map(|(start, _)| {
        let tag = &head[start..];
        let tag = &tag[..tag.find('>').unwrap_or(tag.len())];
        let value = &tag[tag.find("charset=")? + "charset=".len()..];
        let label: String = value
            .trim_start_matches(['"', '\''])
            .chars()
            .take_while(|c| !matches!(c, '"' | '\'' | ';' | '/') && !c.is_whitespace())
            .collect();
        Encoding::for_label(label.as_bytes())
    })
}
