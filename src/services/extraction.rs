//! Fetching a web page and reducing it to its visible body text.

use scraper::{ElementRef, Html, Node};

use crate::error::AppError;

/// Some sites refuse requests without a browser-like agent.
const USER_AGENT: &str = "Mozilla/5.0 (compatible; FaqGateway/0.1)";

/// Bytes of a page read before the rest is dropped. Generation only uses
/// the first few thousand characters of text.
pub const MAX_PAGE_BYTES: usize = 2 * 1024 * 1024;

/// Elements whose text is never shown to a reader.
const HIDDEN_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

/// Validate a user-supplied page URL.
///
/// # Rules
///
/// - Must be a valid absolute URL
/// - Must use HTTP or HTTPS
pub fn validate_page_url(raw: &str) -> Result<url::Url, AppError> {
    let parsed = url::Url::parse(raw.trim())
        .map_err(|_| AppError::InvalidRequest("Invalid URL format".to_string()))?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        _ => Err(AppError::InvalidRequest(
            "URL must use HTTP or HTTPS".to_string(),
        )),
    }
}

/// Text content of the document's `<body>`, whitespace collapsed.
pub fn extract_body_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let root = document.root_element();

    // html5ever always synthesizes a <body>; the fallback only covers fragments
    let body = root
        .children()
        .filter_map(ElementRef::wrap)
        .find(|element| element.value().name() == "body")
        .unwrap_or(root);

    let pieces = body.descendants().filter_map(|node| match node.value() {
        Node::Text(text) => {
            let hidden = node
                .parent()
                .and_then(|parent| parent.value().as_element().map(|e| e.name()))
                .is_some_and(|name| HIDDEN_ELEMENTS.contains(&name));
            (!hidden).then_some(&**text)
        }
        _ => None,
    });

    pieces
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Download `url` and return its body text.
///
/// # Errors
///
/// - `InvalidRequest`: The URL is malformed or not HTTP(S)
/// - `Extraction`: The request failed or the server answered with a non-2xx status
pub async fn fetch_page_text(http: &reqwest::Client, raw_url: &str) -> Result<String, AppError> {
    let url = validate_page_url(raw_url)?;

    let response = http
        .get(url.clone())
        .header("User-Agent", USER_AGENT)
        .send()
        .await
        .map_err(|e| AppError::Extraction(format!("request to {} failed: {}", url, e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(AppError::Extraction(format!("{} answered {}", url, status)));
    }

    let html = read_body_limited(response, MAX_PAGE_BYTES)
        .await
        .map_err(|e| AppError::Extraction(format!("reading {} failed: {}", url, e)))?;

    let text = extract_body_text(&html);
    tracing::info!(%url, chars = text.chars().count(), "page text extracted");

    Ok(text)
}

/// Read at most `max_bytes` of the body chunk by chunk and stop there.
///
/// A cut inside a multi-byte character or a tag is harmless: invalid UTF-8
/// is replaced and the HTML parser closes what is left open.
async fn read_body_limited(
    mut response: reqwest::Response,
    max_bytes: usize,
) -> Result<String, reqwest::Error> {
    if let Some(len) = response.content_length().filter(|&len| len > max_bytes as u64) {
        tracing::debug!(url = %response.url(), len, max_bytes, "page larger than read limit");
    }

    let mut body = Vec::with_capacity(
        response
            .content_length()
            .map_or(8 * 1024, |len| len as usize)
            .min(max_bytes),
    );

    while let Some(chunk) = response.chunk().await? {
        let room = max_bytes - body.len();
        if chunk.len() >= room {
            body.extend_from_slice(&chunk[..room]);
            break;
        }
        body.extend_from_slice(&chunk);
    }

    Ok(String::from_utf8_lossy(&body).into_owned())
}
