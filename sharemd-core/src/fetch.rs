use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, REFERER, USER_AGENT};

use crate::error::{ExportError, Result};
use crate::share_url::ShareUrl;

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/130.0.0.0 Safari/537.36";

// The share page is served to browsers only; requests without a desktop
// browser header set come back 403.
fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(REFERER, HeaderValue::from_static("https://chatgpt.com/"));
    headers
}

pub fn fetch_share_html(share_url: &ShareUrl) -> Result<String> {
    let client = Client::builder()
        .timeout(FETCH_TIMEOUT)
        .build()
        .map_err(|source| ExportError::Fetch { source })?;

    let response = client
        .get(share_url.as_str())
        .headers(default_headers())
        .send()
        .map_err(|source| ExportError::Fetch { source })?;

    if response.status() == StatusCode::FORBIDDEN {
        return Err(ExportError::ShareNotPublic);
    }

    if !response.status().is_success() {
        return Err(ExportError::FetchStatus(response.status().as_u16()));
    }

    response
        .text()
        .map_err(|source| ExportError::Fetch { source })
}
