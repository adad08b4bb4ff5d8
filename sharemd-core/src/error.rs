use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("invalid share url: {0}")]
    InvalidShareUrl(String),

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("unsupported host: {0}")]
    UnsupportedHost(String),

    #[error("invalid share path: {0}")]
    InvalidSharePath(String),

    #[error("share link is not accessible (HTTP 403); confirm this is a public chatgpt.com/share link")]
    ShareNotPublic,

    #[error("failed to fetch share url (HTTP {0})")]
    FetchStatus(u16),

    #[error("failed to fetch share url: {source}")]
    Fetch {
        #[source]
        source: reqwest::Error,
    },

    #[error("{0} share payload not found")]
    PayloadNotFound(&'static str),

    #[error("conversation data not found in {0} payload")]
    PayloadShape(&'static str),

    #[error("modern parse failed: {modern}; legacy parse failed: {legacy}")]
    ParseFailed { modern: String, legacy: String },

    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ExportError>;
