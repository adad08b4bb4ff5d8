use std::str::FromStr;

use url::Url;

use crate::error::{ExportError, Result};

// A validated chatgpt.com share link: absolute http(s) URL on
// chatgpt.com with a /share/... path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareUrl {
    url: Url,
    share_id: String,
}

impl ShareUrl {
    pub fn parse(input: &str) -> Result<Self> {
        input.parse()
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    pub fn share_id(&self) -> &str {
        &self.share_id
    }
}

impl FromStr for ShareUrl {
    type Err = ExportError;

    fn from_str(input: &str) -> Result<Self> {
        let url =
            Url::parse(input).map_err(|_| ExportError::InvalidShareUrl(input.to_string()))?;

        match url.scheme() {
            "http" | "https" => {}
            scheme => return Err(ExportError::UnsupportedScheme(scheme.to_string())),
        }

        match url.host_str() {
            Some("chatgpt.com" | "www.chatgpt.com") => {}
            host => {
                return Err(ExportError::UnsupportedHost(
                    host.unwrap_or_default().to_string(),
                ));
            }
        }

        if !url.path().starts_with("/share/") {
            return Err(ExportError::InvalidSharePath(url.path().to_string()));
        }

        let mut segments = url.path().split('/').filter(|segment| !segment.is_empty());
        let share_id = match (segments.next(), segments.next()) {
            (Some("share"), Some(id)) => id.to_string(),
            _ => "shared".to_string(),
        };

        Ok(Self { url, share_id })
    }
}
