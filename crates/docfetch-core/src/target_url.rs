use crate::{Error, Result};
use url::Url;

const ALLOWED_SCHEMES: &[&str] = &["http", "https", "file"];

/// Parse the URL given on the command line
///
/// Bare hosts such as `docs.example.com/page` get an `https://` scheme.
pub fn normalize_url(input: &str) -> Result<Url> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidUrl {
            url: input.to_string(),
            reason: "URL is empty".to_string(),
        });
    }

    let candidate = if trimmed.contains("://") || trimmed.starts_with("file:") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let url = Url::parse(&candidate).map_err(|e| Error::InvalidUrl {
        url: input.to_string(),
        reason: e.to_string(),
    })?;

    if !ALLOWED_SCHEMES.contains(&url.scheme()) {
        return Err(Error::InvalidUrl {
            url: input.to_string(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }

    Ok(url)
}
