// Shop URL handling

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum TargetError {
    #[error("URL must not be empty")]
    Empty,

    #[error("only https:// URLs are supported: {0}")]
    InsecureScheme(String),

    #[error("URL has no host: {0}")]
    MissingHost(String),

    #[error("URL could not be parsed: {0}")]
    Unparseable(String),

    #[error("Failed to read URL file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Lowercased host of `url`, or an empty string.
pub fn safe_hostname(url: &Url) -> String {
    url.host_str().unwrap_or_default().to_lowercase()
}

pub fn validate_base_url(url: &Url) -> Result<(), TargetError> {
    if url.scheme() != "https" {
        return Err(TargetError::InsecureScheme(url.to_string()));
    }
    if safe_hostname(url).is_empty() {
        return Err(TargetError::MissingHost(url.to_string()));
    }
    Ok(())
}

/// Turn a host or URL into `https://<host>/`.
///
/// A missing scheme defaults to https; path, query and port are dropped.
pub fn normalize_base_url(raw: &str) -> Result<Url, TargetError> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(TargetError::Empty);
    }

    let with_scheme = if text.starts_with("http://") || text.starts_with("https://") {
        text.to_string()
    } else {
        format!("https://{}", text)
    };

    let parsed =
        Url::parse(&with_scheme).map_err(|e| TargetError::Unparseable(format!("{}: {}", text, e)))?;
    validate_base_url(&parsed)?;

    let host = safe_hostname(&parsed);
    Url::parse(&format!("https://{}/", host))
        .map_err(|e| TargetError::Unparseable(format!("{}: {}", text, e)))
}

/// Read one URL or host per line, skipping blank lines and `#` comments.
pub fn load_urls_from_file(path: &Path) -> Result<Vec<String>, TargetError> {
    let content = fs::read_to_string(path).map_err(|source| TargetError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect())
}
