// Cookie loading and normalization

use crate::constants::default_cookie_file_for_host;
use crate::target::safe_hostname;
use regex::Regex;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;
use url::Url;

static COOKIE_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*cookie\s*[:=]\s*").expect("cookie prefix regex is valid"));

#[derive(Error, Debug)]
pub enum CookieError {
    #[error("cookie file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("cookie looks empty or invalid")]
    Invalid,

    #[error("cannot derive a cookie file from a URL without host")]
    NoHost,

    #[error("Failed to read cookie file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Clean up a cookie pasted from a browser or a `Cookie:` header line.
pub fn normalize_cookie(raw: &str) -> Result<String, CookieError> {
    let cookie = raw.trim();
    let cookie = COOKIE_PREFIX_RE.replace(cookie, "");
    let cookie = cookie
        .trim()
        .trim_matches(|c: char| c == '"' || c == '\'')
        .replace('\r', "")
        .replace('\n', "; ");
    let cookie = cookie.trim();

    if cookie.is_empty() || !cookie.contains('=') {
        return Err(CookieError::Invalid);
    }
    Ok(cookie.to_string())
}

/// Explicit value first, then the `cookie_env` variable, then `cookie_file`.
pub fn load_cookie(
    explicit: Option<&str>,
    cookie_env: &str,
    cookie_file: &Path,
) -> Result<String, CookieError> {
    if let Some(cookie) = explicit.filter(|c| !c.is_empty()) {
        return normalize_cookie(cookie);
    }

    if let Ok(value) = env::var(cookie_env)
        && !value.trim().is_empty()
    {
        return normalize_cookie(&value);
    }

    if !cookie_file.exists() {
        return Err(CookieError::NotFound(cookie_file.to_path_buf()));
    }
    let content = fs::read_to_string(cookie_file).map_err(|source| CookieError::Io {
        path: cookie_file.to_path_buf(),
        source,
    })?;
    normalize_cookie(&content)
}

/// `override_path` when given, otherwise the per-host default.
pub fn resolve_cookie_file(base_url: &Url, override_path: Option<&str>) -> Result<PathBuf, CookieError> {
    if let Some(raw) = override_path.map(str::trim).filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(shellexpand::tilde(raw).as_ref()));
    }

    let host = safe_hostname(base_url);
    if host.is_empty() {
        return Err(CookieError::NoHost);
    }
    let default = default_cookie_file_for_host(&host);
    Ok(PathBuf::from(shellexpand::tilde(&default).as_ref()))
}
