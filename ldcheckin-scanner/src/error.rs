use crate::result::Role;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("HTTP {status}: {url}")]
    FetchStatus { url: String, status: u16 },

    #[error("network error fetching {url}: {source}")]
    FetchNetwork {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("bot challenge page served by {url} (refresh the cookie / cf_clearance)")]
    ChallengeDetected { url: String },

    #[error("no /_next/static/*.js references found on {url}")]
    NoScriptsFound { url: String },

    #[error("no 42-char action id candidates found in {scanned} scanned script(s)")]
    NoCandidatesFound { scanned: usize },

    #[error(
        "discovery incomplete, missing {} (tested {tested} candidates)",
        .missing.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
    )]
    IncompleteResolution { missing: Vec<Role>, tested: usize },

    #[error("network error posting action {action_id}: {source}")]
    Probe {
        action_id: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, DiscoveryError>;
