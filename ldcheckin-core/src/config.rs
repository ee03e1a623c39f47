// Per-host action id map (`state/action_ids.json`)

use crate::constants::builtin_action_ids;
use crate::target::safe_hostname;
use ldcheckin_scanner::DiscoveredActionIds;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("action config {} is not valid JSON: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("action config {} must contain a JSON object at the root", .0.display())]
    Shape(PathBuf),

    #[error("action config I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("--status-action-id and --checkin-action-id must be given together")]
    MissingPair,

    #[error(
        "no action ids configured for {host}; pass --status-action-id/--checkin-action-id \
         or add them to {}",
        .config_file.display()
    )]
    Unconfigured { host: String, config_file: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionIdPair {
    pub status_action_id: String,
    pub checkin_action_id: String,
}

impl From<&DiscoveredActionIds> for ActionIdPair {
    fn from(found: &DiscoveredActionIds) -> Self {
        Self {
            status_action_id: found.status_action_id.to_string(),
            checkin_action_id: found.checkin_action_id.to_string(),
        }
    }
}

/// host -> action ids
pub type ActionMap = BTreeMap<String, ActionIdPair>;

/// Load the map, skipping entries that lack either id. A missing file is an empty map.
pub fn read_action_map(path: &Path) -> Result<ActionMap, ConfigError> {
    if !path.exists() {
        return Ok(ActionMap::new());
    }

    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let loaded: Value = serde_json::from_str(&content).map_err(|source| ConfigError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    let Value::Object(entries) = loaded else {
        return Err(ConfigError::Shape(path.to_path_buf()));
    };

    let mut map = ActionMap::new();
    for (host, raw) in entries {
        let id = |key: &str| {
            raw.get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
        };
        if let (Some(status_action_id), Some(checkin_action_id)) =
            (id("status_action_id"), id("checkin_action_id"))
        {
            map.insert(
                host.trim().to_lowercase(),
                ActionIdPair {
                    status_action_id,
                    checkin_action_id,
                },
            );
        }
    }
    Ok(map)
}

pub fn save_action_map(path: &Path, map: &ActionMap) -> Result<(), ConfigError> {
    let io_err = |source: std::io::Error| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(io_err)?;
    }

    let mut json = serde_json::to_string_pretty(map).map_err(|source| ConfigError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    json.push('\n');
    fs::write(path, json).map_err(io_err)
}

/// Pick the action ids for `base_url`: explicit pair, then the config file,
/// then the built-in defaults.
pub fn resolve_action_ids(
    base_url: &Url,
    status_action_id: &str,
    checkin_action_id: &str,
    config_file: &Path,
) -> Result<ActionIdPair, ConfigError> {
    let status = status_action_id.trim();
    let checkin = checkin_action_id.trim();

    if !status.is_empty() && !checkin.is_empty() {
        return Ok(ActionIdPair {
            status_action_id: status.to_string(),
            checkin_action_id: checkin.to_string(),
        });
    }
    if !status.is_empty() || !checkin.is_empty() {
        return Err(ConfigError::MissingPair);
    }

    let host = safe_hostname(base_url);
    if let Some(pair) = read_action_map(config_file)?.remove(&host) {
        return Ok(pair);
    }

    if let Some((status, checkin)) = builtin_action_ids(&host) {
        return Ok(ActionIdPair {
            status_action_id: status.to_string(),
            checkin_action_id: checkin.to_string(),
        });
    }

    Err(ConfigError::Unconfigured {
        host,
        config_file: config_file.to_path_buf(),
    })
}
