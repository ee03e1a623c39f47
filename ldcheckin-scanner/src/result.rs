use serde::{Deserialize, Serialize};
use std::fmt;

/// Length of a rendered server action id (21 bytes as hex).
pub const ACTION_ID_LEN: usize = 42;

/// A server action identifier, canonicalised to lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionId(String);

impl ActionId {
    /// Accepts exactly 42 hex characters in any case.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.len() == ACTION_ID_LEN && raw.bytes().all(|b| b.is_ascii_hexdigit()) {
            Some(Self(raw.to_ascii_lowercase()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The two remote procedures a shop exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Status,
    Checkin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Status => f.write_str("status_action_id"),
            Role::Checkin => f.write_str("checkin_action_id"),
        }
    }
}

/// A set of roles, used both for "which roles a body matches" and
/// "which roles a probe call wants".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Roles {
    pub status: bool,
    pub checkin: bool,
}

impl Roles {
    pub const NONE: Roles = Roles { status: false, checkin: false };
    pub const BOTH: Roles = Roles { status: true, checkin: true };
    pub const STATUS: Roles = Roles { status: true, checkin: false };
    pub const CHECKIN: Roles = Roles { status: false, checkin: true };
}

/// Raw result of one server action POST. Returned for every HTTP status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResponse {
    pub url: String,
    pub status: u16,
    pub content_type: String,
    pub body: String,
}

/// Outcome of a successful discovery run. Both ids are always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredActionIds {
    pub status_action_id: ActionId,
    pub checkin_action_id: ActionId,
    pub candidates_tested: usize,
    pub js_files_scanned: usize,
    pub used_cookie_for_status_probe: bool,
    pub used_cookie_for_checkin_probe: bool,
}
