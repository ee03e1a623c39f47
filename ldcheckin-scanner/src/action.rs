// Classification of server action responses.
//
// Action responses are a line-oriented stream of `<tag>:<payload>` rows where
// several JSON fragments share one body, so nothing here parses the body as a
// whole.

use crate::result::{ActionResponse, Roles};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

static CHALLENGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(Verify you are human|Just a moment|cf-browser-verification|cf-challenge)")
        .expect("challenge regex is valid")
});

static ACTION_NOT_FOUND_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)server action not found").expect("not-found regex is valid")
});

/// True when `text` looks like a bot-challenge interstitial.
pub fn is_challenge(text: &str) -> bool {
    CHALLENGE_RE.is_match(text)
}

/// True when the server rejected the action id as unknown.
pub fn is_action_not_found(resp: &ActionResponse) -> bool {
    resp.status == 404 && ACTION_NOT_FOUND_RE.is_match(&resp.body)
}

/// Split on every line boundary the payload writer may emit, including a lone `\r`.
fn payload_lines(body: &str) -> impl Iterator<Item = &str> {
    body.split(|c: char| {
        matches!(
            c,
            '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
        )
    })
}

/// Find the first `tag:{...}` row whose JSON object contains `key`.
pub fn first_object_with_key(body: &str, key: &str) -> Option<Map<String, Value>> {
    for line in payload_lines(body) {
        let Some((_, payload)) = line.split_once(':') else {
            continue;
        };
        let payload = payload.trim();
        if !payload.starts_with('{') || !payload.ends_with('}') {
            continue;
        }
        if let Ok(Value::Object(obj)) = serde_json::from_str::<Value>(payload)
            && obj.contains_key(key)
        {
            return Some(obj);
        }
    }
    None
}

/// Tag a response body with the roles its payload shape matches.
pub fn classify_body(body: &str) -> Roles {
    let status = first_object_with_key(body, "checkedIn")
        .is_some_and(|obj| obj.get("checkedIn").is_some_and(Value::is_boolean));

    let checkin = first_object_with_key(body, "success").is_some_and(|obj| {
        obj.get("success").is_some_and(Value::is_boolean)
            && (obj.contains_key("points") || obj.contains_key("error"))
    });

    Roles { status, checkin }
}
