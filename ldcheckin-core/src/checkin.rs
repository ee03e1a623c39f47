// Single-shot daily check-in against a known pair of action ids

use crate::artifact::write_artifact;
use crate::config::ActionIdPair;
use ldcheckin_scanner::action::{first_object_with_key, is_action_not_found, is_challenge};
use ldcheckin_scanner::error::Result;
use ldcheckin_scanner::{Role, ShopClient};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use url::Url;

const ALREADY_CHECKED_IN: &str = "Already checked in today";
const NOT_LOGGED_IN: &str = "Not logged in";

/// Process exit codes shared by every subcommand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Ok = 0,
    Error = 1,
    NeedsLogin = 2,
}

impl ExitStatus {
    pub fn code(self) -> i32 {
        self as i32
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckinOutcome {
    AlreadyCheckedIn,
    CheckedIn { points: Option<i64> },
    NotLoggedIn,
    /// The configured id for `stage` is stale.
    ActionNotFound { stage: Role, artifact: PathBuf },
    ChallengeDetected { artifact: PathBuf },
    Unparseable { artifact: PathBuf },
    Failed { error: Option<String>, artifact: PathBuf },
}

impl CheckinOutcome {
    pub fn exit_status(&self) -> ExitStatus {
        match self {
            CheckinOutcome::AlreadyCheckedIn | CheckinOutcome::CheckedIn { .. } => ExitStatus::Ok,
            CheckinOutcome::NotLoggedIn | CheckinOutcome::ChallengeDetected { .. } => {
                ExitStatus::NeedsLogin
            }
            CheckinOutcome::ActionNotFound { .. }
            | CheckinOutcome::Unparseable { .. }
            | CheckinOutcome::Failed { .. } => ExitStatus::Error,
        }
    }

    pub fn message(&self) -> String {
        match self {
            CheckinOutcome::AlreadyCheckedIn => "Already checked in today.".to_string(),
            CheckinOutcome::CheckedIn { points: Some(points) } => {
                format!("Checked in: +{} points.", points)
            }
            CheckinOutcome::CheckedIn { points: None } => "Checked in.".to_string(),
            CheckinOutcome::NotLoggedIn => {
                "Not logged in or cookie expired; refresh the cookie.".to_string()
            }
            CheckinOutcome::ActionNotFound { stage, artifact } => format!(
                "Server action not found: {} is stale (response saved to {}).",
                stage,
                artifact.display()
            ),
            CheckinOutcome::ChallengeDetected { .. } => {
                "Bot challenge page served; refresh the cookie / cf_clearance.".to_string()
            }
            CheckinOutcome::Unparseable { artifact } => format!(
                "Unparseable check-in response (saved to {}).",
                artifact.display()
            ),
            CheckinOutcome::Failed { error: Some(error), .. } => {
                format!("Check-in failed: {}", error)
            }
            CheckinOutcome::Failed { error: None, artifact } => format!(
                "Check-in failed: unknown error (response saved to {}).",
                artifact.display()
            ),
        }
    }
}

pub struct CheckinRequest<'a> {
    pub base_url: &'a Url,
    pub cookie: &'a str,
    pub action_ids: &'a ActionIdPair,
    pub skip_status: bool,
    pub artifacts_dir: &'a Path,
}

/// Query today's status (unless skipped) and check in if needed.
///
/// Only transport failures are errors; every server answer maps to an outcome.
pub async fn run_checkin(client: &ShopClient, request: &CheckinRequest<'_>) -> Result<CheckinOutcome> {
    let CheckinRequest {
        base_url,
        cookie,
        action_ids,
        skip_status,
        artifacts_dir,
    } = *request;

    if !skip_status {
        let status_resp = client
            .post_action(base_url, &action_ids.status_action_id, cookie)
            .await?;
        debug!("Status action answered HTTP {}", status_resp.status);

        if is_action_not_found(&status_resp) {
            let artifact = write_artifact(artifacts_dir, "status_action_not_found", &status_resp);
            return Ok(CheckinOutcome::ActionNotFound {
                stage: Role::Status,
                artifact,
            });
        }

        let checked_in = first_object_with_key(&status_resp.body, "checkedIn")
            .is_some_and(|obj| obj.get("checkedIn") == Some(&Value::Bool(true)));
        if checked_in {
            info!("{} already checked in today", base_url);
            return Ok(CheckinOutcome::AlreadyCheckedIn);
        }
    }

    let checkin_resp = client
        .post_action(base_url, &action_ids.checkin_action_id, cookie)
        .await?;
    debug!("Checkin action answered HTTP {}", checkin_resp.status);

    if is_action_not_found(&checkin_resp) {
        let artifact = write_artifact(artifacts_dir, "checkin_action_not_found", &checkin_resp);
        return Ok(CheckinOutcome::ActionNotFound {
            stage: Role::Checkin,
            artifact,
        });
    }

    if is_challenge(&checkin_resp.body) {
        let artifact = write_artifact(artifacts_dir, "cloudflare_challenge", &checkin_resp);
        return Ok(CheckinOutcome::ChallengeDetected { artifact });
    }

    let Some(result) = first_object_with_key(&checkin_resp.body, "success") else {
        let artifact = write_artifact(artifacts_dir, "unexpected_response", &checkin_resp);
        return Ok(CheckinOutcome::Unparseable { artifact });
    };

    if result.get("success") == Some(&Value::Bool(true)) {
        let points = result
            .get("points")
            .and_then(Value::as_i64)
            .filter(|p| *p > 0);
        return Ok(CheckinOutcome::CheckedIn { points });
    }

    let error = result.get("error").and_then(Value::as_str);
    match error {
        Some(ALREADY_CHECKED_IN) => Ok(CheckinOutcome::AlreadyCheckedIn),
        Some(NOT_LOGGED_IN) => Ok(CheckinOutcome::NotLoggedIn),
        _ => {
            let artifact = write_artifact(artifacts_dir, "checkin_failed", &checkin_resp);
            Ok(CheckinOutcome::Failed {
                error: error.map(str::trim).filter(|e| !e.is_empty()).map(String::from),
                artifact,
            })
        }
    }
}
