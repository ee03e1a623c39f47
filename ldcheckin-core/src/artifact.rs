// Debug artifacts for unexpected action responses

use chrono::Local;
use ldcheckin_scanner::ActionResponse;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Write `<prefix>_<timestamp>.meta.json` and `.resp.txt` under `dir`.
///
/// Best effort: failures are logged and the base path is still returned.
pub fn write_artifact(dir: &Path, prefix: &str, resp: &ActionResponse) -> PathBuf {
    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    let base = dir.join(format!("{}_{}", prefix, stamp));

    if let Err(e) = fs::create_dir_all(dir) {
        warn!("Cannot create artifacts dir {}: {}", dir.display(), e);
        return base;
    }

    let meta = json!({
        "url": resp.url,
        "status": resp.status,
        "content_type": resp.content_type,
    });
    let meta_path = base.with_extension("meta.json");
    let meta_text = serde_json::to_string_pretty(&meta).unwrap_or_default() + "\n";
    if let Err(e) = fs::write(&meta_path, meta_text) {
        warn!("Cannot write {}: {}", meta_path.display(), e);
    }

    let body_path = base.with_extension("resp.txt");
    if let Err(e) = fs::write(&body_path, &resp.body) {
        warn!("Cannot write {}: {}", body_path.display(), e);
    }

    base
}
