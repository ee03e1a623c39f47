// Tests for the per-host action id map

use ldcheckin_core::config::{
    ActionIdPair, ActionMap, ConfigError, read_action_map, resolve_action_ids, save_action_map,
};
use std::fs;
use tempfile::TempDir;
use url::Url;

fn pair(status: &str, checkin: &str) -> ActionIdPair {
    ActionIdPair {
        status_action_id: status.to_string(),
        checkin_action_id: checkin.to_string(),
    }
}

#[test]
fn test_read_missing_map_is_empty() {
    let temp_dir = TempDir::new().unwrap();
    let map = read_action_map(&temp_dir.path().join("none.json")).unwrap();
    assert!(map.is_empty());
}

#[test]
fn test_read_map_skips_incomplete_entries() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("action_ids.json");
    fs::write(
        &path,
        r#"{
            "Shop.Example": {"status_action_id": " s1 ", "checkin_action_id": "c1"},
            "half.example": {"status_action_id": "s2"},
            "blank.example": {"status_action_id": "", "checkin_action_id": "c3"},
            "wrong.example": 42
        }"#,
    )
    .unwrap();

    let map = read_action_map(&path).unwrap();

    assert_eq!(map.len(), 1);
    assert_eq!(map.get("shop.example"), Some(&pair("s1", "c1")));
}

#[test]
fn test_read_map_rejects_bad_json_and_non_objects() {
    let temp_dir = TempDir::new().unwrap();
    let bad = temp_dir.path().join("bad.json");
    fs::write(&bad, "{not json").unwrap();
    assert!(matches!(read_action_map(&bad), Err(ConfigError::Json { .. })));

    let list = temp_dir.path().join("list.json");
    fs::write(&list, "[]").unwrap();
    assert!(matches!(read_action_map(&list), Err(ConfigError::Shape(_))));
}

#[test]
fn test_save_then_read_map() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("state").join("action_ids.json");
    let mut map = ActionMap::new();
    map.insert("shop.example".to_string(), pair("s1", "c1"));

    save_action_map(&path, &map).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.ends_with('\n'));
    assert!(text.contains("\"status_action_id\": \"s1\""));
    assert_eq!(read_action_map(&path).unwrap(), map);
}

#[test]
fn test_resolve_prefers_explicit_pair() {
    let url = Url::parse("https://shop.example/").unwrap();
    let ids = resolve_action_ids(&url, "s", "c", std::path::Path::new("/nonexistent.json")).unwrap();
    assert_eq!(ids, pair("s", "c"));
}

#[test]
fn test_resolve_rejects_half_pair() {
    let url = Url::parse("https://shop.example/").unwrap();
    let err = resolve_action_ids(&url, "s", " ", std::path::Path::new("/nonexistent.json"));
    assert!(matches!(err, Err(ConfigError::MissingPair)));
}

#[test]
fn test_resolve_uses_map_then_builtin() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("action_ids.json");
    let mut map = ActionMap::new();
    map.insert("oeo.cc.cd".to_string(), pair("mapped-s", "mapped-c"));
    save_action_map(&path, &map).unwrap();

    let mapped = resolve_action_ids(&Url::parse("https://oeo.cc.cd/").unwrap(), "", "", &path).unwrap();
    assert_eq!(mapped, pair("mapped-s", "mapped-c"));

    let builtin =
        resolve_action_ids(&Url::parse("https://store.ryanai.org/").unwrap(), "", "", &path).unwrap();
    assert_eq!(
        builtin,
        pair(
            "00047583cb7e0d3bd45fc537bd80dc9c6a7c04a1e8",
            "00573f21cb6fdebcbb247b7ddbec9edcf954d96992"
        )
    );
}

#[test]
fn test_resolve_unconfigured_host() {
    let temp_dir = TempDir::new().unwrap();
    let url = Url::parse("https://shop.example/").unwrap();
    let err = resolve_action_ids(&url, "", "", &temp_dir.path().join("none.json")).unwrap_err();
    assert!(matches!(err, ConfigError::Unconfigured { ref host, .. } if host == "shop.example"));
    assert!(err.to_string().contains("shop.example"));
}
