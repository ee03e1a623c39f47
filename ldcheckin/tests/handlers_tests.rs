use ldcheckin::handlers::*;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};
use url::Url;

const UNSET_ENV: &str = "LDCHECKIN_HANDLER_TEST_COOKIE_NEVER_SET";

#[test]
fn test_validate_timeout() {
    assert_eq!(validate_timeout(30), Ok(30));
    assert_eq!(validate_timeout(5), Ok(5));
    assert!(validate_timeout(4).unwrap_err().contains("at least 5"));
}

#[test]
fn test_single_target_is_normalized() {
    let targets = resolve_discover_targets(false, None, "Shop.Example/some/page").unwrap();
    assert_eq!(targets, vec![Url::parse("https://shop.example/").unwrap()]);
}

#[test]
fn test_run_all_lists_builtin_shops() {
    let targets = resolve_discover_targets(true, None, "ignored.example").unwrap();
    assert_eq!(targets.len(), 4);
    assert_eq!(targets[0].as_str(), "https://store.ryanai.org/");
    assert!(targets.iter().all(|t| t.scheme() == "https"));
}

#[test]
fn test_targets_from_url_file() -> Result<(), Box<dyn std::error::Error>> {
    let mut temp_file = NamedTempFile::new()?;
    writeln!(temp_file, "# my shops")?;
    writeln!(temp_file, "oeo.cc.cd")?;
    writeln!(temp_file)?;
    writeln!(temp_file, "https://shop.example/products")?;

    let targets = resolve_discover_targets(false, Some(temp_file.path()), "ignored.example")?;

    assert_eq!(
        targets,
        vec![
            Url::parse("https://oeo.cc.cd/")?,
            Url::parse("https://shop.example/")?,
        ]
    );
    Ok(())
}

#[test]
fn test_url_file_with_only_comments() {
    let mut temp_file = NamedTempFile::new().unwrap();
    writeln!(temp_file, "# nothing here").unwrap();
    writeln!(temp_file, "   ").unwrap();

    let result = resolve_discover_targets(false, Some(temp_file.path()), "ignored.example");
    assert!(result.is_err());
}

#[test]
fn test_url_file_with_insecure_entry() {
    let mut temp_file = NamedTempFile::new().unwrap();
    writeln!(temp_file, "http://shop.example/").unwrap();

    let err = resolve_discover_targets(false, Some(temp_file.path()), "ignored.example").unwrap_err();
    assert!(err.contains("http://shop.example/"));
}

#[test]
fn test_discovery_cookie_falls_back_to_empty() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("missing.cookie");
    let url = Url::parse("https://shop.example/").unwrap();

    let cookie = load_discovery_cookie(&url, "", UNSET_ENV, missing.to_str());
    assert_eq!(cookie, "");

    let cookie = load_discovery_cookie(&url, "no-equals-sign", UNSET_ENV, missing.to_str());
    assert_eq!(cookie, "");
}

#[test]
fn test_discovery_cookie_from_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("shop.cookie");
    std::fs::write(&path, "Cookie: sid=abc\n").unwrap();
    let url = Url::parse("https://shop.example/").unwrap();

    let cookie = load_discovery_cookie(&url, "", UNSET_ENV, path.to_str());
    assert_eq!(cookie, "sid=abc");
}

#[test]
fn test_run_all_drops_per_shop_overrides() {
    let settings = CheckinSettings {
        cookie: "sid=abc".to_string(),
        cookie_file: Some("/tmp/shop.cookie".to_string()),
        status_action_id: "s".to_string(),
        checkin_action_id: "c".to_string(),
        skip_status: true,
        ..Default::default()
    };

    let settings = settings.for_all_shops();

    assert!(settings.cookie.is_empty());
    assert!(settings.cookie_file.is_none());
    assert!(settings.status_action_id.is_empty());
    assert!(settings.checkin_action_id.is_empty());
    assert!(settings.skip_status);
}
