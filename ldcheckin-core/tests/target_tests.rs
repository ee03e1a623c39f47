// Tests for shop URL handling

use ldcheckin_core::target::{
    TargetError, load_urls_from_file, normalize_base_url, safe_hostname, validate_base_url,
};
use std::io::Write;
use tempfile::NamedTempFile;
use url::Url;

#[test]
fn test_normalize_bare_host() {
    let url = normalize_base_url("Shop.Example").unwrap();
    assert_eq!(url.as_str(), "https://shop.example/");
}

#[test]
fn test_normalize_drops_path() {
    let url = normalize_base_url(" https://shop.example/products?page=2 ").unwrap();
    assert_eq!(url.as_str(), "https://shop.example/");
}

#[test]
fn test_normalize_rejects_http() {
    let err = normalize_base_url("http://shop.example/").unwrap_err();
    assert!(matches!(err, TargetError::InsecureScheme(_)));
}

#[test]
fn test_normalize_rejects_empty() {
    assert!(matches!(normalize_base_url("  "), Err(TargetError::Empty)));
}

#[test]
fn test_validate_base_url() {
    assert!(validate_base_url(&Url::parse("https://shop.example/").unwrap()).is_ok());
    assert!(validate_base_url(&Url::parse("http://shop.example/").unwrap()).is_err());
}

#[test]
fn test_safe_hostname_lowercases() {
    let url = Url::parse("https://SHOP.example/").unwrap();
    assert_eq!(safe_hostname(&url), "shop.example");
}

#[test]
fn test_load_urls_from_file_skips_comments() -> Result<(), Box<dyn std::error::Error>> {
    let mut temp_file = NamedTempFile::new()?;
    writeln!(temp_file, "# shops")?;
    writeln!(temp_file, "shop.example")?;
    writeln!(temp_file)?;
    writeln!(temp_file, "  https://other.example/  ")?;

    let urls = load_urls_from_file(temp_file.path())?;

    assert_eq!(urls, vec!["shop.example", "https://other.example/"]);
    Ok(())
}

#[test]
fn test_load_urls_from_missing_file() {
    let result = load_urls_from_file(std::path::Path::new("/nonexistent/urls.txt"));
    assert!(matches!(result, Err(TargetError::Io { .. })));
}
