// Script link and action id candidate extraction.
//
// Everything here is plain pattern matching over text: pages and bundles are
// never parsed.

use crate::result::ActionId;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;
use url::Url;

static SCRIPT_PATH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)/_next/static/[^"'\s<>]+\.js(?:\?[^"'\s<>]+)?"#)
        .expect("script path regex is valid")
});

static ACTION_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b[0-9a-f]{42}\b").expect("action id regex is valid"));

static ACTION_KV_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)["']next-action["']\s*:\s*["']([0-9a-f]{42})["']"#)
        .expect("action kv regex is valid")
});

static ACTION_SET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)set\(\s*["']next-action["']\s*,\s*["']([0-9a-f]{42})["']\s*\)"#)
        .expect("action set regex is valid")
});

/// Occurrence counts per action id, remembering first-seen order.
#[derive(Debug, Clone, Default)]
pub struct FrequencyTable {
    entries: Vec<(ActionId, usize)>,
    index: HashMap<ActionId, usize>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, id: ActionId, count: usize) {
        match self.index.get(&id) {
            Some(&slot) => self.entries[slot].1 += count,
            None => {
                self.index.insert(id.clone(), self.entries.len());
                self.entries.push((id, count));
            }
        }
    }

    /// Sum another table into this one. Ids new to `self` keep `other`'s order.
    pub fn merge(&mut self, other: &FrequencyTable) {
        for (id, count) in &other.entries {
            self.add(id.clone(), *count);
        }
    }

    pub fn count(&self, id: &ActionId) -> usize {
        self.index.get(id).map_or(0, |&slot| self.entries[slot].1)
    }

    pub fn contains(&self, id: &ActionId) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ids by descending count; equal counts stay in first-seen order.
    pub fn ranked(&self) -> Vec<ActionId> {
        let mut sorted: Vec<&(ActionId, usize)> = self.entries.iter().collect();
        sorted.sort_by(|a, b| b.1.cmp(&a.1));
        sorted.into_iter().map(|(id, _)| id.clone()).collect()
    }
}

/// Candidates found in one script, split by confidence.
#[derive(Debug, Clone, Default)]
pub struct CandidateScan {
    /// Ids bound to the `next-action` marker.
    pub strong: FrequencyTable,
    /// Every bare 42-char hex token.
    pub weak: FrequencyTable,
}

impl CandidateScan {
    pub fn merge(&mut self, other: &CandidateScan) {
        self.strong.merge(&other.strong);
        self.weak.merge(&other.weak);
    }

    /// Strong ids first, then weak ids not already strong; each tier ranked.
    pub fn ranked_candidates(&self) -> Vec<ActionId> {
        let mut candidates = self.strong.ranked();
        candidates.extend(
            self.weak
                .ranked()
                .into_iter()
                .filter(|id| !self.strong.contains(id)),
        );
        candidates
    }
}

/// Collect `/_next/static/*.js` references in page order, resolved against `base_url`.
///
/// Duplicates are dropped by raw path text before resolution.
pub fn extract_script_urls(base_url: &Url, html: &str) -> Vec<Url> {
    let mut seen = HashSet::new();
    let mut urls = Vec::new();

    for m in SCRIPT_PATH_RE.find_iter(html) {
        let raw = m.as_str();
        if !seen.insert(raw) {
            continue;
        }
        if let Ok(resolved) = base_url.join(raw) {
            urls.push(resolved);
        }
    }

    urls
}

pub fn extract_candidates(script: &str) -> CandidateScan {
    let mut scan = CandidateScan::default();

    for re in [&*ACTION_KV_RE, &*ACTION_SET_RE] {
        for cap in re.captures_iter(script) {
            if let Some(id) = cap.get(1).and_then(|m| ActionId::parse(m.as_str())) {
                scan.strong.add(id, 1);
            }
        }
    }

    for m in ACTION_ID_RE.find_iter(script) {
        if let Some(id) = ActionId::parse(m.as_str()) {
            scan.weak.add(id, 1);
        }
    }

    scan
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(c: char) -> ActionId {
        ActionId::parse(&c.to_string().repeat(42)).unwrap()
    }

    #[test]
    fn test_extract_script_urls_dedups_raw_paths() {
        let base = Url::parse("https://shop.example/").unwrap();
        let html = r#"
            <script src="/_next/static/chunks/main-abc.js"></script>
            <link rel="preload" href="/_NEXT/static/chunks/app/page-1.js?v=2">
            <script src="/_next/static/chunks/main-abc.js"></script>
            <script src="https://cdn.example/lib.js"></script>
            <img src="/_next/static/media/logo.png">
        "#;

        let urls = extract_script_urls(&base, html);
        let urls: Vec<&str> = urls.iter().map(Url::as_str).collect();

        assert_eq!(
            urls,
            vec![
                "https://shop.example/_next/static/chunks/main-abc.js",
                "https://shop.example/_NEXT/static/chunks/app/page-1.js?v=2",
            ]
        );
    }

    #[test]
    fn test_extract_script_urls_empty_page() {
        let base = Url::parse("https://shop.example/").unwrap();
        assert!(extract_script_urls(&base, "<html></html>").is_empty());
    }

    #[test]
    fn test_extract_candidates_strong_patterns() {
        let a = "a".repeat(42);
        let b = "B".repeat(42);
        let script = format!(
            r#"x={{"next-action":"{a}"}};h.set('Next-Action', '{b}');"#
        );

        let scan = extract_candidates(&script);

        assert_eq!(scan.strong.count(&id('a')), 1);
        assert_eq!(scan.strong.count(&id('b')), 1);
        // strong ids are also bare tokens
        assert_eq!(scan.weak.count(&id('a')), 1);
        assert_eq!(scan.weak.count(&id('b')), 1);
    }

    #[test]
    fn test_extract_candidates_weak_tokens_need_boundaries() {
        let c = "c".repeat(42);
        let long = "d".repeat(43);
        let script = format!("var k=\"{c}\",q={long},r=\"{c}\";");

        let scan = extract_candidates(&script);

        assert!(scan.strong.is_empty());
        assert_eq!(scan.weak.count(&id('c')), 2);
        assert_eq!(scan.weak.len(), 1);
    }

    #[test]
    fn test_ranked_is_stable_for_ties() {
        let mut table = FrequencyTable::new();
        table.add(id('1'), 1);
        table.add(id('2'), 3);
        table.add(id('3'), 1);
        table.add(id('4'), 3);

        assert_eq!(table.ranked(), vec![id('2'), id('4'), id('1'), id('3')]);
    }

    #[test]
    fn test_merge_sums_counts_and_keeps_first_seen_order() {
        let mut first = FrequencyTable::new();
        first.add(id('1'), 1);
        let mut second = FrequencyTable::new();
        second.add(id('2'), 1);
        second.add(id('1'), 1);

        first.merge(&second);

        assert_eq!(first.count(&id('1')), 2);
        assert_eq!(first.ranked(), vec![id('1'), id('2')]);
    }

    #[test]
    fn test_strong_tier_outranks_frequent_weak_tokens() {
        let mut scan = CandidateScan::default();
        scan.strong.add(id('a'), 1);
        scan.weak.add(id('a'), 1);
        scan.weak.add(id('b'), 50);
        scan.weak.add(id('c'), 2);

        assert_eq!(scan.ranked_candidates(), vec![id('a'), id('b'), id('c')]);
    }
}
