use crate::action::is_challenge;
use crate::client::{HTML_ACCEPT, SCRIPT_ACCEPT, ShopClient};
use crate::error::{DiscoveryError, Result};
use crate::extract::{CandidateScan, extract_candidates, extract_script_urls};
use crate::probe::{ProbeLedger, ProbeRequest, Prober};
use crate::result::{ActionId, DiscoveredActionIds, Role, Roles};
use std::collections::HashSet;
use tracing::{debug, info, warn};
use url::Url;

/// Tunables for one discovery run.
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    pub max_page_bytes: usize,
    pub max_js_files: usize,
    pub max_js_bytes: usize,
    pub max_candidates_test: usize,
    pub max_cookie_probe_tests: usize,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            max_page_bytes: 2_000_000,
            max_js_files: 30,
            max_js_bytes: 6_000_000,
            max_candidates_test: 200,
            max_cookie_probe_tests: 50,
        }
    }
}

/// Finds a shop's status and check-in server action ids from its static bundles.
pub struct Discoverer {
    client: ShopClient,
    options: DiscoveryOptions,
}

impl Discoverer {
    pub fn new(client: ShopClient, options: DiscoveryOptions) -> Self {
        Self { client, options }
    }

    pub fn with_max_js_files(mut self, max_js_files: usize) -> Self {
        self.options.max_js_files = max_js_files;
        self
    }

    pub fn with_max_candidates_test(mut self, max_candidates_test: usize) -> Self {
        self.options.max_candidates_test = max_candidates_test;
        self
    }

    pub fn with_max_cookie_probe_tests(mut self, max_cookie_probe_tests: usize) -> Self {
        self.options.max_cookie_probe_tests = max_cookie_probe_tests;
        self
    }

    pub fn options(&self) -> &DiscoveryOptions {
        &self.options
    }

    /// Run the full discovery against `base_url`.
    ///
    /// Candidates are first probed without a cookie for both roles. Only if a
    /// role is still missing, and `cookie` is non-empty, are fresh candidates
    /// probed again with the cookie, one role at a time. All phases share one
    /// test budget and never POST the same id twice.
    pub async fn discover(&self, base_url: &Url, cookie: &str) -> Result<DiscoveredActionIds> {
        info!("Starting action id discovery for {}", base_url);

        let (candidates, js_files_scanned) = self.collect_candidates(base_url).await?;
        info!(
            "{} candidate(s) from {} script(s)",
            candidates.len(),
            js_files_scanned
        );

        let prober = Prober::new(&self.client, base_url);
        let mut ledger = ProbeLedger::new(self.options.max_candidates_test);
        let no_skip = HashSet::new();
        let has_cookie = !cookie.trim().is_empty();

        debug!("Cookie-less probe for both roles");
        let first = prober
            .probe(
                ProbeRequest {
                    candidates: &candidates,
                    cookie: "",
                    wanted: Roles::BOTH,
                    skip: &no_skip,
                    max_tests: ledger.tests_left(),
                },
                &mut ledger,
            )
            .await?;
        let mut status_action_id = first.status;
        let mut checkin_action_id = first.checkin;

        let mut used_cookie_for_status_probe = false;
        if status_action_id.is_none() && has_cookie && ledger.tests_left() > 0 {
            debug!("Retrying status role with cookie");
            let skip: HashSet<ActionId> = checkin_action_id.iter().cloned().collect();
            let outcome = prober
                .probe(
                    ProbeRequest {
                        candidates: &candidates,
                        cookie,
                        wanted: Roles::STATUS,
                        skip: &skip,
                        max_tests: self.cookie_probe_cap(&ledger),
                    },
                    &mut ledger,
                )
                .await?;
            if outcome.status.is_some() {
                status_action_id = outcome.status;
            }
            used_cookie_for_status_probe = outcome.tested > 0;
        }

        let mut used_cookie_for_checkin_probe = false;
        if checkin_action_id.is_none() && has_cookie && ledger.tests_left() > 0 {
            debug!("Retrying checkin role with cookie");
            let outcome = prober
                .probe(
                    ProbeRequest {
                        candidates: &candidates,
                        cookie,
                        wanted: Roles::CHECKIN,
                        skip: &no_skip,
                        max_tests: self.cookie_probe_cap(&ledger),
                    },
                    &mut ledger,
                )
                .await?;
            if outcome.checkin.is_some() {
                checkin_action_id = outcome.checkin;
            }
            used_cookie_for_checkin_probe = outcome.tested > 0;
        }

        let candidates_tested = ledger.tested_count();
        match (status_action_id, checkin_action_id) {
            (Some(status_action_id), Some(checkin_action_id)) => {
                info!(
                    "Discovered status={} checkin={} after {} test(s)",
                    status_action_id, checkin_action_id, candidates_tested
                );
                Ok(DiscoveredActionIds {
                    status_action_id,
                    checkin_action_id,
                    candidates_tested,
                    js_files_scanned,
                    used_cookie_for_status_probe,
                    used_cookie_for_checkin_probe,
                })
            }
            (status, checkin) => {
                let mut missing = Vec::new();
                if status.is_none() {
                    missing.push(Role::Status);
                }
                if checkin.is_none() {
                    missing.push(Role::Checkin);
                }
                Err(DiscoveryError::IncompleteResolution {
                    missing,
                    tested: candidates_tested,
                })
            }
        }
    }

    fn cookie_probe_cap(&self, ledger: &ProbeLedger) -> usize {
        ledger.tests_left().min(self.options.max_cookie_probe_tests)
    }

    /// Fetch the page and its scripts, returning ranked candidates and the
    /// number of scripts actually scanned.
    async fn collect_candidates(&self, base_url: &Url) -> Result<(Vec<ActionId>, usize)> {
        let html = self
            .client
            .fetch_text(base_url, HTML_ACCEPT, "", self.options.max_page_bytes)
            .await?;
        if is_challenge(&html) {
            return Err(DiscoveryError::ChallengeDetected {
                url: base_url.to_string(),
            });
        }

        let script_urls = extract_script_urls(base_url, &html);
        if script_urls.is_empty() {
            return Err(DiscoveryError::NoScriptsFound {
                url: base_url.to_string(),
            });
        }
        debug!("Found {} script reference(s)", script_urls.len());

        let mut merged = CandidateScan::default();
        let mut scanned = 0;
        for script_url in script_urls.iter().take(self.options.max_js_files) {
            let script = match self
                .client
                .fetch_text(script_url, SCRIPT_ACCEPT, "", self.options.max_js_bytes)
                .await
            {
                Ok(script) => script,
                Err(e) => {
                    warn!("Skipping script {}: {}", script_url, e);
                    continue;
                }
            };
            scanned += 1;
            merged.merge(&extract_candidates(&script));
        }

        let candidates = merged.ranked_candidates();
        if candidates.is_empty() {
            return Err(DiscoveryError::NoCandidatesFound { scanned });
        }

        Ok((candidates, scanned))
    }
}
