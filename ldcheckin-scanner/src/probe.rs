use crate::action::{classify_body, is_action_not_found};
use crate::client::ShopClient;
use crate::error::Result;
use crate::result::{ActionId, Roles};
use std::collections::HashSet;
use tracing::debug;
use url::Url;

/// Probe state shared by every phase of one discovery run.
#[derive(Debug, Clone)]
pub struct ProbeLedger {
    tested: HashSet<ActionId>,
    tests_left: usize,
}

impl ProbeLedger {
    pub fn new(budget: usize) -> Self {
        Self {
            tested: HashSet::new(),
            tests_left: budget,
        }
    }

    pub fn tests_left(&self) -> usize {
        self.tests_left
    }

    pub fn tested_count(&self) -> usize {
        self.tested.len()
    }

    pub fn was_tested(&self, id: &ActionId) -> bool {
        self.tested.contains(id)
    }

    fn mark_tested(&mut self, id: &ActionId) {
        self.tested.insert(id.clone());
        self.tests_left = self.tests_left.saturating_sub(1);
    }
}

/// One probing pass over the candidate list.
#[derive(Debug, Clone, Copy)]
pub struct ProbeRequest<'a> {
    pub candidates: &'a [ActionId],
    pub cookie: &'a str,
    pub wanted: Roles,
    pub skip: &'a HashSet<ActionId>,
    pub max_tests: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub status: Option<ActionId>,
    pub checkin: Option<ActionId>,
    pub tested: usize,
}

impl ProbeOutcome {
    fn satisfies(&self, wanted: Roles) -> bool {
        (!wanted.status || self.status.is_some()) && (!wanted.checkin || self.checkin.is_some())
    }
}

/// Issues live action POSTs against one shop.
pub struct Prober<'a> {
    client: &'a ShopClient,
    base_url: &'a Url,
}

impl<'a> Prober<'a> {
    pub fn new(client: &'a ShopClient, base_url: &'a Url) -> Self {
        Self { client, base_url }
    }

    /// POST untested candidates in order until the wanted roles are filled or
    /// `max_tests` POSTs have been made. Every POSTed id is recorded in `ledger`.
    pub async fn probe(
        &self,
        request: ProbeRequest<'_>,
        ledger: &mut ProbeLedger,
    ) -> Result<ProbeOutcome> {
        let mut outcome = ProbeOutcome::default();

        for id in request.candidates {
            if outcome.tested >= request.max_tests {
                break;
            }
            if ledger.was_tested(id) || request.skip.contains(id) {
                continue;
            }

            ledger.mark_tested(id);
            outcome.tested += 1;

            let resp = self
                .client
                .post_action(self.base_url, id.as_str(), request.cookie)
                .await?;
            if is_action_not_found(&resp) {
                debug!("Action {} not found (HTTP {})", id, resp.status);
                continue;
            }

            let roles = classify_body(&resp.body);
            debug!(
                "Action {} answered HTTP {} (status shape: {}, checkin shape: {})",
                id, resp.status, roles.status, roles.checkin
            );

            if request.wanted.status && outcome.status.is_none() && roles.status {
                outcome.status = Some(id.clone());
            }
            if request.wanted.checkin && outcome.checkin.is_none() && roles.checkin {
                outcome.checkin = Some(id.clone());
            }

            if outcome.satisfies(request.wanted) {
                break;
            }
        }

        Ok(outcome)
    }
}
