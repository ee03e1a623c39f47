// Summary of a multi-shop run

use crate::checkin::ExitStatus;

#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    results: Vec<(String, ExitStatus)>,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, target: impl Into<String>, status: ExitStatus) {
        self.results.push((target.into(), status));
    }

    fn targets_with(&self, status: ExitStatus) -> Vec<&str> {
        self.results
            .iter()
            .filter(|(_, s)| *s == status)
            .map(|(target, _)| target.as_str())
            .collect()
    }

    pub fn ok_count(&self) -> usize {
        self.targets_with(ExitStatus::Ok).len()
    }

    pub fn needs_login(&self) -> Vec<&str> {
        self.targets_with(ExitStatus::NeedsLogin)
    }

    pub fn failed(&self) -> Vec<&str> {
        self.targets_with(ExitStatus::Error)
    }

    /// Any failure wins over needs-login, which wins over success.
    pub fn exit_status(&self) -> ExitStatus {
        self.results
            .iter()
            .map(|(_, s)| *s)
            .max_by_key(|s| match s {
                ExitStatus::Ok => 0,
                ExitStatus::NeedsLogin => 1,
                ExitStatus::Error => 2,
            })
            .unwrap_or(ExitStatus::Ok)
    }

    pub fn generate_report(&self) -> String {
        let mut report = String::new();
        report.push_str("\n=== Summary ===\n");
        report.push_str(&format!(
            "OK: {}, needs cookie refresh: {}, failed: {}\n",
            self.ok_count(),
            self.needs_login().len(),
            self.failed().len()
        ));

        let needs_login = self.needs_login();
        if !needs_login.is_empty() {
            report.push_str(&format!("Needs cookie refresh: {}\n", needs_login.join(", ")));
        }
        let failed = self.failed();
        if !failed.is_empty() {
            report.push_str(&format!("Failed: {}\n", failed.join(", ")));
        }

        report
    }

    /// Discovery has no needs-login outcome, only found or failed.
    pub fn generate_discovery_report(&self) -> String {
        let mut report = String::new();
        report.push_str("\n=== Summary ===\n");
        report.push_str(&format!(
            "Discovered: {}, failed: {}\n",
            self.ok_count(),
            self.failed().len()
        ));

        let failed = self.failed();
        if !failed.is_empty() {
            report.push_str(&format!("Failed: {}\n", failed.join(", ")));
        }

        report
    }
}
