use anyhow::Context;
use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use ldcheckin_core::config::{read_action_map, resolve_action_ids, save_action_map};
use ldcheckin_core::constants::{
    DEFAULT_BASE_URL, DEFAULT_COOKIE_ENV, DEFAULT_TIMEOUT_SECONDS, MIN_TIMEOUT_SECONDS,
    all_shop_urls,
};
use ldcheckin_core::cookie::{CookieError, load_cookie, resolve_cookie_file};
use ldcheckin_core::report::RunSummary;
use ldcheckin_core::target::{load_urls_from_file, normalize_base_url, safe_hostname, validate_base_url};
use ldcheckin_core::{ActionIdPair, CheckinOutcome, CheckinRequest, ExitStatus, run_checkin};
use ldcheckin_scanner::{DEFAULT_USER_AGENT, Discoverer, DiscoveryOptions, ShopClient};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use url::Url;

fn string_arg(args: &ArgMatches, id: &str) -> String {
    args.get_one::<String>(id).cloned().unwrap_or_default()
}

fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

fn print_notice(msg: &str) {
    eprintln!("{} {}", "!".yellow().bold(), msg.yellow());
}

fn print_failure(msg: &str) {
    eprintln!("{} {}", "✗".red().bold(), msg);
}

fn print_heading(target: &Url) {
    println!("\n{}", format!("=== {} ===", target).bright_white().bold());
}

/// Reject timeouts below the minimum the shops tolerate.
pub fn validate_timeout(seconds: u64) -> Result<u64, String> {
    if seconds < MIN_TIMEOUT_SECONDS {
        return Err(format!(
            "--timeout-seconds must be at least {}",
            MIN_TIMEOUT_SECONDS
        ));
    }
    Ok(seconds)
}

/// Shops to discover: the built-in list, a URL file, or the single base URL.
pub fn resolve_discover_targets(
    run_all: bool,
    url_file: Option<&Path>,
    base_url: &str,
) -> Result<Vec<Url>, String> {
    let raw: Vec<String> = if run_all {
        all_shop_urls()
    } else if let Some(path) = url_file {
        load_urls_from_file(path).map_err(|e| e.to_string())?
    } else {
        vec![base_url.to_string()]
    };

    if raw.is_empty() {
        return Err("no shop URLs to process".to_string());
    }

    raw.iter()
        .map(|entry| normalize_base_url(entry).map_err(|e| format!("{}: {}", entry, e)))
        .collect()
}

/// Cookie for discovery; any problem degrades to a cookie-less run.
pub fn load_discovery_cookie(
    base_url: &Url,
    cookie: &str,
    cookie_env: &str,
    cookie_file: Option<&str>,
) -> String {
    let path = match resolve_cookie_file(base_url, cookie_file) {
        Ok(path) => path,
        Err(e) => {
            print_notice(&format!("{} (continuing without cookie)", e));
            return String::new();
        }
    };

    match load_cookie(Some(cookie), cookie_env, &path) {
        Ok(cookie) => cookie,
        Err(CookieError::NotFound(path)) => {
            print_notice(&format!(
                "cookie file not found: {} (continuing without cookie)",
                path.display()
            ));
            String::new()
        }
        Err(e) => {
            print_notice(&format!("{} (continuing without cookie)", e));
            String::new()
        }
    }
}

fn discovery_spinner(quiet: bool, target: &Url) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(format!("Scanning {} for server actions...", target));
    spinner
}

pub async fn handle_discover(args: &ArgMatches, quiet: bool) -> anyhow::Result<ExitStatus> {
    let timeout = validate_timeout(
        args.get_one::<u64>("timeout-seconds")
            .copied()
            .unwrap_or(DEFAULT_TIMEOUT_SECONDS),
    )
    .map_err(anyhow::Error::msg)?;

    let base_url = args
        .get_one::<String>("base-url")
        .map(String::as_str)
        .unwrap_or(DEFAULT_BASE_URL);
    let targets = resolve_discover_targets(
        args.get_flag("run-all"),
        args.get_one::<PathBuf>("url-file").map(PathBuf::as_path),
        base_url,
    )
    .map_err(anyhow::Error::msg)?;

    let mut cookie = string_arg(args, "cookie");
    let mut cookie_file = args.get_one::<String>("cookie-file").cloned();
    if targets.len() > 1 {
        if !cookie.trim().is_empty() {
            print_notice("multi-shop mode reads cookies per host; ignoring --cookie");
        }
        cookie.clear();
        if cookie_file.take().is_some_and(|f| !f.trim().is_empty()) {
            print_notice("multi-shop mode maps cookie files per host; ignoring --cookie-file");
        }
    }
    let cookie_env = args
        .get_one::<String>("cookie-env")
        .cloned()
        .unwrap_or_else(|| DEFAULT_COOKIE_ENV.to_string());

    let action_config_file = expand_path(&string_arg(args, "action-config-file"));
    let mut action_map = read_action_map(&action_config_file)?;

    let user_agent = args
        .get_one::<String>("user-agent")
        .map(String::as_str)
        .unwrap_or(DEFAULT_USER_AGENT);
    let client = ShopClient::new(timeout, user_agent).context("failed to build HTTP client")?;

    let count = |id: &str| args.get_one::<usize>(id).copied();
    let defaults = DiscoveryOptions::default();
    let discoverer = Discoverer::new(client, defaults.clone())
        .with_max_js_files(count("max-js-files").unwrap_or(defaults.max_js_files).max(1))
        .with_max_candidates_test(
            count("max-candidates-test")
                .unwrap_or(defaults.max_candidates_test)
                .max(1),
        )
        .with_max_cookie_probe_tests(
            count("max-cookie-probe-tests").unwrap_or(defaults.max_cookie_probe_tests),
        );
    debug!("Discovery options: {:?}", discoverer.options());

    let mut summary = RunSummary::new();
    let mut updated = 0usize;

    for target in &targets {
        print_heading(target);
        let cookie = load_discovery_cookie(target, &cookie, &cookie_env, cookie_file.as_deref());

        let spinner = discovery_spinner(quiet, target);
        let result = discoverer.discover(target, &cookie).await;
        spinner.finish_and_clear();

        let found = match result {
            Ok(found) => found,
            Err(e) => {
                print_failure(&format!("Discovery failed: {}", e));
                summary.record(target.as_str(), ExitStatus::Error);
                continue;
            }
        };

        action_map.insert(safe_hostname(target), ActionIdPair::from(&found));
        updated += 1;
        summary.record(target.as_str(), ExitStatus::Ok);

        println!("{} Found action ids:", "✓".green().bold());
        println!("  status_action_id : {}", found.status_action_id.to_string().bright_white());
        println!("  checkin_action_id: {}", found.checkin_action_id.to_string().bright_white());
        if !quiet {
            println!(
                "  {}",
                format!(
                    "(tested {} candidates, scanned {} JS files)",
                    found.candidates_tested, found.js_files_scanned
                )
                .dimmed()
            );
        }

        if found.used_cookie_for_checkin_probe {
            print_notice(
                "the checkin id was probed with your cookie; this may have performed a check-in",
            );
        } else if found.used_cookie_for_status_probe {
            print_notice("the status id was probed with your cookie");
        }
    }

    if updated > 0 {
        save_action_map(&action_config_file, &action_map)?;
        println!("\n{} Wrote {}", "✓".green().bold(), action_config_file.display());
    }

    print!("{}", summary.generate_discovery_report());
    Ok(summary.exit_status())
}

/// Per-run check-in settings taken from the command line.
#[derive(Debug, Clone, Default)]
pub struct CheckinSettings {
    pub cookie: String,
    pub cookie_env: String,
    pub cookie_file: Option<String>,
    pub action_config_file: PathBuf,
    pub artifacts_dir: PathBuf,
    pub status_action_id: String,
    pub checkin_action_id: String,
    pub skip_status: bool,
}

impl CheckinSettings {
    pub fn from_matches(args: &ArgMatches) -> Self {
        Self {
            cookie: string_arg(args, "cookie"),
            cookie_env: string_arg(args, "cookie-env"),
            cookie_file: args.get_one::<String>("cookie-file").cloned(),
            action_config_file: expand_path(&string_arg(args, "action-config-file")),
            artifacts_dir: expand_path(&string_arg(args, "artifacts-dir")),
            status_action_id: string_arg(args, "status-action-id"),
            checkin_action_id: string_arg(args, "checkin-action-id"),
            skip_status: args.get_flag("skip-status"),
        }
    }

    /// Drop per-shop overrides for `--run-all`, printing a notice for each.
    pub fn for_all_shops(mut self) -> Self {
        if !self.cookie.trim().is_empty() {
            print_notice("--run-all reads cookies per host; ignoring --cookie");
        }
        self.cookie.clear();
        if self.cookie_file.take().is_some_and(|f| !f.trim().is_empty()) {
            print_notice("--run-all maps cookie files per host; ignoring --cookie-file");
        }
        if !self.status_action_id.trim().is_empty() || !self.checkin_action_id.trim().is_empty() {
            print_notice(
                "--run-all reads action ids per host; ignoring --status-action-id/--checkin-action-id",
            );
        }
        self.status_action_id.clear();
        self.checkin_action_id.clear();
        self
    }
}

/// Check in on one shop and report the outcome.
pub async fn checkin_single_target(
    client: &ShopClient,
    settings: &CheckinSettings,
    base_url: &str,
) -> ExitStatus {
    let base_url = match Url::parse(base_url.trim()) {
        Ok(url) => url,
        Err(e) => {
            print_failure(&format!("invalid URL {}: {}", base_url, e));
            return ExitStatus::Error;
        }
    };
    if let Err(e) = validate_base_url(&base_url) {
        print_failure(&e.to_string());
        return ExitStatus::Error;
    }

    let cookie_file = match resolve_cookie_file(&base_url, settings.cookie_file.as_deref()) {
        Ok(path) => path,
        Err(e) => {
            print_failure(&e.to_string());
            return ExitStatus::Error;
        }
    };

    let action_ids = match resolve_action_ids(
        &base_url,
        &settings.status_action_id,
        &settings.checkin_action_id,
        &settings.action_config_file,
    ) {
        Ok(ids) => ids,
        Err(e) => {
            print_failure(&e.to_string());
            return ExitStatus::Error;
        }
    };

    let cookie = match load_cookie(Some(&settings.cookie), &settings.cookie_env, &cookie_file) {
        Ok(cookie) => cookie,
        Err(CookieError::NotFound(path)) => {
            print_failure(&format!("cookie file not found: {}", path.display()));
            eprintln!(
                "  Paste the browser cookie for {} into that file (chmod 600).",
                safe_hostname(&base_url)
            );
            return ExitStatus::NeedsLogin;
        }
        Err(CookieError::Invalid) => {
            print_failure("cookie looks empty or invalid");
            return ExitStatus::NeedsLogin;
        }
        Err(e) => {
            print_failure(&e.to_string());
            return ExitStatus::Error;
        }
    };

    let request = CheckinRequest {
        base_url: &base_url,
        cookie: &cookie,
        action_ids: &action_ids,
        skip_status: settings.skip_status,
        artifacts_dir: &settings.artifacts_dir,
    };
    let outcome = match run_checkin(client, &request).await {
        Ok(outcome) => outcome,
        Err(e) => {
            print_failure(&format!("network error: {}", e));
            return ExitStatus::Error;
        }
    };

    let status = outcome.exit_status();
    if status == ExitStatus::Ok {
        println!("{} {}", "✓".green().bold(), outcome.message());
    } else {
        print_failure(&outcome.message());
    }
    if let CheckinOutcome::ActionNotFound { .. } = outcome {
        eprintln!(
            "  Run `ldcheckin discover --base-url {}` or update {}.",
            base_url,
            settings.action_config_file.display()
        );
    }
    status
}

pub async fn handle_checkin(args: &ArgMatches) -> anyhow::Result<ExitStatus> {
    let timeout = validate_timeout(
        args.get_one::<u64>("timeout-seconds")
            .copied()
            .unwrap_or(DEFAULT_TIMEOUT_SECONDS),
    )
    .map_err(anyhow::Error::msg)?;
    let user_agent = args
        .get_one::<String>("user-agent")
        .map(String::as_str)
        .unwrap_or(DEFAULT_USER_AGENT);
    let client = ShopClient::new(timeout, user_agent).context("failed to build HTTP client")?;
    let settings = CheckinSettings::from_matches(args);

    if !args.get_flag("run-all") {
        let base_url = args
            .get_one::<String>("base-url")
            .map(String::as_str)
            .unwrap_or(DEFAULT_BASE_URL);
        return Ok(checkin_single_target(&client, &settings, base_url).await);
    }

    let settings = settings.for_all_shops();
    let mut summary = RunSummary::new();
    for shop in all_shop_urls() {
        if let Ok(url) = Url::parse(&shop) {
            print_heading(&url);
        }
        let status = checkin_single_target(&client, &settings, &shop).await;
        summary.record(shop, status);
    }

    print!("{}", summary.generate_report());
    Ok(summary.exit_status())
}
