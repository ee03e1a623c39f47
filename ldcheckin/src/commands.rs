use crate::CLAP_STYLING;
use clap::{Arg, arg, command};
use ldcheckin_core::constants::{
    DEFAULT_ACTION_CONFIG_FILE, DEFAULT_ARTIFACTS_DIR, DEFAULT_BASE_URL, DEFAULT_COOKIE_ENV,
};
use ldcheckin_scanner::DEFAULT_USER_AGENT;

/// Flags shared by `discover` and `checkin`.
fn common_args() -> Vec<Arg> {
    vec![
        arg!(--"base-url" <URL>)
            .required(false)
            .help("Shop URL or bare host")
            .default_value(DEFAULT_BASE_URL),
        arg!(--"run-all")
            .required(false)
            .help("Process every built-in shop in turn")
            .action(clap::ArgAction::SetTrue),
        arg!(--"cookie" <COOKIE>)
            .required(false)
            .help("Cookie string (not recommended: ends up in shell history)"),
        arg!(--"cookie-env" <NAME>)
            .required(false)
            .help("Environment variable holding the cookie")
            .default_value(DEFAULT_COOKIE_ENV),
        arg!(--"cookie-file" <PATH>)
            .required(false)
            .help("Cookie file (default: mapped from the shop host)"),
        arg!(--"action-config-file" <PATH>)
            .required(false)
            .help("JSON file mapping hosts to action ids")
            .default_value(DEFAULT_ACTION_CONFIG_FILE),
        arg!(--"timeout-seconds" <SECONDS>)
            .required(false)
            .help("Request timeout in seconds (at least 5)")
            .value_parser(clap::value_parser!(u64))
            .default_value("30"),
        arg!(--"user-agent" <UA>)
            .required(false)
            .help("User-Agent header (default: Chrome/Linux)")
            .default_value(DEFAULT_USER_AGENT),
    ]
}

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("ldcheckin")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("ldcheckin")
        .styles(CLAP_STYLING)
        .arg(
            arg!(-q --"quiet" "Suppress progress and non-essential output")
                .required(false)
                .global(true),
        )
        .arg(
            arg!(-v --"verbose" "Log requests and probe decisions")
                .required(false)
                .global(true),
        )
        .subcommand_required(true)
        .subcommand(
            command!("discover")
                .about(
                    "Find the status and check-in server action ids of a shop and store them in \
                the action config file.",
                )
                .args(common_args())
                .arg(
                    arg!(--"url-file" <PATH>)
                        .required(false)
                        .help("Newline-delimited file of shop URLs or hosts")
                        .value_parser(clap::value_parser!(std::path::PathBuf))
                        .conflicts_with("run-all"),
                )
                .arg(
                    arg!(--"max-js-files" <NUM>)
                        .required(false)
                        .help("Maximum number of static JS files to scan")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("30"),
                )
                .arg(
                    arg!(--"max-candidates-test" <NUM>)
                        .required(false)
                        .help("Maximum number of candidate ids to probe")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("200"),
                )
                .arg(
                    arg!(--"max-cookie-probe-tests" <NUM>)
                        .required(false)
                        .help("Maximum number of probes sent with the cookie per role")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("50"),
                ),
        )
        .subcommand(
            command!("checkin")
                .about("Run the daily check-in on a shop, or on every built-in shop.")
                .args(common_args())
                .arg(
                    arg!(--"artifacts-dir" <PATH>)
                        .required(false)
                        .help("Directory for debug responses on failure")
                        .default_value(DEFAULT_ARTIFACTS_DIR),
                )
                .arg(
                    arg!(--"status-action-id" <ID>)
                        .required(false)
                        .help("Status action id (pair with --checkin-action-id)"),
                )
                .arg(
                    arg!(--"checkin-action-id" <ID>)
                        .required(false)
                        .help("Check-in action id (pair with --status-action-id)"),
                )
                .arg(
                    arg!(--"skip-status")
                        .required(false)
                        .help("Skip the status query and check in directly")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_definition_is_valid() {
        command_argument_builder().debug_assert();
    }

    #[test]
    fn test_checkin_defaults() {
        let matches =
            command_argument_builder().get_matches_from(["ldcheckin", "checkin", "--skip-status"]);
        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, "checkin");
        assert!(sub.get_flag("skip-status"));
        assert_eq!(sub.get_one::<u64>("timeout-seconds"), Some(&30));
        assert_eq!(
            sub.get_one::<String>("base-url").map(String::as_str),
            Some(DEFAULT_BASE_URL)
        );
    }

    #[test]
    fn test_discover_rejects_run_all_with_url_file() {
        let result = command_argument_builder().try_get_matches_from([
            "ldcheckin",
            "discover",
            "--run-all",
            "--url-file",
            "urls.txt",
        ]);
        assert!(result.is_err());
    }
}
