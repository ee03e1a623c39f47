use colored::Colorize;
use commands::command_argument_builder;
use ldcheckin::handlers::{handle_checkin, handle_discover};
use ldcheckin_core::ExitStatus;
use tracing::Level;

mod commands;

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");
    let level = if chosen_command.get_flag("verbose") {
        Level::DEBUG
    } else {
        Level::WARN
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match chosen_command.subcommand() {
        Some(("discover", primary_command)) => handle_discover(primary_command, quiet).await,
        Some(("checkin", primary_command)) => handle_checkin(primary_command).await,
        _ => unreachable!("clap should ensure we don't get here"),
    };

    let status = result.unwrap_or_else(|e| {
        eprintln!("{} {:#}", "✗".red().bold(), e);
        ExitStatus::Error
    });
    std::process::exit(status.code());
}

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);
