use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::core::verification::{classify, format_international, normalize_phone, Decision, JoinEvent};

#[derive(Parser)]
#[command(name = "pinoy-gate")]
#[command(author, version, about = "Telegram join-request gate that admits Philippine phone numbers", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the bot in normal mode
    Run {
        /// Use webhook mode instead of long polling
        #[arg(long)]
        webhook: bool,

        /// Keep verification state in memory instead of SQLite
        #[arg(long)]
        ephemeral: bool,
    },

    /// Classify a phone number offline, without contacting Telegram
    Check {
        /// Phone number as a user would share it
        phone: String,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Result of the `check` subcommand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    pub input: String,
    pub normalized: String,
    pub formatted: String,
    pub decision: Decision,
}

pub fn check_phone(phone: &str) -> CheckReport {
    let event = JoinEvent::from_contact(0, phone);
    CheckReport {
        input: phone.to_string(),
        normalized: normalize_phone(phone),
        formatted: format_international(phone),
        decision: classify(&event),
    }
}

/// Renders a `CheckReport` for the terminal.
pub fn render_check(report: &CheckReport, json: bool) -> anyhow::Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(report)?);
    }
    Ok(format!(
        "input:      {}\nnormalized: {}\nformatted:  {}\ndecision:   {}",
        report.input, report.normalized, report.formatted, report.decision
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_check_local_number() {
        let report = check_phone("0917-123-4567");
        assert_eq!(report.normalized, "+639171234567");
        assert_eq!(report.formatted, "+63 917 123 4567");
        assert_eq!(report.decision, Decision::Approve);
    }

    #[test]
    fn test_check_foreign_number() {
        assert_eq!(check_phone("+1 415 555 2671").decision, Decision::Block);
    }

    #[test]
    fn test_check_blank_is_pending() {
        assert_eq!(check_phone("   ").decision, Decision::awaiting_phone());
    }

    #[test]
    fn test_render_json() {
        let rendered = render_check(&check_phone("+639171234567"), true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["decision"]["decision"], "approve");
        assert_eq!(value["normalized"], "+639171234567");
    }

    #[test]
    fn test_render_text() {
        let rendered = render_check(&check_phone("+14155552671"), false).unwrap();
        assert!(rendered.contains("normalized: +14155552671"));
    }

    #[test]
    fn test_cli_parses_run_flags() {
        let cli = Cli::try_parse_from(["pinoy-gate", "run", "--webhook", "--ephemeral"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Run {
                webhook: true,
                ephemeral: true
            })
        ));
    }
}
