//! Command-line parsing and dispatch for the `alert-errors` tool

use alert_errors::{AlertError, ErrorDataAccess};
use anyhow::{bail, Result};
use serde_json::{json, Value};
use std::collections::BTreeMap;

pub const USAGE: &str = "\
Usage: alert-errors <command>

Commands:
  failing         List currently failing alerts
  counts          Show failing alert count and total error events
  last <alert>    Show the most recent error for an alert
  history         Show the error history of every alert
  clear <alert>   Erase all error state for an alert
  clear-all       Erase all error state for every alert";

/// Parsed subcommand
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    Failing,
    Counts,
    Last(String),
    History,
    Clear(String),
    ClearAll,
}

impl CliCommand {
    /// Parse the arguments following the program name
    pub fn parse<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        let Some(command) = args.next() else {
            bail!("missing command\n\n{}", USAGE);
        };

        let parsed = match command.as_str() {
            "failing" => CliCommand::Failing,
            "counts" => CliCommand::Counts,
            "history" => CliCommand::History,
            "clear-all" => CliCommand::ClearAll,
            "last" | "clear" => {
                let Some(alert) = args.next().filter(|a| !a.trim().is_empty()) else {
                    bail!("'{}' requires an alert name\n\n{}", command, USAGE);
                };
                if command == "last" {
                    CliCommand::Last(alert)
                } else {
                    CliCommand::Clear(alert)
                }
            }
            other => bail!("unknown command '{}'\n\n{}", other, USAGE),
        };

        if let Some(extra) = args.next() {
            bail!("unexpected argument '{}'\n\n{}", extra, USAGE);
        }

        Ok(parsed)
    }
}

/// Execute `command` against `store`, producing JSON output
pub async fn run<S>(store: &S, command: CliCommand) -> Result<Value>
where
    S: ErrorDataAccess<AlertError>,
{
    let output = match command {
        CliCommand::Failing => {
            // Sorted for stable output
            let mut alerts: Vec<String> = store.get_failing_alerts().await?.into_iter().collect();
            alerts.sort();
            json!({ "failing": alerts })
        }
        CliCommand::Counts => {
            let counts = store.get_failing_alert_counts().await?;
            serde_json::to_value(counts)?
        }
        CliCommand::Last(alert) => {
            let last = store.get_last_event(&alert).await?;
            json!({ "alert": alert, "last": last })
        }
        CliCommand::History => {
            let history: BTreeMap<String, Vec<AlertError>> =
                store.get_full_error_history().await?.into_iter().collect();
            serde_json::to_value(history)?
        }
        CliCommand::Clear(alert) => {
            store.clear_alert(&alert).await?;
            json!({ "cleared": alert })
        }
        CliCommand::ClearAll => {
            store.clear_all().await?;
            json!({ "cleared": "all" })
        }
    };

    Ok(output)
}
