//! Prompt input parsed into controller commands and local view requests.

use client_core::Command;
use shared::domain::ClusterId;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Stats,
    Clusters,
    Results,
}

/// Work queued from the prompt to the controller worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerRequest {
    Run(Command),
    Show(View),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptCommand {
    Worker(WorkerRequest),
    /// Answered from the shared notification board, never queued.
    Notifications,
    Dismiss(u64),
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty input")]
    Empty,
    #[error("unknown command '{0}'; type 'help' for the list")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("'{value}' is not a valid {what}")]
    InvalidNumber { what: &'static str, value: String },
}

pub const HELP: &str = "\
commands:
  load | reload         fetch statistics and clusters again
  stats                 show corpus statistics
  clusters              show cluster cards with current ratings
  rate <id> <1-10>      set your interest in a cluster
  recluster <2-50>      recompute clusters and regenerate summaries
  generate              submit ratings and fetch recommendations
  results               show the last recommendations
  reset | start-over    put every rating back to 5
  export                save the last recommendations as JSON
  notifications         list active notifications
  dismiss <id>          dismiss a notification
  help                  show this help
  quit | exit           leave";

pub fn parse(line: &str) -> Result<PromptCommand, ParseError> {
    let mut parts = line.split_whitespace();
    let Some(head) = parts.next() else {
        return Err(ParseError::Empty);
    };
    let args: Vec<&str> = parts.collect();

    let command = match head.to_ascii_lowercase().as_str() {
        "help" | "?" => PromptCommand::Help,
        "quit" | "exit" => PromptCommand::Quit,
        "load" | "reload" => run(Command::Load),
        "stats" => show(View::Stats),
        "clusters" => show(View::Clusters),
        "results" => show(View::Results),
        "notifications" => PromptCommand::Notifications,
        "generate" => run(Command::Generate),
        "reset" | "start-over" => run(Command::Reset),
        "export" => run(Command::Export),
        "rate" => {
            let [id, value] = args.as_slice() else {
                return Err(ParseError::Usage("rate <cluster-id> <1-10>"));
            };
            run(Command::Rate {
                cluster_id: ClusterId(number(id, "cluster id")?),
                value: number(value, "rating")?,
            })
        }
        "recluster" => {
            let [n] = args.as_slice() else {
                return Err(ParseError::Usage("recluster <2-50>"));
            };
            run(Command::Recluster {
                num_clusters: number(n, "cluster count")?,
            })
        }
        "dismiss" => {
            let [id] = args.as_slice() else {
                return Err(ParseError::Usage("dismiss <notification-id>"));
            };
            PromptCommand::Dismiss(number(id, "notification id")?)
        }
        other => return Err(ParseError::Unknown(other.to_string())),
    };
    Ok(command)
}

fn run(command: Command) -> PromptCommand {
    PromptCommand::Worker(WorkerRequest::Run(command))
}

fn show(view: View) -> PromptCommand {
    PromptCommand::Worker(WorkerRequest::Show(view))
}

fn number<T: std::str::FromStr>(raw: &str, what: &'static str) -> Result<T, ParseError> {
    raw.parse().map_err(|_| ParseError::InvalidNumber {
        what,
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rate_with_arguments() {
        assert_eq!(
            parse("rate 3 9"),
            Ok(run(Command::Rate {
                cluster_id: ClusterId(3),
                value: 9
            }))
        );
    }

    #[test]
    fn out_of_range_rating_is_left_to_the_controller() {
        assert_eq!(
            parse("rate 3 42"),
            Ok(run(Command::Rate {
                cluster_id: ClusterId(3),
                value: 42
            }))
        );
    }

    #[test]
    fn rejects_malformed_numbers() {
        assert_eq!(
            parse("rate x 9"),
            Err(ParseError::InvalidNumber {
                what: "cluster id",
                value: "x".to_string()
            })
        );
        assert!(matches!(
            parse("rate 1 300"),
            Err(ParseError::InvalidNumber { what: "rating", .. })
        ));
    }

    #[test]
    fn wrong_arity_reports_usage() {
        assert_eq!(parse("recluster"), Err(ParseError::Usage("recluster <2-50>")));
        assert!(matches!(parse("rate 1"), Err(ParseError::Usage(_))));
    }

    #[test]
    fn aliases_and_case_are_accepted() {
        assert_eq!(parse("START-OVER"), Ok(run(Command::Reset)));
        assert_eq!(parse("  exit  "), Ok(PromptCommand::Quit));
        assert_eq!(
            parse("recluster 12"),
            Ok(run(Command::Recluster { num_clusters: 12 }))
        );
    }

    #[test]
    fn blank_and_unknown_input() {
        assert_eq!(parse("   "), Err(ParseError::Empty));
        assert_eq!(parse("fly"), Err(ParseError::Unknown("fly".to_string())));
    }

    #[test]
    fn notification_commands_stay_on_the_prompt() {
        assert_eq!(parse("notifications"), Ok(PromptCommand::Notifications));
        assert_eq!(parse("dismiss 4"), Ok(PromptCommand::Dismiss(4)));
    }

    #[test]
    fn every_command_word_is_listed_in_help() {
        for word in [
            "load", "reload", "stats", "clusters", "rate", "recluster", "generate", "results",
            "reset", "start-over", "export", "notifications", "dismiss", "help", "quit", "exit",
        ] {
            assert!(HELP.contains(word), "{word} missing from help");
        }
        assert_eq!(parse("reload"), Ok(run(Command::Load)));
    }
}
