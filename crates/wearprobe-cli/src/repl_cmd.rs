//! `wearprobe repl` command: drive the harness interactively from stdin.

use std::io;
use std::str::FromStr;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::config::WearprobeConfig;
use crate::run_cmd::build_harness;
use crate::surface::{self, LogTail};

/// A line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Register,
    Unregister,
    Configure,
    Clear,
    Link(String),
    Status,
    Json,
    Help,
    Quit,
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplParseError(pub String);

impl std::fmt::Display for ReplParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown command: {:?} (try `help`)", self.0)
    }
}

impl std::error::Error for ReplParseError {}

impl FromStr for ReplCommand {
    type Err = ReplParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let line = s.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((w, r)) => (w, r.trim()),
            None => (line, ""),
        };
        match (word, rest) {
            ("", _) => Ok(Self::Empty),
            ("register" | "r", "") => Ok(Self::Register),
            ("unregister" | "u", "") => Ok(Self::Unregister),
            ("configure", "") => Ok(Self::Configure),
            ("clear" | "c", "") => Ok(Self::Clear),
            ("link" | "l", url) if !url.is_empty() => Ok(Self::Link(url.to_string())),
            ("status" | "s", "") => Ok(Self::Status),
            ("json", "") => Ok(Self::Json),
            ("help" | "?", "") => Ok(Self::Help),
            ("quit" | "exit" | "q", "") => Ok(Self::Quit),
            _ => Err(ReplParseError(line.to_string())),
        }
    }
}

const HELP: &str = "\
Commands:
  register | r       Call startRegistration()
  unregister | u     Call startUnregistration()
  configure          Call configure() again
  link <url> | l     Hand a deep link to the SDK
  clear | c          Clear the log
  status | s         Show config, configure status and registration state
  json               Print the harness snapshot as JSON
  help | ?           Show this help
  quit | q           Exit";

/// Run the repl command.
pub async fn run_repl(config: &WearprobeConfig) -> Result<()> {
    let mut harness = build_harness(config);
    let mut tail = LogTail::default();
    let mut stdout = io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    harness.start();
    surface::write_summary(&harness.snapshot(), &mut stdout)?;
    println!("Type `help` for commands.");
    tail.print_new(&harness, &mut stdout)?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read stdin")? else {
                    break;
                };
                match line.parse::<ReplCommand>() {
                    Ok(ReplCommand::Quit) => break,
                    Ok(ReplCommand::Empty) => {}
                    Ok(ReplCommand::Register) => harness.register(),
                    Ok(ReplCommand::Unregister) => harness.unregister(),
                    Ok(ReplCommand::Configure) => {
                        harness.configure();
                    }
                    Ok(ReplCommand::Clear) => harness.clear_log(),
                    Ok(ReplCommand::Link(url)) => harness.handle_incoming_link(url),
                    Ok(ReplCommand::Status) => {
                        surface::write_summary(&harness.snapshot(), &mut stdout)?;
                    }
                    Ok(ReplCommand::Json) => {
                        let json = serde_json::to_string_pretty(&harness.snapshot())
                            .context("failed to serialize snapshot")?;
                        println!("{json}");
                    }
                    Ok(ReplCommand::Help) => println!("{HELP}"),
                    Err(e) => println!("{e}"),
                }
            }
            open = harness.process_next() => {
                if !open {
                    break;
                }
            }
        }
        tail.print_new(&harness, &mut stdout)?;
    }

    harness.teardown();
    tail.print_new(&harness, &mut stdout)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_commands_and_aliases() {
        assert_eq!("register".parse(), Ok(ReplCommand::Register));
        assert_eq!("  r ".parse(), Ok(ReplCommand::Register));
        assert_eq!("u".parse(), Ok(ReplCommand::Unregister));
        assert_eq!("clear".parse(), Ok(ReplCommand::Clear));
        assert_eq!("q".parse(), Ok(ReplCommand::Quit));
        assert_eq!("".parse(), Ok(ReplCommand::Empty));
    }

    #[test]
    fn parses_link_with_url() {
        assert_eq!(
            "link wearprobe://cb?x=1".parse(),
            Ok(ReplCommand::Link("wearprobe://cb?x=1".to_string()))
        );
    }

    #[test]
    fn link_without_url_is_rejected() {
        assert!("link".parse::<ReplCommand>().is_err());
        assert!("link   ".parse::<ReplCommand>().is_err());
    }

    #[test]
    fn unknown_and_extra_arguments_are_rejected() {
        let err = "pair now".parse::<ReplCommand>().unwrap_err();
        assert!(err.to_string().contains("pair now"));
        assert!("register twice".parse::<ReplCommand>().is_err());
    }
}
