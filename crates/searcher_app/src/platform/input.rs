//! Interactive prompt commands.

use searcher_core::{DocType, TypeChoice};

pub const HELP: &str = "\
Type a query to search, or a command:
  :type <all|web|pdf|word|excel|ppt|zip|file>   toggle a type filter
  :page <n>                                      show result page n
  :history                                       list recent queries
  :recall <n>                                    rerun history entry n
  :help                                          show this help
  :quit                                          exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputCommand {
    Search(String),
    ToggleType(TypeChoice),
    Page(usize),
    History,
    Recall(usize),
    Help,
    Quit,
    Invalid(String),
}

pub fn parse_command(line: &str) -> Option<InputCommand> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let Some(command) = line.strip_prefix(':') else {
        return Some(InputCommand::Search(line.to_string()));
    };

    let mut parts = command.split_whitespace();
    let name = parts.next().unwrap_or("");
    let arg = parts.next();
    let parsed = match (name, arg) {
        ("type" | "t", Some("all")) => Some(InputCommand::ToggleType(TypeChoice::All)),
        ("type" | "t", Some(raw)) => {
            DocType::parse(raw).map(|ty| InputCommand::ToggleType(TypeChoice::Type(ty)))
        }
        ("page" | "p", Some(raw)) => raw.parse().ok().map(InputCommand::Page),
        ("history" | "h", None) => Some(InputCommand::History),
        ("recall" | "r", Some(raw)) => raw.parse().ok().map(InputCommand::Recall),
        ("help" | "?", None) => Some(InputCommand::Help),
        ("quit" | "q", None) => Some(InputCommand::Quit),
        _ => None,
    };
    Some(parsed.unwrap_or_else(|| InputCommand::Invalid(line.to_string())))
}
