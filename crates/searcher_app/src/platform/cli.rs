use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogMode {
    File,
    Terminal,
    Both,
    Off,
}

#[derive(Parser, Debug)]
#[command(
    name = "searcher",
    version,
    about = "Streams search results and a generated answer from a search service"
)]
/// Command-line arguments accepted by the `searcher` binary.
pub struct CliArgs {
    /// Query to run; omit it to start from the interactive prompt.
    pub query: Option<String>,
    #[arg(
        short,
        long = "config",
        value_name = "FILE",
        env = "SEARCHER_CONFIG",
        help = "RON configuration file (default: none)"
    )]
    pub config: Option<PathBuf>,
    #[arg(
        short,
        long,
        value_name = "URL",
        env = "SEARCHER_ENDPOINT",
        help = "Search endpoint serving the event stream"
    )]
    pub endpoint: Option<String>,
    #[arg(
        long = "history-dir",
        value_name = "DIR",
        env = "SEARCHER_HISTORY_DIR",
        help = "Directory holding the search history"
    )]
    pub history_dir: Option<PathBuf>,
    #[arg(
        short = 't',
        long = "type",
        value_name = "TYPE",
        action = ArgAction::Append,
        help = "Only show documents of this type (web, pdf, word, excel, ppt, zip, file)"
    )]
    pub types: Vec<String>,
    #[arg(short, long, default_value_t = 1, help = "Result page to show")]
    pub page: usize,
    #[arg(
        short,
        long,
        help = "Keep running and read further queries and commands from stdin"
    )]
    pub interactive: bool,
    #[arg(long = "show-history", help = "Print the stored search history and exit")]
    pub show_history: bool,
    #[arg(long, value_enum, help = "Where log output goes (default: file)")]
    pub log: Option<LogMode>,
    #[arg(long = "log-file", value_name = "FILE", help = "Log file path")]
    pub log_file: Option<PathBuf>,
    #[arg(short, long, help = "Log debug messages")]
    pub verbose: bool,
}
