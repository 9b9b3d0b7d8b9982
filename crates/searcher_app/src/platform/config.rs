//! Runtime configuration: optional RON file, overridden by command-line flags.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context};
use log::LevelFilter;
use searcher_core::DocType;
use searcher_engine::StreamSettings;
use serde::Deserialize;
use url::Url;

use super::cli::{CliArgs, LogMode};

const DEFAULT_STATE_DIR: &str = ".searcher";
const DEFAULT_LOG_FILE: &str = "searcher.log";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub endpoint: Option<String>,
    pub history_dir: Option<PathBuf>,
    pub connect_timeout_secs: Option<u64>,
    pub log: Option<LogMode>,
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub stream: StreamSettings,
    /// Server origin used to build preview and download links.
    pub origin: Url,
    pub history_dir: PathBuf,
    pub log: LogMode,
    pub log_file: PathBuf,
    pub log_level: LevelFilter,
    /// Types preselected in the filter; repeated flags collapse into one.
    pub types: BTreeSet<DocType>,
}

pub fn load_file_config(path: &Path) -> anyhow::Result<FileConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading config file {}", path.display()))?;
    ron::from_str(&text).with_context(|| format!("parsing config file {}", path.display()))
}

pub fn resolve(args: &CliArgs, file: FileConfig) -> anyhow::Result<AppConfig> {
    let defaults = StreamSettings::default();
    let endpoint = args
        .endpoint
        .clone()
        .or(file.endpoint)
        .unwrap_or(defaults.endpoint.clone());
    let origin = Url::parse(&endpoint).with_context(|| format!("invalid endpoint {endpoint}"))?;
    if !matches!(origin.scheme(), "http" | "https") {
        bail!("endpoint must be an http(s) url, got {endpoint}");
    }

    let connect_timeout = file
        .connect_timeout_secs
        .map(Duration::from_secs)
        .unwrap_or(defaults.connect_timeout);

    let state_dir = std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(DEFAULT_STATE_DIR);
    let history_dir = args
        .history_dir
        .clone()
        .or(file.history_dir)
        .unwrap_or(state_dir);

    let types = args
        .types
        .iter()
        .map(|raw| DocType::parse(raw).with_context(|| format!("unknown document type {raw:?}")))
        .collect::<anyhow::Result<BTreeSet<_>>>()?;

    Ok(AppConfig {
        stream: StreamSettings {
            endpoint,
            connect_timeout,
            ..defaults
        },
        origin,
        history_dir,
        log: args.log.or(file.log).unwrap_or(LogMode::File),
        log_file: args
            .log_file
            .clone()
            .or(file.log_file)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE)),
        log_level: if args.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        },
        types,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;

    fn args(argv: &[&str]) -> CliArgs {
        CliArgs::parse_from(std::iter::once("searcher").chain(argv.iter().copied()))
    }

    #[test]
    fn file_config_parses_from_ron() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("searcher.ron");
        fs::write(
            &path,
            r#"(endpoint: Some("http://search.lan:8080/api/search"), connect_timeout_secs: Some(3), log: Some(off))"#,
        )
        .unwrap();

        let file = load_file_config(&path).unwrap();
        assert_eq!(
            file,
            FileConfig {
                endpoint: Some("http://search.lan:8080/api/search".to_string()),
                connect_timeout_secs: Some(3),
                log: Some(LogMode::Off),
                ..FileConfig::default()
            }
        );
    }

    #[test]
    fn flags_override_file_values() {
        let file = FileConfig {
            endpoint: Some("http://from-file/api/search".to_string()),
            connect_timeout_secs: Some(3),
            log: Some(LogMode::Both),
            ..FileConfig::default()
        };
        let config = resolve(
            &args(&["-e", "https://cli.example/api/search", "--log", "off", "-t", "PDF", "q"]),
            file,
        )
        .unwrap();

        assert_eq!(config.stream.endpoint, "https://cli.example/api/search");
        assert_eq!(config.origin.host_str(), Some("cli.example"));
        assert_eq!(config.stream.connect_timeout, Duration::from_secs(3));
        assert_eq!(config.log, LogMode::Off);
        assert_eq!(config.types, BTreeSet::from([DocType::Pdf]));
    }

    #[test]
    fn repeated_type_flags_select_the_type_once() {
        let config = resolve(
            &args(&["-t", "pdf", "-t", "PDF", "-t", "zip", "q"]),
            FileConfig::default(),
        )
        .unwrap();
        assert_eq!(config.types, BTreeSet::from([DocType::Pdf, DocType::Zip]));
    }

    #[test]
    fn rejects_bad_endpoint_and_types() {
        assert!(resolve(&args(&["-e", "ftp://x/y"]), FileConfig::default()).is_err());
        assert!(resolve(&args(&["-e", "::"]), FileConfig::default()).is_err());
        assert!(resolve(&args(&["-t", "video"]), FileConfig::default()).is_err());
    }
}
