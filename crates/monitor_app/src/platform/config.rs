use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use monitor_engine::{MonitorSettings, ServiceSettings};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use super::cli::Cli;
use super::logging::LogDestination;

const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/";
const DEFAULT_RESULTS_TEMPLATE: &str = "{base_url}projects/{job_id}/results";
const DEFAULT_LOG_PATH: &str = "./job-monitor.log";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not parse config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
    #[error("invalid base url {url:?}: {source}")]
    BaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Contents of the optional RON configuration file. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub base_url: Option<String>,
    pub bearer_token: Option<String>,
    /// Results page; `{base_url}` and `{job_id}` are substituted.
    pub results_url: Option<String>,
    pub connect_timeout_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub poll_interval_ms: Option<u64>,
    pub clock_interval_ms: Option<u64>,
    pub log_path: Option<PathBuf>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        ron::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Fully resolved settings: CLI flags over file values over defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub job_id: String,
    pub service: ServiceSettings,
    pub monitor: MonitorSettings,
    pub results_url_template: String,
    pub log_destination: LogDestination,
    pub log_path: PathBuf,
}

impl AppConfig {
    pub fn resolve(cli: &Cli) -> Result<Self, ConfigError> {
        let file = match &cli.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Self::merge(cli, file)
    }

    fn merge(cli: &Cli, file: FileConfig) -> Result<Self, ConfigError> {
        let raw_base = cli
            .base_url
            .clone()
            .or(file.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = parse_base_url(&raw_base)?;

        let mut service = ServiceSettings::new(base_url.clone());
        if let Some(secs) = file.connect_timeout_secs {
            service.connect_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = file.request_timeout_secs {
            service.request_timeout = Duration::from_secs(secs);
        }
        service.bearer_token = cli.token.clone().or(file.bearer_token);

        let mut monitor = MonitorSettings::default();
        if let Some(ms) = file.poll_interval_ms {
            monitor.poll_interval = Duration::from_millis(ms);
        }
        if let Some(ms) = file.clock_interval_ms {
            monitor.clock_interval = Duration::from_millis(ms);
        }

        let results_url_template = file
            .results_url
            .unwrap_or_else(|| DEFAULT_RESULTS_TEMPLATE.to_string())
            .replace("{base_url}", base_url.as_str());

        Ok(Self {
            job_id: cli.job_id.clone(),
            service,
            monitor,
            results_url_template,
            log_destination: cli.log,
            log_path: file
                .log_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_PATH)),
        })
    }

    pub fn results_url(&self, job_id: &str) -> String {
        self.results_url_template.replace("{job_id}", job_id)
    }
}

/// Parses the API base, forcing a trailing slash so relative joins keep its path.
fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    Url::parse(&normalized).map_err(|source| ConfigError::BaseUrl {
        url: raw.to_string(),
        source,
    })
}
