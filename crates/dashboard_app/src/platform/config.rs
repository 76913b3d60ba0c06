use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context};
use dashboard_engine::{EngineConfig, FetchSettings, ProxyMode, SourceConfig, ALLORIGINS_ENDPOINT};
use serde::{Deserialize, Serialize};

use super::cli::Cli;
use super::logging::LogDestination;

const DEFAULT_CONFIG_FILE: &str = "dashboard.ron";
const DEFAULT_PROFILE: &str = "ur14323971";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceSetting {
    /// Scrape HTML; `proxy: None` fetches pages directly.
    Scrape { proxy: Option<String> },
    Api { base_url: String },
}

/// Settings read from `dashboard.ron`; every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub profile: String,
    pub source: SourceSetting,
    pub concurrency: usize,
    pub request_timeout_secs: Option<u64>,
    pub max_bytes: u64,
    pub log: LogDestination,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            profile: DEFAULT_PROFILE.to_string(),
            source: SourceSetting::Scrape {
                proxy: Some(ALLORIGINS_ENDPOINT.to_string()),
            },
            concurrency: 1,
            request_timeout_secs: None,
            max_bytes: FetchSettings::default().max_bytes,
            log: LogDestination::default(),
        }
    }
}

impl DashboardConfig {
    /// Loads `path`, or `./dashboard.ron` when no path is given. Only an
    /// explicitly named file is required to exist. Also returns the file that
    /// was actually read.
    pub fn load(path: Option<&Path>) -> anyhow::Result<(Self, Option<PathBuf>)> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        let content = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound && !required => {
                return Ok((Self::default(), None));
            }
            Err(err) => {
                return Err(err).with_context(|| format!("reading config {}", path.display()))
            }
        };

        let config = Self::parse(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok((config, Some(path)))
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let config: Self = ron::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_ron(&self) -> anyhow::Result<String> {
        Ok(ron::ser::to_string_pretty(
            self,
            ron::ser::PrettyConfig::new(),
        )?)
    }

    /// Command-line flags win over file values.
    pub fn with_overrides(mut self, cli: &Cli) -> anyhow::Result<Self> {
        if let Some(profile) = &cli.profile {
            self.profile = profile.clone();
        }
        if let Some(base_url) = &cli.api {
            self.source = SourceSetting::Api {
                base_url: base_url.clone(),
            };
        } else if cli.direct {
            self.source = SourceSetting::Scrape { proxy: None };
        } else if let Some(proxy) = &cli.proxy {
            self.source = SourceSetting::Scrape {
                proxy: Some(proxy.clone()),
            };
        }
        if let Some(concurrency) = cli.concurrency {
            self.concurrency = concurrency;
        }
        if let Some(timeout) = cli.timeout {
            self.request_timeout_secs = Some(timeout);
        }
        if let Some(log) = cli.log {
            self.log = log;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn engine_config(&self) -> EngineConfig {
        let source = match &self.source {
            SourceSetting::Scrape { proxy: None } => SourceConfig::Scrape {
                proxy: ProxyMode::Direct,
            },
            SourceSetting::Scrape {
                proxy: Some(endpoint),
            } => SourceConfig::Scrape {
                proxy: ProxyMode::AllOrigins {
                    endpoint: endpoint.clone(),
                },
            },
            SourceSetting::Api { base_url } => SourceConfig::Api {
                base_url: base_url.clone(),
            },
        };
        EngineConfig {
            source,
            fetch: FetchSettings {
                request_timeout: self.request_timeout_secs.map(Duration::from_secs),
                max_bytes: self.max_bytes,
                ..FetchSettings::default()
            },
            concurrency: self.concurrency,
        }
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.concurrency == 0 {
            bail!("concurrency must be at least 1");
        }
        if self.max_bytes == 0 {
            bail!("max_bytes must be positive");
        }
        Ok(())
    }
}
