use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use chrono_tz::Tz;
use serde::Deserialize;

use crate::dedup::DEFAULT_STOP_WORDS;
use crate::filter::DEFAULT_KEYWORDS;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Where the snapshot JSON is written
    #[serde(default = "default_output")]
    pub output: PathBuf,
    /// IANA zone whose wall clock decides the morning/evening slot
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Per-source request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_per_source_max")]
    pub per_source_max: usize,
    #[serde(default = "default_max_items")]
    pub max_items: usize,
    /// Number of feeds fetched in parallel
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,
    #[serde(default = "default_stop_words")]
    pub stop_words: Vec<String>,
    pub feeds: Vec<SourceConfig>,
}

fn default_output() -> PathBuf {
    PathBuf::from("public/news.json")
}

fn default_timezone() -> String {
    "America/New_York".to_string()
}

fn default_request_timeout_secs() -> u64 {
    15
}

fn default_per_source_max() -> usize {
    6
}

fn default_max_items() -> usize {
    20
}

fn default_concurrency() -> usize {
    4
}

fn default_keywords() -> Vec<String> {
    DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect()
}

fn default_stop_words() -> Vec<String> {
    DEFAULT_STOP_WORDS.iter().map(|w| w.to_string()).collect()
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SourceConfig {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub homepage: Option<String>,
    pub url: String,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_str(&content)
    }

    /// Parse config from a TOML string (useful for testing)
    pub fn from_str(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.tz()?;
        if self.per_source_max == 0 {
            bail!("per_source_max must be at least 1");
        }
        if self.max_items == 0 {
            bail!("max_items must be at least 1");
        }
        if self.concurrency == 0 {
            bail!("concurrency must be at least 1");
        }

        let mut ids = HashSet::new();
        for feed in &self.feeds {
            if !ids.insert(feed.id.as_str()) {
                bail!("duplicate feed id '{}'", feed.id);
            }
            if feed.url.trim().is_empty() {
                bail!("feed '{}' has an empty url", feed.id);
            }
        }
        Ok(())
    }

    pub fn tz(&self) -> anyhow::Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| anyhow::anyhow!("invalid timezone '{}': {}", self.timezone, e))
    }
}
