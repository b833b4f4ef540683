//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Registry page location and structure
    #[serde(default)]
    pub source: SourceConfig,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Selection and rendering limits
    #[serde(default)]
    pub announce: AnnounceConfig,

    /// Where notification state lives
    #[serde(default)]
    pub state: StateConfig,

    /// Where announcements go
    #[serde(default)]
    pub publisher: PublisherConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration, or the defaults if the file does not exist.
    ///
    /// A file that exists but cannot be read or parsed is an error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        match Self::load(&path) {
            Err(AppError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                log::warn!(
                    "No config at {:?}. Using defaults.",
                    path.as_ref()
                );
                Ok(Self::default())
            }
            result => result,
        }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::validation("http.timeout_secs must be > 0"));
        }
        url::Url::parse(&self.source.url)
            .map_err(|e| AppError::validation(format!("source.url is invalid: {e}")))?;
        url::Url::parse(&self.source.origin)
            .map_err(|e| AppError::validation(format!("source.origin is invalid: {e}")))?;
        if self.source.block_selector.trim().is_empty() {
            return Err(AppError::validation("source.block_selector is empty"));
        }
        if self.announce.alias_cap == 0 {
            return Err(AppError::validation("announce.alias_cap must be > 0"));
        }
        if self.announce.max_per_run == 0 {
            return Err(AppError::validation("announce.max_per_run must be > 0"));
        }
        if self.publisher.kind == PublisherKind::Webhook && self.publisher.endpoint.is_none() {
            return Err(AppError::validation(
                "publisher.endpoint is required for the webhook publisher",
            ));
        }
        Ok(())
    }
}

/// Registry page settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Page listing current applications
    #[serde(default = "defaults::source_url")]
    pub url: String,

    /// Origin prefixed to relative image URLs
    #[serde(default = "defaults::origin")]
    pub origin: String,

    /// CSS selector for one application block
    #[serde(default = "defaults::block_selector")]
    pub block_selector: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: defaults::source_url(),
            origin: defaults::origin(),
            block_selector: defaults::block_selector(),
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Which records go first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderPolicy {
    /// Reverse of page order; the page lists newest first
    #[default]
    OldestFirst,
    /// Page order
    DocumentOrder,
}

/// Announcement limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnounceConfig {
    #[serde(default)]
    pub order: OrderPolicy,

    /// Message length (in characters) that alias lines must stay under
    #[serde(default = "defaults::alias_cap")]
    pub alias_cap: usize,

    /// Maximum emblems attached to one announcement
    #[serde(default = "defaults::emblem_cap")]
    pub emblem_cap: usize,

    /// Publish attempts per invocation
    #[serde(default = "defaults::max_per_run")]
    pub max_per_run: usize,
}

impl Default for AnnounceConfig {
    fn default() -> Self {
        Self {
            order: OrderPolicy::default(),
            alias_cap: defaults::alias_cap(),
            emblem_cap: defaults::emblem_cap(),
            max_per_run: defaults::max_per_run(),
        }
    }
}

/// State file settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateConfig {
    #[serde(default = "defaults::state_path")]
    pub path: PathBuf,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            path: defaults::state_path(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublisherKind {
    /// Log announcements instead of sending them
    #[default]
    DryRun,
    /// POST announcements as JSON
    Webhook,
}

/// Publisher settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PublisherConfig {
    #[serde(default)]
    pub kind: PublisherKind,

    /// Target URL for the webhook publisher
    #[serde(default)]
    pub endpoint: Option<String>,
}

mod defaults {
    use std::path::PathBuf;

    pub fn source_url() -> String {
        "https://www.electoralcommission.org.uk/who-we-are-and-what-we-do/party-registration-applications/view-current-applications".into()
    }
    pub fn origin() -> String {
        "https://www.electoralcommission.org.uk".into()
    }
    pub fn block_selector() -> String {
        "div.c-accordion".into()
    }

    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; partywatch/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }

    pub fn alias_cap() -> usize {
        220
    }
    pub fn emblem_cap() -> usize {
        4
    }
    pub fn max_per_run() -> usize {
        1
    }

    pub fn state_path() -> PathBuf {
        PathBuf::from("partywatch.json")
    }
}
