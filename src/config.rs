//! Scraper configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";
pub const DEFAULT_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";

/// Configuration for fetching and caching
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Lifetime of a cached page (seconds)
    pub cache_ttl_secs: u64,

    /// Request timeout (seconds)
    pub timeout_secs: u64,

    pub user_agent: String,

    pub accept: String,

    /// Maximum redirect hops followed
    pub max_redirects: usize,

    /// Honour `HTTP_PROXY`/`HTTPS_PROXY` from the environment
    pub use_system_proxy: bool,

    /// Case-sensitive substrings that mark a page as a bot challenge
    pub block_markers: Vec<String>,

    /// Where the raw body of every fetch is dumped; `None` disables the dump
    pub debug_dump_path: Option<PathBuf>,
}

impl ScraperConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Same config without the on-disk debug dump
    pub fn without_debug_dump(mut self) -> Self {
        self.debug_dump_path = None;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than 0".to_string());
        }
        if self.user_agent.trim().is_empty() {
            return Err("user_agent must not be empty".to_string());
        }
        if self.block_markers.iter().any(|m| m.is_empty()) {
            return Err("block_markers must not contain empty strings".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        let config: Self =
            toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, String> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        Self::from_toml(&contents)
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: 3600,
            timeout_secs: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept: DEFAULT_ACCEPT.to_string(),
            max_redirects: 10,
            use_system_proxy: true,
            block_markers: vec!["captcha".to_string(), "human".to_string()],
            debug_dump_path: Some(PathBuf::from("debug.html")),
        }
    }
}
