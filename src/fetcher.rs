//! Stealth page fetching
//!
//! Plain blocking GET dressed up with desktop-browser headers. Bodies that
//! look like a bot challenge are rejected instead of being handed to the
//! extractor.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use reqwest::blocking::Client;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::redirect::Policy;
use url::Url;

use crate::config::ScraperConfig;
use crate::error::{Result, ScrapeError};

/// Source of raw page HTML
pub trait Fetch: Send + Sync {
    fn fetch(&self, url: &str) -> Result<String>;
}

/// Diagnostic hook receiving every body before the block and status checks
pub trait DebugSink: Send + Sync {
    fn record(&self, url: &str, body: &str);
}

/// Overwrites a single file with the latest body
#[derive(Debug, Clone)]
pub struct FileDebugSink {
    path: PathBuf,
}

impl FileDebugSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DebugSink for FileDebugSink {
    fn record(&self, url: &str, body: &str) {
        // A failed dump never fails the fetch
        if let Err(e) = std::fs::write(&self.path, body) {
            tracing::warn!(url, path = %self.path.display(), "failed to write debug dump: {}", e);
        }
    }
}

/// Keeps bodies in memory; handy when the filesystem is off limits
#[derive(Debug, Default)]
pub struct MemoryDebugSink {
    bodies: Mutex<Vec<(String, String)>>,
}

impl MemoryDebugSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded `(url, body)` pairs, oldest first
    pub fn records(&self) -> Vec<(String, String)> {
        self.bodies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl DebugSink for MemoryDebugSink {
    fn record(&self, url: &str, body: &str) {
        self.bodies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((url.to_string(), body.to_string()));
    }
}

/// First configured marker found in `body` (case-sensitive, literal)
pub fn find_block_marker<'a>(body: &str, markers: &'a [String]) -> Option<&'a str> {
    markers
        .iter()
        .map(String::as_str)
        .find(|marker| body.contains(marker))
}

/// reqwest-backed fetcher with browser-like headers
pub struct StealthFetcher {
    client: Client,
    block_markers: Vec<String>,
    debug_sink: Option<Arc<dyn DebugSink>>,
}

impl StealthFetcher {
    /// Build from config; the debug sink follows `debug_dump_path`
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, header_value("user_agent", &config.user_agent)?);
        headers.insert(header::ACCEPT, header_value("accept", &config.accept)?);
        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert(header::UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));

        let mut builder = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .redirect(Policy::limited(config.max_redirects));
        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }
        let client = builder.build().map_err(ScrapeError::Client)?;

        let debug_sink = config
            .debug_dump_path
            .as_ref()
            .map(|path| Arc::new(FileDebugSink::new(path)) as Arc<dyn DebugSink>);

        Ok(Self {
            client,
            block_markers: config.block_markers.clone(),
            debug_sink,
        })
    }

    pub fn with_debug_sink(mut self, sink: Arc<dyn DebugSink>) -> Self {
        self.debug_sink = Some(sink);
        self
    }

    pub fn without_debug_sink(mut self) -> Self {
        self.debug_sink = None;
        self
    }
}

impl Fetch for StealthFetcher {
    fn fetch(&self, url: &str) -> Result<String> {
        let target = Url::parse(url).map_err(|e| ScrapeError::fetch(url, e))?;

        tracing::debug!(url, "fetching page");
        let response = self
            .client
            .get(target)
            .send()
            .map_err(|e| ScrapeError::fetch(url, e))?;

        let status = response.status();
        let final_url = response.url().to_string();
        // Challenge pages often come with 403/429, so the body is read regardless
        let status_error = response.error_for_status_ref().err();
        let body = response.text().map_err(|e| ScrapeError::fetch(url, e))?;

        tracing::info!(url, %status, final_url = %final_url, bytes = body.len(), "fetched page");

        if let Some(sink) = &self.debug_sink {
            sink.record(url, &body);
        }

        if let Some(marker) = find_block_marker(&body, &self.block_markers) {
            tracing::warn!(url, marker, "page looks like a bot challenge");
            return Err(ScrapeError::Blocked {
                url: url.to_string(),
                marker: marker.to_string(),
            });
        }

        if let Some(e) = status_error {
            return Err(ScrapeError::fetch(url, e));
        }

        Ok(body)
    }
}

fn header_value(field: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| ScrapeError::invalid_config(field, format!("not a valid header value: {}", e)))
}
