//! Scraper service: cached fetch, single parse, per-field extraction

use std::sync::Arc;
use std::time::Duration;

use crate::cache::{cache_key, HtmlCache};
use crate::config::ScraperConfig;
use crate::error::{ScrapeError, ScrapeFailure};
use crate::extractors::{extract_parsed, parse_document, ExtractionResult};
use crate::fetcher::{Fetch, StealthFetcher};
use crate::fields::FieldConfig;

/// Public entry point.
///
/// Stateless apart from the shared cache, so one instance can serve
/// concurrent callers. Clones share the same cache and fetcher.
#[derive(Clone)]
pub struct ScraperService {
    cache: Arc<HtmlCache>,
    fetcher: Arc<dyn Fetch>,
    cache_ttl: Duration,
}

impl ScraperService {
    /// Service backed by [`StealthFetcher`] and a fresh cache
    pub fn new(config: &ScraperConfig) -> Result<Self, ScrapeError> {
        config
            .validate()
            .map_err(|reason| ScrapeError::invalid_config("<scraper config>", reason))?;
        let fetcher = StealthFetcher::new(config)?;
        Ok(Self::with_fetcher(
            Arc::new(fetcher),
            Arc::new(HtmlCache::new()),
            config.cache_ttl(),
        ))
    }

    /// Service over any fetcher and cache, e.g. a cache shared with other services
    pub fn with_fetcher(fetcher: Arc<dyn Fetch>, cache: Arc<HtmlCache>, cache_ttl: Duration) -> Self {
        Self {
            cache,
            fetcher,
            cache_ttl,
        }
    }

    pub fn cache(&self) -> &Arc<HtmlCache> {
        &self.cache
    }

    /// Raw HTML for `url`, from cache when live
    pub fn fetch_html(&self, url: &str) -> Result<String, ScrapeError> {
        self.cache
            .get_or_fetch(&cache_key(url), self.cache_ttl, || self.fetcher.fetch(url))
    }

    /// Extract every configured field from the page at `url`.
    ///
    /// Any failure along the way comes back as one [`ScrapeFailure`]; there
    /// is no partial result.
    pub fn extract(&self, url: &str, fields: &FieldConfig) -> Result<ExtractionResult, ScrapeFailure> {
        self.run(url, fields).map_err(|cause| {
            tracing::warn!(url, "scrape failed: {}", cause);
            ScrapeFailure::new(url, cause)
        })
    }

    fn run(&self, url: &str, fields: &FieldConfig) -> Result<ExtractionResult, ScrapeError> {
        let html = self.fetch_html(url)?;
        let document = parse_document(&html);
        let result = extract_parsed(&document, fields)?;

        tracing::debug!(url, fields = result.len(), "extracted fields");
        Ok(result)
    }
}
