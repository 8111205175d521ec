//! Stealth scraper
//!
//! Extracts named fields from a web page given a field configuration:
//! - CSS selectors (text of one or many elements)
//! - Meta tags by `name` / `property`
//!
//! Pages are fetched with browser-like headers, checked for bot challenges,
//! and cached per URL for a bounded time. A C ABI is exposed in [`ffi`].

pub mod cache;
pub mod config;
pub mod error;
pub mod extractors;
pub mod fetcher;
pub mod ffi;
pub mod fields;
pub mod service;

pub use cache::{cache_key, HtmlCache};
pub use config::ScraperConfig;
pub use error::{ScrapeError, ScrapeFailure};
pub use extractors::*;
pub use fetcher::{DebugSink, Fetch, FileDebugSink, MemoryDebugSink, StealthFetcher};
pub use fields::{FieldConfig, FieldSpec};
pub use service::ScraperService;
