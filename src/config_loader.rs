//! Loading `CrawlConfiguration` from an external TOML file, with
//! `CRAWL_`-prefixed environment overrides. `CrawlEngine` never
//! requires this — a `CrawlConfiguration` built by struct literal or
//! `Default` works just as well.

use std::path::Path;

use anyhow::Context;

use crate::config::CrawlConfiguration;
use crate::error::{CrawlError, EngineResult};

/// Loads a `CrawlConfiguration` from TOML, then applies environment
/// overrides on top (`CRAWL_MAX_PAGES_TO_CRAWL`, etc.).
pub struct ConfigLoader;

impl ConfigLoader {
    pub fn from_toml_str(toml_text: &str) -> EngineResult<CrawlConfiguration> {
        let mut config: CrawlConfiguration = toml::from_str(toml_text)
            .map_err(|e| CrawlError::config_load("failed to parse crawl configuration", e))?;
        Self::apply_env_overrides(&mut config);
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> EngineResult<CrawlConfiguration> {
        let path = path.as_ref();
        let text = Self::read_file(path).map_err(|e| {
            CrawlError::config_load_anyhow(format!("failed to read {}", path.display()), e)
        })?;
        Self::from_toml_str(&text)
    }

    /// Internal glue that never crosses the public API boundary: reads
    /// the file with an `anyhow` context chain, then the caller converts
    /// the failure into the crate's own `CrawlError` at the edge.
    fn read_file(path: &Path) -> anyhow::Result<String> {
        std::fs::read_to_string(path)
            .with_context(|| format!("reading configuration file {}", path.display()))
    }

    fn apply_env_overrides(config: &mut CrawlConfiguration) {
        if let Some(v) = env_u64("CRAWL_MAX_PAGES_TO_CRAWL") {
            config.max_pages_to_crawl = v;
        }
        if let Some(v) = env_u64("CRAWL_MAX_PAGES_TO_CRAWL_PER_DOMAIN") {
            config.max_pages_to_crawl_per_domain = v;
        }
        if let Some(v) = env_u64("CRAWL_TIMEOUT_SECONDS") {
            config.crawl_timeout_seconds = v;
        }
        if let Some(v) = env_u64("CRAWL_MAX_CONCURRENT_THREADS") {
            config.max_concurrent_threads = v as usize;
        }
        if let Ok(v) = std::env::var("CRAWL_USER_AGENT_STRING") {
            config.user_agent_string = v;
        }
    }
}

fn env_u64(key: &str) -> Option<u64> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}
