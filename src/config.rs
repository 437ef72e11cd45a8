//! Crawl configuration: the recognized options, plus validation and
//! preset constructors.

use serde::{Deserialize, Serialize};

use crate::error::{CrawlError, EngineResult};

/// The recognized crawl options.
///
/// # Sentinel semantics
///
/// `crawl_timeout_seconds == 0` means "no timeout". `max_pages_to_crawl
/// == 0` and `max_pages_to_crawl_per_domain == 0` instead mean "a cap
/// of zero" — i.e. nothing is admitted. This asymmetry is intentional
/// and preserved exactly; do not "fix" it into a second unlimited
/// sentinel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfiguration {
    /// Hard cap on admitted pages. `0` means a cap of zero, not unlimited.
    pub max_pages_to_crawl: u64,
    /// Per-host cap keyed by authority. `0` means a cap of zero, not unlimited.
    pub max_pages_to_crawl_per_domain: u64,
    /// Wall-clock budget from crawl start, in seconds. `0` means unlimited.
    pub crawl_timeout_seconds: u64,
    /// Worker-pool width. Must be `>= 1`.
    pub max_concurrent_threads: usize,
    /// Admit pages whose authority differs from the root URI's.
    pub is_external_page_crawling_enabled: bool,
    /// Parse links from pages whose authority differs from the root URI's.
    pub is_external_page_links_crawling_enabled: bool,
    /// Sent as the `User-Agent` request header.
    pub user_agent_string: String,
}

impl Default for CrawlConfiguration {
    fn default() -> Self {
        Self {
            max_pages_to_crawl: 1000,
            max_pages_to_crawl_per_domain: 0,
            crawl_timeout_seconds: 0,
            max_concurrent_threads: 10,
            is_external_page_crawling_enabled: false,
            is_external_page_links_crawling_enabled: false,
            user_agent_string: "CrawlCore/1.0".to_string(),
        }
    }
}

impl CrawlConfiguration {
    /// Reject structurally unusable values before they reach an engine.
    pub fn validate(&self) -> EngineResult<()> {
        if self.max_concurrent_threads == 0 {
            return Err(CrawlError::invalid_configuration(
                "max_concurrent_threads must be >= 1",
            ));
        }
        if self.user_agent_string.trim().is_empty() {
            return Err(CrawlError::invalid_configuration(
                "user_agent_string must not be empty",
            ));
        }
        Ok(())
    }
}

/// Convenience preset constructors for common crawl shapes.
pub struct CrawlPresets;

impl CrawlPresets {
    /// Small, fast-failing settings suitable for local development and tests.
    pub fn development() -> CrawlConfiguration {
        CrawlConfiguration {
            max_pages_to_crawl: 50,
            max_pages_to_crawl_per_domain: 0,
            crawl_timeout_seconds: 30,
            max_concurrent_threads: 4,
            is_external_page_crawling_enabled: false,
            is_external_page_links_crawling_enabled: false,
            user_agent_string: "CrawlCore/1.0 (dev)".to_string(),
        }
    }

    /// No caps at all besides the worker-pool width.
    ///
    /// `max_pages_to_crawl` and `max_pages_to_crawl_per_domain` cannot
    /// use `0` to mean "unlimited" — that sentinel means a cap of zero
    /// for these two fields (see the type's doc comment). `u64::MAX` is
    /// used instead so this preset actually behaves as advertised.
    pub fn unbounded(max_concurrent_threads: usize) -> CrawlConfiguration {
        CrawlConfiguration {
            max_pages_to_crawl: u64::MAX,
            max_pages_to_crawl_per_domain: u64::MAX,
            crawl_timeout_seconds: 0,
            max_concurrent_threads: max_concurrent_threads.max(1),
            is_external_page_crawling_enabled: true,
            is_external_page_links_crawling_enabled: true,
            user_agent_string: "CrawlCore/1.0".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(CrawlConfiguration::default().validate().is_ok());
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let mut config = CrawlConfiguration::default();
        config.max_concurrent_threads = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_user_agent_is_rejected() {
        let mut config = CrawlConfiguration::default();
        config.user_agent_string = "  ".to_string();
        assert!(config.validate().is_err());
    }
}
