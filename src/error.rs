//! Error types for the crawl engine core.
//!
//! Decision denials are never errors — they are normal `CrawlDecision`
//! values. `CrawlError` covers only the synchronous argument errors a
//! caller of `CrawlEngine::crawl` or `Scheduler::add` can receive.

use thiserror::Error;

/// Errors surfaced synchronously to callers of the public API.
#[derive(Error, Debug)]
pub enum CrawlError {
    /// `crawl(seed_uri)` was called with a missing or unparseable seed URI.
    #[error("invalid seed URI: {message}")]
    InvalidSeedUri { message: String },

    /// `Scheduler::add` was called with a page that has no URI.
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// A `CrawlConfiguration` failed validation.
    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    /// The configuration loader could not read or parse its source.
    #[error("configuration load failed: {message}")]
    ConfigLoad {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl CrawlError {
    pub fn invalid_seed_uri(message: impl Into<String>) -> Self {
        Self::InvalidSeedUri {
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
        }
    }

    pub fn config_load<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ConfigLoad {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Build a `ConfigLoad` error from an internal `anyhow` chain.
    ///
    /// `anyhow::Error` deliberately does not implement
    /// `std::error::Error`, so its context chain is folded into the
    /// message via `{:#}` rather than attached as `#[source]`.
    pub fn config_load_anyhow(message: impl Into<String>, source: anyhow::Error) -> Self {
        Self::ConfigLoad {
            message: format!("{}: {source:#}", message.into()),
            source: None,
        }
    }
}

/// Convenience alias for `Result<T, CrawlError>`.
///
/// Named distinctly from the data-model's `CrawlResult` (the summary
/// returned by `CrawlEngine::crawl`) to avoid a collision in the
/// crate's public vocabulary.
pub type EngineResult<T> = Result<T, CrawlError>;
