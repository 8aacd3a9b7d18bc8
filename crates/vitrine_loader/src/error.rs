use thiserror::Error;

/// Failures surface to the caller; none are retried here.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoadError {
    #[error("no plugin name provided")]
    MissingPluginName,
    #[error("no chunk name provided")]
    MissingChunkName,
    /// The script executed (or the hot bundle was searched) but the expected
    /// chunk never reached the registry.
    #[error("cache key \"{key}\" not found")]
    CacheKeyNotFound { key: String },
    #[error("loading \"{url}\" timed out after {seconds}s")]
    Timeout { url: String, seconds: u64 },
}
