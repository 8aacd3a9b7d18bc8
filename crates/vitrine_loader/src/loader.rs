use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use vitrine_core::names::to_kebab_case;

use crate::error::LoadError;
use crate::script::ScriptHost;
use crate::store::{ChunkStore, Exports};

/// Path segment inside a loading-path template that gets substituted with the
/// concrete bundle path per request.
pub const BUNDLE_PATH_PLACEHOLDER: &str = "14cdd85b63697b04af2302ece9ac3239";

pub const LOAD_TIMEOUT: Duration = Duration::from_secs(120);

/// How the chunk was obtained: a fresh script load, the registry cache, or
/// the hot bundle passthrough. Timeouts reject instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadKind {
    Load,
    CacheHit,
    Hot,
}

#[derive(Clone, Debug)]
pub struct LoadedChunk {
    pub exports: Exports,
    pub kind: LoadKind,
}

/// Resolves a `(plugin, chunk)` identifier to a script, loads it once, and
/// returns the chunk's exports from the shared registry.
pub struct ChunkLoader {
    store: Arc<dyn ChunkStore>,
    host: Arc<dyn ScriptHost>,
    hot: bool,
    default_template: Option<String>,
    load_timeout: Duration,
    /// Hot cache keys already resolved once in this session.
    observed: Mutex<HashSet<String>>,
}

impl ChunkLoader {
    pub fn new(store: Arc<dyn ChunkStore>, host: Arc<dyn ScriptHost>) -> Self {
        Self {
            store,
            host,
            hot: false,
            default_template: None,
            load_timeout: LOAD_TIMEOUT,
            observed: Mutex::new(HashSet::new()),
        }
    }

    /// Mirrors the environment's hot-reload flag: chunks resolve against the
    /// already-inlined bundle instead of the network.
    pub fn with_hot_reload(mut self, hot: bool) -> Self {
        self.hot = hot;
        self
    }

    /// Template used when a call does not pass one.
    pub fn with_default_template(mut self, template: &str) -> Self {
        self.default_template = Some(template.to_string());
        self
    }

    pub fn with_load_timeout(mut self, timeout: Duration) -> Self {
        self.load_timeout = timeout;
        self
    }

    pub async fn load_component(
        &self,
        plugin_name: &str,
        chunk_name: &str,
        template: Option<&str>,
    ) -> Result<LoadedChunk, LoadError> {
        if plugin_name.is_empty() {
            return Err(LoadError::MissingPluginName);
        }
        if chunk_name.is_empty() {
            return Err(LoadError::MissingChunkName);
        }

        if self.hot {
            return self.resolve_hot(chunk_name);
        }
        self.load_over_network(plugin_name, chunk_name, template).await
    }

    /// Hot branch: the chunk was inlined into the live bundle, so its key
    /// resolves in-memory or not at all.
    fn resolve_hot(&self, key: &str) -> Result<LoadedChunk, LoadError> {
        let exports = self.store.get(key).ok_or_else(|| LoadError::CacheKeyNotFound {
            key: key.to_string(),
        })?;

        let first = self.observed.lock().unwrap().insert(key.to_string());
        let kind = if first { LoadKind::Hot } else { LoadKind::CacheHit };
        tracing::debug!(key, ?kind, "resolved chunk from hot bundle");
        Ok(LoadedChunk { exports, kind })
    }

    async fn load_over_network(
        &self,
        plugin_name: &str,
        chunk_name: &str,
        template: Option<&str>,
    ) -> Result<LoadedChunk, LoadError> {
        if let Some(exports) = self.store.get(chunk_name) {
            tracing::debug!(chunk = chunk_name, "chunk already registered");
            return Ok(LoadedChunk {
                exports,
                kind: LoadKind::CacheHit,
            });
        }

        let url = self.script_url(plugin_name, chunk_name, template);
        tracing::debug!(url = %url, "injecting chunk script");

        let mut script = self.host.inject(&url);
        let completion = tokio::time::timeout(self.load_timeout, script.completion()).await;
        // Every terminal path detaches exactly once: no leaked timers, no
        // orphan elements, and a later duplicate event settles nothing.
        script.detach();

        match completion {
            Err(_) => {
                tracing::warn!(url = %url, "chunk script load timed out");
                Err(LoadError::Timeout {
                    url,
                    seconds: self.load_timeout.as_secs(),
                })
            }
            Ok(event) => {
                tracing::debug!(url = %url, ?event, "chunk script settled");
                // Load and error both resolve through the registry: a script
                // that executed without registering its chunk broke the
                // bundle contract, which is not recoverable here.
                self.store
                    .get(chunk_name)
                    .map(|exports| LoadedChunk {
                        exports,
                        kind: LoadKind::Load,
                    })
                    .ok_or_else(|| LoadError::CacheKeyNotFound {
                        key: chunk_name.to_string(),
                    })
            }
        }
    }

    fn script_url(&self, plugin_name: &str, chunk_name: &str, template: Option<&str>) -> String {
        let plugin = to_kebab_case(plugin_name, false);
        let bundle_path = format!("{plugin}/storefront/js/{chunk_name}.js");
        let template = template
            .or(self.default_template.as_deref())
            .unwrap_or_default();
        template.replacen(
            &format!("/{BUNDLE_PATH_PLACEHOLDER}"),
            &format!("/{bundle_path}"),
            1,
        )
    }
}
