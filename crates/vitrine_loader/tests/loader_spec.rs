mod support;

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use support::{Serve, StubHost};
use vitrine_loader::{ChunkLoader, LoadError, LoadKind, MemoryChunkStore};

const TEMPLATE: &str = "/bundles/14cdd85b63697b04af2302ece9ac3239?v=42";

#[tokio::test]
async fn test_load_then_cache_hit() {
    let store = Arc::new(MemoryChunkStore::new());
    let host = StubHost::new(
        store.clone(),
        Serve::Register {
            key: "foo-map".to_string(),
            exports: json!({ "default": "map" }),
        },
    );
    let loader = ChunkLoader::new(store, host.clone());

    // 1. First call performs the load
    let first = loader
        .load_component("Foo", "foo-map", Some(TEMPLATE))
        .await
        .unwrap();
    assert_eq!(first.kind, LoadKind::Load);
    assert_eq!(*first.exports, json!({ "default": "map" }));

    // 2. Second call resolves from the registry, no second script
    let second = loader
        .load_component("Foo", "foo-map", Some(TEMPLATE))
        .await
        .unwrap();
    assert_eq!(second.kind, LoadKind::CacheHit);
    assert_eq!(first.exports, second.exports);
    assert_eq!(host.injected_urls().len(), 1);
}

#[tokio::test]
async fn test_script_url_substitution() {
    let store = Arc::new(MemoryChunkStore::new());
    let host = StubHost::new(
        store.clone(),
        Serve::Register {
            key: "foo-map".to_string(),
            exports: json!({}),
        },
    );
    let loader = ChunkLoader::new(store, host.clone());

    loader
        .load_component("FooBar", "foo-map", Some(TEMPLATE))
        .await
        .unwrap();

    // Squashed plugin name, chunk script path, query string preserved
    assert_eq!(
        host.injected_urls(),
        vec!["/bundles/foobar/storefront/js/foo-map.js?v=42".to_string()]
    );
}

#[tokio::test]
async fn test_default_template_is_used_when_call_passes_none() {
    let store = Arc::new(MemoryChunkStore::new());
    let host = StubHost::new(
        store.clone(),
        Serve::Register {
            key: "foo-map".to_string(),
            exports: json!({}),
        },
    );
    let loader = ChunkLoader::new(store, host.clone()).with_default_template(TEMPLATE);

    loader.load_component("Foo", "foo-map", None).await.unwrap();
    assert_eq!(
        host.injected_urls(),
        vec!["/bundles/foo/storefront/js/foo-map.js?v=42".to_string()]
    );
}

#[tokio::test]
async fn test_empty_names_reject_before_any_injection() {
    let store = Arc::new(MemoryChunkStore::new());
    let host = StubHost::new(store.clone(), Serve::Silent);
    let loader = ChunkLoader::new(store, host.clone());

    assert_eq!(
        loader.load_component("", "foo-map", Some(TEMPLATE)).await.unwrap_err(),
        LoadError::MissingPluginName
    );
    assert_eq!(
        loader.load_component("Foo", "", Some(TEMPLATE)).await.unwrap_err(),
        LoadError::MissingChunkName
    );
    assert!(host.injected_urls().is_empty(), "no DOM activity may happen");
}

#[tokio::test]
async fn test_unregistered_chunk_rejects_after_load_event() {
    // The script fires `load` but never registers its chunk: a contract
    // violation by the served bundle
    let store = Arc::new(MemoryChunkStore::new());
    let host = StubHost::new(store.clone(), Serve::LoadOnly);
    let loader = ChunkLoader::new(store, host.clone());

    let err = loader
        .load_component("Foo", "foo-map", Some(TEMPLATE))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        LoadError::CacheKeyNotFound {
            key: "foo-map".to_string()
        }
    );
    assert_eq!(host.detach_count(), 1, "cleanup must run on the error path too");
}

#[tokio::test]
async fn test_script_error_rejects_when_chunk_never_registered() {
    let store = Arc::new(MemoryChunkStore::new());
    let host = StubHost::new(store.clone(), Serve::ErrorOnly);
    let loader = ChunkLoader::new(store, host.clone());

    let err = loader
        .load_component("Foo", "foo-map", Some(TEMPLATE))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        LoadError::CacheKeyNotFound {
            key: "foo-map".to_string()
        }
    );
    assert_eq!(host.detach_count(), 1);
}

#[tokio::test]
async fn test_concurrent_loads_reconcile_to_one_registry_entry() {
    let store = Arc::new(MemoryChunkStore::new());
    let host = StubHost::new(
        store.clone(),
        Serve::RegisterDelayed {
            key: "foo-map".to_string(),
            exports: json!({ "n": 1 }),
            delay: Duration::from_millis(30),
        },
    );
    let loader = ChunkLoader::new(store.clone(), host.clone());

    let (a, b) = tokio::join!(
        loader.load_component("Foo", "foo-map", Some(TEMPLATE)),
        loader.load_component("Foo", "foo-map", Some(TEMPLATE)),
    );
    let a = a.unwrap();
    let b = b.unwrap();

    // Two scripts may fly for the same key; the registry keeps one entry
    assert_eq!(host.injected_urls().len(), 2);
    assert_eq!(a.kind, LoadKind::Load);
    assert_eq!(b.kind, LoadKind::Load);
    assert!(
        Arc::ptr_eq(&a.exports, &b.exports),
        "both completions must read the same registry entry"
    );
}
