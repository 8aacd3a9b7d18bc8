#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::Value;
use tokio::sync::mpsc::{self, UnboundedSender};
use vitrine_loader::{ChunkStore, InjectedScript, MemoryChunkStore, ScriptEvent, ScriptHost};

/// What the served script does once its element is injected.
pub enum Serve {
    /// Registers the chunk, then fires `load`.
    Register { key: String, exports: Value },
    /// Registers the chunk and fires `load` after a delay.
    RegisterDelayed {
        key: String,
        exports: Value,
        delay: Duration,
    },
    /// Fires `load` without ever registering the chunk.
    LoadOnly,
    /// Fires `error`.
    ErrorOnly,
    /// Never fires anything; only the loader's timer can settle the call.
    Silent,
}

pub struct StubHost {
    store: Arc<MemoryChunkStore>,
    serve: Serve,
    injected: Mutex<Vec<String>>,
    detached: Arc<AtomicUsize>,
    held: Mutex<Vec<UnboundedSender<ScriptEvent>>>,
}

impl StubHost {
    pub fn new(store: Arc<MemoryChunkStore>, serve: Serve) -> Arc<Self> {
        Arc::new(Self {
            store,
            serve,
            injected: Mutex::new(Vec::new()),
            detached: Arc::new(AtomicUsize::new(0)),
            held: Mutex::new(Vec::new()),
        })
    }

    pub fn injected_urls(&self) -> Vec<String> {
        self.injected.lock().unwrap().clone()
    }

    pub fn detach_count(&self) -> usize {
        self.detached.load(Ordering::SeqCst)
    }

    pub fn take_sender(&self) -> Option<UnboundedSender<ScriptEvent>> {
        self.held.lock().unwrap().pop()
    }
}

impl ScriptHost for StubHost {
    fn inject(&self, url: &str) -> InjectedScript {
        self.injected.lock().unwrap().push(url.to_string());
        let (tx, rx) = mpsc::unbounded_channel();

        match &self.serve {
            Serve::Register { key, exports } => {
                self.store.insert(key, Arc::new(exports.clone()));
                let _ = tx.send(ScriptEvent::Load);
            }
            Serve::RegisterDelayed { key, exports, delay } => {
                let store = self.store.clone();
                let key = key.clone();
                let exports = exports.clone();
                let delay = *delay;
                let tx = tx.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    store.insert(&key, Arc::new(exports));
                    let _ = tx.send(ScriptEvent::Load);
                });
            }
            Serve::LoadOnly => {
                let _ = tx.send(ScriptEvent::Load);
            }
            Serve::ErrorOnly => {
                let _ = tx.send(ScriptEvent::Error);
            }
            Serve::Silent => {}
        }

        self.held.lock().unwrap().push(tx);
        let detached = self.detached.clone();
        InjectedScript::new(rx, move || {
            detached.fetch_add(1, Ordering::SeqCst);
        })
    }
}
