//! Build-time chunk isolation for plugin-extensible storefront bundles:
//! keeps registered plugin chunks self-contained and independently
//! fetchable, and remaps their emitted artifacts to publish paths.

use std::sync::Once;

pub mod build;
pub mod graph;
pub mod isolation;
pub mod names;
pub mod registry;
pub mod remap;
pub mod usage;

pub use build::{BuildState, Chunk, CopyFile, CopyTask, EntryPoint};
pub use graph::{GraphError, Module, ModuleGraph, ModuleId, ModuleKind, RuntimeSpec, UsageInfo};
pub use isolation::{BuildMode, ChunkSplitter, SplitError};
pub use registry::{ConfigError, PluginRegistration, PluginSet, SplitOptions};
pub use remap::remap_artifacts;
pub use usage::mark_used;

static INIT: Once = Once::new();

/// Installs the global fmt subscriber, filtered by `RUST_LOG`. Safe to call
/// more than once.
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .init();
    });
}
