//! Runtime counterpart of the chunk isolation engine: resolves a
//! `(plugin, chunk)` identifier to a script URL, loads it exactly once, and
//! returns the chunk's exports from a process-wide registry.

pub mod error;
pub mod loader;
pub mod script;
pub mod store;

pub use error::LoadError;
pub use loader::{ChunkLoader, LoadKind, LoadedChunk, BUNDLE_PATH_PLACEHOLDER, LOAD_TIMEOUT};
pub use script::{InjectedScript, ScriptEvent, ScriptHost};
pub use store::{ChunkStore, Exports, MemoryChunkStore};
