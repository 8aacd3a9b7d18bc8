use thiserror::Error;

use crate::build::BuildState;
use crate::graph::{GraphError, ModuleKind};
use crate::registry::{ConfigError, PluginSet, SplitOptions};
use crate::usage::mark_used;

/// Hot mode inlines plugin entries into the live-reloading bundle instead of
/// isolating them: a live-reload server cannot serve separately fetched
/// chunks with cache busting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuildMode {
    Normal,
    Hot,
}

impl BuildMode {
    /// `MODE=hot` selects the hot-reload build.
    pub fn from_env() -> Self {
        match std::env::var("MODE") {
            Ok(mode) if mode == "hot" => BuildMode::Hot,
            _ => BuildMode::Normal,
        }
    }
}

#[derive(Debug, Error)]
pub enum SplitError {
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error("main entry \"{0}\" is not declared in this build")]
    MissingMainEntry(String),
}

/// Keeps registered plugin chunks self-contained and independently fetchable.
pub struct ChunkSplitter {
    plugins: PluginSet,
}

impl ChunkSplitter {
    pub fn new(options: SplitOptions) -> Result<Self, ConfigError> {
        Ok(Self {
            plugins: PluginSet::from_options(options)?,
        })
    }

    pub fn plugins(&self) -> &PluginSet {
        &self.plugins
    }

    pub fn apply(&self, build: &mut BuildState, mode: BuildMode) -> Result<(), SplitError> {
        match mode {
            BuildMode::Hot => self.inline_into_main(build),
            BuildMode::Normal => self.isolate_chunks(build),
        }
    }

    /// Hot mode: append every registration's source entries, in declaration
    /// order, to the main application entry's import list.
    fn inline_into_main(&self, build: &mut BuildState) -> Result<(), SplitError> {
        let inlined: Vec<String> = self
            .plugins
            .plugins()
            .iter()
            .flat_map(|plugin| plugin.mapping.values().cloned())
            .collect();

        let main_entry = self.plugins.main_entry();
        let entry = build
            .entry_mut(main_entry)
            .ok_or_else(|| SplitError::MissingMainEntry(main_entry.to_string()))?;

        tracing::info!(
            entry = main_entry,
            imports = inlined.len(),
            "hot build, inlining plugin entries"
        );
        entry.imports.extend(inlined);
        Ok(())
    }

    /// Normal mode: after the optimizer has assigned modules to chunks, mark
    /// every script module of every registered chunk as used under the union
    /// of all entry runtimes, so none of it is eliminated or folded into the
    /// shared bundle. Marking is idempotent, so visit order is irrelevant.
    fn isolate_chunks(&self, build: &mut BuildState) -> Result<(), SplitError> {
        let runtime = build.full_runtime();
        let BuildState { graph, chunks, .. } = build;

        for chunk in chunks.iter().filter(|c| self.plugins.is_target_chunk(&c.name)) {
            let mut marked = 0usize;
            for &module_id in &chunk.modules {
                let module = graph
                    .module(module_id)
                    .ok_or(GraphError::UnknownModule(module_id))?;
                if module.kind != ModuleKind::Script {
                    continue;
                }
                mark_used(graph, module_id, &runtime)?;
                marked += 1;
            }
            tracing::info!(chunk = %chunk.name, modules = marked, "pinned plugin chunk");
        }
        Ok(())
    }
}
