use crate::graph::{ModuleGraph, ModuleId, RuntimeSpec};

/// A named, build-emitted bundle of modules. Built by the host pipeline;
/// read-only here except for entry rewiring.
#[derive(Clone, Debug)]
pub struct Chunk {
    pub name: String,
    pub modules: Vec<ModuleId>,
}

impl Chunk {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            modules: Vec::new(),
        }
    }

    pub fn push_module(&mut self, id: ModuleId) {
        if !self.modules.contains(&id) {
            self.modules.push(id);
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryPoint {
    pub name: String,
    pub imports: Vec<String>,
}

impl EntryPoint {
    pub fn new(name: &str, imports: Vec<String>) -> Self {
        Self {
            name: name.to_string(),
            imports,
        }
    }

    pub fn runtime(&self) -> RuntimeSpec {
        RuntimeSpec::of(&self.name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CopyFile {
    pub chunk_name: String,
    pub to: String,
}

/// A post-build file-copy request handed to the external publish step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CopyTask {
    pub files: Vec<CopyFile>,
    pub absolute_path: bool,
    pub source_map: bool,
    /// Path fragment stripped from copied artifact paths, e.g. `static/`.
    pub strip_prefix: Option<String>,
}

impl CopyTask {
    pub fn new(files: Vec<CopyFile>) -> Self {
        Self {
            files,
            absolute_path: false,
            source_map: false,
            strip_prefix: None,
        }
    }

    pub fn destination_for(&self, chunk_name: &str) -> Option<&str> {
        self.files
            .iter()
            .find(|f| f.chunk_name == chunk_name)
            .map(|f| f.to.as_str())
    }
}

/// Snapshot of the host pipeline state this engine operates on: the module
/// graph, the optimizer's chunk assignment, declared entry points, and the
/// copy tasks scheduled so far.
#[derive(Clone, Debug, Default)]
pub struct BuildState {
    pub graph: ModuleGraph,
    pub chunks: Vec<Chunk>,
    pub entries: Vec<EntryPoint>,
    pub copy_tasks: Vec<CopyTask>,
}

impl BuildState {
    pub fn new(graph: ModuleGraph) -> Self {
        Self {
            graph,
            chunks: Vec::new(),
            entries: Vec::new(),
            copy_tasks: Vec::new(),
        }
    }

    /// Union of every declared entry's runtime. Dynamically loaded code is
    /// reachable from any entry, so usage marking folds them all.
    pub fn full_runtime(&self) -> RuntimeSpec {
        let mut runtime = RuntimeSpec::empty();
        for entry in &self.entries {
            runtime.union_with(&entry.runtime());
        }
        runtime
    }

    pub fn entry(&self, name: &str) -> Option<&EntryPoint> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn entry_mut(&mut self, name: &str) -> Option<&mut EntryPoint> {
        self.entries.iter_mut().find(|e| e.name == name)
    }

    /// Registers an entry point, replacing the import list of an existing
    /// entry with the same name.
    pub fn upsert_entry(&mut self, entry: EntryPoint) {
        match self.entry_mut(&entry.name) {
            Some(existing) => existing.imports = entry.imports,
            None => self.entries.push(entry),
        }
    }

    pub fn chunk(&self, name: &str) -> Option<&Chunk> {
        self.chunks.iter().find(|c| c.name == name)
    }
}
