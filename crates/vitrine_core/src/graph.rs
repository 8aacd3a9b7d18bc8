use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ModuleId(pub usize);

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Only `Script` modules participate in usage marking.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModuleKind {
    Script,
    Css,
    Asset,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("module {0} is not part of this build graph")]
    UnknownModule(ModuleId),
    #[error("module {0} cannot depend on itself")]
    SelfDependency(ModuleId),
    #[error("module {0} cannot be its own fusion root")]
    SelfFusion(ModuleId),
}

/// The set of entry runtimes that may execute a piece of code. Union is
/// commutative and idempotent; nothing here inspects the members beyond that.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RuntimeSpec(BTreeSet<String>);

impl RuntimeSpec {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn of(runtime: &str) -> Self {
        let mut set = BTreeSet::new();
        set.insert(runtime.to_string());
        Self(set)
    }

    pub fn union(&self, other: &Self) -> Self {
        let mut merged = self.clone();
        merged.union_with(other);
        merged
    }

    pub fn union_with(&mut self, other: &Self) {
        self.0.extend(other.0.iter().cloned());
    }

    pub fn contains(&self, runtime: &str) -> bool {
        self.0.contains(runtime)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Clone, Debug)]
pub struct Module {
    pub id: ModuleId,
    pub path: String,
    pub kind: ModuleKind,
    pub exports: Vec<String>,
    /// Pre-fusion source module, when this module is a fused group.
    pub fused_root: Option<ModuleId>,
}

/// Per-module usage bookkeeping. Later optimization passes must not drop an
/// export that carries a runtime here, nor fold a module whose evaluation
/// boundary is pinned.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UsageInfo {
    pub used_exports: BTreeMap<String, RuntimeSpec>,
    pub evaluation_pinned: RuntimeSpec,
}

impl UsageInfo {
    pub fn is_export_used_in(&self, export: &str, runtime: &str) -> bool {
        self.used_exports
            .get(export)
            .map(|spec| spec.contains(runtime))
            .unwrap_or(false)
    }

    pub fn is_pinned(&self) -> bool {
        !self.evaluation_pinned.is_empty()
    }
}

/// Read-only-per-build module dependency graph with mutable usage flags.
#[derive(Clone, Debug, Default)]
pub struct ModuleGraph {
    pub modules: Vec<Module>,
    pub outgoing_edges: Vec<Vec<ModuleId>>,
    pub incoming_edges: Vec<Vec<ModuleId>>,
    usage: Vec<UsageInfo>,
}

impl ModuleGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_module(&mut self, path: &str, kind: ModuleKind, exports: &[&str]) -> ModuleId {
        let id = ModuleId(self.modules.len());
        self.modules.push(Module {
            id,
            path: path.to_string(),
            kind,
            exports: exports.iter().map(|e| e.to_string()).collect(),
            fused_root: None,
        });
        self.outgoing_edges.push(Vec::new());
        self.incoming_edges.push(Vec::new());
        self.usage.push(UsageInfo::default());
        id
    }

    pub fn add_dependency(&mut self, from: ModuleId, to: ModuleId) -> Result<(), GraphError> {
        if from.0 >= self.modules.len() {
            return Err(GraphError::UnknownModule(from));
        }
        if to.0 >= self.modules.len() {
            return Err(GraphError::UnknownModule(to));
        }
        if from == to {
            return Err(GraphError::SelfDependency(from));
        }

        // Strictly one edge per relation in both directions.
        if !self.outgoing_edges[from.0].contains(&to) {
            self.outgoing_edges[from.0].push(to);
        }
        if !self.incoming_edges[to.0].contains(&from) {
            self.incoming_edges[to.0].push(from);
        }

        Ok(())
    }

    /// Declares `fused` to be a fusion group whose pre-merge identity is `root`.
    pub fn set_fused_root(&mut self, fused: ModuleId, root: ModuleId) -> Result<(), GraphError> {
        if root.0 >= self.modules.len() {
            return Err(GraphError::UnknownModule(root));
        }
        if fused == root {
            return Err(GraphError::SelfFusion(fused));
        }
        let module = self
            .modules
            .get_mut(fused.0)
            .ok_or(GraphError::UnknownModule(fused))?;
        module.fused_root = Some(root);
        Ok(())
    }

    pub fn module(&self, id: ModuleId) -> Option<&Module> {
        self.modules.get(id.0)
    }

    pub fn usage(&self, id: ModuleId) -> Option<&UsageInfo> {
        self.usage.get(id.0)
    }

    pub fn get_dependencies(&self, id: ModuleId) -> Option<&Vec<ModuleId>> {
        self.outgoing_edges.get(id.0)
    }

    pub fn get_dependents(&self, id: ModuleId) -> Option<&Vec<ModuleId>> {
        self.incoming_edges.get(id.0)
    }

    pub fn find_by_path(&self, path: &str) -> Option<ModuleId> {
        self.modules.iter().find(|m| m.path == path).map(|m| m.id)
    }

    pub(crate) fn union_usage(&mut self, id: ModuleId, runtime: &RuntimeSpec) -> Result<(), GraphError> {
        let exports: Vec<String> = self
            .modules
            .get(id.0)
            .ok_or(GraphError::UnknownModule(id))?
            .exports
            .clone();
        let usage = &mut self.usage[id.0];
        for export in exports {
            usage
                .used_exports
                .entry(export)
                .or_default()
                .union_with(runtime);
        }
        usage.evaluation_pinned.union_with(runtime);
        Ok(())
    }
}
