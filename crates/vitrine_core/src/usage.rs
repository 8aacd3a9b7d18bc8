use crate::graph::{GraphError, ModuleGraph, ModuleId, RuntimeSpec};

/// Declares that every export of `module` is observably used within `runtime`,
/// so dead-export elimination cannot drop them and the module keeps its own
/// top-level evaluation boundary.
///
/// A fused module is marked together with its root: optimization decisions are
/// made against the root's usage, not the fused wrapper's. An id that does not
/// belong to `graph` is a caller bug and fails the build.
pub fn mark_used(
    graph: &mut ModuleGraph,
    module: ModuleId,
    runtime: &RuntimeSpec,
) -> Result<(), GraphError> {
    let root = graph
        .module(module)
        .ok_or(GraphError::UnknownModule(module))?
        .fused_root;

    graph.union_usage(module, runtime)?;
    tracing::trace!(module = %module, "marked exports as used");

    if let Some(root) = root {
        graph.union_usage(root, runtime)?;
        tracing::trace!(fused = %module, root = %root, "marked fusion root as used");
    }

    Ok(())
}
