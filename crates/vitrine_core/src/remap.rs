use crate::build::{BuildState, CopyFile, CopyTask, EntryPoint};
use crate::registry::PluginSet;

pub const BUILD_OUTPUT_ROOT: &str = "app/storefront/dist/storefront/";
pub const PUBLISH_ROOT: &str = "public/storefront/";
/// Fragment stripped from copied artifact paths.
pub const STATIC_PREFIX: &str = "static/";

/// Runs once after artifacts are emitted, normal builds only. Matches each
/// registration against the copy tasks scheduled so far; a plugin without a
/// matching task contributed no separately emitted artifact and is skipped.
/// For every mapping entry of a matched plugin, an entry point is upserted
/// and one copy task is scheduled toward the publish root, so the returned
/// count equals the number of mapping entries across matched plugins.
pub fn remap_artifacts(plugins: &PluginSet, build: &mut BuildState) -> usize {
    let mut scheduled: Vec<CopyTask> = Vec::new();

    for plugin in plugins.plugins() {
        let Some(destination) = build
            .copy_tasks
            .iter()
            .find_map(|task| task.destination_for(&plugin.kebab_name))
            .map(str::to_string)
        else {
            tracing::debug!(plugin = %plugin.name, "no emitted artifact, skipping remap");
            continue;
        };

        for (output_chunk, source_entry) in &plugin.mapping {
            build.upsert_entry(EntryPoint::new(output_chunk, vec![source_entry.clone()]));

            // First occurrence only: the chunk name may recur deeper in the
            // path without being the fragment to rewrite.
            let to = destination
                .replacen(BUILD_OUTPUT_ROOT, PUBLISH_ROOT, 1)
                .replacen(&plugin.kebab_name, output_chunk, 1);

            tracing::debug!(chunk = %output_chunk, to = %to, "scheduling publish copy");
            scheduled.push(CopyTask {
                files: vec![CopyFile {
                    chunk_name: output_chunk.clone(),
                    to,
                }],
                absolute_path: true,
                source_map: true,
                strip_prefix: Some(STATIC_PREFIX.to_string()),
            });
        }
    }

    let count = scheduled.len();
    build.copy_tasks.extend(scheduled);
    count
}
