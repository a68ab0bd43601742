//! Binding-mode decision and fan-out.
//!
//! Given a source descriptor and its fetched (and hooked) entries, decide
//! whether to bind a single entry, bind the full list, or fan out into one
//! new descriptor per entry.

use tracing::info;

use stackbind_shared::{Entry, FileMap, QuerySpec, Result, SiteFile};

use crate::naming;
use crate::pipeline::BindOptions;

/// Expand one source file against its fetched entries.
///
/// Returns the per-source output map: the source's own descriptor plus any
/// fanned-out descriptors. Derived output paths that collide — with each
/// other or with the source — silently overwrite; this is accepted, not
/// defended against.
pub fn expand(
    mut file: SiteFile,
    spec: &QuerySpec,
    entries: Vec<Entry>,
    options: &BindOptions,
) -> Result<FileMap> {
    let mut map = FileMap::new();

    // Single-entry bind: singleton flag, explicit entry_id, or a uid
    // equality query. Never fans out.
    if spec.selects_single() {
        file.entry = entries.into_iter().next();
        file.metadata = options.metadata.clone();
        info!(file = %file.file_name, "bound single entry");
        map.insert(file.file_name.clone(), file);
        return Ok(map);
    }

    // No per-entry layout: bind the full list onto the source descriptor.
    let Some(layout) = spec.entry_layout().map(str::to_string) else {
        file.entries = Some(entries);
        file.metadata = options.metadata.clone();
        info!(file = %file.file_name, "bound entry list");
        map.insert(file.file_name.clone(), file);
        return Ok(map);
    };

    // Fan out: one new descriptor per entry under its derived path.
    let title = file.title.clone();
    let contents = file.contents.clone();
    let stack = file.stack.clone();
    let source_name = file.file_name.clone();

    file.entries = Some(entries.clone());
    map.insert(source_name.clone(), file);

    for entry in entries {
        let path = naming::derive(&entry, &source_name, spec)?;
        map.insert(
            path.clone(),
            SiteFile {
                file_name: path,
                title: title.clone(),
                contents: contents.clone(),
                layout: Some(layout.clone()),
                stack: stack.clone(),
                entry: Some(entry),
                metadata: options.metadata.clone(),
                ..Default::default()
            },
        );
    }

    info!(
        file = %source_name,
        descriptors = map.len() - 1,
        layout = %layout,
        "fanned out entries"
    );
    Ok(map)
}
