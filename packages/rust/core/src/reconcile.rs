//! Reconciliation: drop descriptors that queried the content store but never
//! resolved to a renderable layout.

use tracing::debug;

use stackbind_shared::FileMap;

/// Remove every descriptor carrying a query spec but no layout.
///
/// Applies identically to the pre-expansion source map and to post-expansion
/// output maps.
pub fn reconcile(files: &mut FileMap) {
    files.retain(|name, file| {
        let keep = file.stack.is_none() || file.layout.is_some();
        if !keep {
            debug!(file = %name, "removing descriptor with content query but no layout");
        }
        keep
    });
}
