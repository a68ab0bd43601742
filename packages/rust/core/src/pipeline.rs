//! End-to-end binding pipeline: file map → validate → query → fetch → hooks
//! → expand → reconcile → partials → merged file map.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

use stackbind_shared::{
    AppConfig, BindError, Binding, Credentials, FieldMap, FileMap, FilterSet, Result, SiteFile,
};
use stackbind_store::build_filters;

use crate::hooks::{self, HookRegistry};
use crate::{expand, partials, reconcile, validate};

// ---------------------------------------------------------------------------
// BindOptions
// ---------------------------------------------------------------------------

/// Global options for one binding run.
///
/// Supplied by the build orchestrator; file-level query specs override the
/// credential, content-type, and filter defaults per field.
#[derive(Debug, Default)]
pub struct BindOptions {
    /// Default content store credentials.
    pub credentials: Credentials,
    /// Default content type for files that don't name one.
    pub content_type: Option<String>,
    /// Default filter set, merged under every file's own filters.
    pub filters: Option<FilterSet>,
    /// Partial content types fetched once per build.
    pub partials: Vec<String>,
    /// User-registered entry and post hooks.
    pub hooks: HookRegistry,
    /// Shared metadata injected into bound descriptors.
    pub metadata: FieldMap,
}

impl BindOptions {
    /// Build options from an [`AppConfig`], resolving credentials from the
    /// configured environment variables. Hooks, filters, and metadata start
    /// empty — the orchestrator fills them in.
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            credentials: config.credentials(),
            content_type: config.defaults.content_type.clone(),
            partials: config.defaults.partials.clone(),
            ..Default::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Run the binding pipeline over a build's file map, in place.
///
/// 1. Normalize descriptors (output path, legacy layout aliases)
/// 2. Bind each file concurrently (validate → query → fetch → hooks → expand)
/// 3. Run post hooks over the union
/// 4. Reconcile away layout-less query descriptors
/// 5. Fetch and inject shared partials
/// 6. Merge bound descriptors back into the map
///
/// A failure inside one file's worker drops that file and leaves its
/// siblings untouched; a partial-binding failure is the pipeline's failure.
#[instrument(skip_all, fields(files = files.len()))]
pub async fn bind(files: &mut FileMap, options: Arc<BindOptions>) -> Result<()> {
    // --- Phase 1: Normalization ---
    for (key, file) in files.iter_mut() {
        file.normalize(key);
    }

    // --- Phase 2: Per-file binding workers ---
    let mut set: JoinSet<(String, Result<Binding>)> = JoinSet::new();
    for (key, file) in files.iter() {
        let key = key.clone();
        let file = file.clone();
        let options = Arc::clone(&options);
        set.spawn(async move {
            let result = worker(file, &options).await;
            (key, result)
        });
    }

    let mut outcomes: BTreeMap<String, Result<Binding>> = BTreeMap::new();
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((key, result)) => {
                outcomes.insert(key, result);
            }
            Err(e) => warn!(error = %e, "binding worker task failed to join"),
        }
    }

    let mut bindings: Vec<Binding> = Vec::with_capacity(outcomes.len());
    for (key, result) in outcomes {
        match result {
            Ok(Binding::Skip) => {
                debug!(file = %key, "no content store dependency");
                bindings.push(Binding::Skip);
            }
            Ok(Binding::Bound(map)) => {
                // The bound descriptors re-enter under their normalized
                // names during the merge; the stale source slot goes now.
                files.remove(&key);
                bindings.push(Binding::Bound(map));
            }
            Err(e) => {
                warn!(file = %key, error = %e, "binding failed, dropping file");
                files.remove(&key);
            }
        }
    }

    // --- Phase 3: Post hooks over the union ---
    hooks::run_post_hooks(&mut bindings, &options);

    // --- Phase 4: Reconciliation ---
    reconcile::reconcile(files);
    for binding in bindings.iter_mut() {
        if let Binding::Bound(map) = binding {
            reconcile::reconcile(map);
        }
    }

    // --- Phase 5: Partial binding (not isolated) ---
    partials::bind_partials(&mut bindings, &options).await?;

    // --- Phase 6: Merge ---
    for binding in bindings {
        if let Binding::Bound(map) = binding {
            files.extend(map);
        }
    }

    info!(files = files.len(), "binding pipeline complete");
    Ok(())
}

/// Bind one source file: the isolated per-file pipeline.
async fn worker(file: SiteFile, options: &BindOptions) -> Result<Binding> {
    let Some(spec) = file.stack.clone() else {
        return Ok(Binding::Skip);
    };

    validate::validate(
        &file.file_name,
        &spec,
        &options.credentials,
        options.content_type.as_deref(),
    )?;

    let credentials = validate::resolve_credentials(&spec, &options.credentials);
    let content_type = spec
        .content_type
        .clone()
        .or_else(|| options.content_type.clone())
        .ok_or_else(|| BindError::configuration(&file.file_name, "no content_type configured"))?;

    let client = stackbind_store::client_for(&credentials)?;

    let mut query = client.content_type(content_type.as_str());
    if let Some(filters) = build_filters(options.filters.as_ref(), &spec) {
        query = query.apply_all(&filters);
    }

    let entries = query
        .find()
        .await
        .map_err(|e| BindError::query(&file.file_name, e))?;
    info!(
        file = %file.file_name,
        content_type = %content_type,
        count = entries.len(),
        "fetched entries"
    );

    let entries = hooks::run_entry_hooks(entries, &spec, &options.hooks);

    let map = expand::expand(file, &spec, entries, options)?;
    Ok(Binding::Bound(map))
}
