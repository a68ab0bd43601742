//! User-registered extension hooks.
//!
//! Two distinct hook phases with two distinct contracts: entry hooks
//! transform fetched entries before expansion, post hooks transform finished
//! output descriptors after the per-file barrier (and can see every other
//! descriptor). Hooks are registered by name; a file listing a name nobody
//! registered is skipped silently.

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use stackbind_shared::{Binding, Entry, FileMap, QuerySpec, SiteFile};

use crate::pipeline::BindOptions;

/// Transforms one fetched entry. Applied before filename derivation and
/// expansion; the return value replaces the entry in the fetched list.
pub type EntryHook = Box<dyn Fn(Entry) -> Entry + Send + Sync>;

/// Transforms one finished output descriptor. Receives a snapshot of the
/// full output-descriptor union for cross-file effects, plus the global
/// options; the return value replaces the descriptor.
pub type PostHook = Box<dyn Fn(SiteFile, &FileMap, &BindOptions) -> SiteFile + Send + Sync>;

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Named hook functions, looked up by the names listed on each file's spec.
#[derive(Default)]
pub struct HookRegistry {
    entry_hooks: HashMap<String, EntryHook>,
    post_hooks: HashMap<String, PostHook>,
}

impl HookRegistry {
    /// Register an entry hook under a name.
    pub fn register_entry_hook(
        &mut self,
        name: impl Into<String>,
        hook: impl Fn(Entry) -> Entry + Send + Sync + 'static,
    ) {
        self.entry_hooks.insert(name.into(), Box::new(hook));
    }

    /// Register a post hook under a name.
    pub fn register_post_hook(
        &mut self,
        name: impl Into<String>,
        hook: impl Fn(SiteFile, &FileMap, &BindOptions) -> SiteFile + Send + Sync + 'static,
    ) {
        self.post_hooks.insert(name.into(), Box::new(hook));
    }

    /// Look up an entry hook by name.
    pub fn entry_hook(&self, name: &str) -> Option<&EntryHook> {
        self.entry_hooks.get(name)
    }

    /// Look up a post hook by name.
    pub fn post_hook(&self, name: &str) -> Option<&PostHook> {
        self.post_hooks.get(name)
    }
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut entry: Vec<_> = self.entry_hooks.keys().collect();
        let mut post: Vec<_> = self.post_hooks.keys().collect();
        entry.sort();
        post.sort();
        f.debug_struct("HookRegistry")
            .field("entry_hooks", &entry)
            .field("post_hooks", &post)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Apply a file's listed entry hooks to its fetched entries.
///
/// Hooks run in listed-name order, then entry order. Hook return values are
/// written back into the list — the transformed entries are what filename
/// derivation and expansion see.
pub fn run_entry_hooks(
    mut entries: Vec<Entry>,
    spec: &QuerySpec,
    registry: &HookRegistry,
) -> Vec<Entry> {
    for name in &spec.entry_hooks {
        let Some(hook) = registry.entry_hook(name) else {
            debug!(hook = %name, "entry hook not registered, skipping");
            continue;
        };
        entries = entries.into_iter().map(|entry| hook(entry)).collect();
    }
    entries
}

/// Apply each bound descriptor's listed post hooks over the expanded output.
///
/// Every hook sees a phase-start snapshot of the full output union as
/// context. `Binding::Skip` values pass through untouched.
pub fn run_post_hooks(bindings: &mut [Binding], options: &BindOptions) {
    let mut context = FileMap::new();
    for binding in bindings.iter() {
        if let Binding::Bound(map) = binding {
            context.extend(map.clone());
        }
    }

    for binding in bindings.iter_mut() {
        let Binding::Bound(map) = binding else {
            continue;
        };
        for file in map.values_mut() {
            let Some(spec) = file.stack.clone() else {
                continue;
            };
            for name in &spec.post_hooks {
                let Some(hook) = options.hooks.post_hook(name) else {
                    debug!(hook = %name, "post hook not registered, skipping");
                    continue;
                };
                *file = hook(std::mem::take(file), &context, options);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use stackbind_shared::FieldMap;

    fn entry(uid: &str, title: &str) -> Entry {
        let mut fields = FieldMap::new();
        fields.insert("uid".into(), json!(uid));
        fields.insert("title".into(), json!(title));
        Entry(fields)
    }

    #[test]
    fn entry_hooks_apply_in_listed_order_and_write_back() {
        let mut registry = HookRegistry::default();
        registry.register_entry_hook("upper", |mut e: Entry| {
            let title = e.field("title").and_then(|v| v.as_str()).unwrap_or("").to_uppercase();
            e.fields_mut().insert("title".into(), json!(title));
            e
        });
        registry.register_entry_hook("bang", |mut e: Entry| {
            let title = format!("{}!", e.field("title").and_then(|v| v.as_str()).unwrap_or(""));
            e.fields_mut().insert("title".into(), json!(title));
            e
        });

        let spec = QuerySpec {
            entry_hooks: vec!["upper".into(), "bang".into()],
            ..Default::default()
        };

        let out = run_entry_hooks(vec![entry("a", "hello")], &spec, &registry);
        assert_eq!(
            out[0].field("title").and_then(|v| v.as_str()),
            Some("HELLO!")
        );
    }

    #[test]
    fn unregistered_entry_hook_names_are_ignored() {
        let registry = HookRegistry::default();
        let spec = QuerySpec {
            entry_hooks: vec!["does_not_exist".into()],
            ..Default::default()
        };

        let out = run_entry_hooks(vec![entry("a", "hello")], &spec, &registry);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].field("title").and_then(|v| v.as_str()), Some("hello"));
    }

    #[test]
    fn post_hooks_replace_descriptors_and_see_context() {
        let mut options = BindOptions::default();
        options
            .hooks
            .register_post_hook("count_peers", |mut file, all, _opts| {
                file.metadata
                    .insert("peer_count".into(), json!(all.len()));
                file
            });

        let spec = QuerySpec {
            post_hooks: vec!["count_peers".into()],
            ..Default::default()
        };

        let mut map_a = FileMap::new();
        map_a.insert(
            "a.html".into(),
            SiteFile {
                file_name: "a.html".into(),
                stack: Some(spec.clone()),
                ..Default::default()
            },
        );
        let mut map_b = FileMap::new();
        map_b.insert(
            "b.html".into(),
            SiteFile {
                file_name: "b.html".into(),
                ..Default::default()
            },
        );

        let mut bindings = vec![Binding::Bound(map_a), Binding::Skip, Binding::Bound(map_b)];
        run_post_hooks(&mut bindings, &options);

        let Binding::Bound(map_a) = &bindings[0] else {
            panic!("expected bound map");
        };
        assert_eq!(
            map_a["a.html"].metadata.get("peer_count"),
            Some(&json!(2))
        );

        // b.html lists no post hooks and is untouched.
        let Binding::Bound(map_b) = &bindings[2] else {
            panic!("expected bound map");
        };
        assert!(map_b["b.html"].metadata.is_empty());
    }
}
