//! Core domain types for the stackbind binding pipeline.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Free-form JSON object, used for entry fields and shared metadata.
pub type FieldMap = serde_json::Map<String, Value>;

/// Named query operations and their arguments (`query`, `limit`, `desc`, ...).
pub type FilterSet = BTreeMap<String, Value>;

/// A site's file descriptors, keyed by output path.
pub type FileMap = BTreeMap<String, SiteFile>;

// ---------------------------------------------------------------------------
// Entry
// ---------------------------------------------------------------------------

/// One structured content record returned by the content store.
///
/// Entries are opaque field mappings; the only structural requirements are a
/// unique `uid` and nested field access via dotted paths.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Entry(pub FieldMap);

impl Entry {
    /// The entry's unique identifier, if present.
    pub fn uid(&self) -> Option<&str> {
        self.0.get("uid").and_then(Value::as_str)
    }

    /// Look up a nested field via a dotted path (`"author.profile.slug"`).
    pub fn field(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut current = self.0.get(segments.next()?)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// Borrow the underlying field map.
    pub fn fields(&self) -> &FieldMap {
        &self.0
    }

    /// Mutably borrow the underlying field map.
    pub fn fields_mut(&mut self) -> &mut FieldMap {
        &mut self.0
    }
}

impl From<FieldMap> for Entry {
    fn from(fields: FieldMap) -> Self {
        Self(fields)
    }
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// Content store access credentials.
///
/// Every field is optional so that partially-configured scopes are
/// representable; completeness is checked by the query validator, not here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    /// Stack API key; also the client registry's cache key.
    pub api_key: Option<String>,
    /// Delivery access token.
    pub access_token: Option<String>,
    /// Publishing environment to query against.
    pub environment: Option<String>,
    /// Delivery API host override (region endpoints, mock servers).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
}

impl Credentials {
    /// Whether the three credential fields are all present.
    pub fn is_complete(&self) -> bool {
        self.api_key.is_some() && self.access_token.is_some() && self.environment.is_some()
    }
}

// ---------------------------------------------------------------------------
// QuerySpec
// ---------------------------------------------------------------------------

/// The content query configuration block attached to a source file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuerySpec {
    /// Per-file credential overrides; absent fields inherit from global options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,

    /// Content type identifier to query.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    /// Named query operations merged over the global filter set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<FilterSet>,

    /// Single-entry selector; forces `limit = 1` and a `uid` equality query.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_id: Option<String>,

    /// Bind exactly one entry (index 0 of the result) instead of a list.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub singleton: bool,

    /// Custom output path pattern with at most one `${entry.field}` segment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_pattern: Option<String>,

    /// Layout for fanned-out per-entry descriptors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_layout: Option<String>,
    /// Legacy alias for `entry_layout`, folded in during normalization.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_template: Option<String>,

    /// Ordered entry-hook names to apply to fetched entries.
    #[serde(
        default,
        rename = "entryHooks",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub entry_hooks: Vec<String>,

    /// Ordered post-hook names to apply to finished descriptors.
    #[serde(default, rename = "postHooks", skip_serializing_if = "Vec::is_empty")]
    pub post_hooks: Vec<String>,

    /// Partial content type identifiers this file wants injected.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub partials: Vec<String>,

    /// Derive the output extension from the source file instead of the default.
    #[serde(
        default,
        alias = "tmpl_extension",
        skip_serializing_if = "std::ops::Not::not"
    )]
    pub source_extension: bool,
}

impl QuerySpec {
    /// The per-entry layout, honoring the legacy `entry_template` alias.
    pub fn entry_layout(&self) -> Option<&str> {
        self.entry_layout
            .as_deref()
            .or(self.entry_template.as_deref())
    }

    /// Fold the legacy `entry_template` alias into `entry_layout`.
    pub fn normalize(&mut self) {
        if let Some(template) = self.entry_template.take() {
            self.entry_layout.get_or_insert(template);
        }
    }

    /// Whether this spec binds at most one entry: `singleton`, an explicit
    /// `entry_id`, or a `uid` equality condition in the file's own filters.
    pub fn selects_single(&self) -> bool {
        if self.singleton || self.entry_id.is_some() {
            return true;
        }
        self.filters
            .as_ref()
            .and_then(|f| f.get("query"))
            .and_then(Value::as_object)
            .is_some_and(|q| q.contains_key("uid"))
    }
}

// ---------------------------------------------------------------------------
// SiteFile
// ---------------------------------------------------------------------------

/// One file descriptor in the build's file map.
///
/// The same shape serves as source descriptor (as read by the orchestrator)
/// and output descriptor (after binding): the pipeline normalizes it in
/// place, then either passes it through untouched or binds entries, layout,
/// metadata, and partials onto it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteFile {
    /// Normalized output path; set from `custom_url` or the map key.
    #[serde(default)]
    pub file_name: String,

    /// Author-requested output path override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Raw source contents, passed through to output descriptors.
    #[serde(default)]
    pub contents: String,

    /// Renderable layout name; descriptors with a query spec but no layout
    /// are reconciled away.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
    /// Legacy alias for `layout`, folded in during normalization.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,

    /// Content query configuration; absent means the file has no content
    /// store dependency and skips the pipeline untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<QuerySpec>,

    /// Single bound entry (`singleton` / `entry_id` / fan-out descriptors).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry: Option<Entry>,

    /// Full bound entry list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entries: Option<Vec<Entry>>,

    /// Shared metadata injected by the build orchestrator.
    #[serde(default, skip_serializing_if = "FieldMap::is_empty")]
    pub metadata: FieldMap,

    /// Bound partial entries, keyed by partial content type identifier.
    /// One `Arc` per partial is shared by every requesting descriptor.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub partials: BTreeMap<String, Arc<Entry>>,
}

impl SiteFile {
    /// Normalize a freshly-read descriptor against its map key: resolve the
    /// output path from `custom_url` and fold the legacy `template` aliases.
    pub fn normalize(&mut self, key: &str) {
        self.file_name = self
            .custom_url
            .clone()
            .unwrap_or_else(|| key.to_string());

        if let Some(template) = self.template.take() {
            self.layout.get_or_insert(template);
        }
        if let Some(spec) = self.stack.as_mut() {
            spec.normalize();
        }
    }
}

// ---------------------------------------------------------------------------
// Binding
// ---------------------------------------------------------------------------

/// Per-source-file outcome of the binding worker.
///
/// Replaces the reference implementation's sentinel boolean: a file either
/// has no content store dependency and passes through every stage untouched,
/// or it resolved to a map of output descriptors.
#[derive(Debug, Clone)]
pub enum Binding {
    /// The source file has no content store dependency.
    Skip,
    /// Output descriptors produced for one source file (the source's own
    /// entry plus any fanned-out descriptors), keyed by output path.
    Bound(FileMap),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(value: Value) -> Entry {
        serde_json::from_value(value).expect("entry from object")
    }

    #[test]
    fn entry_uid_and_field_lookup() {
        let e = entry(json!({
            "uid": "blt123",
            "title": "Hello",
            "author": {"profile": {"slug": "jane-doe"}}
        }));

        assert_eq!(e.uid(), Some("blt123"));
        assert_eq!(
            e.field("author.profile.slug").and_then(Value::as_str),
            Some("jane-doe")
        );
        assert_eq!(e.field("author.profile.missing"), None);
        assert_eq!(e.field("title.not.an.object"), None);
    }

    #[test]
    fn query_spec_wire_names() {
        let spec: QuerySpec = serde_json::from_value(json!({
            "content_type": "post",
            "entryHooks": ["markdown"],
            "postHooks": ["inject_nav"],
            "tmpl_extension": true
        }))
        .expect("deserialize spec");

        assert_eq!(spec.content_type.as_deref(), Some("post"));
        assert_eq!(spec.entry_hooks, vec!["markdown"]);
        assert_eq!(spec.post_hooks, vec!["inject_nav"]);
        assert!(spec.source_extension);
    }

    #[test]
    fn entry_template_alias_folds_into_layout() {
        let mut spec = QuerySpec {
            entry_template: Some("article".into()),
            ..Default::default()
        };
        spec.normalize();
        assert_eq!(spec.entry_layout.as_deref(), Some("article"));
        assert_eq!(spec.entry_template, None);

        // An explicit entry_layout wins over the alias.
        let mut spec = QuerySpec {
            entry_layout: Some("article".into()),
            entry_template: Some("old".into()),
            ..Default::default()
        };
        spec.normalize();
        assert_eq!(spec.entry_layout.as_deref(), Some("article"));
    }

    #[test]
    fn selects_single_modes() {
        assert!(QuerySpec {
            singleton: true,
            ..Default::default()
        }
        .selects_single());

        assert!(QuerySpec {
            entry_id: Some("blt1".into()),
            ..Default::default()
        }
        .selects_single());

        let mut filters = FilterSet::new();
        filters.insert("query".into(), json!({"uid": "blt1"}));
        assert!(QuerySpec {
            filters: Some(filters),
            ..Default::default()
        }
        .selects_single());

        assert!(!QuerySpec::default().selects_single());
    }

    #[test]
    fn site_file_normalization() {
        let mut file = SiteFile {
            custom_url: Some("about/team.html".into()),
            template: Some("page".into()),
            stack: Some(QuerySpec {
                entry_template: Some("member".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        file.normalize("about.html");

        assert_eq!(file.file_name, "about/team.html");
        assert_eq!(file.layout.as_deref(), Some("page"));
        assert_eq!(file.template, None);
        assert_eq!(
            file.stack.as_ref().and_then(|s| s.entry_layout.as_deref()),
            Some("member")
        );
    }

    #[test]
    fn site_file_normalization_defaults_to_key() {
        let mut file = SiteFile::default();
        file.normalize("blog/index.html");
        assert_eq!(file.file_name, "blog/index.html");
    }
}
