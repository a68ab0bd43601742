//! Query building: filter merging and named-operation dispatch.
//!
//! A [`Query`] accumulates named operations (`query`, `limit`, `desc`,
//! `include[]`, ...) and executes exactly once via [`Query::find`]. Operation
//! names are not interpreted here — each key is passed straight through to
//! the delivery API as a request parameter, which is what lets file authors
//! use the store's full filter vocabulary without this crate enumerating it.

use serde_json::Value;

use stackbind_shared::{Entry, FilterSet, QuerySpec, Result};

use crate::client::StackClient;

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

/// A single-shot entries query against one content type.
#[derive(Debug)]
pub struct Query<'a> {
    client: &'a StackClient,
    content_type: String,
    params: FilterSet,
}

impl<'a> Query<'a> {
    pub(crate) fn new(client: &'a StackClient, content_type: String) -> Self {
        Self {
            client,
            content_type,
            params: FilterSet::new(),
        }
    }

    /// Apply one named operation with its argument.
    pub fn apply(mut self, op: impl Into<String>, value: Value) -> Self {
        self.params.insert(op.into(), value);
        self
    }

    /// Apply every operation from a merged filter set.
    pub fn apply_all(mut self, filters: &FilterSet) -> Self {
        for (op, value) in filters {
            self.params.insert(op.clone(), value.clone());
        }
        self
    }

    /// The accumulated operations.
    pub fn params(&self) -> &FilterSet {
        &self.params
    }

    /// Execute the query once, returning entries in delivery order.
    pub async fn find(self) -> Result<Vec<Entry>> {
        self.client
            .fetch_entries(&self.content_type, &self.params)
            .await
    }
}

// ---------------------------------------------------------------------------
// Filter merging
// ---------------------------------------------------------------------------

/// Merge the global filter set and a file's filter set into the operations
/// for one query.
///
/// File-level keys take precedence. The global set is cloned before merging
/// and is never mutated — it is reused across every file in the build. When
/// the spec carries an `entry_id`, the merged set is forced to `limit = 1`
/// with a `uid` equality condition overriding any previously set `uid`
/// filter (other keys of an existing `query` condition are preserved).
pub fn build_filters(global: Option<&FilterSet>, spec: &QuerySpec) -> Option<FilterSet> {
    if global.is_none() && spec.filters.is_none() && spec.entry_id.is_none() {
        return None;
    }

    let mut merged = global.cloned().unwrap_or_default();
    if let Some(file_filters) = &spec.filters {
        for (op, value) in file_filters {
            merged.insert(op.clone(), value.clone());
        }
    }

    if let Some(entry_id) = &spec.entry_id {
        merged.insert("limit".into(), Value::from(1));

        let mut condition = merged
            .get("query")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        condition.insert("uid".into(), Value::String(entry_id.clone()));
        merged.insert("query".into(), Value::Object(condition));
    }

    Some(merged)
}
