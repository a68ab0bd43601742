//! Output path derivation for fanned-out entry descriptors.
//!
//! Two branches: the default convention joins the source path's stem with
//! the entry's uid (`blog/post.html` + `abc123` → `blog/post/abc123.html`);
//! a custom pattern lets authors compute either a static alias or a
//! per-field slug (`articles/${entry.slug}`) without a general templating
//! engine. The chosen extension is appended in both branches.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use stackbind_shared::{BindError, Entry, QuerySpec, Result};

/// Extension appended when the spec doesn't opt into the source file's own.
pub const DEFAULT_EXTENSION: &str = "html";

/// Matches one `${ ... }` interpolation placeholder.
fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\{\s*(.*?)\s*\}").expect("placeholder regex"))
}

/// Derive the output path for one entry of a fanned-out source file.
pub fn derive(entry: &Entry, source_name: &str, spec: &QuerySpec) -> Result<String> {
    let extension = if spec.source_extension {
        source_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_string())
            .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
    } else {
        DEFAULT_EXTENSION.to_string()
    };

    let name = match &spec.custom_pattern {
        Some(pattern) => resolve_pattern(pattern, entry, source_name)?,
        None => {
            let uid = entry.uid().ok_or_else(|| {
                BindError::pattern(source_name, "entry has no uid to derive a file name from")
            })?;
            let stem = source_name
                .rsplit_once('.')
                .map(|(stem, _)| stem)
                .unwrap_or(source_name);
            format!("{stem}/{uid}")
        }
    };

    Ok(format!("{name}.{extension}"))
}

/// Evaluate a custom pattern against an entry.
///
/// The final path segment is the candidate template. Without a placeholder
/// the whole pattern is returned verbatim. With one, the dotted field path
/// inside it (minus a leading `entry.`) is resolved against the entry; a
/// missing, falsy, or non-string resolution is a pattern error. URL-style
/// fields commonly carry a leading slash, which is stripped before the
/// resolved value is rejoined with the preceding segments.
fn resolve_pattern(pattern: &str, entry: &Entry, source_name: &str) -> Result<String> {
    let (prefix, candidate) = match pattern.rsplit_once('/') {
        Some((prefix, last)) => (prefix, last),
        None => ("", pattern),
    };

    let Some(caps) = placeholder_re().captures(candidate) else {
        return Ok(pattern.to_string());
    };

    let field_path = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
    let field_path = field_path.strip_prefix("entry.").unwrap_or(field_path);

    let value = entry.field(field_path);
    if !is_truthy(value) {
        return Err(BindError::pattern(
            source_name,
            format!("custom pattern field '{field_path}' is missing or empty"),
        ));
    }
    let resolved = value.and_then(Value::as_str).ok_or_else(|| {
        BindError::pattern(
            source_name,
            format!("custom pattern field '{field_path}' did not resolve to a string"),
        )
    })?;

    let resolved = resolved.strip_prefix('/').unwrap_or(resolved);
    if prefix.is_empty() {
        Ok(resolved.to_string())
    } else {
        Ok(format!("{prefix}/{resolved}"))
    }
}

/// JSON truthiness: null, false, 0, and "" all disqualify a resolution.
fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}
