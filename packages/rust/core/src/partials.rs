//! Shared "partial" content binding.
//!
//! Partials (navigation, footers, site chrome) are fetched once per build —
//! one unfiltered query per configured content type, first entry wins — and
//! injected into every output descriptor that requests them. All requesting
//! descriptors share the same `Arc<Entry>`.
//!
//! Unlike the per-file workers, this phase is not isolated: any failure
//! aborts partial binding entirely and surfaces as the build's error.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::info;

use stackbind_shared::{BindError, Binding, Entry, Result};

use crate::pipeline::BindOptions;

/// Fetch every configured partial and inject it into requesting descriptors.
pub async fn bind_partials(bindings: &mut [Binding], options: &BindOptions) -> Result<()> {
    if options.partials.is_empty() {
        return Ok(());
    }

    let client = stackbind_store::client_for(&options.credentials)?;

    let mut set: JoinSet<Result<(String, Arc<Entry>)>> = JoinSet::new();
    for content_type in options.partials.clone() {
        let client = Arc::clone(&client);
        set.spawn(async move {
            let entries = client
                .content_type(content_type.as_str())
                .find()
                .await
                .map_err(|e| BindError::partial(&content_type, e.to_string()))?;

            let first = entries.into_iter().next().ok_or_else(|| {
                BindError::partial(&content_type, "query returned no entries")
            })?;

            Ok((content_type, Arc::new(first)))
        });
    }

    let mut fetched: BTreeMap<String, Arc<Entry>> = BTreeMap::new();
    while let Some(joined) = set.join_next().await {
        let (content_type, entry) =
            joined.map_err(|e| BindError::partial("partials", format!("task failed: {e}")))??;
        fetched.insert(content_type, entry);
    }

    info!(partials = fetched.len(), "fetched shared partials");

    for binding in bindings.iter_mut() {
        let Binding::Bound(map) = binding else {
            continue;
        };
        for file in map.values_mut() {
            let Some(spec) = &file.stack else {
                continue;
            };
            for requested in &spec.partials {
                if let Some(entry) = fetched.get(requested) {
                    file.partials.insert(requested.clone(), Arc::clone(entry));
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use stackbind_shared::{Credentials, FileMap, QuerySpec, SiteFile};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn options(server_uri: &str, api_key: &str, partials: &[&str]) -> BindOptions {
        BindOptions {
            credentials: Credentials {
                api_key: Some(api_key.into()),
                access_token: Some("token".into()),
                environment: Some("staging".into()),
                host: Some(server_uri.into()),
            },
            partials: partials.iter().map(|p| p.to_string()).collect(),
            ..Default::default()
        }
    }

    fn bound_file(name: &str, partials: &[&str]) -> (String, SiteFile) {
        (
            name.to_string(),
            SiteFile {
                file_name: name.into(),
                layout: Some("page".into()),
                stack: Some(QuerySpec {
                    partials: partials.iter().map(|p| p.to_string()).collect(),
                    ..Default::default()
                }),
                ..Default::default()
            },
        )
    }

    #[tokio::test]
    async fn requesting_descriptors_share_one_entry() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v3/content_types/nav/entries"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "entries": [{"uid": "nav1", "links": ["home", "blog"]}]
            })))
            .mount(&server)
            .await;

        let mut map = FileMap::new();
        for (name, file) in [
            bound_file("a.html", &["nav"]),
            bound_file("b.html", &["nav"]),
            bound_file("c.html", &[]),
        ] {
            map.insert(name, file);
        }
        let mut bindings = vec![Binding::Bound(map), Binding::Skip];

        let options = options(&server.uri(), "partials-key-share", &["nav"]);
        bind_partials(&mut bindings, &options).await.unwrap();

        let Binding::Bound(map) = &bindings[0] else {
            panic!("expected bound map");
        };
        let nav_a = map["a.html"].partials.get("nav").expect("nav on a.html");
        let nav_b = map["b.html"].partials.get("nav").expect("nav on b.html");
        assert!(Arc::ptr_eq(nav_a, nav_b));
        assert_eq!(nav_a.uid(), Some("nav1"));

        // The non-requesting descriptor has no partial bound.
        assert!(map["c.html"].partials.is_empty());
    }

    #[tokio::test]
    async fn empty_partial_result_aborts_the_phase() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v3/content_types/footer/entries"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"entries": []})))
            .mount(&server)
            .await;

        let mut bindings = vec![Binding::Skip];
        let options = options(&server.uri(), "partials-key-empty", &["footer"]);
        let err = bind_partials(&mut bindings, &options).await.unwrap_err();

        assert!(matches!(err, BindError::Partial { .. }));
        assert!(err.to_string().contains("footer"));
    }

    #[tokio::test]
    async fn no_configured_partials_is_a_no_op() {
        let mut bindings = vec![Binding::Skip];
        let options = BindOptions::default();
        bind_partials(&mut bindings, &options).await.unwrap();
    }
}
