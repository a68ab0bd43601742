//! Content Delivery API client.
//!
//! `StackClient` speaks the Contentstack-compatible delivery wire format:
//! `GET {host}/v3/content_types/{content_type}/entries` authenticated with
//! `api_key` / `access_token` headers, scoped by an `environment` parameter,
//! answering `{"entries": [...]}`. One client is constructed per credential
//! identity and cached for the process lifetime by [`crate::registry`].

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use stackbind_shared::{BindError, Credentials, Entry, FilterSet, Result};

use crate::query::Query;

/// User-Agent string for delivery requests.
const USER_AGENT: &str = concat!("stackbind/", env!("CARGO_PKG_VERSION"));

/// Default delivery API host.
const DEFAULT_HOST: &str = "https://cdn.contentstack.io";

/// Maximum number of redirects to follow.
const MAX_REDIRECTS: usize = 3;

/// Request timeout in seconds. There is deliberately no retry layer: a query
/// executes exactly once and failures surface to the caller.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Wire shape of a delivery API entries response.
#[derive(Debug, Deserialize)]
struct EntriesResponse {
    #[serde(default)]
    entries: Vec<Entry>,
}

// ---------------------------------------------------------------------------
// StackClient
// ---------------------------------------------------------------------------

/// A delivery API client bound to one credential identity.
#[derive(Debug)]
pub struct StackClient {
    http: Client,
    host: String,
    api_key: String,
    access_token: String,
    environment: String,
}

impl StackClient {
    /// Create a client from complete credentials.
    pub fn new(credentials: Credentials) -> Result<Self> {
        let api_key = credentials
            .api_key
            .ok_or_else(|| BindError::config("client requires an api_key"))?;
        let access_token = credentials
            .access_token
            .ok_or_else(|| BindError::config("client requires an access_token"))?;
        let environment = credentials
            .environment
            .ok_or_else(|| BindError::config("client requires an environment"))?;

        let host = credentials
            .host
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let host = host.trim_end_matches('/').to_string();
        Url::parse(&host)
            .map_err(|e| BindError::config(format!("invalid delivery host '{host}': {e}")))?;

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| BindError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            host,
            api_key,
            access_token,
            environment,
        })
    }

    /// The api_key this client was constructed with.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Start a query against a content type.
    pub fn content_type(&self, id: impl Into<String>) -> Query<'_> {
        Query::new(self, id.into())
    }

    /// Execute one entries request. Called by [`Query::find`].
    pub(crate) async fn fetch_entries(
        &self,
        content_type: &str,
        params: &FilterSet,
    ) -> Result<Vec<Entry>> {
        if content_type.is_empty() {
            return Err(BindError::config("cannot query an empty content type"));
        }

        let url = format!(
            "{}/v3/content_types/{content_type}/entries",
            self.host
        );

        let mut query_params: Vec<(String, String)> =
            vec![("environment".into(), self.environment.clone())];
        for (op, value) in params {
            query_params.push((op.clone(), encode_param(value)));
        }

        let response = self
            .http
            .get(&url)
            .header("api_key", &self.api_key)
            .header("access_token", &self.access_token)
            .query(&query_params)
            .send()
            .await
            .map_err(|e| BindError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BindError::Network(format!("{url}: HTTP {status}")));
        }

        let body: EntriesResponse = response
            .json()
            .await
            .map_err(|e| BindError::Network(format!("{url}: invalid response body: {e}")))?;

        debug!(
            content_type,
            count = body.entries.len(),
            "fetched entries from content store"
        );

        Ok(body.entries)
    }
}

/// Encode one named query operation's argument as a request parameter.
/// Strings pass through verbatim; everything else is compact JSON.
fn encode_param(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
