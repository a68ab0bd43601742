//! Process-wide client registry.
//!
//! One [`StackClient`] exists per distinct credential identity for the
//! lifetime of the process — deliberately shared across builds, not
//! per-build state. The cache is keyed by `api_key` alone: the first call
//! for a key constructs and caches a client, and later calls return that
//! instance regardless of the other credential fields.
//!
//! The map is mutex-guarded because the pipeline runs its per-file workers
//! on a multi-threaded runtime.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

use tracing::debug;

use stackbind_shared::{BindError, Credentials, Result};

use crate::client::StackClient;

static CLIENTS: OnceLock<Mutex<HashMap<String, Arc<StackClient>>>> = OnceLock::new();

/// Get or create the client for a credential identity.
pub fn client_for(credentials: &Credentials) -> Result<Arc<StackClient>> {
    let api_key = credentials
        .api_key
        .as_deref()
        .ok_or_else(|| BindError::config("cannot create a content store client without an api_key"))?;

    let mut clients = CLIENTS
        .get_or_init(|| Mutex::new(HashMap::new()))
        .lock()
        .expect("client registry lock poisoned");

    if let Some(client) = clients.get(api_key) {
        return Ok(Arc::clone(client));
    }

    debug!(api_key, "constructing content store client");
    let client = Arc::new(StackClient::new(credentials.clone())?);
    clients.insert(api_key.to_string(), Arc::clone(&client));
    Ok(client)
}
