//! Pre-query validation of credential and selector configuration.
//!
//! Validation runs before any network call: a file must have a fully
//! satisfied credential scope — all four fields on the file itself, or the
//! three credential fields globally with a content type available at either
//! scope — and must not combine mutually exclusive selectors.

use tracing::info;

use stackbind_shared::{BindError, Credentials, QuerySpec, Result};

/// Which scope satisfied the credential requirements for a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialScope {
    /// The file's own query spec carried complete credentials.
    File,
    /// Global options supplied the credentials.
    Global,
}

/// Validate a file's query configuration against global options.
///
/// Returns the satisfied credential scope, or a [`BindError::Configuration`]
/// naming the file. Emits a diagnostic naming the scope that supplied the
/// credentials.
pub fn validate(
    file_name: &str,
    spec: &QuerySpec,
    global: &Credentials,
    global_content_type: Option<&str>,
) -> Result<CredentialScope> {
    let scope = credential_scope(file_name, spec, global, global_content_type)?;

    // A single-entry selector cannot also request a per-entry fan-out.
    if spec.entry_id.is_some() && spec.entry_layout().is_some() {
        return Err(BindError::configuration(
            file_name,
            "entry_id and entry_layout are mutually exclusive; provide one or the other",
        ));
    }

    Ok(scope)
}

fn credential_scope(
    file_name: &str,
    spec: &QuerySpec,
    global: &Credentials,
    global_content_type: Option<&str>,
) -> Result<CredentialScope> {
    let file_complete = spec.api_key.is_some()
        && spec.access_token.is_some()
        && spec.environment.is_some()
        && spec.content_type.is_some();

    if file_complete {
        info!(file = %file_name, scope = "file", "resolved content store credentials");
        return Ok(CredentialScope::File);
    }

    if global.is_complete() {
        if spec.content_type.is_none() && global_content_type.is_none() {
            return Err(BindError::configuration(
                file_name,
                "no content_type configured at file or global scope",
            ));
        }
        info!(file = %file_name, scope = "global", "resolved content store credentials");
        return Ok(CredentialScope::Global);
    }

    Err(BindError::configuration(
        file_name,
        "incomplete content store credentials: provide api_key, access_token, environment \
         and content_type on the file, or api_key, access_token and environment in global options",
    ))
}

/// Field-level credential resolution: each file-scope field falls back to
/// its global counterpart. The host override is global-only.
pub fn resolve_credentials(spec: &QuerySpec, global: &Credentials) -> Credentials {
    Credentials {
        api_key: spec.api_key.clone().or_else(|| global.api_key.clone()),
        access_token: spec
            .access_token
            .clone()
            .or_else(|| global.access_token.clone()),
        environment: spec
            .environment
            .clone()
            .or_else(|| global.environment.clone()),
        host: global.host.clone(),
    }
}
