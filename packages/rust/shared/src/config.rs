//! Application configuration for stackbind.
//!
//! User config lives at `~/.stackbind/stackbind.toml`. The config file never
//! stores credentials directly — it stores the *names* of the environment
//! variables that hold them, and [`AppConfig::credentials`] resolves those at
//! runtime. Orchestrators that manage credentials themselves can bypass this
//! module entirely and build a [`Credentials`] value directly.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BindError, Result};
use crate::types::Credentials;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "stackbind.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".stackbind";

// ---------------------------------------------------------------------------
// Config structs (matching stackbind.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Content store connection settings.
    #[serde(default)]
    pub stack: StackConfig,

    /// Global query defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

/// `[stack]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Name of the env var holding the delivery access token.
    #[serde(default = "default_access_token_env")]
    pub access_token_env: String,

    /// Publishing environment to query against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,

    /// Delivery API host override (region endpoints).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            access_token_env: default_access_token_env(),
            environment: None,
            host: None,
        }
    }
}

fn default_api_key_env() -> String {
    "STACKBIND_API_KEY".into()
}
fn default_access_token_env() -> String {
    "STACKBIND_ACCESS_TOKEN".into()
}

/// `[defaults]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Default content type for files that don't name one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    /// Partial content types fetched once per build.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub partials: Vec<String>,
}

impl AppConfig {
    /// Resolve credentials from the configured environment variables.
    ///
    /// Unset variables resolve to `None` rather than an error — per-file
    /// credential overrides may make global credentials unnecessary, and the
    /// query validator decides per file whether the available scopes suffice.
    pub fn credentials(&self) -> Credentials {
        Credentials {
            api_key: non_empty_env(&self.stack.api_key_env),
            access_token: non_empty_env(&self.stack.access_token_env),
            environment: self.stack.environment.clone(),
            host: self.stack.host.clone(),
        }
    }
}

fn non_empty_env(var_name: &str) -> Option<String> {
    std::env::var(var_name).ok().filter(|v| !v.is_empty())
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.stackbind/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| BindError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.stackbind/stackbind.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| BindError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| BindError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| BindError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| BindError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| BindError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("STACKBIND_API_KEY"));
        assert!(toml_str.contains("STACKBIND_ACCESS_TOKEN"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.stack.api_key_env, "STACKBIND_API_KEY");
        assert!(parsed.defaults.content_type.is_none());
    }

    #[test]
    fn config_with_defaults_section() {
        let toml_str = r#"
[stack]
environment = "production"
host = "https://eu-cdn.example.com"

[defaults]
content_type = "post"
partials = ["nav", "footer"]
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.stack.environment.as_deref(), Some("production"));
        assert_eq!(config.defaults.content_type.as_deref(), Some("post"));
        assert_eq!(config.defaults.partials, vec!["nav", "footer"]);
    }

    #[test]
    fn credentials_resolve_from_env() {
        // Unique env var names to avoid interfering with other tests
        let mut config = AppConfig::default();
        config.stack.api_key_env = "SB_TEST_KEY_71632".into();
        config.stack.access_token_env = "SB_TEST_TOKEN_71632".into();
        config.stack.environment = Some("staging".into());

        unsafe {
            std::env::set_var("SB_TEST_KEY_71632", "key-abc");
            std::env::set_var("SB_TEST_TOKEN_71632", "token-def");
        }

        let creds = config.credentials();
        assert_eq!(creds.api_key.as_deref(), Some("key-abc"));
        assert_eq!(creds.access_token.as_deref(), Some("token-def"));
        assert_eq!(creds.environment.as_deref(), Some("staging"));
        assert!(creds.is_complete());
    }

    #[test]
    fn missing_env_vars_resolve_to_none() {
        let mut config = AppConfig::default();
        config.stack.api_key_env = "SB_TEST_NONEXISTENT_98217".into();
        config.stack.access_token_env = "SB_TEST_NONEXISTENT_98218".into();

        let creds = config.credentials();
        assert!(creds.api_key.is_none());
        assert!(creds.access_token.is_none());
        assert!(!creds.is_complete());
    }
}
