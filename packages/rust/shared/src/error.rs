//! Error types for stackbind.
//!
//! Library crates use [`BindError`] via `thiserror`. Per-file failures
//! (`Configuration`, `Query`, `Pattern`) drop only the affected file from the
//! build; `Partial` aborts the whole partial-binding phase and surfaces as
//! the pipeline's error.

use std::path::PathBuf;

/// Top-level error type for all stackbind operations.
#[derive(Debug, thiserror::Error)]
pub enum BindError {
    /// Incomplete or contradictory credential/selector configuration on a file.
    #[error("configuration error in '{file}': {message}")]
    Configuration { file: String, message: String },

    /// Content store query execution failure for one file.
    #[error("query for '{file}' failed")]
    Query {
        file: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Custom path pattern could not be resolved against an entry.
    #[error("pattern error in '{file}': {message}")]
    Pattern { file: String, message: String },

    /// A configured partial content type could not be bound.
    #[error("partial '{content_type}' fetch failed: {message}")]
    Partial {
        content_type: String,
        message: String,
    },

    /// Network/HTTP error talking to the content store.
    #[error("network error: {0}")]
    Network(String),

    /// Configuration file loading or parsing error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, BindError>;

impl BindError {
    /// Create a configuration error naming the offending file.
    pub fn configuration(file: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Configuration {
            file: file.into(),
            message: msg.into(),
        }
    }

    /// Wrap a query execution failure with the file it belongs to.
    pub fn query(
        file: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Query {
            file: file.into(),
            source: source.into(),
        }
    }

    /// Create a pattern error naming the offending file.
    pub fn pattern(file: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Pattern {
            file: file.into(),
            message: msg.into(),
        }
    }

    /// Create a partial-binding error for a content type.
    pub fn partial(content_type: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Partial {
            content_type: content_type.into(),
            message: msg.into(),
        }
    }

    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = BindError::configuration("blog/index.html", "missing environment");
        assert_eq!(
            err.to_string(),
            "configuration error in 'blog/index.html': missing environment"
        );

        let err = BindError::partial("nav", "no entries returned");
        assert!(err.to_string().contains("'nav'"));
    }

    #[test]
    fn query_error_preserves_cause() {
        let cause = BindError::Network("HTTP 500".into());
        let err = BindError::query("blog/index.html", cause);
        assert_eq!(err.to_string(), "query for 'blog/index.html' failed");

        let source = std::error::Error::source(&err).expect("source");
        assert!(source.to_string().contains("HTTP 500"));
    }
}
