//! CLI error types.

use std::path::PathBuf;

use docloom_config::ConfigError;
use docloom_site::GenerateError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Generate(#[from] GenerateError),

    #[error("Failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("{warnings} warning(s) raised in strict mode; no files written")]
    Strict { warnings: usize },
}
