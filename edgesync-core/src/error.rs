//! Error types for edgesync-core.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::ArtifactKind;

/// All errors that can arise from loading configuration or validating
/// artifact specs.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure (file not found, permission denied, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error (write/save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load: includes file path and line context from serde_yaml.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// `dirs::home_dir()` returned `None`: cannot locate `~/.edgesync/`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,

    /// The config file did not exist at the expected path.
    #[error("config not found at {path}; run `edgesync init` first")]
    NotFound { path: PathBuf },

    /// A loaded config is structurally valid YAML but unusable.
    #[error("invalid config: {0}")]
    Invalid(String),

    /// An artifact spec lacks a field required to build the artifact.
    #[error("{kind} '{name}' is missing required field `{field}`")]
    MissingField {
        kind: ArtifactKind,
        name: String,
        field: &'static str,
    },
}
