//! Session-level errors.

use std::path::PathBuf;

use chatmeter_common::{ConfigError, ModelKind};

use crate::AiError;

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// No price row for the model, or the row belongs to the other model kind.
    #[error("no price known for {kind} model '{name}'")]
    UnknownModel { name: String, kind: ModelKind },

    #[error("corrupt cache file {}: {reason}", path.display())]
    CorruptCache { path: PathBuf, reason: String },

    #[error("failed to write cache file {}: {source}", path.display())]
    CacheWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failure reported by the remote API, passed through untouched.
    #[error(transparent)]
    Upstream(#[from] AiError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
