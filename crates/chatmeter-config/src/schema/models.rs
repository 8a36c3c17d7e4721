//! Default model selection.

use serde::{Deserialize, Serialize};

/// Models used when a call does not name one explicitly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ModelsConfig {
    /// Chat completion model.
    pub text: String,
    /// Embedding model.
    pub embedding: String,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            text: "gpt-3.5-turbo".to_string(),
            embedding: "text-embedding-ada-002".to_string(),
        }
    }
}
