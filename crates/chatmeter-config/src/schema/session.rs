//! Conversation behaviour.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SessionConfig {
    /// Keep turns in history across calls. When false every call is one-shot.
    pub interactive: bool,
    /// Optional system message that opens every conversation and survives reset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            interactive: true,
            system_prompt: None,
        }
    }
}
