//! Ordered conversation history.

use std::fmt;

use crate::{Message, Role};

/// Conversation turns, optionally opened by a fixed system message.
///
/// The system message is part of the history sent upstream and survives
/// [`Conversation::reset`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    system_prompt: Option<String>,
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new(system_prompt: Option<String>) -> Self {
        let mut conversation = Self {
            system_prompt,
            messages: Vec::new(),
        };
        conversation.reset();
        conversation
    }

    pub fn append(&mut self, role: Role, content: impl Into<String>) {
        self.messages.push(Message::new(role, content));
    }

    /// Drop every turn, keeping only the initial system message.
    pub fn reset(&mut self) {
        self.messages.clear();
        if let Some(ref prompt) = self.system_prompt {
            self.messages.push(Message::new(Role::System, prompt.clone()));
        }
    }

    /// Keep the system message plus the last `n` turns.
    pub fn keep_last(&mut self, n: usize) {
        let preamble = self.preamble_len();
        let turns = self.messages.len() - preamble;
        if turns > n {
            self.messages.drain(preamble..preamble + (turns - n));
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn system_prompt(&self) -> Option<&str> {
        self.system_prompt.as_deref()
    }

    /// Number of messages, system message included.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// True when nothing beyond the system message has been said.
    pub fn is_empty(&self) -> bool {
        self.messages.len() == self.preamble_len()
    }

    /// Human-readable transcript, one `> role: ` block per turn.
    pub fn render(&self) -> String {
        self.messages
            .iter()
            .map(|m| format!("> {}: \n{}", m.role.as_str(), m.content))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    fn preamble_len(&self) -> usize {
        usize::from(self.system_prompt.is_some())
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new(None)
    }
}

impl fmt::Display for Conversation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
