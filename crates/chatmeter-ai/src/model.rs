//! Model selection.

use std::fmt;

use chatmeter_common::ModelKind;

/// A model name tagged with the API surface it is used on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Model {
    Text(String),
    Embedding(String),
}

impl Model {
    pub fn text(name: impl Into<String>) -> Self {
        Model::Text(name.into())
    }

    pub fn embedding(name: impl Into<String>) -> Self {
        Model::Embedding(name.into())
    }

    pub fn name(&self) -> &str {
        match self {
            Model::Text(name) | Model::Embedding(name) => name,
        }
    }

    pub fn kind(&self) -> ModelKind {
        match self {
            Model::Text(_) => ModelKind::Text,
            Model::Embedding(_) => ModelKind::Embedding,
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
