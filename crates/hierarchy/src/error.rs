use std::path::PathBuf;

/// Failure reported by a [`PageProvider`](crate::page::PageProvider) while
/// fetching a page.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        self.message.as_str()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HierarchyError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unknown node: {0}")]
    UnknownNode(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl HierarchyError {
    /// Returns true when the error came from the page provider.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    pub(crate) fn unknown_node(id: impl std::fmt::Debug) -> Self {
        Self::UnknownNode(format!("{id:?}"))
    }
}

pub type Result<T> = std::result::Result<T, HierarchyError>;
