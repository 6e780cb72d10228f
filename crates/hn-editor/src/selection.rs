//! The editor's current selection: nothing, or one existing node or pipe.

use serde::{Deserialize, Serialize};

/// What the user is looking at: nothing, one node or one pipe.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "lowercase")]
pub enum Selection {
    #[default]
    None,
    Node(String),
    Pipe(String),
}

impl Selection {
    pub fn is_none(&self) -> bool {
        matches!(self, Selection::None)
    }

    pub fn node_id(&self) -> Option<&str> {
        match self {
            Selection::Node(id) => Some(id),
            _ => None,
        }
    }

    pub fn pipe_id(&self) -> Option<&str> {
        match self {
            Selection::Pipe(id) => Some(id),
            _ => None,
        }
    }
}
