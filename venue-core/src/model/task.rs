use serde::{Deserialize, Serialize};

/// Kind of widget a task renders. Only venues take part in signaling.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Choice,
    Comments,
    Text,
    Venue,
}

impl TaskKind {
    pub fn is_venue(self) -> bool {
        matches!(self, TaskKind::Venue)
    }
}
