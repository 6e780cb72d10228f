//! Deterministic grid placement for nodes added without an explicit position.

use serde::{Deserialize, Serialize};

use crate::schema::Position;

/// Fixed-column grid indexed by node count. Collisions with hand-placed nodes
/// are tolerated; nothing is ever moved.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridLayout {
    pub columns: usize,
    pub spacing_x: f64,
    pub spacing_y: f64,
    pub origin: Position,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            columns: 4,
            spacing_x: 180.0,
            spacing_y: 140.0,
            origin: Position::new(120.0, 120.0),
        }
    }
}

impl GridLayout {
    /// Slot for the `index`-th node (0-based).
    pub fn position(&self, index: usize) -> Position {
        let columns = self.columns.max(1);
        let col = (index % columns) as f64;
        let row = (index / columns) as f64;
        Position::new(
            self.origin.x + col * self.spacing_x,
            self.origin.y + row * self.spacing_y,
        )
    }
}
