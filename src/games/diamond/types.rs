//! Diamond lattice core types.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::engine::models::{GameResult, PlayerId};

/// Index into `Lattice::dots`.
pub type DotId = usize;
/// Index into `Lattice::edges` and `DiamondState::edges`.
pub type EdgeId = usize;
/// Index into `Lattice::triangles` and `DiamondState::triangles`.
pub type TriangleId = usize;

/// Lattice address of a dot. Ordered by row, then column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPos {
    pub row: usize,
    pub col: usize,
}

impl GridPos {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.row, self.col)
    }
}

/// A lattice point with its board coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Dot {
    pub pos: GridPos,
    pub x: f64,
    pub y: f64,
}

/// Canonical name of an unordered dot pair: the lower endpoint comes first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey {
    a: GridPos,
    b: GridPos,
}

impl EdgeKey {
    pub fn new(p: GridPos, q: GridPos) -> Self {
        if p <= q {
            Self { a: p, b: q }
        } else {
            Self { a: q, b: p }
        }
    }

    pub fn endpoints(&self) -> (GridPos, GridPos) {
        (self.a, self.b)
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.a, self.b)
    }
}

impl Serialize for EdgeKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Structural edge: its key and the two dot indices it joins.
#[derive(Debug, Clone, Copy)]
pub struct EdgeDef {
    pub key: EdgeKey,
    pub dots: [DotId; 2],
}

/// Structural triangle: three corner dots and the three bounding edges.
#[derive(Debug, Clone, Copy)]
pub struct TriangleDef {
    pub corners: [GridPos; 3],
    pub edges: [EdgeId; 3],
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct EdgeState {
    pub drawn: bool,
    pub owner: Option<PlayerId>,
    /// Set when another player re-traces an owned edge. Display only.
    pub shared_by: Option<PlayerId>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct TriangleState {
    pub filled: bool,
    pub owner: Option<PlayerId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PlayerState {
    pub id: PlayerId,
    pub score: u32,
    pub is_ai: bool,
    pub label: String,
}

/// Maximum number of unit edges a human may draw in one move.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum DrawLimit {
    Segments(usize),
    /// The configured value was not a positive integer; kept verbatim.
    Invalid(String),
}

/// Per-game mutable state. The lattice itself is shared and immutable.
#[derive(Debug, Clone)]
pub struct DiamondState {
    pub edges: Vec<EdgeState>,
    pub triangles: Vec<TriangleState>,
    pub players: Vec<PlayerState>,
    pub current_player: PlayerId,
    pub draw_limit: DrawLimit,
    pub drawn_count: usize,
    pub moves_made: usize,
    pub result: Option<GameResult>,
}

impl DiamondState {
    pub fn total_players(&self) -> usize {
        self.players.len()
    }

    pub fn player(&self, id: PlayerId) -> Option<&PlayerState> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn is_over(&self) -> bool {
        self.result.is_some()
    }

    pub fn total_score(&self) -> u32 {
        self.players.iter().map(|p| p.score).sum()
    }

    /// Board-only view used to compare states before and after a rejected move.
    pub fn board_fingerprint(&self) -> (Vec<EdgeState>, Vec<TriangleState>, Vec<u32>, PlayerId) {
        (
            self.edges.clone(),
            self.triangles.clone(),
            self.players.iter().map(|p| p.score).collect(),
            self.current_player,
        )
    }
}

/// A move request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiamondAction {
    /// Straight line between two chosen dots, possibly spanning several edges.
    Chord { from: GridPos, to: GridPos },
    /// A single unit edge.
    Edge { key: EdgeKey },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_key_is_symmetric() {
        let p = GridPos::new(2, 3);
        let q = GridPos::new(1, 4);
        assert_eq!(EdgeKey::new(p, q), EdgeKey::new(q, p));
        assert_eq!(EdgeKey::new(p, q).endpoints(), (q, p));
    }

    #[test]
    fn test_edge_key_display() {
        let key = EdgeKey::new(GridPos::new(1, 1), GridPos::new(0, 0));
        assert_eq!(key.to_string(), "0,0_1,1");
        assert_eq!(serde_json::to_value(key).unwrap(), serde_json::json!("0,0_1,1"));
    }

    #[test]
    fn test_grid_pos_orders_by_row_first() {
        assert!(GridPos::new(0, 5) < GridPos::new(1, 0));
        assert!(GridPos::new(3, 1) < GridPos::new(3, 2));
    }
}
