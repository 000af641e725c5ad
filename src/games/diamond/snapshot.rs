//! Read-only board view handed to renderers after every change.

use serde::Serialize;

use crate::engine::models::{GameResult, PlayerId};
use crate::games::diamond::lattice::Lattice;
use crate::games::diamond::session::Selection;
use crate::games::diamond::types::*;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeView {
    pub key: EdgeKey,
    pub from: GridPos,
    pub to: GridPos,
    pub drawn: bool,
    pub owner: Option<PlayerId>,
    pub shared_by: Option<PlayerId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriangleView {
    pub corners: [GridPos; 3],
    pub filled: bool,
    pub owner: Option<PlayerId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerView {
    pub id: PlayerId,
    pub label: String,
    pub score: u32,
    pub is_ai: bool,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameOverView {
    pub winners: Vec<PlayerId>,
    pub labels: Vec<String>,
    pub tie: bool,
    pub message: String,
}

impl GameOverView {
    pub fn new(result: &GameResult, players: &[PlayerState]) -> Self {
        let labels: Vec<String> = result
            .winners
            .iter()
            .map(|&w| {
                players
                    .iter()
                    .find(|p| p.id == w)
                    .map(|p| p.label.clone())
                    .unwrap_or_else(|| format!("Player {w}"))
            })
            .collect();
        let tie = labels.len() > 1;
        let message = if tie {
            format!("Tie! ({})", labels.join(", "))
        } else {
            format!("{} wins!", labels.first().map(String::as_str).unwrap_or("Nobody"))
        };
        Self {
            winners: result.winners.clone(),
            labels,
            tie,
            message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub width: f64,
    pub height: f64,
    pub dots: Vec<Dot>,
    pub edges: Vec<EdgeView>,
    pub triangles: Vec<TriangleView>,
    pub players: Vec<PlayerView>,
    pub current_player: Option<PlayerId>,
    pub selection: Selection,
    pub ai_thinking: bool,
    /// None when the configured draw length is unusable.
    pub max_draw_length: Option<usize>,
    pub game_over: Option<GameOverView>,
}

impl Snapshot {
    pub fn capture(
        lattice: &Lattice,
        state: &DiamondState,
        selection: Selection,
        ai_thinking: bool,
    ) -> Self {
        let active = (!state.is_over()).then_some(state.current_player);
        Self {
            width: lattice.width(),
            height: lattice.height(),
            dots: lattice.dots().to_vec(),
            edges: lattice
                .edges()
                .iter()
                .zip(&state.edges)
                .map(|(def, s)| {
                    let (from, to) = def.key.endpoints();
                    EdgeView {
                        key: def.key,
                        from,
                        to,
                        drawn: s.drawn,
                        owner: s.owner,
                        shared_by: s.shared_by,
                    }
                })
                .collect(),
            triangles: lattice
                .triangles()
                .iter()
                .zip(&state.triangles)
                .map(|(def, s)| TriangleView {
                    corners: def.corners,
                    filled: s.filled,
                    owner: s.owner,
                })
                .collect(),
            players: state
                .players
                .iter()
                .map(|p| PlayerView {
                    id: p.id,
                    label: p.label.clone(),
                    score: p.score,
                    is_ai: p.is_ai,
                    active: active == Some(p.id),
                })
                .collect(),
            current_player: active,
            selection,
            ai_thinking,
            max_draw_length: match state.draw_limit {
                DrawLimit::Segments(n) => Some(n),
                DrawLimit::Invalid(_) => None,
            },
            game_over: state
                .result
                .as_ref()
                .map(|r| GameOverView::new(r, &state.players)),
        }
    }
}
