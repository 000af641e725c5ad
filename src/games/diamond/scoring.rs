//! Triangle completion and final standings.

use crate::engine::models::PlayerId;
use crate::games::diamond::lattice::Lattice;
use crate::games::diamond::types::*;

/// Number of drawn sides of a triangle.
pub fn drawn_sides(lattice: &Lattice, edges: &[EdgeState], tri: TriangleId) -> usize {
    lattice.triangles()[tri]
        .edges
        .iter()
        .filter(|&&e| edges[e].drawn)
        .count()
}

/// Fill every unfilled triangle that the freshly drawn edges just closed and
/// credit them to `player`. Returns the filled triangles in generation order.
///
/// Only triangles touching a fresh edge can have changed, so only those are
/// checked.
pub fn complete_triangles(
    lattice: &Lattice,
    state: &mut DiamondState,
    fresh: &[EdgeId],
    player: PlayerId,
) -> Vec<TriangleId> {
    let mut candidates: Vec<TriangleId> = fresh
        .iter()
        .flat_map(|&e| lattice.triangles_of(e).iter().copied())
        .collect();
    candidates.sort_unstable();
    candidates.dedup();

    let mut closed = Vec::new();
    for tri in candidates {
        if state.triangles[tri].filled || drawn_sides(lattice, &state.edges, tri) < 3 {
            continue;
        }
        state.triangles[tri] = TriangleState {
            filled: true,
            owner: Some(player),
        };
        closed.push(tri);
    }

    if !closed.is_empty() {
        if let Some(p) = state.players.iter_mut().find(|p| p.id == player) {
            p.score += closed.len() as u32;
        }
    }
    closed
}

/// Players sharing the highest score, in seat order.
pub fn leaders(players: &[PlayerState]) -> Vec<PlayerId> {
    let Some(best) = players.iter().map(|p| p.score).max() else {
        return Vec::new();
    };
    players
        .iter()
        .filter(|p| p.score == best)
        .map(|p| p.id)
        .collect()
}
