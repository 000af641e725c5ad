//! Computer player: take a free triangle if one is on offer, otherwise avoid
//! handing one to the next player.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::engine::bot_strategy::{BotStrategy, RandomStrategy};
use crate::engine::models::PlayerId;
use crate::games::diamond::lattice::Lattice;
use crate::games::diamond::plugin::DiamondPlugin;
use crate::games::diamond::scoring::drawn_sides;
use crate::games::diamond::types::*;

/// First undrawn edge, scanning triangles in generation order, that closes a
/// triangle with two sides already drawn.
pub fn find_scoring_edge(lattice: &Lattice, state: &DiamondState) -> Option<EdgeId> {
    lattice
        .triangles()
        .iter()
        .enumerate()
        .filter(|(id, _)| !state.triangles[*id].filled)
        .find_map(|(id, tri)| {
            if drawn_sides(lattice, &state.edges, id) != 2 {
                return None;
            }
            tri.edges.iter().copied().find(|&e| !state.edges[e].drawn)
        })
}

/// Undrawn edges that would not leave any triangle with exactly two sides.
pub fn find_safe_edges(lattice: &Lattice, state: &DiamondState) -> Vec<EdgeId> {
    undrawn_edges(state)
        .filter(|&e| {
            lattice.triangles_of(e).iter().all(|&tri| {
                state.triangles[tri].filled || drawn_sides(lattice, &state.edges, tri) != 1
            })
        })
        .collect()
}

fn undrawn_edges(state: &DiamondState) -> impl Iterator<Item = EdgeId> + '_ {
    state
        .edges
        .iter()
        .enumerate()
        .filter(|(_, e)| !e.drawn)
        .map(|(id, _)| id)
}

/// Pick one edge: scoring, then a random safe edge, then any random edge.
pub fn choose_edge(lattice: &Lattice, state: &DiamondState, rng: &mut StdRng) -> Option<EdgeId> {
    if let Some(edge) = find_scoring_edge(lattice, state) {
        tracing::debug!(edge = %lattice.edges()[edge].key, "ai takes a triangle");
        return Some(edge);
    }

    let safe = find_safe_edges(lattice, state);
    if let Some(&edge) = safe.choose(rng) {
        tracing::debug!(edge = %lattice.edges()[edge].key, options = safe.len(), "ai plays safe");
        return Some(edge);
    }

    let remaining: Vec<EdgeId> = undrawn_edges(state).collect();
    let edge = remaining.choose(rng).copied();
    if let Some(edge) = edge {
        tracing::debug!(edge = %lattice.edges()[edge].key, options = remaining.len(), "ai forced to concede");
    }
    edge
}

/// Greedy one-edge strategy used for the computer seat.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicStrategy;

impl BotStrategy<DiamondPlugin> for HeuristicStrategy {
    fn choose_action(
        &self,
        state: &DiamondState,
        _player_id: PlayerId,
        plugin: &DiamondPlugin,
        rng: &mut StdRng,
    ) -> Option<DiamondAction> {
        let lattice = plugin.lattice();
        choose_edge(lattice, state, rng).map(|e| DiamondAction::Edge {
            key: lattice.edges()[e].key,
        })
    }
}

/// Strategy for a configured bot name: "heuristic" or "random".
pub fn strategy_by_name(name: &str) -> Option<Box<dyn BotStrategy<DiamondPlugin>>> {
    match name {
        "heuristic" => Some(Box::new(HeuristicStrategy)),
        "random" => Some(Box::new(RandomStrategy)),
        _ => None,
    }
}
