//! Synchronous game simulator. This is the single place where an action is
//! applied to a running game; the arena and interactive sessions both use it.

use std::collections::HashMap;

use crate::engine::models::*;
use crate::engine::plugin::GamePlugin;

/// Mutable game state for synchronous simulation.
#[derive(Clone)]
pub struct SimulationState<S> {
    pub state: S,
    pub players: Vec<Player>,
    pub scores: HashMap<PlayerId, f64>,
    pub game_over: Option<GameResult>,
}

impl<S> SimulationState<S> {
    /// Start a simulation from a fresh initial state.
    pub fn start<P>(plugin: &P, players: &[Player], config: &GameConfig) -> (Self, Vec<Event>)
    where
        P: GamePlugin<State = S>,
    {
        let (state, events) = plugin.create_initial_state(players, config);
        let scores = plugin.get_scores(&state);
        let sim = Self {
            state,
            players: players.to_vec(),
            scores,
            game_over: None,
        };
        (sim, events)
    }
}

/// Apply an action for `player_id` and record the outcome.
///
/// Either the whole transition is stored in `sim` or, on error, `sim` is left
/// exactly as it was.
pub fn apply_action_and_record<P: GamePlugin>(
    plugin: &P,
    sim: &mut SimulationState<P::State>,
    player_id: PlayerId,
    action: &P::Action,
) -> Result<Vec<Event>, P::Error> {
    let result = plugin.apply_action(&sim.state, player_id, action, &sim.players)?;
    sim.state = result.state;
    if !result.scores.is_empty() {
        sim.scores = result.scores;
    }
    sim.game_over = result.game_over;
    Ok(result.events)
}
