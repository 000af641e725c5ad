//! GamePlugin trait: the interface every game must implement.

use std::collections::HashMap;

use crate::engine::models::*;

/// Trait that every game must implement.
///
/// State and actions are strongly typed so that the arena and the
/// interactive session can clone and apply them without a JSON round trip.
/// Snapshots for outside collaborators are produced by the games themselves.
pub trait GamePlugin: Send + Sync {
    type State: Clone + Send + Sync;
    type Action: Clone + Send + Sync + std::fmt::Debug;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Name shown to people running the game.
    fn display_name(&self) -> &str;
    /// Smallest and largest table the game can seat.
    fn min_players(&self) -> u32;
    fn max_players(&self) -> u32;

    /// Create initial game state from seated players + config.
    fn create_initial_state(
        &self,
        players: &[Player],
        config: &GameConfig,
    ) -> (Self::State, Vec<Event>);

    /// The player expected to act next, or None once the game is over.
    fn current_player(&self, state: &Self::State) -> Option<PlayerId>;

    /// Return all legal actions for this player.
    fn get_valid_actions(&self, state: &Self::State, player_id: PlayerId) -> Vec<Self::Action>;

    /// Check an action without touching the state.
    fn validate_action(
        &self,
        state: &Self::State,
        player_id: PlayerId,
        action: &Self::Action,
    ) -> Result<(), Self::Error>;

    /// Apply an action, returning new state + events. On error the input
    /// state is untouched and nothing is returned.
    fn apply_action(
        &self,
        state: &Self::State,
        player_id: PlayerId,
        action: &Self::Action,
        players: &[Player],
    ) -> Result<TransitionResult<Self::State>, Self::Error>;

    /// Current score per player.
    fn get_scores(&self, state: &Self::State) -> HashMap<PlayerId, f64>;
}
