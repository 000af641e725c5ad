//! Bot strategy trait and the random baseline.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::engine::models::PlayerId;
use crate::engine::plugin::GamePlugin;

/// A bot strategy selects an action given the current typed game state.
///
/// The random source is passed in so callers decide how it is seeded.
pub trait BotStrategy<P: GamePlugin>: Send + Sync {
    fn choose_action(
        &self,
        state: &P::State,
        player_id: PlayerId,
        plugin: &P,
        rng: &mut StdRng,
    ) -> Option<P::Action>;
}

/// Picks a uniformly random valid action.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomStrategy;

impl<P: GamePlugin> BotStrategy<P> for RandomStrategy {
    fn choose_action(
        &self,
        state: &P::State,
        player_id: PlayerId,
        plugin: &P,
        rng: &mut StdRng,
    ) -> Option<P::Action> {
        let valid = plugin.get_valid_actions(state, player_id);
        valid.choose(rng).cloned()
    }
}
