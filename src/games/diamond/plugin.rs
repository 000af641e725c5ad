//! DiamondPlugin: rules, turn rotation and end of game.

use std::collections::HashMap;

use crate::engine::models::*;
use crate::engine::plugin::GamePlugin;

use super::errors::MoveError;
use super::lattice::{diamond, Lattice};
use super::moves::{apply_plan, plan_chord, plan_edge, MovePlan};
use super::scoring::{complete_triangles, leaders};
use super::types::*;

pub const MIN_SEATS: usize = 2;
pub const MAX_SEATS: usize = 4;
/// Seat taken by the computer in a one-player game.
pub const AI_SEAT: PlayerId = 2;

pub const COMPUTER_LABEL: &str = "Computer";

pub fn seat_label(id: PlayerId) -> String {
    format!("Player {id}")
}

/// Seats at the table after coercing the requested player count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSetup {
    pub seats: usize,
    pub vs_computer: bool,
}

/// `1` means one human against the computer; `2..=4` are all-human tables.
/// Anything else falls back to two humans.
pub fn coerce_player_count(value: &SettingValue) -> TableSetup {
    match value.as_int() {
        Some(1) => TableSetup {
            seats: MIN_SEATS,
            vs_computer: true,
        },
        Some(n) if (MIN_SEATS as i64..=MAX_SEATS as i64).contains(&n) => TableSetup {
            seats: n as usize,
            vs_computer: false,
        },
        _ => {
            tracing::warn!(requested = %value, "invalid player count, using 2");
            TableSetup {
                seats: MIN_SEATS,
                vs_computer: false,
            }
        }
    }
}

pub fn coerce_draw_limit(value: &SettingValue) -> DrawLimit {
    match value.as_int() {
        Some(n) if n >= 1 => DrawLimit::Segments(n as usize),
        _ => {
            tracing::warn!(requested = %value, "invalid draw length, human moves will be refused");
            DrawLimit::Invalid(value.raw())
        }
    }
}

pub struct DiamondPlugin;

impl DiamondPlugin {
    pub fn lattice(&self) -> &'static Lattice {
        diamond()
    }

    /// Seat list for a configuration: human seats labelled "Player N" and,
    /// for a one-player request, the computer in seat 2.
    pub fn players_for_config(&self, config: &GameConfig) -> Vec<Player> {
        let setup = coerce_player_count(&config.player_count);
        (1..=setup.seats as PlayerId)
            .map(|id| {
                let is_bot = setup.vs_computer && id == AI_SEAT;
                Player {
                    player_id: id,
                    display_name: if is_bot {
                        COMPUTER_LABEL.to_string()
                    } else {
                        seat_label(id)
                    },
                    is_bot,
                }
            })
            .collect()
    }

    /// Validate `action` for `player_id` without modifying anything.
    pub fn plan(
        &self,
        state: &DiamondState,
        player_id: PlayerId,
        action: &DiamondAction,
    ) -> Result<MovePlan, MoveError> {
        if state.is_over() {
            return Err(MoveError::GameFinished);
        }
        if player_id != state.current_player {
            return Err(MoveError::OutOfTurn {
                expected: state.current_player,
                actual: player_id,
            });
        }
        let lattice = self.lattice();
        match *action {
            DiamondAction::Chord { from, to } => {
                plan_chord(lattice, &state.edges, player_id, from, to, &state.draw_limit)
            }
            DiamondAction::Edge { key } => plan_edge(lattice, &state.edges, player_id, key),
        }
    }
}

fn score_map(state: &DiamondState) -> HashMap<PlayerId, f64> {
    state
        .players
        .iter()
        .map(|p| (p.id, p.score as f64))
        .collect()
}

impl GamePlugin for DiamondPlugin {
    type State = DiamondState;
    type Action = DiamondAction;
    type Error = MoveError;

    fn display_name(&self) -> &str {
        "Diamond Triangles"
    }
    fn min_players(&self) -> u32 {
        MIN_SEATS as u32
    }
    fn max_players(&self) -> u32 {
        MAX_SEATS as u32
    }

    /// Seats come from `players`; with fewer than two seats the table is
    /// built from `config.player_count` instead.
    fn create_initial_state(
        &self,
        players: &[Player],
        config: &GameConfig,
    ) -> (DiamondState, Vec<Event>) {
        let seated;
        let players = if players.len() >= MIN_SEATS {
            players
        } else {
            seated = self.players_for_config(config);
            &seated
        };

        let lattice = self.lattice();
        let state = DiamondState {
            edges: vec![EdgeState::default(); lattice.edges().len()],
            triangles: vec![TriangleState::default(); lattice.triangles().len()],
            players: players
                .iter()
                .map(|p| PlayerState {
                    id: p.player_id,
                    score: 0,
                    is_ai: p.is_bot,
                    label: p.display_name.clone(),
                })
                .collect(),
            current_player: players[0].player_id,
            draw_limit: coerce_draw_limit(&config.max_draw_length),
            drawn_count: 0,
            moves_made: 0,
            result: None,
        };

        tracing::info!(
            players = state.total_players(),
            draw_limit = ?state.draw_limit,
            "game started"
        );

        let events = vec![Event {
            event_type: "game_started".into(),
            player_id: None,
            payload: serde_json::json!({
                "players": state.players.iter().map(|p| &p.label).collect::<Vec<_>>(),
                "edges": lattice.edges().len(),
                "triangles": lattice.triangles().len(),
            }),
        }];

        (state, events)
    }

    fn current_player(&self, state: &DiamondState) -> Option<PlayerId> {
        (!state.is_over()).then_some(state.current_player)
    }

    fn get_valid_actions(&self, state: &DiamondState, player_id: PlayerId) -> Vec<DiamondAction> {
        if state.is_over() || player_id != state.current_player {
            return vec![];
        }
        let lattice = self.lattice();
        state
            .edges
            .iter()
            .zip(lattice.edges())
            .filter(|(s, _)| !s.drawn)
            .map(|(_, def)| DiamondAction::Edge { key: def.key })
            .collect()
    }

    fn validate_action(
        &self,
        state: &DiamondState,
        player_id: PlayerId,
        action: &DiamondAction,
    ) -> Result<(), MoveError> {
        self.plan(state, player_id, action).map(|_| ())
    }

    fn apply_action(
        &self,
        state: &DiamondState,
        player_id: PlayerId,
        action: &DiamondAction,
        _players: &[Player],
    ) -> Result<TransitionResult<DiamondState>, MoveError> {
        let plan = self.plan(state, player_id, action)?;
        let lattice = self.lattice();

        let mut next = state.clone();
        apply_plan(&mut next, &plan, player_id);
        let closed = complete_triangles(lattice, &mut next, &plan.fresh, player_id);
        next.moves_made += 1;

        let edge_keys = |ids: &[EdgeId]| -> Vec<String> {
            ids.iter().map(|&e| lattice.edges()[e].key.to_string()).collect()
        };
        tracing::debug!(
            player = player_id,
            drawn = plan.fresh.len(),
            shared = plan.shared.len(),
            closed = closed.len(),
            "move applied"
        );

        let mut events = vec![Event {
            event_type: "line_drawn".into(),
            player_id: Some(player_id),
            payload: serde_json::json!({
                "edges": edge_keys(&plan.fresh),
                "shared": edge_keys(&plan.shared),
            }),
        }];
        if !closed.is_empty() {
            events.push(Event {
                event_type: "triangles_completed".into(),
                player_id: Some(player_id),
                payload: serde_json::json!({ "triangles": closed }),
            });
        }

        let scores = score_map(&next);

        if next.drawn_count == lattice.edges().len() {
            let winners = leaders(&next.players);
            let result = GameResult {
                reason: if winners.len() > 1 { "tie" } else { "normal" }.into(),
                winners,
                final_scores: scores.clone(),
            };
            tracing::info!(winners = ?result.winners, moves = next.moves_made, "game over");
            events.push(Event {
                event_type: "game_over".into(),
                player_id: None,
                payload: serde_json::json!({ "winners": result.winners }),
            });
            next.result = Some(result.clone());
            return Ok(TransitionResult {
                state: next,
                events,
                scores,
                game_over: Some(result),
            });
        }

        let total = next.total_players() as PlayerId;
        next.current_player = next.current_player % total + 1;
        events.push(Event {
            event_type: "turn_changed".into(),
            player_id: Some(next.current_player),
            payload: serde_json::Value::Null,
        });

        Ok(TransitionResult {
            state: next,
            events,
            scores,
            game_over: None,
        })
    }

    fn get_scores(&self, state: &DiamondState) -> HashMap<PlayerId, f64> {
        score_map(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(players: i64, length: i64) -> (DiamondState, Vec<Player>) {
        let config = GameConfig {
            player_count: players.into(),
            max_draw_length: length.into(),
            random_seed: None,
        };
        let seats = DiamondPlugin.players_for_config(&config);
        let (state, _) = DiamondPlugin.create_initial_state(&seats, &config);
        (state, seats)
    }

    fn chord(a: (usize, usize), b: (usize, usize)) -> DiamondAction {
        DiamondAction::Chord {
            from: GridPos::new(a.0, a.1),
            to: GridPos::new(b.0, b.1),
        }
    }

    #[test]
    fn test_player_count_coercion() {
        assert_eq!(coerce_player_count(&SettingValue::Number(1)), TableSetup { seats: 2, vs_computer: true });
        assert_eq!(coerce_player_count(&SettingValue::Number(4)), TableSetup { seats: 4, vs_computer: false });
        assert_eq!(coerce_player_count(&SettingValue::Number(5)), TableSetup { seats: 2, vs_computer: false });
        assert_eq!(coerce_player_count(&SettingValue::Number(0)), TableSetup { seats: 2, vs_computer: false });
        assert_eq!(coerce_player_count(&SettingValue::from("x")), TableSetup { seats: 2, vs_computer: false });
        assert_eq!(coerce_player_count(&SettingValue::from(" 3")), TableSetup { seats: 3, vs_computer: false });
    }

    #[test]
    fn test_table_limits_match_player_count_coercion() {
        let plugin = DiamondPlugin;
        assert_eq!(plugin.display_name(), "Diamond Triangles");
        for n in plugin.min_players()..=plugin.max_players() {
            let setup = coerce_player_count(&SettingValue::Number(n as i64));
            assert_eq!(setup, TableSetup { seats: n as usize, vs_computer: false });
        }
        let past = SettingValue::Number(plugin.max_players() as i64 + 1);
        assert_eq!(coerce_player_count(&past).seats, plugin.min_players() as usize);
    }

    #[test]
    fn test_draw_limit_coercion() {
        assert_eq!(coerce_draw_limit(&SettingValue::Number(2)), DrawLimit::Segments(2));
        assert_eq!(coerce_draw_limit(&SettingValue::Number(0)), DrawLimit::Invalid("0".into()));
        assert_eq!(coerce_draw_limit(&SettingValue::from("")), DrawLimit::Invalid("".into()));
        assert_eq!(coerce_draw_limit(&SettingValue::from("3abc")), DrawLimit::Segments(3));
        assert_eq!(coerce_draw_limit(&SettingValue::Decimal(2.5)), DrawLimit::Segments(2));
        assert_eq!(coerce_draw_limit(&SettingValue::Decimal(0.5)), DrawLimit::Invalid("0.5".into()));
        assert_eq!(coerce_draw_limit(&SettingValue::Flag(true)), DrawLimit::Invalid("true".into()));
    }

    #[test]
    fn test_one_player_seats_computer_second() {
        let (state, seats) = setup(1, 1);
        assert_eq!(state.total_players(), 2);
        assert_eq!(state.current_player, 1);
        assert!(!state.players[0].is_ai);
        assert!(state.players[1].is_ai);
        assert_eq!(seats[1].display_name, COMPUTER_LABEL);
        assert_eq!(seats[0].display_name, "Player 1");
    }

    #[test]
    fn test_rotation_wraps_around() {
        let (mut state, seats) = setup(3, 1);
        let moves = [chord((0, 0), (0, 1)), chord((0, 1), (0, 2)), chord((0, 2), (0, 3)), chord((6, 0), (6, 1))];
        let mut expected = [2, 3, 1, 2].into_iter();
        for action in moves {
            let mover = state.current_player;
            let result = DiamondPlugin.apply_action(&state, mover, &action, &seats).unwrap();
            state = result.state;
            assert_eq!(state.current_player, expected.next().unwrap());
        }
    }

    #[test]
    fn test_out_of_turn_is_rejected() {
        let (state, seats) = setup(2, 1);
        let err = DiamondPlugin
            .apply_action(&state, 2, &chord((0, 0), (1, 0)), &seats)
            .err()
            .unwrap();
        assert_eq!(err, MoveError::OutOfTurn { expected: 1, actual: 2 });
    }

    #[test]
    fn test_valid_actions_are_undrawn_edges_for_current_player() {
        let (state, seats) = setup(2, 1);
        assert_eq!(DiamondPlugin.get_valid_actions(&state, 1).len(), 90);
        assert!(DiamondPlugin.get_valid_actions(&state, 2).is_empty());

        let next = DiamondPlugin
            .apply_action(&state, 1, &chord((0, 0), (1, 0)), &seats)
            .unwrap()
            .state;
        assert_eq!(DiamondPlugin.get_valid_actions(&next, 2).len(), 89);
    }

    #[test]
    fn test_playing_every_edge_ends_the_game() {
        let (mut state, seats) = setup(2, 1);
        let keys: Vec<EdgeKey> = DiamondPlugin.lattice().edges().iter().map(|e| e.key).collect();
        let mut game_over = None;
        for key in keys {
            let mover = state.current_player;
            let result = DiamondPlugin
                .apply_action(&state, mover, &DiamondAction::Edge { key }, &seats)
                .unwrap();
            state = result.state;
            game_over = result.game_over;
        }
        let result = game_over.unwrap();
        assert_eq!(state.total_score(), 54);
        assert!(DiamondPlugin.current_player(&state).is_none());
        let best = state.players.iter().map(|p| p.score).max().unwrap();
        for w in &result.winners {
            assert_eq!(state.player(*w).unwrap().score, best);
        }
        assert_eq!(result.is_tie(), result.reason == "tie");

        let err = DiamondPlugin
            .apply_action(&state, state.current_player, &chord((0, 0), (1, 0)), &seats)
            .err()
            .unwrap();
        assert_eq!(err, MoveError::GameFinished);
    }

    #[test]
    fn test_invalid_draw_length_only_blocks_chords() {
        let (state, seats) = setup(2, 0);
        let err = DiamondPlugin
            .validate_action(&state, 1, &chord((0, 0), (1, 0)))
            .unwrap_err();
        assert!(matches!(err, MoveError::InvalidConfiguration { .. }));

        let key = EdgeKey::new(GridPos::new(0, 0), GridPos::new(1, 0));
        assert!(DiamondPlugin
            .apply_action(&state, 1, &DiamondAction::Edge { key }, &seats)
            .is_ok());
    }
}
