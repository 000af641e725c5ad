//! End-to-end rule checks driven through the public session and plugin API.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use diamond_game_engine::engine::models::*;
use diamond_game_engine::engine::plugin::GamePlugin;
use diamond_game_engine::engine::simulator::{apply_action_and_record, SimulationState};
use diamond_game_engine::games::diamond::ai::{choose_edge, find_safe_edges, find_scoring_edge};
use diamond_game_engine::games::diamond::errors::{MoveError, SessionError};
use diamond_game_engine::games::diamond::lattice::diamond;
use diamond_game_engine::games::diamond::plugin::DiamondPlugin;
use diamond_game_engine::games::diamond::session::{GameSession, MoveOutcome, Selection};
use diamond_game_engine::games::diamond::types::*;

fn config(players: i64, length: i64) -> GameConfig {
    GameConfig {
        player_count: SettingValue::Number(players),
        max_draw_length: SettingValue::Number(length),
        random_seed: Some(2024),
    }
}

fn p(row: usize, col: usize) -> GridPos {
    GridPos::new(row, col)
}

fn play(session: &mut GameSession, a: GridPos, b: GridPos) -> Result<MoveOutcome, SessionError> {
    session.select_dot(a)?;
    session.select_dot(b)?;
    session.confirm()
}

fn edge_state(session: &GameSession, a: GridPos, b: GridPos) -> EdgeState {
    let id = diamond().edge_between(a, b).unwrap();
    session.state().edges[id]
}

fn first_triangle(session: &GameSession) -> TriangleState {
    session.state().triangles[0]
}

#[test]
fn closing_third_side_scores_for_mover() {
    let mut session = GameSession::new(config(2, 1));

    // Player 1 draws (0,0)-(1,0).
    play(&mut session, p(0, 0), p(1, 0)).unwrap();
    assert_eq!(session.state().total_score(), 0);
    assert_eq!(session.state().current_player, 2);
    assert_eq!(edge_state(&session, p(0, 0), p(1, 0)).owner, Some(1));

    // Player 2 draws (0,0)-(1,1); the triangle has two sides.
    play(&mut session, p(0, 0), p(1, 1)).unwrap();
    assert!(!first_triangle(&session).filled);
    assert_eq!(session.state().current_player, 1);

    // Player 1 closes it.
    let outcome = play(&mut session, p(1, 0), p(1, 1)).unwrap();
    assert!(outcome.events.iter().any(|e| e.event_type == "triangles_completed"));
    let tri = first_triangle(&session);
    assert!(tri.filled);
    assert_eq!(tri.owner, Some(1));
    assert_eq!(session.state().player(1).unwrap().score, 1);
    assert_eq!(session.state().player(2).unwrap().score, 0);
    assert_eq!(session.state().current_player, 2);
}

#[test]
fn one_player_request_seats_computer_second() {
    let session = GameSession::new(config(1, 1));
    let state = session.state();
    assert_eq!(state.total_players(), 2);
    assert_eq!(state.current_player, 1);
    assert!(!state.player(1).unwrap().is_ai);
    assert!(state.player(2).unwrap().is_ai);

    let snapshot = session.snapshot();
    assert_eq!(snapshot.players[1].label, "Computer");
    assert!(snapshot.players[0].active);
}

#[test]
fn chord_over_limit_is_refused() {
    let mut session = GameSession::new(config(2, 2));
    let before = session.state().board_fingerprint();
    let err = play(&mut session, p(3, 0), p(3, 3)).unwrap_err();
    assert_eq!(
        err,
        SessionError::Rejected(MoveError::TooLong { segments: 3, limit: 2 })
    );
    assert_eq!(session.state().board_fingerprint(), before);
}

#[test]
fn every_rejection_leaves_the_board_untouched() {
    let mut session = GameSession::new(config(2, 2));
    play(&mut session, p(0, 0), p(1, 0)).unwrap();

    let attempts = [
        (p(0, 0), p(2, 1)), // vertical
        (p(3, 0), p(3, 3)), // three segments
        (p(1, 0), p(0, 0)), // already drawn
    ];
    for (a, b) in attempts {
        let before = session.state().board_fingerprint();
        assert!(play(&mut session, a, b).is_err());
        assert_eq!(session.state().board_fingerprint(), before);
        assert_eq!(session.selection(), Selection::Idle);
    }
}

#[test]
fn shared_edges_are_cosmetic() {
    let mut session = GameSession::new(config(2, 2));
    play(&mut session, p(0, 0), p(1, 0)).unwrap();
    let scores_before: Vec<u32> = session.state().players.iter().map(|p| p.score).collect();

    play(&mut session, p(0, 0), p(2, 0)).unwrap();
    let traced = edge_state(&session, p(0, 0), p(1, 0));
    assert_eq!(traced.owner, Some(1));
    assert_eq!(traced.shared_by, Some(2));
    assert_eq!(edge_state(&session, p(1, 0), p(2, 0)).owner, Some(2));

    let scores_after: Vec<u32> = session.state().players.iter().map(|p| p.score).collect();
    assert_eq!(scores_before, scores_after);
    assert_eq!(session.state().current_player, 1);
}

#[test]
fn noop_chord_does_not_mark_shared() {
    let mut session = GameSession::new(config(2, 1));
    play(&mut session, p(0, 0), p(1, 0)).unwrap();
    let err = play(&mut session, p(0, 0), p(1, 0)).unwrap_err();
    assert_eq!(err, SessionError::Rejected(MoveError::NoOp));
    assert_eq!(edge_state(&session, p(0, 0), p(1, 0)).shared_by, None);
    assert_eq!(session.state().current_player, 2);
}

/// Play random legal single edges until the game ends, checking the
/// per-move invariants along the way.
fn random_game(players: usize, seed: u64) -> SimulationState<DiamondState> {
    let plugin = DiamondPlugin;
    let seats = plugin.players_for_config(&config(players as i64, 1));
    let (mut sim, _) = SimulationState::start(&plugin, &seats, &config(players as i64, 1));
    let mut rng = StdRng::seed_from_u64(seed);

    while sim.game_over.is_none() {
        let mover = plugin.current_player(&sim.state).unwrap();
        let drawn_before: Vec<bool> = sim.state.edges.iter().map(|e| e.drawn).collect();
        let actions = plugin.get_valid_actions(&sim.state, mover);
        let action = *actions.choose(&mut rng).unwrap();

        apply_action_and_record(&plugin, &mut sim, mover, &action).unwrap();

        for (before, after) in drawn_before.iter().zip(&sim.state.edges) {
            assert!(!before || after.drawn, "an edge was undrawn");
        }
        if sim.game_over.is_none() {
            assert_eq!(sim.state.current_player, mover % players as PlayerId + 1);
        }
        for (tri, def) in sim.state.triangles.iter().zip(diamond().triangles()) {
            let complete = def.edges.iter().all(|&e| sim.state.edges[e].drawn);
            assert_eq!(tri.filled, complete);
        }
    }
    sim
}

#[test]
fn conservation_over_random_games() {
    for (players, seed) in [(2, 1), (3, 2), (4, 3), (2, 4)] {
        let sim = random_game(players, seed);
        assert_eq!(sim.state.total_score(), 54);
        assert_eq!(sim.state.drawn_count, 90);
        let result = sim.game_over.unwrap();
        let best = sim.state.players.iter().map(|p| p.score).max().unwrap();
        assert!(!result.winners.is_empty());
        for w in &result.winners {
            assert_eq!(sim.state.player(*w).unwrap().score, best);
        }
        let total: f64 = result.final_scores.values().sum();
        assert_eq!(total, 54.0);
    }
}

#[test]
fn ai_prefers_scoring_then_safe_moves() {
    let plugin = DiamondPlugin;
    let seats = plugin.players_for_config(&config(2, 1));
    let (mut sim, _) = SimulationState::start(&plugin, &seats, &config(2, 1));
    let lattice = diamond();
    let mut rng = StdRng::seed_from_u64(77);

    while sim.game_over.is_none() {
        let mover = sim.state.current_player;
        let scoring = find_scoring_edge(lattice, &sim.state);
        let safe = find_safe_edges(lattice, &sim.state);
        let choice = choose_edge(lattice, &sim.state, &mut rng).unwrap();

        if let Some(edge) = scoring {
            assert_eq!(choice, edge);
        } else if !safe.is_empty() {
            assert!(safe.contains(&choice));
        }

        let key = lattice.edges()[choice].key;
        apply_action_and_record(&plugin, &mut sim, mover, &DiamondAction::Edge { key }).unwrap();
    }
    assert_eq!(sim.state.total_score(), 54);
}

#[test]
fn computer_game_runs_to_completion() {
    let mut session = GameSession::new(config(1, 1));
    let mut rng = StdRng::seed_from_u64(9);

    while session.state().result.is_none() {
        if let Some(ticket) = session.pending_ai() {
            session.run_ai_turn(ticket).unwrap();
            continue;
        }
        let plugin = DiamondPlugin;
        let options = plugin.get_valid_actions(session.state(), 1);
        let Some(DiamondAction::Edge { key }) = options.choose(&mut rng).copied() else {
            panic!("human has no move");
        };
        let (a, b) = key.endpoints();
        play(&mut session, a, b).unwrap();
    }

    let snapshot = session.snapshot();
    let over = snapshot.game_over.unwrap();
    assert_eq!(snapshot.players.iter().map(|p| p.score).sum::<u32>(), 54);
    assert!(snapshot.current_player.is_none());
    assert_eq!(over.tie, over.winners.len() > 1);
    assert_eq!(session.confirm().unwrap_err(), SessionError::GameOver);
    assert_eq!(
        session.set_max_draw_length(SettingValue::Number(2)).unwrap_err(),
        SessionError::ConfigurationLocked
    );
}

#[test]
fn invalid_player_count_falls_back_to_two_humans() {
    for raw in [SettingValue::Number(0), SettingValue::Number(7), SettingValue::from("many")] {
        let session = GameSession::new(GameConfig {
            player_count: raw,
            ..config(2, 1)
        });
        assert_eq!(session.state().total_players(), 2);
        assert!(session.state().players.iter().all(|p| !p.is_ai));
    }
}
