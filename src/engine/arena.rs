//! Bot-vs-bot arena runner.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::engine::bot_strategy::BotStrategy;
use crate::engine::models::*;
use crate::engine::plugin::GamePlugin;
use crate::engine::simulator::{apply_action_and_record, SimulationState};

/// Aggregated results from an arena run.
///
/// Points are tracked per seat: a strategy filling two seats in a game gets
/// two entries for that game.
pub struct ArenaResult {
    pub num_games: usize,
    pub seats: usize,
    pub wins: HashMap<String, usize>,
    /// Finished games where the top score was shared.
    pub ties: usize,
    /// Games cut off by the move cap or an illegal bot action.
    pub unfinished: usize,
    pub points: HashMap<String, Vec<f64>>,
    /// Mean points handed out per finished game.
    pub board_points: f64,
    pub game_durations_ms: Vec<f64>,
}

impl ArenaResult {
    pub fn win_rate(&self, name: &str) -> f64 {
        *self.wins.get(name).unwrap_or(&0) as f64 / self.num_games.max(1) as f64
    }

    /// Wilson score interval for the win rate.
    pub fn win_rate_interval(&self, name: &str) -> (f64, f64) {
        let n = self.num_games as f64;
        if self.num_games == 0 {
            return (0.0, 0.0);
        }
        let p = self.win_rate(name);
        let z2 = 1.96_f64 * 1.96;
        let denom = 1.0 + z2 / n;
        let center = (p + z2 / (2.0 * n)) / denom;
        let margin = (z2 * (p * (1.0 - p) / n + z2 / (4.0 * n * n))).sqrt() / denom;
        ((center - margin).max(0.0), (center + margin).min(1.0))
    }

    /// Mean points per seat.
    pub fn mean_points(&self, name: &str) -> f64 {
        match self.points.get(name) {
            Some(p) if !p.is_empty() => p.iter().sum::<f64>() / p.len() as f64,
            _ => 0.0,
        }
    }

    pub fn points_stddev(&self, name: &str) -> f64 {
        let points = match self.points.get(name) {
            Some(p) if p.len() >= 2 => p,
            _ => return 0.0,
        };
        let mean = self.mean_points(name);
        let variance = points.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (points.len() - 1) as f64;
        variance.sqrt()
    }

    /// Fraction of the board a seat of this strategy takes on average.
    pub fn board_share(&self, name: &str) -> f64 {
        if self.board_points <= 0.0 {
            return 0.0;
        }
        self.mean_points(name) / self.board_points
    }

    /// The share each seat would take if every seat played equally well.
    pub fn fair_share(&self) -> f64 {
        1.0 / self.seats.max(1) as f64
    }

    pub fn summary(&self) -> String {
        let mut lines = vec![format!(
            "Arena Results ({} games, {} seats, {:.0} points per board)",
            self.num_games, self.seats, self.board_points
        )];
        lines.push("=".repeat(72));
        let mut names: Vec<&String> = self.wins.keys().collect();
        names.sort();
        for name in names {
            let (lo, hi) = self.win_rate_interval(name);
            lines.push(format!(
                "  {:>12}: {:3} wins ({:5.1}%, 95% CI {:.1}-{:.1}%)  {:5.1} +/- {:4.1} pts  share {:5.1}%",
                name,
                self.wins[name],
                self.win_rate(name) * 100.0,
                lo * 100.0,
                hi * 100.0,
                self.mean_points(name),
                self.points_stddev(name),
                self.board_share(name) * 100.0,
            ));
        }
        lines.push(format!(
            "  {:>12}: {}  (fair share {:.1}%)",
            "Ties",
            self.ties,
            self.fair_share() * 100.0
        ));
        if self.unfinished > 0 {
            lines.push(format!("  {:>12}: {}", "Unfinished", self.unfinished));
        }
        if !self.game_durations_ms.is_empty() {
            let total_ms = self.game_durations_ms.iter().sum::<f64>();
            lines.push(format!(
                "  Avg game: {:.2}ms  |  Total: {:.2}s",
                total_ms / self.game_durations_ms.len() as f64,
                total_ms / 1000.0
            ));
        }
        lines.join("\n")
    }
}

/// Outcome of one arena game, before aggregation.
struct GameRecord {
    seat_names: Vec<String>,
    result: Option<GameResult>,
    points: HashMap<PlayerId, f64>,
    elapsed_ms: f64,
}

/// Run `num_games` between the given strategies and return aggregated stats.
///
/// Strategies are seated in name order and, with `alternate_seats`, rotated
/// one seat per game. When there are more seats than strategies the names
/// repeat around the table. Games run in parallel but each one is seeded
/// from `base_seed + game_idx`, so results do not depend on scheduling.
pub fn run_arena<P: GamePlugin>(
    plugin: &P,
    strategies: &HashMap<String, Box<dyn BotStrategy<P>>>,
    num_games: usize,
    base_seed: u64,
    num_players: usize,
    config: &GameConfig,
    alternate_seats: bool,
    progress_callback: Option<&(dyn Fn(usize, usize) + Sync)>,
) -> ArenaResult {
    let mut strategy_names: Vec<String> = strategies.keys().cloned().collect();
    strategy_names.sort();
    assert!(!strategy_names.is_empty(), "arena needs at least one strategy");

    let completed = AtomicUsize::new(0);

    let records: Vec<GameRecord> = (0..num_games)
        .into_par_iter()
        .map(|game_idx| {
            let seed = base_seed + game_idx as u64;
            let shift = if alternate_seats { game_idx } else { 0 };
            let seat_names: Vec<String> = (0..num_players)
                .map(|i| strategy_names[(i + shift) % strategy_names.len()].clone())
                .collect();

            let players: Vec<Player> = seat_names
                .iter()
                .enumerate()
                .map(|(i, name)| Player {
                    player_id: (i + 1) as PlayerId,
                    display_name: name.clone(),
                    is_bot: true,
                })
                .collect();

            let game_config = GameConfig {
                random_seed: Some(seed),
                ..config.clone()
            };

            let t0 = Instant::now();
            let (result, points) = play_one_game(plugin, &players, &game_config, strategies, seed);
            let elapsed_ms = t0.elapsed().as_secs_f64() * 1000.0;

            if let Some(cb) = progress_callback {
                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                cb(done, num_games);
            }

            GameRecord {
                seat_names,
                result,
                points,
                elapsed_ms,
            }
        })
        .collect();

    let mut result = ArenaResult {
        num_games,
        seats: num_players,
        wins: strategy_names.iter().map(|n| (n.clone(), 0)).collect(),
        ties: 0,
        unfinished: 0,
        points: strategy_names.iter().map(|n| (n.clone(), Vec::new())).collect(),
        board_points: 0.0,
        game_durations_ms: Vec::with_capacity(num_games),
    };

    let mut finished_points = Vec::new();
    for record in records {
        result.game_durations_ms.push(record.elapsed_ms);
        for (seat, name) in record.seat_names.iter().enumerate() {
            let pid = (seat + 1) as PlayerId;
            let points = record.points.get(&pid).copied().unwrap_or(0.0);
            if let Some(list) = result.points.get_mut(name) {
                list.push(points);
            }
        }

        let Some(gr) = record.result else {
            result.unfinished += 1;
            continue;
        };
        finished_points.push(record.points.values().sum::<f64>());
        if gr.winners.len() == 1 {
            let name = &record.seat_names[(gr.winners[0] - 1) as usize];
            if let Some(wins) = result.wins.get_mut(name) {
                *wins += 1;
            }
        } else {
            result.ties += 1;
        }
    }
    if !finished_points.is_empty() {
        result.board_points = finished_points.iter().sum::<f64>() / finished_points.len() as f64;
    }

    result
}

fn play_one_game<P: GamePlugin>(
    plugin: &P,
    players: &[Player],
    config: &GameConfig,
    strategies: &HashMap<String, Box<dyn BotStrategy<P>>>,
    seed: u64,
) -> (Option<GameResult>, HashMap<PlayerId, f64>) {
    let (mut sim, _) = SimulationState::start(plugin, players, config);
    let mut rng = StdRng::seed_from_u64(seed);

    let max_iterations = 500;
    for _ in 0..max_iterations {
        if sim.game_over.is_some() {
            break;
        }

        let Some(acting) = plugin.current_player(&sim.state) else {
            break;
        };
        let strategy = players
            .iter()
            .find(|p| p.player_id == acting)
            .and_then(|p| strategies.get(&p.display_name));
        let Some(strategy) = strategy else {
            break;
        };

        let Some(action) = strategy.choose_action(&sim.state, acting, plugin, &mut rng) else {
            break;
        };

        if let Err(e) = apply_action_and_record(plugin, &mut sim, acting, &action) {
            tracing::warn!(player = acting, ?action, error = %e, "bot produced an illegal action");
            break;
        }
    }

    (sim.game_over, sim.scores)
}
