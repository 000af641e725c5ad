//! One interactive table: dot selection, confirmation, scheduled computer
//! moves and configuration changes.
//!
//! The session never sleeps. When the computer is due to move it hands out an
//! [`AiTicket`]; whoever owns the clock redeems it with
//! [`GameSession::run_ai_turn`] after the think delay. A reset or a
//! configuration change bumps the generation and voids every ticket issued
//! before it.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use crate::engine::bot_strategy::BotStrategy;
use crate::engine::models::*;
use crate::engine::simulator::{apply_action_and_record, SimulationState};
use crate::games::diamond::ai::HeuristicStrategy;
use crate::games::diamond::errors::SessionError;
use crate::games::diamond::lattice::HIT_TOLERANCE;
use crate::games::diamond::plugin::DiamondPlugin;
use crate::games::diamond::snapshot::Snapshot;
use crate::games::diamond::types::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Selection {
    Idle,
    OneSelected { dot: GridPos },
    PendingConfirm { from: GridPos, to: GridPos },
}

/// Permission for one computer move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AiTicket {
    pub generation: u64,
    pub player: PlayerId,
    /// Number of moves made when the ticket was issued.
    pub turn: usize,
}

/// What a successful move produced.
#[derive(Debug, Clone)]
pub struct MoveOutcome {
    pub events: Vec<Event>,
    /// Set when the computer moves next.
    pub ai_ticket: Option<AiTicket>,
    pub game_over: Option<GameResult>,
}

pub struct GameSession {
    plugin: DiamondPlugin,
    config: GameConfig,
    sim: SimulationState<DiamondState>,
    selection: Selection,
    pending_ai: Option<AiTicket>,
    generation: u64,
    rng: StdRng,
    ai: Box<dyn BotStrategy<DiamondPlugin>>,
}

impl GameSession {
    pub fn new(config: GameConfig) -> Self {
        Self::with_strategy(config, Box::new(HeuristicStrategy))
    }

    pub fn with_strategy(config: GameConfig, ai: Box<dyn BotStrategy<DiamondPlugin>>) -> Self {
        let rng = match config.random_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let plugin = DiamondPlugin;
        let sim = Self::start(&plugin, &config);
        Self {
            plugin,
            config,
            sim,
            selection: Selection::Idle,
            pending_ai: None,
            generation: 0,
            rng,
            ai,
        }
    }

    fn start(plugin: &DiamondPlugin, config: &GameConfig) -> SimulationState<DiamondState> {
        let players = plugin.players_for_config(config);
        SimulationState::start(plugin, &players, config).0
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn state(&self) -> &DiamondState {
        &self.sim.state
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn pending_ai(&self) -> Option<AiTicket> {
        self.pending_ai
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_ai_turn(&self) -> bool {
        let state = &self.sim.state;
        !state.is_over()
            && state
                .player(state.current_player)
                .is_some_and(|p| p.is_ai)
    }

    fn ensure_human_turn(&self) -> Result<(), SessionError> {
        if self.sim.state.is_over() {
            return Err(SessionError::GameOver);
        }
        if self.is_ai_turn() {
            return Err(SessionError::AiTurnInProgress);
        }
        Ok(())
    }

    /// Pick a dot by lattice address.
    pub fn select_dot(&mut self, pos: GridPos) -> Result<Selection, SessionError> {
        self.ensure_human_turn()?;
        if self.plugin.lattice().dot_id(pos).is_none() {
            return Err(SessionError::UnknownDot);
        }
        self.selection = match self.selection {
            Selection::Idle => Selection::OneSelected { dot: pos },
            Selection::OneSelected { dot } if dot == pos => Selection::Idle,
            Selection::OneSelected { dot } => Selection::PendingConfirm { from: dot, to: pos },
            pending @ Selection::PendingConfirm { .. } => pending,
        };
        Ok(self.selection)
    }

    /// Pick the dot under a board point. A miss drops a half-made selection.
    pub fn select_at(&mut self, x: f64, y: f64) -> Result<Selection, SessionError> {
        self.ensure_human_turn()?;
        if matches!(self.selection, Selection::PendingConfirm { .. }) {
            return Ok(self.selection);
        }
        match self.plugin.lattice().nearest_dot(x, y, HIT_TOLERANCE) {
            Some(pos) => self.select_dot(pos),
            None => {
                self.selection = Selection::Idle;
                Ok(self.selection)
            }
        }
    }

    pub fn cancel(&mut self) {
        self.selection = Selection::Idle;
    }

    /// Play the pending chord for the current player.
    pub fn confirm(&mut self) -> Result<MoveOutcome, SessionError> {
        self.ensure_human_turn()?;
        let Selection::PendingConfirm { from, to } = self.selection else {
            return Err(SessionError::NothingPending);
        };
        self.selection = Selection::Idle;

        let player = self.sim.state.current_player;
        let action = DiamondAction::Chord { from, to };
        match apply_action_and_record(&self.plugin, &mut self.sim, player, &action) {
            Ok(events) => Ok(self.after_move(events)),
            Err(err) => {
                tracing::warn!(player, %from, %to, error = %err, "move rejected");
                Err(SessionError::Rejected(err))
            }
        }
    }

    /// Let the computer move, if `ticket` is still the one on file.
    pub fn run_ai_turn(&mut self, ticket: AiTicket) -> Result<MoveOutcome, SessionError> {
        if self.pending_ai != Some(ticket) || ticket.generation != self.generation {
            return Err(SessionError::StaleAiTicket);
        }
        self.pending_ai = None;

        let state = &self.sim.state;
        if !self.is_ai_turn()
            || state.current_player != ticket.player
            || state.moves_made != ticket.turn
        {
            return Err(SessionError::StaleAiTicket);
        }

        let player = ticket.player;
        let Some(action) = self.ai.choose_action(state, player, &self.plugin, &mut self.rng) else {
            return Err(SessionError::GameOver);
        };
        let events = apply_action_and_record(&self.plugin, &mut self.sim, player, &action)?;
        Ok(self.after_move(events))
    }

    fn after_move(&mut self, events: Vec<Event>) -> MoveOutcome {
        let ai_ticket = if self.is_ai_turn() {
            let ticket = AiTicket {
                generation: self.generation,
                player: self.sim.state.current_player,
                turn: self.sim.state.moves_made,
            };
            self.pending_ai = Some(ticket);
            Some(ticket)
        } else {
            None
        };
        MoveOutcome {
            events,
            ai_ticket,
            game_over: self.sim.game_over.clone(),
        }
    }

    /// Start over with the current configuration.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.pending_ai = None;
        self.selection = Selection::Idle;
        self.sim = Self::start(&self.plugin, &self.config);
    }

    /// Change the player count and restart. Refused once a move was made.
    pub fn set_player_count(&mut self, value: SettingValue) -> Result<(), SessionError> {
        if self.sim.state.moves_made > 0 {
            tracing::warn!(requested = %value, "player count is locked for this game");
            return Err(SessionError::ConfigurationLocked);
        }
        self.config.player_count = value;
        self.reset();
        Ok(())
    }

    /// Change the draw length and restart. Refused while the computer is
    /// thinking and after the game has ended.
    pub fn set_max_draw_length(&mut self, value: SettingValue) -> Result<(), SessionError> {
        if self.is_ai_turn() || self.sim.state.is_over() {
            tracing::warn!(requested = %value, "draw length is locked right now");
            return Err(SessionError::ConfigurationLocked);
        }
        self.config.max_draw_length = value;
        self.reset();
        Ok(())
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(
            self.plugin.lattice(),
            &self.sim.state,
            self.selection,
            self.pending_ai.is_some(),
        )
    }
}
