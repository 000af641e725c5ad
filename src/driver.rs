//! Async event loop around a [`GameSession`].
//!
//! One task owns the session and handles commands one at a time, so a move is
//! always validated and applied before the next event is looked at. The
//! computer's think delay is a deadline raced against incoming commands;
//! resetting drops the deadline and the session voids the ticket behind it.

use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::engine::models::SettingValue;
use crate::games::diamond::errors::SessionError;
use crate::games::diamond::session::{AiTicket, GameSession, MoveOutcome};
use crate::games::diamond::snapshot::{GameOverView, Snapshot};
use crate::games::diamond::types::GridPos;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SelectAt { x: f64, y: f64 },
    SelectDot(GridPos),
    Confirm,
    Cancel,
    Reset,
    SetPlayers(SettingValue),
    SetDrawLength(SettingValue),
    State,
    Quit,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Update {
    State { snapshot: Snapshot },
    Rejected { reason: String },
    GameOver { result: GameOverView },
}

/// Parse one line of the text protocol.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let mut parts = line.split_whitespace();
    let Some(verb) = parts.next() else {
        return Err("empty command".into());
    };
    let args: Vec<&str> = parts.collect();

    let number = |i: usize| -> Result<f64, String> {
        let raw = args.get(i).ok_or_else(|| format!("{verb}: missing argument"))?;
        raw.parse::<f64>().map_err(|e| format!("{verb}: bad number {raw:?}: {e}"))
    };
    let index = |i: usize| -> Result<usize, String> {
        let raw = args.get(i).ok_or_else(|| format!("{verb}: missing argument"))?;
        raw.parse::<usize>().map_err(|e| format!("{verb}: bad index {raw:?}: {e}"))
    };
    let rest = || args.join(" ");

    match verb {
        "select" => Ok(Command::SelectAt {
            x: number(0)?,
            y: number(1)?,
        }),
        "dot" => Ok(Command::SelectDot(GridPos::new(index(0)?, index(1)?))),
        "confirm" => Ok(Command::Confirm),
        "cancel" => Ok(Command::Cancel),
        "reset" => Ok(Command::Reset),
        "players" => Ok(Command::SetPlayers(SettingValue::from_raw(&rest()))),
        "length" => Ok(Command::SetDrawLength(SettingValue::from_raw(&rest()))),
        "state" => Ok(Command::State),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(format!("unknown command {other:?}")),
    }
}

struct Driver {
    session: GameSession,
    think_delay: Duration,
    ai_due: Option<(Instant, AiTicket)>,
}

impl Driver {
    fn state(&self) -> Update {
        Update::State {
            snapshot: self.session.snapshot(),
        }
    }

    fn rejected(err: SessionError) -> Update {
        tracing::warn!(error = %err, "event refused");
        Update::Rejected {
            reason: err.to_string(),
        }
    }

    fn moved(&mut self, outcome: MoveOutcome) -> Vec<Update> {
        if let Some(ticket) = outcome.ai_ticket {
            self.ai_due = Some((Instant::now() + self.think_delay, ticket));
        }
        let snapshot = self.session.snapshot();
        let game_over = snapshot.game_over.clone();
        let mut updates = vec![Update::State { snapshot }];
        if let Some(result) = game_over {
            tracing::info!(message = %result.message, "game finished");
            updates.push(Update::GameOver { result });
        }
        updates
    }

    fn settings_changed(&mut self, result: Result<(), SessionError>) -> Vec<Update> {
        match result {
            Ok(()) => {
                self.ai_due = None;
                vec![self.state()]
            }
            Err(err) => vec![Self::rejected(err)],
        }
    }

    fn handle(&mut self, command: Command) -> Vec<Update> {
        match command {
            Command::SelectAt { x, y } => match self.session.select_at(x, y) {
                Ok(_) => vec![self.state()],
                Err(err) => vec![Self::rejected(err)],
            },
            Command::SelectDot(pos) => match self.session.select_dot(pos) {
                Ok(_) => vec![self.state()],
                Err(err) => vec![Self::rejected(err)],
            },
            Command::Confirm => match self.session.confirm() {
                Ok(outcome) => self.moved(outcome),
                Err(err) => vec![Self::rejected(err), self.state()],
            },
            Command::Cancel => {
                self.session.cancel();
                vec![self.state()]
            }
            Command::Reset => {
                self.session.reset();
                self.ai_due = None;
                vec![self.state()]
            }
            Command::SetPlayers(value) => {
                let result = self.session.set_player_count(value);
                self.settings_changed(result)
            }
            Command::SetDrawLength(value) => {
                let result = self.session.set_max_draw_length(value);
                self.settings_changed(result)
            }
            Command::State => vec![self.state()],
            Command::Quit => vec![],
        }
    }

    fn ai_turn(&mut self, ticket: AiTicket) -> Vec<Update> {
        match self.session.run_ai_turn(ticket) {
            Ok(outcome) => self.moved(outcome),
            Err(err) => {
                tracing::debug!(error = %err, "scheduled computer move dropped");
                vec![]
            }
        }
    }
}

/// Drive `session` until `commands` closes, a `Quit` arrives, or nobody is
/// listening to `updates` any more.
pub async fn run_session(
    session: GameSession,
    think_delay: Duration,
    mut commands: mpsc::Receiver<Command>,
    updates: mpsc::Sender<Update>,
) {
    let mut driver = Driver {
        session,
        think_delay,
        ai_due: None,
    };

    loop {
        let deadline = driver.ai_due.map(|(at, _)| at);
        let batch = tokio::select! {
            command = commands.recv() => match command {
                None | Some(Command::Quit) => break,
                Some(command) => driver.handle(command),
            },
            _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                match driver.ai_due.take() {
                    Some((_, ticket)) => driver.ai_turn(ticket),
                    None => vec![],
                }
            }
        };

        for update in batch {
            if updates.send(update).await.is_err() {
                tracing::info!("update receiver closed, stopping session");
                return;
            }
        }
    }
    tracing::info!("session ended");
}
