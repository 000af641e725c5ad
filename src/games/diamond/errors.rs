//! Rejection reasons. Every variant is recoverable: the move is refused and
//! nothing on the board changes.

use crate::engine::models::PlayerId;
use crate::games::diamond::types::{EdgeKey, GridPos};

/// Why a single move was refused.
#[derive(Debug, Clone, PartialEq)]
pub enum MoveError {
    /// The chord is not parallel to one of the three lattice axes.
    InvalidDirection { angle: f64 },
    /// Fewer than two dots lie on the chord.
    NoSegments,
    /// The draw-length setting is not a positive integer.
    InvalidConfiguration { reason: String },
    TooLong { segments: usize, limit: usize },
    /// A unit piece of the chord is not a lattice edge.
    Misaligned { key: EdgeKey },
    /// Every piece of the chord was already drawn.
    NoOp,
    UnknownDot { pos: GridPos },
    UnknownEdge { key: EdgeKey },
    OutOfTurn { expected: PlayerId, actual: PlayerId },
    GameFinished,
}

impl std::error::Error for MoveError {}

impl std::fmt::Display for MoveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MoveError::InvalidDirection { angle } => write!(
                f,
                "Invalid line at {:.1} degrees: lines must run at 0, 60, 120 or 180 degrees",
                angle
            ),
            MoveError::NoSegments => write!(f, "Invalid line: no lattice segment found"),
            MoveError::InvalidConfiguration { reason } => {
                write!(f, "Invalid draw length setting: {}", reason)
            }
            MoveError::TooLong { segments, limit } => write!(
                f,
                "Line too long: {} segments, at most {} allowed per move",
                segments, limit
            ),
            MoveError::Misaligned { key } => {
                write!(f, "Line is not aligned with the grid (no edge {})", key)
            }
            MoveError::NoOp => write!(f, "Every part of this line has already been drawn"),
            MoveError::UnknownDot { pos } => write!(f, "No dot at {}", pos),
            MoveError::UnknownEdge { key } => write!(f, "No edge {}", key),
            MoveError::OutOfTurn { expected, actual } => write!(
                f,
                "Player {} tried to move but it is player {}'s turn",
                actual, expected
            ),
            MoveError::GameFinished => write!(f, "The game is already over"),
        }
    }
}

/// Why a session event was refused.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionError {
    AiTurnInProgress,
    GameOver,
    NothingPending,
    /// Player count cannot change once a move has been made.
    ConfigurationLocked,
    /// The AI ticket was issued for an earlier game or turn.
    StaleAiTicket,
    UnknownDot,
    Rejected(MoveError),
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Rejected(err) => Some(err),
            _ => None,
        }
    }
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::AiTurnInProgress => write!(f, "Wait for the computer to move"),
            SessionError::GameOver => write!(f, "The game is over; reset to play again"),
            SessionError::NothingPending => write!(f, "Select two dots before confirming"),
            SessionError::ConfigurationLocked => {
                write!(f, "Settings cannot be changed at this point of the game")
            }
            SessionError::StaleAiTicket => write!(f, "Scheduled computer move is no longer valid"),
            SessionError::UnknownDot => write!(f, "No dot near that point"),
            SessionError::Rejected(err) => write!(f, "{}", err),
        }
    }
}

impl From<MoveError> for SessionError {
    fn from(err: MoveError) -> Self {
        SessionError::Rejected(err)
    }
}
