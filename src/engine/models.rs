//! Core engine data types shared by every game and by the arena.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Seat number, 1-based.
pub type PlayerId = u8;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub player_id: PlayerId,
    pub display_name: String,
    #[serde(default)]
    pub is_bot: bool,
}

/// A configuration value as it was typed in.
///
/// Games coerce these themselves so that a bad value never aborts a session.
/// Any TOML scalar is accepted here, so one odd entry in a settings file
/// cannot take the rest of the file down with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Number(i64),
    Decimal(f64),
    Flag(bool),
    Text(String),
}

impl SettingValue {
    /// Interpret typed-in text: integers become numbers, anything else stays text.
    pub fn from_raw(raw: &str) -> Self {
        match raw.trim().parse::<i64>() {
            Ok(n) => SettingValue::Number(n),
            Err(_) => SettingValue::Text(raw.to_string()),
        }
    }

    /// The value as an integer, read the lenient way a form field is read:
    /// leading whitespace is skipped, then an optional sign and the leading
    /// digits are taken and the rest ignored. `"3abc"` and `"2.5"` are 3 and
    /// 2; `"abc"` has no integer. Decimals truncate toward zero.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            SettingValue::Number(n) => Some(*n),
            SettingValue::Decimal(f) if f.is_finite() => Some(f.trunc() as i64),
            SettingValue::Decimal(_) | SettingValue::Flag(_) => None,
            SettingValue::Text(s) => leading_int(s),
        }
    }

    /// The value as plain text, without quoting.
    pub fn raw(&self) -> String {
        match self {
            SettingValue::Number(n) => n.to_string(),
            SettingValue::Decimal(f) => f.to_string(),
            SettingValue::Flag(b) => b.to_string(),
            SettingValue::Text(s) => s.clone(),
        }
    }
}

fn leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    let magnitude: i64 = rest[..digits].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

impl From<i64> for SettingValue {
    fn from(n: i64) -> Self {
        SettingValue::Number(n)
    }
}

impl From<&str> for SettingValue {
    fn from(s: &str) -> Self {
        SettingValue::Text(s.to_string())
    }
}

impl std::fmt::Display for SettingValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingValue::Number(n) => write!(f, "{n}"),
            SettingValue::Decimal(d) => write!(f, "{d}"),
            SettingValue::Flag(b) => write!(f, "{b}"),
            SettingValue::Text(s) => write!(f, "{s:?}"),
        }
    }
}

fn default_player_count() -> SettingValue {
    SettingValue::Number(2)
}

fn default_max_draw_length() -> SettingValue {
    SettingValue::Number(1)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default = "default_player_count")]
    pub player_count: SettingValue,
    #[serde(default = "default_max_draw_length")]
    pub max_draw_length: SettingValue,
    #[serde(default)]
    pub random_seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            player_count: default_player_count(),
            max_draw_length: default_max_draw_length(),
            random_seed: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub event_type: String,
    #[serde(default)]
    pub player_id: Option<PlayerId>,
    #[serde(default)]
    pub payload: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameResult {
    pub winners: Vec<PlayerId>,
    pub final_scores: HashMap<PlayerId, f64>,
    #[serde(default = "default_reason")]
    pub reason: String,
}

impl GameResult {
    pub fn is_tie(&self) -> bool {
        self.winners.len() > 1
    }
}

fn default_reason() -> String {
    "normal".to_string()
}

/// Result of applying one action: the new state plus what happened.
pub struct TransitionResult<S> {
    pub state: S,
    pub events: Vec<Event>,
    pub scores: HashMap<PlayerId, f64>,
    pub game_over: Option<GameResult>,
}
