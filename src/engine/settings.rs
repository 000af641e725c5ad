//! Table settings: game options plus computer-player behaviour.
//! Loaded from TOML at runtime by the engine binary and the arena CLI.

use std::path::Path;

use serde::Deserialize;

use crate::engine::models::GameConfig;

/// How the computer player behaves.
#[derive(Debug, Deserialize, Clone)]
pub struct BotSettings {
    /// "heuristic" or "random".
    #[serde(default = "default_strategy")]
    pub strategy: String,
    /// Artificial thinking time before a computer move.
    #[serde(default = "default_think_delay_ms")]
    pub think_delay_ms: u64,
    /// Fixed seed for the computer's tie-breaking; random when absent.
    pub seed: Option<u64>,
}

fn default_strategy() -> String {
    "heuristic".into()
}

fn default_think_delay_ms() -> u64 {
    750
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            strategy: default_strategy(),
            think_delay_ms: default_think_delay_ms(),
            seed: None,
        }
    }
}

/// Top-level TOML file structure.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct SettingsFile {
    #[serde(default)]
    pub game: GameConfig,
    #[serde(default)]
    pub bot: BotSettings,
}

/// Load settings from a TOML file at the given path.
pub fn load_settings(path: &Path) -> Result<SettingsFile, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    toml::from_str(&content).map_err(|e| format!("Failed to parse {}: {}", path.display(), e))
}

/// Try to load settings from well-known paths, returning defaults if none found.
pub fn load_default_settings() -> SettingsFile {
    let candidates = [
        "diamond.toml",
        "../diamond.toml",
        "/etc/diamond/diamond.toml",
    ];
    for path in &candidates {
        let p = Path::new(path);
        if p.exists() {
            match load_settings(p) {
                Ok(settings) => {
                    tracing::info!(path = %p.display(), "loaded settings");
                    return settings;
                }
                Err(e) => {
                    tracing::warn!(path = %p.display(), error = %e, "failed to load settings");
                }
            }
        }
    }
    tracing::info!("no diamond.toml found, using built-in defaults");
    SettingsFile::default()
}
