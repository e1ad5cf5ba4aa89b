mod channels;
mod defaults;

#[cfg(test)]
mod tests;

pub use channels::*;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ForesightError;
use defaults::*;

/// Environment variable that overrides `channel.telegram.bot_token`.
pub const TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";

/// Top-level Foresight configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub foresight: ForesightConfig,
    /// File this config was read from; `None` when running on defaults.
    #[serde(skip)]
    pub loaded_from: Option<PathBuf>,
    #[serde(default)]
    pub pool: PoolConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub reply: ReplyConfig,
    #[serde(default)]
    pub channel: ChannelConfig,
}

/// General bot settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForesightConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Also write daily-rolling logs to `{data_dir}/logs`.
    #[serde(default)]
    pub log_file: bool,
}

impl Default for ForesightConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            log_file: false,
        }
    }
}

/// Where the foresight texts come from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Newline-delimited text file, one foresight per line.
    #[serde(default = "default_pool_path")]
    pub path: String,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            path: default_pool_path(),
        }
    }
}

/// What to do when the state file cannot be written after a mutation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Durability {
    /// Log the failure and still answer from memory (default).
    #[default]
    BestEffort,
    /// Undo the new assignment and report an error; nothing is sent.
    Strict,
}

impl Durability {
    /// Human-readable name for display (e.g. in `status`).
    pub fn display_name(&self) -> &str {
        match self {
            Self::BestEffort => "best_effort",
            Self::Strict => "strict",
        }
    }
}

/// Assignment state persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// JSON file holding the daily assignments.
    #[serde(default = "default_state_path")]
    pub state_path: String,
    #[serde(default)]
    pub durability: Durability,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            state_path: default_state_path(),
            durability: Durability::default(),
        }
    }
}

/// Reply text settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplyConfig {
    /// Phrase shown in italics above the foresight.
    #[serde(default = "default_intro")]
    pub intro: String,
}

impl Default for ReplyConfig {
    fn default() -> Self {
        Self {
            intro: default_intro(),
        }
    }
}

/// Expand `~` to home directory.
pub fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return format!("{}/{rest}", home.to_string_lossy());
        }
    }
    path.to_string()
}

/// Put a bot token from the environment into the Telegram config.
///
/// A non-empty token enables Telegram even when the file has no
/// `[channel.telegram]` table.
pub fn apply_token_override(config: &mut Config, token: Option<String>) {
    let Some(token) = token.filter(|t| !t.trim().is_empty()) else {
        return;
    };
    let tg = config
        .channel
        .telegram
        .get_or_insert_with(|| TelegramConfig {
            enabled: true,
            ..Default::default()
        });
    tg.bot_token = token.trim().to_string();
}

/// Load configuration from a TOML file.
///
/// Falls back to defaults if the file does not exist, leaving
/// [`Config::loaded_from`] empty so the caller can report it once logging is
/// up. The bot token may be supplied through [`TOKEN_ENV`] instead of the file.
pub fn load(path: &str) -> Result<Config, ForesightError> {
    let path = Path::new(path);
    let mut config = if !path.exists() {
        Config::default()
    } else {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ForesightError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;

        let mut config: Config = toml::from_str(&content)
            .map_err(|e| ForesightError::Config(format!("failed to parse config: {}", e)))?;
        config.loaded_from = Some(path.to_path_buf());
        config
    };

    apply_token_override(&mut config, std::env::var(TOKEN_ENV).ok());
    Ok(config)
}
