use anyhow::{Context, Result};
use serde::Deserialize;
use std::{env, str::FromStr, time::Duration};

use crate::game::BoardConfig;

pub const DEFAULT_GRADING_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_GRADING_MODEL: &str = "openai/gpt-oss-20b:free";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub grading: GradingConfig,
    pub game: GameConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory with a built web frontend to serve at `/`
    pub static_dir: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GradingConfig {
    /// Checked when grading, so the server can start without a key
    pub api_key: Option<String>,
    pub api_url: String,
    pub model: String,
    pub site_url: String,
    pub app_name: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GameConfig {
    pub question_bank_path: Option<String>,
    pub winning_score: u32,
    /// Special tile override, e.g. `4:forward,11:backward`
    pub special_tiles: Option<String>,
    pub session_idle_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let server = ServerConfig {
            host: env::var("HOST")
                .unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: number_var("PORT", "3000")?,
            static_dir: optional_var("STATIC_DIR"),
        };

        let grading = GradingConfig {
            api_key: optional_var("OPENROUTER_API_KEY"),
            api_url: env::var("OPENROUTER_API_URL")
                .unwrap_or_else(|_| DEFAULT_GRADING_URL.to_string()),
            model: env::var("OPENROUTER_MODEL")
                .unwrap_or_else(|_| DEFAULT_GRADING_MODEL.to_string()),
            site_url: env::var("YOUR_SITE_URL")
                .unwrap_or_else(|_| "https://localhost".to_string()),
            app_name: env::var("YOUR_APP_NAME")
                .unwrap_or_else(|_| "Double Spin Wheel".to_string()),
            timeout_secs: number_var("GRADING_TIMEOUT_SECS", "20")?,
        };

        let game = GameConfig {
            question_bank_path: optional_var("QUESTION_BANK_PATH"),
            winning_score: number_var(
                "WINNING_SCORE",
                &crate::game::board::WINNING_SCORE.to_string(),
            )?,
            special_tiles: optional_var("SPECIAL_TILES"),
            session_idle_timeout_secs: number_var("SESSION_IDLE_TIMEOUT_SECS", "3600")?,
        };

        Ok(Config {
            server,
            grading,
            game,
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl GradingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl GameConfig {
    /// Board built from the configured track length and special tiles.
    /// Without an override the default special tiles are used.
    pub fn board(&self) -> Result<BoardConfig> {
        let special_tiles = match &self.special_tiles {
            Some(table) => BoardConfig::parse_special_tiles(table)
                .context("SPECIAL_TILES is malformed")?,
            None => BoardConfig::default().special_tiles().clone(),
        };

        BoardConfig::new(self.winning_score, special_tiles).context("Invalid board configuration")
    }

    pub fn session_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.session_idle_timeout_secs)
    }
}

/// Read an environment variable, treating blank values as unset
fn optional_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Read a numeric environment variable, falling back to `default` when unset.
/// A value that does not parse is a startup error.
fn number_var<T>(name: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    parse_number(name, env::var(name).ok().as_deref(), default)
}

fn parse_number<T>(name: &str, value: Option<&str>, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .unwrap_or(default)
        .trim()
        .parse()
        .with_context(|| format!("{} must be a number", name))
}
