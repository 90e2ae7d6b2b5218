use color_eyre::eyre::{Context, Result, eyre};
use serde::Deserialize;
use std::{
    env, fs, io,
    path::PathBuf,
    sync::{OnceLock, RwLock},
};

/// Globally accessible application configuration values.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_api_base_url_value")]
    pub api_base_url: String,
    #[serde(default = "default_num_questions_value")]
    pub default_num_questions: usize,
    #[serde(default = "default_difficulty_value")]
    pub default_difficulty: Difficulty,
    #[serde(default = "default_num_cards_value")]
    pub default_num_cards: usize,
    #[serde(default = "default_study_days_value")]
    pub default_study_days: usize,
}

impl AppConfig {
    fn normalize(&mut self) {
        let trimmed = self.api_base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            self.api_base_url = DEFAULT_API_BASE_URL.to_string();
        } else if trimmed != self.api_base_url {
            self.api_base_url = trimmed.to_string();
        }
        if self.default_num_questions == 0 {
            self.default_num_questions = DEFAULT_NUM_QUESTIONS;
        }
        if self.default_num_cards == 0 {
            self.default_num_cards = DEFAULT_NUM_CARDS;
        }
        if self.default_study_days == 0 {
            self.default_study_days = DEFAULT_STUDY_DAYS;
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            default_num_questions: DEFAULT_NUM_QUESTIONS,
            default_difficulty: default_difficulty_value(),
            default_num_cards: DEFAULT_NUM_CARDS,
            default_study_days: DEFAULT_STUDY_DAYS,
        }
    }
}

const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_NUM_QUESTIONS: usize = 5;
const DEFAULT_NUM_CARDS: usize = 10;
const DEFAULT_STUDY_DAYS: usize = 7;

const CONFIG_FILE_PATH: &str = "config/app_config.toml";

/// Environment variable that overrides the configured backend address.
const API_BASE_ENV_VAR: &str = "STUDYHUB_API_BASE";

static APP_CONFIG: OnceLock<RwLock<AppConfig>> = OnceLock::new();

fn config_lock() -> &'static RwLock<AppConfig> {
    APP_CONFIG.get_or_init(|| RwLock::new(AppConfig::default()))
}

/// Attempt to load configuration from disk. If loading fails, the in-memory config will be reset
/// to defaults and the error will be returned for the caller to surface if desired.
pub fn initialize() -> Result<()> {
    match load_config_from_disk() {
        Ok(mut config) => {
            apply_env_overrides(&mut config);
            let lock = config_lock();
            *lock.write().expect("config lock poisoned") = config;
            Ok(())
        }
        Err(err) => {
            let mut config = AppConfig::default();
            apply_env_overrides(&mut config);
            let lock = config_lock();
            *lock.write().expect("config lock poisoned") = config;
            Err(err)
        }
    }
}

/// Retrieve a clone of the current configuration.
pub fn current() -> AppConfig {
    config_lock().read().expect("config lock poisoned").clone()
}

/// Absolute path to the configuration file used for persistence.
pub fn config_file_path() -> PathBuf {
    PathBuf::from(CONFIG_FILE_PATH)
}

fn apply_env_overrides(config: &mut AppConfig) {
    if let Ok(base) = env::var(API_BASE_ENV_VAR) {
        if !base.trim().is_empty() {
            config.api_base_url = base;
        }
    }
    config.normalize();
}

fn load_config_from_disk() -> Result<AppConfig> {
    let path = config_file_path();
    match fs::read_to_string(&path) {
        Ok(contents) => {
            let mut config: AppConfig = toml::from_str(&contents)
                .wrap_err_with(|| format!("failed to parse configuration at {}", path.display()))?;
            config.normalize();
            Ok(config)
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(err) => Err(eyre!(format!(
            "failed to read configuration at {}: {}",
            path.display(),
            err
        ))),
    }
}

const fn default_num_questions_value() -> usize {
    DEFAULT_NUM_QUESTIONS
}

const fn default_num_cards_value() -> usize {
    DEFAULT_NUM_CARDS
}

const fn default_study_days_value() -> usize {
    DEFAULT_STUDY_DAYS
}

const fn default_difficulty_value() -> Difficulty {
    Difficulty::Medium
}

fn default_api_base_url_value() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

/// Quiz difficulty forwarded verbatim to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_request_value(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Easy => Self::Medium,
            Self::Medium => Self::Hard,
            Self::Hard => Self::Easy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_trailing_slash_from_base_url() {
        let mut config = AppConfig {
            api_base_url: "http://localhost:9999/".to_string(),
            ..AppConfig::default()
        };
        config.normalize();
        assert_eq!(config.api_base_url, "http://localhost:9999");
    }

    #[test]
    fn normalize_restores_defaults_for_zero_counts() {
        let mut config = AppConfig {
            default_num_questions: 0,
            default_num_cards: 0,
            default_study_days: 0,
            ..AppConfig::default()
        };
        config.normalize();
        assert_eq!(config.default_num_questions, DEFAULT_NUM_QUESTIONS);
        assert_eq!(config.default_num_cards, DEFAULT_NUM_CARDS);
        assert_eq!(config.default_study_days, DEFAULT_STUDY_DAYS);
    }

    #[test]
    fn difficulty_cycles_through_all_levels() {
        let start = Difficulty::Easy;
        assert_eq!(start.next(), Difficulty::Medium);
        assert_eq!(start.next().next(), Difficulty::Hard);
        assert_eq!(start.next().next().next(), Difficulty::Easy);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: AppConfig = toml::from_str("api_base_url = \"http://example.test\"")
            .expect("partial config should parse");
        assert_eq!(config.api_base_url, "http://example.test");
        assert_eq!(config.default_num_questions, DEFAULT_NUM_QUESTIONS);
        assert_eq!(config.default_difficulty, Difficulty::Medium);
    }
}
