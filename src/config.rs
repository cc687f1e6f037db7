use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

use crate::types::Level;

const APP_NAME: &str = "vocab_trainer";

/// Thresholds and multipliers used to turn a word's record into a weight.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WeightConfig {
    pub high_accuracy: f64,
    pub moderate_accuracy: f64,
    pub low_accuracy: f64,
    pub mastered_base: f64,
    pub moderate_base: f64,
    pub struggling_base: f64,
    pub weak_base: f64,
    pub correct_streak_threshold: u32,
    pub correct_streak_multiplier: f64,
    pub wrong_streak_threshold: u32,
    pub wrong_streak_multiplier: f64,
    pub new_word_attempts: u32,
    pub new_word_multiplier: f64,
    pub practiced_attempts: u32,
    pub practiced_multiplier: f64,
    pub unseen_weight: f64,
    pub stale_after_hours: i64,
    pub stale_multiplier: f64,
    pub min_weight: f64,
    pub max_weight: f64,
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self {
            high_accuracy: 0.8,
            moderate_accuracy: 0.6,
            low_accuracy: 0.4,
            mastered_base: 0.3,
            moderate_base: 0.8,
            struggling_base: 1.2,
            weak_base: 2.0,
            correct_streak_threshold: 3,
            correct_streak_multiplier: 0.5,
            wrong_streak_threshold: 2,
            wrong_streak_multiplier: 2.5,
            new_word_attempts: 3,
            new_word_multiplier: 1.2,
            practiced_attempts: 10,
            practiced_multiplier: 0.9,
            unseen_weight: 1.2,
            stale_after_hours: 72,
            stale_multiplier: 1.5,
            min_weight: 0.1,
            max_weight: 5.0,
        }
    }
}

impl WeightConfig {
    pub fn clamp(&self, weight: f64) -> f64 {
        weight.max(self.min_weight).min(self.max_weight)
    }

    /// Restores defaults for values that would break weighted selection:
    /// keeps `0 < min_weight <= max_weight` and a positive unseen weight.
    /// Returns true if anything was changed.
    pub fn normalize(&mut self) -> bool {
        let defaults = Self::default();
        let mut changed = false;

        if !(self.min_weight.is_finite() && self.min_weight > 0.0) {
            warn!(value = self.min_weight, "min_weight must be positive, using default");
            self.min_weight = defaults.min_weight;
            changed = true;
        }
        if !(self.max_weight.is_finite() && self.max_weight >= self.min_weight) {
            warn!(
                min = self.min_weight,
                max = self.max_weight,
                "max_weight is below min_weight, using default bounds"
            );
            self.max_weight = defaults.max_weight.max(self.min_weight);
            changed = true;
        }
        if !(self.unseen_weight.is_finite() && self.unseen_weight > 0.0) {
            warn!(value = self.unseen_weight, "unseen_weight must be positive, using default");
            self.unseen_weight = defaults.unseen_weight;
            changed = true;
        }
        if !(self.stale_multiplier.is_finite() && self.stale_multiplier > 0.0) {
            warn!(value = self.stale_multiplier, "stale_multiplier must be positive, using default");
            self.stale_multiplier = defaults.stale_multiplier;
            changed = true;
        }
        changed
    }
}

/// Retry schedule for the translation request: `base * multiplier^attempt`, capped.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub multiplier: f64,
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000,
            multiplier: 2.0,
            max_delay_ms: 8000,
        }
    }
}

impl RetryPolicy {
    /// A policy that retries immediately; used by tests.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay_ms: 0,
            multiplier: 1.0,
            max_delay_ms: 0,
        }
    }

    /// Delay to wait after the failed attempt with zero-based index `attempt`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = self.multiplier.max(1.0).powi(attempt as i32);
        let millis = (self.base_delay_ms as f64 * factor).min(self.max_delay_ms as f64);
        Duration::from_millis(millis as u64)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TranslatorConfig {
    pub endpoint: String,
    pub model: String,
    pub timeout_secs: u64,
    pub max_tokens: u32,
    pub temperature: f32,
    pub retry: RetryPolicy,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.groq.com/openai/v1/chat/completions".to_string(),
            model: "llama-3.1-8b-instant".to_string(),
            timeout_secs: 10,
            max_tokens: 150,
            temperature: 0.3,
            retry: RetryPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SelectionConfig {
    /// How many of the most recently shown words are skipped when possible
    pub exclude_recent: usize,
    pub adventure_levels: Vec<Level>,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            exclude_recent: 2,
            adventure_levels: vec![Level::A1, Level::A2, Level::B1, Level::B2],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionRules {
    pub end_on_wrong: bool,
    pub max_skips: Option<u32>,
    pub correct_limit: Option<u32>,
}

impl Default for SessionRules {
    fn default() -> Self {
        Self {
            end_on_wrong: true,
            max_skips: None,
            correct_limit: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub target_language: String,
    pub word_list: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub translator: TranslatorConfig,
    pub weights: WeightConfig,
    pub selection: SelectionConfig,
    pub session: SessionRules,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_language: "Indonesian".to_string(),
            word_list: None,
            data_dir: None,
            translator: TranslatorConfig::default(),
            weights: WeightConfig::default(),
            selection: SelectionConfig::default(),
            session: SessionRules::default(),
        }
    }
}

impl Config {
    /// Apply `MAX_RETRIES`, `TRANSLATION_TIMEOUT` and `VOCAB_MODEL` overrides.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    fn apply_overrides<F: Fn(&str) -> Option<String>>(&mut self, lookup: F) {
        if let Some(raw) = lookup("MAX_RETRIES") {
            match raw.trim().parse::<u32>() {
                Ok(n) if n > 0 => self.translator.retry.max_attempts = n,
                _ => warn!(value = %raw, "Ignoring invalid MAX_RETRIES"),
            }
        }
        if let Some(raw) = lookup("TRANSLATION_TIMEOUT") {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => self.translator.timeout_secs = secs,
                _ => warn!(value = %raw, "Ignoring invalid TRANSLATION_TIMEOUT"),
            }
        }
        if let Some(model) = lookup("VOCAB_MODEL") {
            if !model.trim().is_empty() {
                self.translator.model = model.trim().to_string();
            }
        }
    }

    /// Directory holding weights, history, scores and logs.
    pub fn resolved_data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(AppDirs::data_dir)
    }
}

/// Reads the API key, treating the `.env.example` placeholder as unset.
pub fn api_key_from_env() -> Option<String> {
    std::env::var("GROQ_API_KEY")
        .ok()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty() && k != "your_groq_api_key_here")
}

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    pub fn data_dir() -> PathBuf {
        ProjectDirs::from("", "", APP_NAME)
            .map(|pd| pd.data_local_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("scores"))
    }

    pub fn config_path() -> PathBuf {
        ProjectDirs::from("", "", APP_NAME)
            .map(|pd| pd.config_dir().join("config.json"))
            .unwrap_or_else(|| PathBuf::from("vocab_trainer_config.json"))
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            path: AppDirs::config_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        match fs::read(&self.path) {
            Ok(bytes) => match serde_json::from_slice::<Config>(&bytes) {
                Ok(mut cfg) => {
                    cfg.weights.normalize();
                    cfg
                }
                Err(e) => {
                    warn!(path = %self.path.display(), error = %e, "Invalid config file, using defaults");
                    Config::default()
                }
            },
            Err(_) => {
                debug!(path = %self.path.display(), "No config file, using defaults");
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).map_err(std::io::Error::other)?;
        fs::write(&self.path, data)
    }
}
