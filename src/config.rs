use crate::api::endpoints;
use crate::error::AppError;
use crate::storage::Storage;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const CONFIG_FILE: &str = "conf.json";
const API_KEY_GROUPS: [usize; 5] = [8, 4, 4, 4, 12];

/// The contents of conf.json. Environment and command-line overrides never
/// reach this; only answers the user typed in are saved.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct StoredConfig {
    api_key: String,
    summoner_name: String,
    base_url: String,
    storage_path: PathBuf,
}

impl Default for StoredConfig {
    fn default() -> Self {
        StoredConfig {
            api_key: String::new(),
            summoner_name: String::new(),
            base_url: endpoints::platform_base_url(endpoints::DEFAULT_PLATFORM),
            storage_path: Storage::default_path(),
        }
    }
}

/// Effective settings for this run: file values with overrides applied.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub summoner_name: String,
    pub base_url: String,
    pub storage_path: PathBuf,
    stored: StoredConfig,
    path: PathBuf,
}

/// Source of answers when the configuration is incomplete.
pub trait Prompt {
    fn ask(&mut self, question: &str) -> Result<String, AppError>;
}

/// Asks on stdout and reads one line from stdin.
pub struct StdinPrompt;

impl Prompt for StdinPrompt {
    fn ask(&mut self, question: &str) -> Result<String, AppError> {
        let mut stdout = io::stdout();
        writeln!(stdout, "{}", question)?;
        stdout.flush()?;

        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(line.trim_end_matches(&['\n', '\r'][..]).to_string())
    }
}

impl Config {
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("leaguestats")
            .join(CONFIG_FILE)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the config file at `path` (missing or empty gives defaults),
    /// then apply environment overrides.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let mut config = Self::from_file(path)?;
        config.apply_env(|key| env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let path = path.into();

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
            Err(e) => {
                return Err(AppError::Config(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        let stored = if content.trim().is_empty() {
            debug!(path = %path.display(), "no config file, using defaults");
            StoredConfig::default()
        } else {
            serde_json::from_str::<StoredConfig>(&content).map_err(|e| {
                AppError::Config(format!("Failed to parse {}: {}", path.display(), e))
            })?
        };

        Ok(Config {
            api_key: stored.api_key.clone(),
            summoner_name: stored.summoner_name.clone(),
            base_url: stored.base_url.clone(),
            storage_path: stored.storage_path.clone(),
            stored,
            path,
        })
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        let var = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        if let Some(api_key) = var("RIOT_API_KEY") {
            self.api_key = api_key.trim().to_string();
        }
        if let Some(name) = var("LEAGUESTATS_SUMMONER") {
            self.summoner_name = name;
        }
        if let Some(url) = var("LEAGUESTATS_BASE_URL") {
            self.base_url = url;
        }
        if let Some(path) = var("LEAGUESTATS_STORAGE") {
            self.storage_path = PathBuf::from(path);
        }
    }

    pub fn save(&self) -> Result<(), AppError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }

        let json = serde_json::to_string_pretty(&self.stored)
            .map_err(|e| AppError::Json(format!("Failed to serialize config: {}", e)))?;

        fs::write(&self.path, json).map_err(|e| {
            AppError::Config(format!("Failed to write {}: {}", self.path.display(), e))
        })?;

        Ok(())
    }

    /// Ask for whatever is missing or malformed and save the answers.
    pub fn validate(&mut self, prompt: &mut dyn Prompt) -> Result<(), AppError> {
        self.ensure_api_key(prompt)?;
        self.ensure_summoner_name(prompt)
    }

    pub fn ensure_api_key(&mut self, prompt: &mut dyn Prompt) -> Result<(), AppError> {
        if valid_api_key(&self.api_key) {
            return Ok(());
        }
        let api_key = ask_api_key(prompt, "Invalid API Key")?;
        self.api_key = api_key.clone();
        self.stored.api_key = api_key;
        self.save()?;
        info!(path = %self.path.display(), "saved API key");
        Ok(())
    }

    pub fn ensure_summoner_name(&mut self, prompt: &mut dyn Prompt) -> Result<(), AppError> {
        if !self.summoner_name.trim().is_empty() {
            return Ok(());
        }
        let name = prompt.ask("Invalid Summoner Name\nEnter your Summoner Name:")?;
        if name.trim().is_empty() {
            return Err(AppError::Config("Summoner name must not be empty".to_string()));
        }
        self.summoner_name = name.clone();
        self.stored.summoner_name = name;
        self.save()?;
        info!(path = %self.path.display(), "saved summoner name");
        Ok(())
    }

    /// The summoner for this run: `cli` when given, otherwise the configured
    /// name, asking for one only if none is configured.
    pub fn resolve_summoner(
        &mut self,
        cli: Option<&str>,
        prompt: &mut dyn Prompt,
    ) -> Result<String, AppError> {
        match cli.map(str::trim) {
            Some(name) if !name.is_empty() => Ok(name.to_string()),
            _ => {
                self.ensure_summoner_name(prompt)?;
                Ok(self.summoner_name.clone())
            }
        }
    }

    /// Replace a rejected key with a fresh one from `prompt` and save it.
    pub fn refresh_api_key(&mut self, prompt: &mut dyn Prompt, reason: &str) -> Result<String, AppError> {
        let api_key = ask_api_key(prompt, reason)?;
        self.api_key = api_key.clone();
        self.stored.api_key = api_key;
        self.save()?;
        info!("stored new API key");
        Ok(self.api_key.clone())
    }
}

fn ask_api_key(prompt: &mut dyn Prompt, reason: &str) -> Result<String, AppError> {
    let key = prompt.ask(&format!(
        "{}\nGenerate new API Key at https://developer.riotgames.com\nEnter the New API Key:",
        reason
    ))?;
    let key = key.trim().to_string();
    if !valid_api_key(&key) {
        return Err(AppError::Config(format!("'{}' is not a valid API key", key)));
    }
    Ok(key)
}

/// `RGAPI-` followed by word-character groups of 8-4-4-4-12.
pub fn valid_api_key(key: &str) -> bool {
    let Some(rest) = key.strip_prefix("RGAPI-") else {
        return false;
    };

    let groups: Vec<&str> = rest.split('-').collect();
    groups.len() == API_KEY_GROUPS.len()
        && groups.iter().zip(API_KEY_GROUPS).all(|(group, len)| {
            group.len() == len && group.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}
