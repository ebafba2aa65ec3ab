use crate::api::models::Match;
use crate::error::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const STORAGE_FILE: &str = "storage.json";

/// Every match fetched so far, keyed by game id. The whole map is read on
/// load and rewritten on every mutation.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Storage {
    #[serde(skip)]
    path: PathBuf,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub data: BTreeMap<i64, Match>,
}

impl Storage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Storage {
            path: path.into(),
            last_updated: None,
            data: BTreeMap::new(),
        }
    }

    pub fn default_path() -> PathBuf {
        dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("leaguestats")
            .join(STORAGE_FILE)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing or empty file gives an empty store. So does a corrupt one,
    /// which is overwritten on the next save.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let path = path.into();

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Storage::new(path)),
            Err(e) => {
                return Err(AppError::Storage(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        if content.trim().is_empty() {
            return Ok(Storage::new(path));
        }

        match serde_json::from_str::<Storage>(&content) {
            Ok(mut storage) => {
                storage.path = path;
                Ok(storage)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "storage file unreadable, starting empty");
                Ok(Storage::new(path))
            }
        }
    }

    pub fn save(&self) -> Result<(), AppError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| AppError::Json(format!("Failed to serialize storage: {}", e)))?;

        fs::write(&self.path, json).map_err(|e| {
            AppError::Storage(format!("Failed to write {}: {}", self.path.display(), e))
        })?;

        Ok(())
    }

    /// Insert new records and overwrite existing ones, then persist.
    pub fn upsert_records(&mut self, matches: Vec<Match>) -> Result<(), AppError> {
        let count = matches.len();
        for m in matches {
            self.data.insert(m.game_id, m);
        }
        self.last_updated = Some(Utc::now());
        self.save()?;
        info!(count, total = self.data.len(), "upserted matches");
        Ok(())
    }

    pub fn delete_records(&mut self, matches: &[Match]) -> Result<(), AppError> {
        for m in matches {
            self.data.remove(&m.game_id);
        }
        self.last_updated = Some(Utc::now());
        self.save()
    }

    /// The ids from `game_ids` that are not stored yet, in their original order.
    pub fn filter_game_ids(&self, game_ids: &[i64]) -> Vec<i64> {
        game_ids
            .iter()
            .copied()
            .filter(|id| !self.data.contains_key(id))
            .collect()
    }

    /// Keep only the `total` most recently created matches.
    pub fn prune(&mut self, total: usize) -> Result<usize, AppError> {
        if total == 0 {
            warn!(stored = self.data.len(), "prune to zero requested, removing every match");
        }
        if self.data.len() <= total {
            return Ok(0);
        }

        let mut by_recency: Vec<(i64, i64)> = self
            .data
            .values()
            .map(|m| (m.game_creation, m.game_id))
            .collect();
        by_recency.sort_by(|a, b| b.cmp(a));

        let keep: HashSet<i64> = by_recency.iter().take(total).map(|&(_, id)| id).collect();
        let before = self.data.len();
        self.data.retain(|id, _| keep.contains(id));
        let removed = before - self.data.len();

        self.last_updated = Some(Utc::now());
        self.save()?;
        info!(removed, kept = self.data.len(), "pruned storage");
        Ok(removed)
    }

    pub fn get(&self, game_id: i64) -> Option<&Match> {
        self.data.get(&game_id)
    }

    pub fn matches(&self) -> impl Iterator<Item = &Match> {
        self.data.values()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn latest_game_version(&self) -> String {
        self.data
            .values()
            .map(|m| m.game_version.as_str())
            .fold("0.0.0.0", |latest, v| {
                if compare_game_versions(v, latest) == Ordering::Greater {
                    v
                } else {
                    latest
                }
            })
            .to_string()
    }

    /// Game version to look champion names up for; `None` while nothing is
    /// stored, since there is no patch to ask about.
    pub fn champion_data_version(&self) -> Option<String> {
        if self.is_empty() {
            None
        } else {
            Some(self.latest_game_version())
        }
    }
}

/// Compare dot-separated versions numerically, component by component.
/// Missing or non-numeric components count as 0.
pub fn compare_game_versions(a: &str, b: &str) -> Ordering {
    let parse = |v: &str| -> Vec<u64> { v.split('.').map(|s| s.parse().unwrap_or(0)).collect() };
    let (a, b) = (parse(a), parse(b));
    let len = a.len().max(b.len());

    (0..len)
        .map(|i| {
            let x = a.get(i).copied().unwrap_or(0);
            let y = b.get(i).copied().unwrap_or(0);
            x.cmp(&y)
        })
        .find(|o| *o != Ordering::Equal)
        .unwrap_or(Ordering::Equal)
}
