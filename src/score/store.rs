//! Best-score persistence
//!
//! The best score survives across runs as a small JSON file. A missing file
//! means no game has been recorded yet; an unreadable or malformed file is an
//! error rather than a silent reset.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// On-disk shape of the score file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ScoreData {
    best_score: u32,
}

/// Owns the score file and the best score read from it
#[derive(Debug)]
pub struct BestScoreStore {
    path: PathBuf,
    data: ScoreData,
}

impl BestScoreStore {
    /// Load the store from a file, starting from zero if the file is absent
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let data = if path.exists() {
            let text = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read score file {:?}", path))?;
            serde_json::from_str(&text)
                .with_context(|| format!("Failed to parse score file {:?}", path))?
        } else {
            ScoreData::default()
        };

        Ok(Self { path, data })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Best score seen so far
    pub fn best(&self) -> u32 {
        self.data.best_score
    }

    /// Record a finished game's score, persisting only a new best.
    /// Returns whether the score beat the previous best.
    pub fn record(&mut self, score: u32) -> Result<bool> {
        if score <= self.data.best_score {
            return Ok(false);
        }

        self.data.best_score = score;
        self.save()?;
        Ok(true)
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }

        let json =
            serde_json::to_string_pretty(&self.data).context("Failed to serialize score data")?;
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write score file {:?}", self.path))?;

        Ok(())
    }
}
