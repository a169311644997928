//! JSON leaderboard of finished games.

use std::{fs, io::ErrorKind, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Single leaderboard row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct LeaderboardEntry {
    pub(crate) initials: String,
    pub(crate) score: u64,
}

/// Scores sorted from highest to lowest.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Leaderboard {
    entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    /// Reads the leaderboard file. A missing file yields an empty board.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(contents) => Self::from_json(&contents)
                .with_context(|| format!("failed to parse leaderboard at {}", path.display())),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(error) => Err(error)
                .with_context(|| format!("failed to read leaderboard at {}", path.display())),
        }
    }

    pub(crate) fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string(&self.entries).context("failed to encode leaderboard")?;
        fs::write(path, json)
            .with_context(|| format!("failed to write leaderboard to {}", path.display()))
    }

    fn from_json(contents: &str) -> Result<Self> {
        let mut entries: Vec<LeaderboardEntry> = serde_json::from_str(contents)?;
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        Ok(Self { entries })
    }

    /// Records a score. Equal scores keep their insertion order.
    pub(crate) fn add(&mut self, initials: &str, score: u64) {
        let position = self
            .entries
            .iter()
            .position(|entry| entry.score < score)
            .unwrap_or(self.entries.len());
        self.entries.insert(
            position,
            LeaderboardEntry {
                initials: initials.to_owned(),
                score,
            },
        );
    }

    pub(crate) fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }
}
