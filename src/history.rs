use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::config_dir;

/// Stories the reader has already been shown, by uuid.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SeenStories {
    seen_stories: HashSet<String>,
    #[serde(skip)]
    path: Option<PathBuf>,
}

impl SeenStories {
    pub fn load() -> Self {
        match history_file_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Empty history when the file is missing or unreadable.
    pub fn load_from(path: &Path) -> Self {
        let mut history = fs::read_to_string(path)
            .ok()
            .and_then(|contents| serde_json::from_str::<SeenStories>(&contents).ok())
            .unwrap_or_default();
        history.path = Some(path.to_path_buf());
        history
    }

    pub fn save(&self) -> Result<()> {
        let Some(path) = self.path.as_ref() else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
        debug!("saved {} seen stories to {}", self.seen_stories.len(), path.display());
        Ok(())
    }

    pub fn mark_as_seen(&mut self, uuid: &str) {
        self.seen_stories.insert(uuid.to_string());
    }

    pub fn is_seen(&self, uuid: &str) -> bool {
        self.seen_stories.contains(uuid)
    }
}

fn history_file_path() -> Option<PathBuf> {
    config_dir().map(|p| p.join("seen_stories.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_round_trip_through_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("seen.json");

        let mut history = SeenStories::load_from(&path);
        assert!(!history.is_seen("a"));
        history.mark_as_seen("a");
        history.save().unwrap();

        let reloaded = SeenStories::load_from(&path);
        assert!(reloaded.is_seen("a"));
        assert!(!reloaded.is_seen("b"));
    }

    #[test]
    fn test_corrupt_file_gives_empty_history() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("seen.json");
        fs::write(&path, "not json").unwrap();
        let history = SeenStories::load_from(&path);
        assert!(!history.is_seen("a"));
    }
}
