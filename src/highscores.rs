//! Persist best scores per board configuration (XDG config or ~/.config/samegametui).

use crate::board::BoardConfig;
use anyhow::Result;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

const FILENAME: &str = "highscores";

/// Best score keyed by `WxHxC`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighScores {
    best: BTreeMap<String, u32>,
}

fn key(config: BoardConfig) -> String {
    format!(
        "{}x{}x{}",
        config.width(),
        config.height(),
        config.num_colors()
    )
}

impl HighScores {
    /// Load from disk; empty on a missing or unreadable file.
    pub fn load() -> Self {
        config_path()
            .and_then(|path| Ok(fs::read_to_string(path)?))
            .map(|content| Self::parse(&content))
            .unwrap_or_default()
    }

    /// Save to disk. Creates the config directory if needed.
    pub fn save(&self) -> Result<()> {
        let path = config_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_file_string())?;
        Ok(())
    }

    pub fn best(&self, config: BoardConfig) -> u32 {
        self.best.get(&key(config)).copied().unwrap_or(0)
    }

    /// Record a finished game; true if it beat the stored best.
    pub fn submit(&mut self, config: BoardConfig, score: u32) -> bool {
        let entry = self.best.entry(key(config)).or_insert(0);
        if score > *entry {
            *entry = score;
            true
        } else {
            false
        }
    }

    /// One `WxHxC=score` per line; malformed lines are skipped.
    fn parse(content: &str) -> Self {
        let best = content
            .lines()
            .filter_map(|line| {
                let (k, v) = line.trim().split_once('=')?;
                Some((k.trim().to_string(), v.trim().parse().ok()?))
            })
            .collect();
        Self { best }
    }

    fn to_file_string(&self) -> String {
        self.best
            .iter()
            .map(|(k, v)| format!("{k}={v}\n"))
            .collect()
    }
}

/// Returns the path to the high scores file (config dir / samegametui / highscores).
fn config_path() -> Result<PathBuf> {
    let base = match std::env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg),
        _ => std::env::var("HOME")
            .map(|h| PathBuf::from(h).join(".config"))
            .unwrap_or_else(|_| PathBuf::from(".")),
    };
    Ok(base.join("samegametui").join(FILENAME))
}
