use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::analysis::DEFAULT_MODEL;

/// Session lengths offered on the welcome screen
pub const DURATION_OPTIONS_MINS: [u64; 7] = [2, 5, 10, 15, 20, 25, 30];

pub const DEFAULT_DURATION_SECS: u64 = 300;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub duration_secs: u64,
    pub analysis_model: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            duration_secs: DEFAULT_DURATION_SECS,
            analysis_model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl Config {
    /// Index into [`DURATION_OPTIONS_MINS`] of the current duration, if it is one of them
    pub fn duration_option(&self) -> Option<usize> {
        DURATION_OPTIONS_MINS
            .iter()
            .position(|m| m * 60 == self.duration_secs)
    }

    /// Move to the next/previous preset length, wrapping around
    pub fn cycle_duration(&mut self, forward: bool) {
        let len = DURATION_OPTIONS_MINS.len();
        let next = match (self.duration_option(), forward) {
            (Some(i), true) => (i + 1) % len,
            (Some(i), false) => (i + len - 1) % len,
            (None, true) => 0,
            (None, false) => len - 1,
        };
        self.duration_secs = DURATION_OPTIONS_MINS[next] * 60;
    }

    pub fn select_duration_option(&mut self, index: usize) -> bool {
        match DURATION_OPTIONS_MINS.get(index) {
            Some(mins) => {
                self.duration_secs = mins * 60;
                true
            }
            None => false,
        }
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
        let path = if let Some(pd) = ProjectDirs::from("", "", "wordflow") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("wordflow_config.json")
        };
        Self { path }
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
        if let Ok(bytes) = fs::read(&self.path) {
            match serde_json::from_slice::<Config>(&bytes) {
                Ok(cfg) if cfg.duration_secs > 0 => return cfg,
                Ok(_) => tracing::warn!(path = %self.path.display(), "ignoring zero duration in config"),
                Err(e) => tracing::warn!(path = %self.path.display(), error = %e, "unreadable config"),
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).unwrap_or_default();
        fs::write(&self.path, data)
    }
}
