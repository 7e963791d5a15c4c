use directories::{ProjectDirs, UserDirs};
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// `$HOME/.local/state/wordflow`, or the platform's local data dir
    pub fn state_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(
                PathBuf::from(home)
                    .join(".local")
                    .join("state")
                    .join("wordflow"),
            )
        } else {
            ProjectDirs::from("", "", "wordflow").map(|pd| pd.data_local_dir().to_path_buf())
        }
    }

    pub fn db_path() -> Option<PathBuf> {
        Self::state_dir().map(|d| d.join("wordflow.db"))
    }

    pub fn rounds_log_path() -> Option<PathBuf> {
        Self::state_dir().map(|d| d.join("rounds.csv"))
    }

    pub fn log_path() -> Option<PathBuf> {
        Self::state_dir().map(|d| d.join("wordflow.log"))
    }

    /// Where exported texts go: the user's download dir, else the working dir
    pub fn export_dir() -> PathBuf {
        UserDirs::new()
            .and_then(|u| u.download_dir().map(|d| d.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
