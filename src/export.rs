use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::Serialize;

use crate::session::RoundEnd;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum ExportFormat {
    #[strum(serialize = "txt")]
    Text,
    #[strum(serialize = "md")]
    Markdown,
}

impl ExportFormat {
    pub fn file_name(&self) -> String {
        format!("wordflow-export.{self}")
    }
}

/// Write the round's text into `dir`, replacing any earlier export
pub fn export_text(dir: &Path, text: &str, format: ExportFormat) -> io::Result<PathBuf> {
    if text.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "nothing to export",
        ));
    }

    fs::create_dir_all(dir)?;
    let path = dir.join(format.file_name());
    fs::write(&path, text)?;
    tracing::info!(path = %path.display(), "exported text");
    Ok(path)
}

/// One row of the round history
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundRecord {
    pub date: String,
    pub duration_secs: u64,
    pub score: u64,
    pub words: usize,
    pub unique_words: usize,
    pub multiplier: String,
}

impl From<&RoundEnd> for RoundRecord {
    fn from(end: &RoundEnd) -> Self {
        Self {
            date: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            duration_secs: end.duration_secs,
            score: end.score,
            words: end.details.words,
            unique_words: end.details.unique_words,
            multiplier: format!("{:.2}", end.details.multiplier),
        }
    }
}

/// Append-only CSV log of finished rounds
#[derive(Debug, Clone)]
pub struct RoundLog {
    path: PathBuf,
}

impl RoundLog {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, record: &RoundRecord) -> Result<(), csv::Error> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        // If the log doesn't exist yet, we need to emit a header
        let needs_header = !self.path.exists();

        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        writer.serialize(record)?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::ScoreDetails;
    use tempfile::tempdir;

    fn round() -> RoundEnd {
        RoundEnd {
            text: "cat cat dog".into(),
            score: 28,
            details: ScoreDetails {
                score: 28,
                words: 3,
                unique_words: 2,
                multiplier: 1.05,
            },
            duration_secs: 5,
        }
    }

    #[test]
    fn export_writes_named_file() {
        let dir = tempdir().unwrap();
        let path = export_text(dir.path(), "hello there", ExportFormat::Markdown).unwrap();
        assert!(path.ends_with("wordflow-export.md"));
        assert_eq!(fs::read_to_string(path).unwrap(), "hello there");
    }

    #[test]
    fn export_rejects_empty_text() {
        let dir = tempdir().unwrap();
        let err = export_text(dir.path(), "", ExportFormat::Text).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert!(!dir.path().join("wordflow-export.txt").exists());
    }

    #[test]
    fn format_file_names() {
        assert_eq!(ExportFormat::Text.file_name(), "wordflow-export.txt");
        assert_eq!(ExportFormat::Markdown.file_name(), "wordflow-export.md");
    }

    #[test]
    fn round_log_writes_header_once() {
        let dir = tempdir().unwrap();
        let log = RoundLog::new(dir.path().join("state").join("rounds.csv"));
        let record = RoundRecord::from(&round());
        log.append(&record).unwrap();
        log.append(&record).unwrap();

        let contents = fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "date,duration_secs,score,words,unique_words,multiplier"
        );
        assert!(lines[1].ends_with(",5,28,3,2,1.05"));
    }
}
