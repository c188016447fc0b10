//! Score and config storage
//!
//! Features:
//! - Plain JSON files (the leaderboard is a flat array of entries)
//! - Atomic writes (tmp → rename)
//! - A missing score file is an empty leaderboard, not an error
//!
//! The simulation never touches storage; the session driver hands finished
//! runs to a `ScoreStore`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::highscores::{HighScoreEntry, HighScores};

/// Failure reading or writing a stored file
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("stored data is malformed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Where finished runs are kept
pub trait ScoreStore {
    fn load(&self) -> Result<HighScores, StorageError>;
    fn save(&mut self, scores: &HighScores) -> Result<(), StorageError>;
}

/// Leaderboard stored as a JSON file
#[derive(Debug, Clone)]
pub struct ScoreFile {
    path: PathBuf,
}

impl ScoreFile {
    /// Default file name next to the working directory
    pub const DEFAULT_PATH: &'static str = "volcano_scores.json";

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ScoreStore for ScoreFile {
    fn load(&self) -> Result<HighScores, StorageError> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                log::info!("No score file at {}, starting fresh", self.path.display());
                return Ok(HighScores::new());
            }
            Err(err) => return Err(err.into()),
        };
        let entries: Vec<HighScoreEntry> = serde_json::from_str(&json)?;
        Ok(HighScores::from_entries(entries))
    }

    fn save(&mut self, scores: &HighScores) -> Result<(), StorageError> {
        write_atomic(&self.path, &serde_json::to_string_pretty(&scores.entries)?)?;
        log::info!(
            "High scores saved ({} entries) to {}",
            scores.entries.len(),
            self.path.display()
        );
        Ok(())
    }
}

/// Write through a sibling tmp file so a crash never leaves a half-written file
pub fn write_atomic(path: &Path, contents: &str) -> Result<(), StorageError> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
