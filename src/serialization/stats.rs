use std::fs;
use std::io;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use super::SerializationError;

/// Statistics kept across sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Stats {
    pub best_score: u64,
}

impl Stats {
    /// Raise the best score to `score` if it is higher; returns the best score.
    pub fn evaluate(&mut self, score: u64) -> u64 {
        self.best_score = self.best_score.max(score);
        self.best_score
    }
}

pub fn write_stats<P: AsRef<Path>>(path: P, stats: &Stats) -> Result<(), SerializationError> {
    let path = path.as_ref();
    fs::write(path, serde_json::to_vec_pretty(stats)?)?;
    debug!("saved stats to {}", path.display());
    Ok(())
}

/// `Ok(None)` when there is no stats file yet.
pub fn read_stats<P: AsRef<Path>>(path: P) -> Result<Option<Stats>, SerializationError> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}
