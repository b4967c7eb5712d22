//! Leaderboard model and backend abstraction
//!
//! Backends store entries in submission order; ranking happens on read so the
//! rank of an entry is always derived from its sorted position.

use crate::machine::SessionResult;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use thiserror::Error;

/// Number of entries shown on leaderboard screens
pub const TOP_ENTRIES: usize = 10;

/// One submitted score
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: u32,
    /// Seconds played
    pub time: u32,
    /// 1-based position, filled in on retrieval
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<usize>,
}

impl From<&SessionResult> for LeaderboardEntry {
    fn from(result: &SessionResult) -> Self {
        Self {
            name: result.name.clone(),
            score: result.score,
            time: result.time_secs,
            rank: None,
        }
    }
}

/// Result type for leaderboard operations
pub type LeaderboardResult<T> = Result<T, LeaderboardError>;

/// Errors that can occur during leaderboard operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LeaderboardError {
    #[error("network error: {0}")]
    Network(String),
    #[error("server error: {0}")]
    Server(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("leaderboard unavailable")]
    Unavailable,
}

/// Trait for leaderboard backends
pub trait LeaderboardBackend: Send + Sync {
    /// Record a finished session
    fn submit(&self, entry: LeaderboardEntry) -> LeaderboardResult<()>;

    /// Best `limit` entries, score descending, ties in submission order
    fn fetch_top(&self, limit: usize) -> LeaderboardResult<Vec<LeaderboardEntry>>;

    /// Whether a name is already on the board, ignoring case
    fn name_exists(&self, name: &str) -> LeaderboardResult<bool>;

    fn is_available(&self) -> bool;

    /// Backend name for display
    fn backend_name(&self) -> &'static str;
}

/// Sort entries by score (stable, so ties keep submission order), keep the
/// first `limit` and number them from 1
pub fn rank_entries(mut entries: Vec<LeaderboardEntry>, limit: usize) -> Vec<LeaderboardEntry> {
    entries.sort_by(|a, b| b.score.cmp(&a.score));
    entries.truncate(limit);
    for (i, entry) in entries.iter_mut().enumerate() {
        entry.rank = Some(i + 1);
    }
    entries
}

/// Case-insensitive name comparison used by every backend
pub fn same_name(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

/// In-memory leaderboard, used for tests and as a session-local board
#[derive(Debug)]
pub struct MemoryLeaderboard {
    entries: Mutex<Vec<LeaderboardEntry>>,
    available: Mutex<bool>,
}

impl MemoryLeaderboard {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            available: Mutex::new(true),
        }
    }

    /// Board pre-filled with entries in the given submission order
    pub fn with_entries(entries: Vec<LeaderboardEntry>) -> Self {
        Self {
            entries: Mutex::new(entries),
            available: Mutex::new(true),
        }
    }

    /// Set whether the backend should report as available
    pub fn set_available(&self, available: bool) {
        if let Ok(mut flag) = self.available.lock() {
            *flag = available;
        }
    }

    /// Replace all entries
    pub fn set_entries(&self, entries: Vec<LeaderboardEntry>) {
        if let Ok(mut data) = self.entries.lock() {
            *data = entries;
        }
    }

    pub fn count(&self) -> usize {
        self.entries.lock().map(|data| data.len()).unwrap_or(0)
    }

    fn guard(&self) -> LeaderboardResult<std::sync::MutexGuard<'_, Vec<LeaderboardEntry>>> {
        if !self.is_available() {
            return Err(LeaderboardError::Unavailable);
        }
        self.entries
            .lock()
            .map_err(|e| LeaderboardError::Storage(e.to_string()))
    }
}

impl Default for MemoryLeaderboard {
    fn default() -> Self {
        Self::new()
    }
}

impl LeaderboardBackend for MemoryLeaderboard {
    fn submit(&self, entry: LeaderboardEntry) -> LeaderboardResult<()> {
        self.guard()?.push(LeaderboardEntry { rank: None, ..entry });
        Ok(())
    }

    fn fetch_top(&self, limit: usize) -> LeaderboardResult<Vec<LeaderboardEntry>> {
        let entries = self.guard()?.clone();
        Ok(rank_entries(entries, limit))
    }

    fn name_exists(&self, name: &str) -> LeaderboardResult<bool> {
        Ok(self.guard()?.iter().any(|e| same_name(&e.name, name)))
    }

    fn is_available(&self) -> bool {
        self.available.lock().map(|flag| *flag).unwrap_or(false)
    }

    fn backend_name(&self) -> &'static str {
        "Memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::GameOverReason;

    fn entry(name: &str, score: u32, time: u32) -> LeaderboardEntry {
        LeaderboardEntry {
            name: name.to_string(),
            score,
            time,
            rank: None,
        }
    }

    #[test]
    fn test_top_is_sorted_with_stable_ties() {
        let board = MemoryLeaderboard::new();
        board.submit(entry("Luka", 21, 60)).unwrap();
        board.submit(entry("Ana", 36, 60)).unwrap();
        board.submit(entry("Mari", 25, 60)).unwrap();
        board.submit(entry("Irakli", 25, 41)).unwrap();

        let top = board.fetch_top(10).unwrap();
        let names: Vec<&str> = top.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["Ana", "Mari", "Irakli", "Luka"]);
        let ranks: Vec<usize> = top.iter().filter_map(|e| e.rank).collect();
        assert_eq!(ranks, [1, 2, 3, 4]);
    }

    #[test]
    fn test_top_respects_limit() {
        let entries = (0..15).map(|i| entry(&format!("p{}", i), i, 60)).collect();
        let board = MemoryLeaderboard::with_entries(entries);
        let top = board.fetch_top(TOP_ENTRIES).unwrap();
        assert_eq!(top.len(), TOP_ENTRIES);
        assert_eq!(top[0].score, 14);
        assert_eq!(top[9].score, 5);
        assert_eq!(board.count(), 15);
    }

    #[test]
    fn test_submitted_rank_is_ignored() {
        let board = MemoryLeaderboard::new();
        board
            .submit(LeaderboardEntry {
                rank: Some(1),
                ..entry("Ana", 1, 2)
            })
            .unwrap();
        board.submit(entry("Giorgi", 5, 2)).unwrap();
        let top = board.fetch_top(2).unwrap();
        assert_eq!(top[0].name, "Giorgi");
        assert_eq!(top[1].rank, Some(2));
    }

    #[test]
    fn test_name_exists_ignores_case() {
        let board = MemoryLeaderboard::new();
        board.submit(entry("Mari", 25, 60)).unwrap();
        assert!(board.name_exists("MARI").unwrap());
        assert!(board.name_exists(" mari ").unwrap());
        assert!(!board.name_exists("Maria").unwrap());
    }

    #[test]
    fn test_unavailable_backend_errors() {
        let board = MemoryLeaderboard::new();
        board.set_available(false);
        assert!(!board.is_available());
        assert_eq!(
            board.submit(entry("Ana", 1, 1)),
            Err(LeaderboardError::Unavailable)
        );
        assert!(board.fetch_top(10).is_err());
    }

    #[test]
    fn test_entry_from_session_result() {
        let result = SessionResult {
            name: "Ana".to_string(),
            score: 12,
            time_secs: 60,
            reason: GameOverReason::TimeUp,
        };
        assert_eq!(LeaderboardEntry::from(&result), entry("Ana", 12, 60));
    }

    #[test]
    fn test_entry_json_omits_missing_rank() {
        let json = serde_json::to_string(&entry("Ana", 3, 9)).unwrap();
        assert_eq!(json, r#"{"name":"Ana","score":3,"time":9}"#);
        let parsed: LeaderboardEntry =
            serde_json::from_str(r#"{"name":"Ana","score":3,"time":9,"rank":4}"#).unwrap();
        assert_eq!(parsed.rank, Some(4));
    }
}
