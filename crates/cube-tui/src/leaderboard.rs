//! Leaderboard backends for the terminal build
//!
//! Supports different backends based on environment:
//! - Local: File-based storage in the user's data directory
//! - Test: In-memory board that forgets everything on exit

use cube_core::{
    rank_entries, same_name, LeaderboardBackend, LeaderboardEntry, LeaderboardError,
    LeaderboardResult, MemoryLeaderboard, ScoreSink, SessionResult, TOP_ENTRIES,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Environment configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// File-based storage
    Local,
    /// In-memory board
    Test,
}

impl Environment {
    /// Detect environment from the CUBE_ENV variable
    pub fn detect() -> Self {
        Self::from_name(std::env::var("CUBE_ENV").ok().as_deref())
    }

    fn from_name(name: Option<&str>) -> Self {
        match name {
            Some("test") | Some("testing") | Some("memory") => Environment::Test,
            _ => Environment::Local,
        }
    }
}

// ==================== Local File Backend ====================

/// File-based leaderboard
pub struct LocalLeaderboard {
    path: PathBuf,
    cache: Mutex<Option<LocalLeaderboardData>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LocalLeaderboardData {
    /// Submission order; ranking happens on read
    entries: Vec<LeaderboardEntry>,
}

/// Entries kept on disk
const MAX_STORED_ENTRIES: usize = 1000;

impl LocalLeaderboard {
    pub fn new() -> Self {
        let path = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("cube_game_leaderboard.json");
        Self::with_path(path)
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self {
            path,
            cache: Mutex::new(None),
        }
    }

    /// Lock the cached data, reading the file on first use. Holding the guard
    /// serializes every read-modify-write against the file.
    fn lock(&self) -> LeaderboardResult<MutexGuard<'_, Option<LocalLeaderboardData>>> {
        let mut cache = self
            .cache
            .lock()
            .map_err(|e| LeaderboardError::Storage(e.to_string()))?;
        if cache.is_none() {
            *cache = Some(self.read_file());
        }
        Ok(cache)
    }

    fn read_file(&self) -> LocalLeaderboardData {
        match std::fs::read_to_string(&self.path) {
            Ok(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
                log::warn!("ignoring unreadable leaderboard {}: {}", self.path.display(), e);
                LocalLeaderboardData::default()
            }),
            Err(_) => LocalLeaderboardData::default(),
        }
    }

    fn write_file(&self, data: &LocalLeaderboardData) -> LeaderboardResult<()> {
        let json = serde_json::to_string_pretty(data)
            .map_err(|e| LeaderboardError::Storage(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| LeaderboardError::Storage(e.to_string()))?;
        }
        std::fs::write(&self.path, json).map_err(|e| LeaderboardError::Storage(e.to_string()))
    }
}

impl Default for LocalLeaderboard {
    fn default() -> Self {
        Self::new()
    }
}

impl LeaderboardBackend for LocalLeaderboard {
    fn submit(&self, entry: LeaderboardEntry) -> LeaderboardResult<()> {
        let mut cache = self.lock()?;
        let mut data = cache.clone().unwrap_or_default();
        data.entries.push(LeaderboardEntry { rank: None, ..entry });

        // Drop the weakest entries once the file grows too large
        if data.entries.len() > MAX_STORED_ENTRIES {
            let keep = rank_entries(data.entries, MAX_STORED_ENTRIES);
            data.entries = keep
                .into_iter()
                .map(|e| LeaderboardEntry { rank: None, ..e })
                .collect();
        }

        self.write_file(&data)?;
        *cache = Some(data);
        Ok(())
    }

    fn fetch_top(&self, limit: usize) -> LeaderboardResult<Vec<LeaderboardEntry>> {
        let cache = self.lock()?;
        let entries = cache.as_ref().map(|d| d.entries.clone()).unwrap_or_default();
        Ok(rank_entries(entries, limit))
    }

    fn name_exists(&self, name: &str) -> LeaderboardResult<bool> {
        let cache = self.lock()?;
        Ok(cache
            .as_ref()
            .is_some_and(|d| d.entries.iter().any(|e| same_name(&e.name, name))))
    }

    fn is_available(&self) -> bool {
        true
    }

    fn backend_name(&self) -> &'static str {
        "Local"
    }
}

// ==================== Backend Factory ====================

/// Create the appropriate backend based on environment
pub fn create_backend(env: Environment) -> Arc<dyn LeaderboardBackend> {
    match env {
        Environment::Local => Arc::new(LocalLeaderboard::new()),
        Environment::Test => Arc::new(MemoryLeaderboard::new()),
    }
}

// ==================== Leaderboard Manager ====================

/// Leaderboard with a fallback backend and a short-lived top-list cache
pub struct LeaderboardManager {
    primary: Arc<dyn LeaderboardBackend>,
    fallback: Option<Arc<dyn LeaderboardBackend>>,
    cache: Mutex<LeaderboardCache>,
}

impl std::fmt::Debug for LeaderboardManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LeaderboardManager")
            .field("primary", &self.primary.backend_name())
            .field("fallback", &self.fallback.as_ref().map(|f| f.backend_name()))
            .finish()
    }
}

#[derive(Debug)]
struct LeaderboardCache {
    /// Top list, the limit it was fetched with, and when
    entries: Option<(Vec<LeaderboardEntry>, usize, Instant)>,
    ttl: Duration,
}

impl LeaderboardCache {
    fn new(ttl: Duration) -> Self {
        Self { entries: None, ttl }
    }

    fn get(&self, limit: usize) -> Option<Vec<LeaderboardEntry>> {
        self.entries.as_ref().and_then(|(entries, fetched, time)| {
            (time.elapsed() < self.ttl && limit <= *fetched)
                .then(|| entries.iter().take(limit).cloned().collect())
        })
    }

    fn set(&mut self, entries: Vec<LeaderboardEntry>, limit: usize) {
        self.entries = Some((entries, limit, Instant::now()));
    }

    fn invalidate(&mut self) {
        self.entries = None;
    }
}

impl LeaderboardManager {
    /// Create a new manager with the given primary backend
    pub fn new(primary: Arc<dyn LeaderboardBackend>) -> Self {
        Self {
            primary,
            fallback: None,
            cache: Mutex::new(LeaderboardCache::new(Duration::from_secs(60))),
        }
    }

    /// Create with automatic environment detection.
    ///
    /// The file-backed board gets an in-memory fallback that keeps scores
    /// which could not be written to disk.
    pub fn auto() -> Self {
        let env = Environment::detect();
        log::info!("leaderboard environment: {:?}", env);
        let manager = Self::new(create_backend(env));
        match env {
            Environment::Local => manager.with_fallback(Arc::new(MemoryLeaderboard::new())),
            Environment::Test => manager,
        }
    }

    /// Set a fallback backend
    pub fn with_fallback(mut self, fallback: Arc<dyn LeaderboardBackend>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// The primary if available, else the fallback
    fn active_backend(&self) -> &Arc<dyn LeaderboardBackend> {
        if self.primary.is_available() {
            &self.primary
        } else if let Some(ref fallback) = self.fallback {
            fallback
        } else {
            &self.primary
        }
    }

    fn invalidate_cache(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.invalidate();
        }
    }

    /// Get backend status info
    pub fn status(&self) -> LeaderboardStatus {
        LeaderboardStatus {
            backend_name: self.active_backend().backend_name(),
            is_available: self.primary.is_available(),
            using_fallback: !self.primary.is_available() && self.fallback.is_some(),
        }
    }
}

impl LeaderboardBackend for LeaderboardManager {
    fn submit(&self, entry: LeaderboardEntry) -> LeaderboardResult<()> {
        let result = self.primary.submit(entry.clone());

        if let Err(ref err) = result {
            if let Some(ref fallback) = self.fallback {
                log::warn!(
                    "{} leaderboard rejected score ({}), storing in {}",
                    self.primary.backend_name(),
                    err,
                    fallback.backend_name()
                );
                if let Err(fallback_err) = fallback.submit(entry) {
                    log::warn!("fallback leaderboard failed too: {}", fallback_err);
                }
            }
        }

        self.invalidate_cache();
        result
    }

    fn fetch_top(&self, limit: usize) -> LeaderboardResult<Vec<LeaderboardEntry>> {
        if let Some(cached) = self.cache.lock().ok().and_then(|cache| cache.get(limit)) {
            return Ok(cached);
        }

        let entries = self.active_backend().fetch_top(limit)?;

        if let Ok(mut cache) = self.cache.lock() {
            cache.set(entries.clone(), limit);
        }
        Ok(entries)
    }

    fn name_exists(&self, name: &str) -> LeaderboardResult<bool> {
        self.active_backend().name_exists(name)
    }

    fn is_available(&self) -> bool {
        self.primary.is_available() || self.fallback.as_ref().is_some_and(|f| f.is_available())
    }

    fn backend_name(&self) -> &'static str {
        self.active_backend().backend_name()
    }
}

/// Status information about the leaderboard
#[derive(Debug, Clone)]
pub struct LeaderboardStatus {
    pub backend_name: &'static str,
    pub is_available: bool,
    pub using_fallback: bool,
}

// ==================== Score submission ====================

/// Submits finished sessions on a background thread and sends the refreshed
/// top list back to the UI. Failures are logged and never reach the player.
pub struct BackgroundSubmitter {
    leaderboard: Arc<LeaderboardManager>,
    refreshed: Sender<Vec<LeaderboardEntry>>,
}

impl BackgroundSubmitter {
    pub fn new(leaderboard: Arc<LeaderboardManager>, refreshed: Sender<Vec<LeaderboardEntry>>) -> Self {
        Self {
            leaderboard,
            refreshed,
        }
    }
}

impl ScoreSink for BackgroundSubmitter {
    fn submit(&self, result: &SessionResult) {
        let entry = LeaderboardEntry::from(result);
        let leaderboard = Arc::clone(&self.leaderboard);
        let refreshed = self.refreshed.clone();

        let spawned = std::thread::Builder::new()
            .name("score-submit".into())
            .spawn(move || {
                let name = entry.name.clone();
                let (score, time) = (entry.score, entry.time);
                match leaderboard.submit(entry) {
                    Ok(()) => log::info!("posted score: {} {} in {}s", name, score, time),
                    Err(e) => log::warn!("failed to add score to leaderboard: {}", e),
                }

                match leaderboard.fetch_top(TOP_ENTRIES) {
                    Ok(top) => {
                        match top.iter().find(|e| e.name == name && e.score == score && e.time == time) {
                            Some(e) => log::info!("{} is now rank #{}", name, e.rank.unwrap_or(0)),
                            None => log::info!("{} with score {} is not in the top list", name, score),
                        }
                        // the UI may already be gone
                        let _ = refreshed.send(top);
                    }
                    Err(e) => log::warn!("failed to refresh leaderboard: {}", e),
                }
            });

        if let Err(e) = spawned {
            log::warn!("could not start score submission: {}", e);
        }
    }
}
