//! Durable local preferences: selected team and last-paint instant.
//!
//! SYSTEM CONTEXT
//! ==============
//! The cooldown must survive a process restart, so the last-paint instant is
//! written synchronously the moment a paint commits — before any network
//! submission. Team selection persists the same way so a returning
//! participant keeps their faction. Saves are best-effort: a failing disk
//! write is logged and the in-memory session continues.

#[cfg(test)]
#[path = "prefs_test.rs"]
mod prefs_test;

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};

use canvas::grid::Team;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Key-value persistence for the session's durable state. Read once at
/// startup, written synchronously on change.
pub trait PrefsStore: Send {
    /// The team persisted by a previous session, if any.
    fn load_team(&self) -> Option<Team>;
    /// Persist the selected team.
    fn save_team(&mut self, team: Team);
    /// The last-paint instant persisted by a previous session, epoch ms.
    fn load_last_paint_ms(&self) -> Option<i64>;
    /// Persist the last-paint instant, epoch ms.
    fn save_last_paint_ms(&mut self, at_ms: i64);
}

/// On-disk shape of the preferences file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct PrefsData {
    #[serde(skip_serializing_if = "Option::is_none")]
    selected_team: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_paint_ms: Option<i64>,
}

/// JSON-file-backed preferences.
pub struct FilePrefs {
    path: PathBuf,
    data: PrefsData,
}

impl FilePrefs {
    /// Open (or lazily create) the preferences file at `path`. A missing or
    /// unreadable file yields empty preferences.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let data = Self::read(&path);
        Self { path, data }
    }

    fn read(path: &Path) -> PrefsData {
        match fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(data) => data,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "preferences file unreadable; starting fresh");
                    PrefsData::default()
                }
            },
            Err(_) => PrefsData::default(),
        }
    }

    fn write_out(&self) {
        let raw = match serde_json::to_string_pretty(&self.data) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(error = %err, "could not encode preferences");
                return;
            }
        };
        if let Err(err) = fs::write(&self.path, raw) {
            warn!(path = %self.path.display(), error = %err, "could not persist preferences");
        }
    }
}

impl PrefsStore for FilePrefs {
    fn load_team(&self) -> Option<Team> {
        parse_team(self.data.selected_team.as_deref())
    }

    fn save_team(&mut self, team: Team) {
        self.data.selected_team = Some(team.as_str().to_owned());
        self.write_out();
    }

    fn load_last_paint_ms(&self) -> Option<i64> {
        self.data.last_paint_ms
    }

    fn save_last_paint_ms(&mut self, at_ms: i64) {
        self.data.last_paint_ms = Some(at_ms);
        self.write_out();
    }
}

/// In-memory preferences with a shared backing store, for tests and
/// ephemeral sessions. Clones observe each other's writes.
#[derive(Clone, Default)]
pub struct MemoryPrefs {
    data: Arc<Mutex<PrefsData>>,
}

impl MemoryPrefs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, PrefsData> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PrefsStore for MemoryPrefs {
    fn load_team(&self) -> Option<Team> {
        parse_team(self.lock().selected_team.as_deref())
    }

    fn save_team(&mut self, team: Team) {
        self.lock().selected_team = Some(team.as_str().to_owned());
    }

    fn load_last_paint_ms(&self) -> Option<i64> {
        self.lock().last_paint_ms
    }

    fn save_last_paint_ms(&mut self, at_ms: i64) {
        self.lock().last_paint_ms = Some(at_ms);
    }
}

fn parse_team(raw: Option<&str>) -> Option<Team> {
    let raw = raw?;
    match Team::from_str(raw) {
        Ok(team) => Some(team),
        Err(err) => {
            warn!(%err, "ignoring persisted team");
            None
        }
    }
}
