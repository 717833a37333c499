//! JSON persistence for the single game record.
//!
//! The store is the only writer: transitions run under its lock and the new
//! record is swapped in only after it reached disk, so two completions
//! racing (a battle ending while the day rolls over) are applied one after
//! the other against the latest state.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use super::data_dir;
use crate::error::{CoreError, Result};
use crate::events::Event;
use crate::game::streak::resolve_day;
use crate::game::{GameState, Transition};

/// State file name inside the data directory.
const STATE_FILE: &str = "game_state.json";

#[derive(Debug)]
pub struct StateStore {
    path: PathBuf,
    current: Mutex<GameState>,
}

impl StateStore {
    /// Open the store in the data directory.
    pub fn open() -> Result<Self> {
        Ok(Self::open_at(data_dir()?.join(STATE_FILE)))
    }

    /// Open the store in the data directory and settle the day boundary
    /// for `today` before anything else reads the record.
    ///
    /// Returns the day-boundary events; empty when `today` was already
    /// resolved.
    pub fn open_for(today: NaiveDate) -> Result<(Self, Vec<Event>)> {
        let store = Self::open()?;
        let events = store.settle_day(today)?;
        Ok((store, events))
    }

    /// Open the store at `path`. A missing or unreadable file yields a
    /// fresh record; this never fails.
    pub fn open_at(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let state = load_or_default(&path);
        Self {
            path,
            current: Mutex::new(state),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Copy of the current record.
    pub fn snapshot(&self) -> GameState {
        self.lock().clone()
    }

    /// Run `rule` against the current record and commit its result.
    ///
    /// A rejected rule leaves both memory and disk untouched. A rule that
    /// reports no events is not written.
    pub fn apply<F, E>(&self, rule: F) -> Result<Transition>
    where
        F: FnOnce(&GameState) -> std::result::Result<Transition, E>,
        E: Into<CoreError>,
    {
        let mut current = self.lock();
        let transition = rule(&current).map_err(Into::into)?;
        if transition.is_noop() {
            return Ok(transition);
        }
        write_state(&self.path, &transition.state)?;
        *current = transition.state.clone();
        debug!(events = transition.events.len(), "state committed");
        Ok(transition)
    }

    /// Roll the record forward to `today`: streak, freezes, daily goals.
    pub fn settle_day(&self, today: NaiveDate) -> Result<Vec<Event>> {
        let t = self.apply(|s| Ok::<_, CoreError>(resolve_day(s, today)))?;
        if !t.is_noop() {
            info!(%today, events = t.events.len(), "day boundary resolved");
        }
        Ok(t.events)
    }

    /// Overwrite the record outright.
    pub fn replace(&self, state: GameState) -> Result<()> {
        let mut current = self.lock();
        write_state(&self.path, &state)?;
        *current = state;
        info!(path = %self.path.display(), "state replaced");
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, GameState> {
        // The swap is a single assignment; a poisoned lock still holds a whole record.
        self.current.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn load_or_default(path: &Path) -> GameState {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!(path = %path.display(), "no saved state, starting fresh");
            return GameState::default();
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot read saved state, starting fresh");
            return GameState::default();
        }
    };
    match serde_json::from_str::<GameState>(&content) {
        Ok(state) => state.normalized(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "saved state is corrupt, starting fresh");
            GameState::default()
        }
    }
}

/// Write through a sibling temp file so a crash never truncates the record.
fn write_state(path: &Path, state: &GameState) -> Result<()> {
    let store_err = |message: String| CoreError::StoreWrite {
        path: path.to_path_buf(),
        message,
    };
    let content = serde_json::to_string_pretty(state)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, content).map_err(|e| store_err(e.to_string()))?;
    std::fs::rename(&tmp, path).map_err(|e| store_err(e.to_string()))?;
    Ok(())
}
