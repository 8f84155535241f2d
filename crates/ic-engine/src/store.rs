//! The persistence boundary.
//!
//! The engine never touches storage itself. [`SessionStore`] is the narrow
//! interface an orchestration layer uses to load and save what a step
//! produced; [`MemoryStore`] is the reference implementation.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EngineResult;
use crate::journal::JournalPage;
use crate::state::PlayerState;

/// A player known to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    /// Unique player id.
    pub player_id: String,
    /// Name shown to others.
    pub display_name: String,
    /// Pronouns, if the player gave them.
    #[serde(default)]
    pub pronouns: Option<String>,
    /// When the player was created.
    pub created_at: DateTime<Utc>,
}

impl PlayerRecord {
    /// A new player with a random id.
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            player_id: Uuid::new_v4().to_string(),
            display_name: display_name.into(),
            pronouns: None,
            created_at: Utc::now(),
        }
    }

    /// Set pronouns.
    pub fn with_pronouns(mut self, pronouns: impl Into<String>) -> Self {
        self.pronouns = Some(pronouns.into());
        self
    }
}

/// Key-value storage for player state, journals and players.
///
/// Writes for one session must be serialized by the caller.
pub trait SessionStore {
    /// The stored state of a session.
    fn get_state(&self, session_id: &str) -> EngineResult<Option<PlayerState>>;
    /// Insert or replace the state of a session.
    fn upsert_state(&mut self, session_id: &str, state: &PlayerState) -> EngineResult<()>;
    /// Append a page to a session's journal.
    fn append_journal(&mut self, session_id: &str, page: &JournalPage) -> EngineResult<()>;
    /// A session's journal, oldest first.
    fn list_journal(&self, session_id: &str) -> EngineResult<Vec<JournalPage>>;
    /// A player record.
    fn get_player(&self, player_id: &str) -> EngineResult<Option<PlayerRecord>>;
}

/// An in-memory store. Serializable, so it doubles as a save file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryStore {
    #[serde(default)]
    states: BTreeMap<String, PlayerState>,
    #[serde(default)]
    journals: BTreeMap<String, Vec<JournalPage>>,
    #[serde(default)]
    players: BTreeMap<String, PlayerRecord>,
}

impl MemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a player record.
    pub fn insert_player(&mut self, player: PlayerRecord) {
        self.players.insert(player.player_id.clone(), player);
    }

    /// Number of sessions with stored state.
    pub fn session_count(&self) -> usize {
        self.states.len()
    }
}

impl SessionStore for MemoryStore {
    fn get_state(&self, session_id: &str) -> EngineResult<Option<PlayerState>> {
        Ok(self.states.get(session_id).cloned())
    }

    fn upsert_state(&mut self, session_id: &str, state: &PlayerState) -> EngineResult<()> {
        self.states.insert(session_id.to_string(), state.clone());
        Ok(())
    }

    fn append_journal(&mut self, session_id: &str, page: &JournalPage) -> EngineResult<()> {
        self.journals
            .entry(session_id.to_string())
            .or_default()
            .push(page.clone());
        Ok(())
    }

    fn list_journal(&self, session_id: &str) -> EngineResult<Vec<JournalPage>> {
        Ok(self.journals.get(session_id).cloned().unwrap_or_default())
    }

    fn get_player(&self, player_id: &str) -> EngineResult<Option<PlayerRecord>> {
        Ok(self.players.get(player_id).cloned())
    }
}
