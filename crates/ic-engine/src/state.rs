//! Persistent per-player state.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// What the engine knows about one player between steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    /// The session this state belongs to.
    pub session_id: String,
    /// Where the player is.
    pub current_place_id: String,
    /// Item counts. Zero counts are kept once an item has been held.
    #[serde(default)]
    pub inventory: BTreeMap<String, u32>,
    /// Set flags.
    #[serde(default)]
    pub flags: BTreeSet<String>,
    /// Resolved steps so far.
    #[serde(default)]
    pub time_tick: u64,
}

impl PlayerState {
    /// A fresh state at `place_id`.
    pub fn new(session_id: impl Into<String>, place_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            current_place_id: place_id.into(),
            inventory: BTreeMap::new(),
            flags: BTreeSet::new(),
            time_tick: 0,
        }
    }

    /// The held count of an item.
    pub fn count(&self, item_id: &str) -> u32 {
        self.inventory.get(item_id).copied().unwrap_or(0)
    }

    /// Items with a positive count, in id order.
    pub fn held_items(&self) -> impl Iterator<Item = &str> {
        self.inventory
            .iter()
            .filter(|(_, n)| **n > 0)
            .map(|(id, _)| id.as_str())
    }

    /// Whether a flag is set.
    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.contains(flag)
    }
}
