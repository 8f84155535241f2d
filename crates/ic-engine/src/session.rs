//! Play sessions and the turn orchestration helper.

use chrono::{DateTime, Utc};
use ic_content::Repository;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::{Command, Engine, Phase, StepResult};
use crate::error::{EngineError, EngineResult};
use crate::state::PlayerState;
use crate::store::SessionStore;

/// One player's ongoing play context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Session id; also keys the stored state and journal.
    pub session_id: String,
    /// The owning player.
    pub player_id: String,
    /// The unit currently on offer, once one has been shown.
    #[serde(default)]
    pub current_unit_id: Option<String>,
    /// The seed that reproduces the current offer.
    pub offer_seed: u64,
    /// When the session began.
    pub started_at: DateTime<Utc>,
}

impl Session {
    /// Start a session for a known player at `place_id` and store the fresh
    /// state.
    pub fn begin(
        store: &mut impl SessionStore,
        repo: &Repository,
        player_id: &str,
        place_id: &str,
        seed: u64,
    ) -> EngineResult<Self> {
        if store.get_player(player_id)?.is_none() {
            return Err(EngineError::UnknownPlayer(player_id.to_string()));
        }
        repo.place(place_id)
            .map_err(|_| EngineError::UnknownPlace(place_id.to_string()))?;

        let session_id = Uuid::new_v4().to_string();
        store.upsert_state(&session_id, &PlayerState::new(&session_id, place_id))?;
        tracing::info!(session = %session_id, player = player_id, place = place_id, "session started");
        Ok(Self {
            session_id,
            player_id: player_id.to_string(),
            current_unit_id: None,
            offer_seed: seed,
            started_at: Utc::now(),
        })
    }

    /// Point the session at what a step now offers.
    pub fn advance(&mut self, result: &StepResult) {
        self.current_unit_id = Some(result.debug.unit_id.clone());
        self.offer_seed = result.debug.next_seed;
    }
}

/// Load state, step, and persist the outcome.
///
/// State and journal are written only after a successful resolved step, so a
/// failed step leaves the store untouched. The page is written before the
/// state.
pub fn play_turn(
    store: &mut impl SessionStore,
    session: &mut Session,
    repo: &Repository,
    engine: &Engine,
    command: Command,
    choice_id: Option<&str>,
) -> EngineResult<StepResult> {
    let state = store
        .get_state(&session.session_id)?
        .ok_or_else(|| EngineError::UnknownSession(session.session_id.clone()))?;
    let result = engine.step(&state, command, choice_id, repo, session.offer_seed)?;

    // The page goes first: a stored state never runs ahead of its journal.
    if result.debug.phase == Phase::Resolved {
        if let Some(page) = &result.journal_page {
            store.append_journal(&session.session_id, page)?;
        }
        store.upsert_state(&session.session_id, &result.new_state)?;
    }
    session.advance(&result);
    Ok(result)
}
