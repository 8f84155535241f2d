//! Deterministic narrative generation and session stepping.
//!
//! Given a read-only [`ic_content::Repository`], a player's state and an
//! explicit seed, the engine generates or selects a narrative unit for the
//! player's place, applies the effects of the chosen option, and renders a
//! journal page. Every random decision flows from the caller's seed.

pub mod config;
pub mod effect;
pub mod engine;
pub mod error;
pub mod families;
pub mod generator;
pub mod intent;
pub mod journal;
pub mod picker;
pub mod selector;
pub mod session;
pub mod state;
pub mod store;

#[cfg(test)]
mod testing;

pub use config::EngineConfig;
pub use effect::apply;
pub use engine::{Command, Engine, Phase, StepDebug, StepResult};
pub use error::{EngineError, EngineResult};
pub use generator::generate;
pub use intent::match_intent;
pub use journal::{Frontmatter, JournalPage, PageContext, render};
pub use picker::{LocalityTier, Pick, pick};
pub use selector::{Offer, choose, generate_candidates, merge_with_authored, offer};
pub use session::{Session, play_turn};
pub use state::PlayerState;
pub use store::{MemoryStore, PlayerRecord, SessionStore};
