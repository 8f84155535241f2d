//! The session engine.
//!
//! Each step is either OFFERING (show the unit for the current place, state
//! untouched) or RESOLVED (apply the chosen option, render the page, and
//! offer the next unit). The engine holds no per-player state; callers pass
//! the state in and persist what comes back.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, Utc};
use ic_content::{ChoiceView, NarrativeUnit, Repository};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::effect::apply;
use crate::error::{EngineError, EngineResult};
use crate::journal::{JournalPage, PageContext, render};
use crate::picker::{LocalityTier, Pick, pick_with_tier};
use crate::selector::{Offer, offer};
use crate::state::PlayerState;

/// Mixed into a step seed to derive the seeds used after a resolved step.
const NEXT_SEED_SALT: u64 = 0x9e37_79b9_7f4a_7c15;

/// A player command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    /// Arrive at a place.
    Enter,
    /// Look again without choosing.
    Continue,
    /// Pick one of the offered choices.
    Choose,
}

impl Command {
    /// The phase this command leads to.
    pub fn phase(self) -> Phase {
        match self {
            Self::Enter | Self::Continue => Phase::Offering,
            Self::Choose => Phase::Resolved,
        }
    }
}

impl FromStr for Command {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "enter" => Ok(Self::Enter),
            "continue" => Ok(Self::Continue),
            "choose" | "choose option" | "choose_option" => Ok(Self::Choose),
            other => Err(EngineError::UnknownCommand(other.to_string())),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enter => write!(f, "enter"),
            Self::Continue => write!(f, "continue"),
            Self::Choose => write!(f, "choose"),
        }
    }
}

/// Which half of a turn a step produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Choices presented; state unchanged.
    Offering,
    /// A choice applied and a page rendered.
    Resolved,
}

/// Diagnostics for one step. Never shown to players.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepDebug {
    /// The seed the step was called with.
    pub seed: u64,
    /// Which half of the turn ran.
    pub phase: Phase,
    /// The unit whose choices are now on offer.
    pub unit_id: String,
    /// How many units were eligible for that offer.
    pub eligible_count: usize,
    /// The seed to pass on the next step.
    pub next_seed: u64,
    /// The choice applied, on a resolved step.
    pub applied_choice: Option<String>,
    /// The locality tier ingredients came from, on a resolved step.
    pub ingredient_tier: Option<LocalityTier>,
    /// Free-form notes.
    pub notes: Vec<String>,
}

/// Everything a step produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    /// The rendered page, or a peek page while offering.
    pub journal_page: Option<JournalPage>,
    /// The unit now on offer.
    pub unit: NarrativeUnit,
    /// Its three choices.
    pub choices: Vec<ChoiceView>,
    /// The state after the step; equal to the input while offering.
    pub new_state: PlayerState,
    /// Diagnostics.
    pub debug: StepDebug,
}

/// The turn processor.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    /// Create an engine with the given configuration.
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// The engine's configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The seed that follows `seed` after a resolved step.
    pub fn next_seed(seed: u64) -> u64 {
        StdRng::seed_from_u64(seed ^ NEXT_SEED_SALT).random()
    }

    /// Process one turn.
    ///
    /// The offer is a pure function of `(state, seed)`, so a choose step
    /// must be called with the same state and seed that produced the offer
    /// it answers. On any error nothing is returned and the caller's state
    /// stays as it was.
    pub fn step(
        &self,
        state: &PlayerState,
        command: Command,
        choice_id: Option<&str>,
        repo: &Repository,
        seed: u64,
    ) -> EngineResult<StepResult> {
        match command.phase() {
            Phase::Offering => self.offering(state, repo, seed),
            Phase::Resolved => {
                let choice_id = choice_id
                    .ok_or_else(|| EngineError::InvalidAction("no choice id given".to_string()))?;
                self.resolve(state, choice_id, repo, seed)
            }
        }
    }

    /// The unit a step with this state and seed would offer.
    pub fn current_offer(
        &self,
        state: &PlayerState,
        repo: &Repository,
        seed: u64,
    ) -> EngineResult<Offer> {
        offer(state, repo, seed, self.config.candidates_per_offer)
    }

    fn offering(
        &self,
        state: &PlayerState,
        repo: &Repository,
        seed: u64,
    ) -> EngineResult<StepResult> {
        let Offer {
            unit,
            eligible_count,
        } = self.current_offer(state, repo, seed)?;
        let mut notes = Vec::new();

        let ctx = PageContext {
            date: self.journal_date(),
            choice: None,
        };
        let peek = match render(
            &unit.place_id,
            unit.entry_type,
            &unit,
            state,
            repo,
            &[],
            &ctx,
        ) {
            Ok(page) => Some(page),
            Err(EngineError::MissingTemplate(entry_type)) => {
                notes.push(format!("no peek page: no template for {entry_type}"));
                None
            }
            Err(e) => return Err(e),
        };

        Ok(StepResult {
            journal_page: peek,
            choices: unit.choice_views(),
            new_state: state.clone(),
            debug: StepDebug {
                seed,
                phase: Phase::Offering,
                unit_id: unit.unit_id.clone(),
                eligible_count,
                next_seed: seed,
                applied_choice: None,
                ingredient_tier: None,
                notes,
            },
            unit,
        })
    }

    fn resolve(
        &self,
        state: &PlayerState,
        choice_id: &str,
        repo: &Repository,
        seed: u64,
    ) -> EngineResult<StepResult> {
        let current = self.current_offer(state, repo, seed)?.unit;
        let choice = current.choice(choice_id).ok_or_else(|| {
            EngineError::InvalidAction(format!(
                "\"{choice_id}\" is not one of the offered choices"
            ))
        })?;

        let mut new_state = apply(state, &choice.effects)?;
        repo.place(&new_state.current_place_id)
            .map_err(|_| EngineError::UnknownPlace(new_state.current_place_id.clone()))?;
        new_state.time_tick += 1;

        let mut rng = StdRng::seed_from_u64(seed ^ NEXT_SEED_SALT);
        let next_seed: u64 = rng.random();
        let pick_seed: u64 = rng.random();

        // Ingredients come from where the unit took place, before any move.
        let picks = self.pick_ingredients(state, repo, &current, pick_seed)?;
        let ctx = PageContext {
            date: self.journal_date(),
            choice: Some(choice.label.clone()),
        };
        let page = render(
            &current.place_id,
            current.entry_type,
            &current,
            &new_state,
            repo,
            &picks.item_ids,
            &ctx,
        )?;

        let next = self.current_offer(&new_state, repo, next_seed)?;
        tracing::info!(
            session = %state.session_id,
            unit = %current.unit_id,
            choice = choice_id,
            place = %new_state.current_place_id,
            tick = new_state.time_tick,
            "step resolved"
        );

        Ok(StepResult {
            journal_page: Some(page),
            choices: next.unit.choice_views(),
            new_state,
            debug: StepDebug {
                seed,
                phase: Phase::Resolved,
                unit_id: next.unit.unit_id.clone(),
                eligible_count: next.eligible_count,
                next_seed,
                applied_choice: Some(choice_id.to_string()),
                ingredient_tier: Some(picks.tier),
                notes: vec![format!("resolved {}", current.unit_id)],
            },
            unit: next.unit,
        })
    }

    /// Pick page ingredients, settling for fewer when the pool is small.
    fn pick_ingredients(
        &self,
        state: &PlayerState,
        repo: &Repository,
        unit: &NarrativeUnit,
        seed: u64,
    ) -> EngineResult<Pick> {
        let mut at_place = state.clone();
        at_place.current_place_id = unit.place_id.clone();
        let n = self.config.ingredients_per_page;
        match pick_with_tier(&at_place, repo, unit.entry_type, n, Some(seed)) {
            Err(EngineError::InsufficientContent { available, .. }) => {
                tracing::debug!(requested = n, available, "ingredient pool is small");
                pick_with_tier(&at_place, repo, unit.entry_type, available, Some(seed))
            }
            other => other,
        }
    }

    fn journal_date(&self) -> NaiveDate {
        self.config
            .journal_date
            .unwrap_or_else(|| Utc::now().date_naive())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_repo;
    use ic_content::Effect;

    fn engine() -> Engine {
        Engine::new(
            EngineConfig::default()
                .with_journal_date(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()),
        )
    }

    #[test]
    fn command_parsing() {
        assert_eq!("enter".parse::<Command>().unwrap(), Command::Enter);
        assert_eq!("Choose Option".parse::<Command>().unwrap(), Command::Choose);
        assert!(matches!(
            "dance".parse::<Command>(),
            Err(EngineError::UnknownCommand(_))
        ));
    }

    #[test]
    fn offering_leaves_state_unchanged() {
        let repo = sample_repo();
        let state = PlayerState::new("s", "cottage_home");
        let result = engine()
            .step(&state, Command::Enter, None, &repo, 42)
            .unwrap();
        assert_eq!(result.new_state, state);
        assert_eq!(result.choices.len(), 3);
        assert_eq!(result.debug.phase, Phase::Offering);
        assert_eq!(result.debug.next_seed, 42);
        assert!(result.journal_page.is_some());
    }

    #[test]
    fn continue_offers_the_same_unit_as_enter() {
        let repo = sample_repo();
        let state = PlayerState::new("s", "cottage_home");
        let e = engine();
        let a = e.step(&state, Command::Enter, None, &repo, 8).unwrap();
        let b = e.step(&state, Command::Continue, None, &repo, 8).unwrap();
        assert_eq!(a.unit, b.unit);
    }

    #[test]
    fn peek_is_skipped_without_a_template() {
        let mut set = crate::testing::sample_set();
        set.templates.retain(|t| t.entry_type != ic_content::EntryType::Spell);
        let repo = crate::testing::repo_with(set);
        let state = PlayerState::new("s", "shrine_of_dawn");
        let result = engine()
            .step(&state, Command::Enter, None, &repo, 1)
            .unwrap();
        assert!(result.journal_page.is_none());
        assert!(result.debug.notes[0].contains("no template"));
    }

    #[test]
    fn choose_applies_effects_and_renders() {
        let repo = sample_repo();
        let state = PlayerState::new("s", "cottage_home");
        let e = engine();
        let offered = e.step(&state, Command::Enter, None, &repo, 3).unwrap();
        let chosen = offered.unit.choice("1").unwrap().clone();

        let result = e
            .step(&state, Command::Choose, Some("1"), &repo, 3)
            .unwrap();
        let expected = apply(&state, &chosen.effects).unwrap();
        assert_eq!(result.new_state.inventory, expected.inventory);
        assert_eq!(result.new_state.flags, expected.flags);
        assert_eq!(result.new_state.time_tick, 1);
        assert_eq!(result.debug.phase, Phase::Resolved);
        assert_eq!(result.debug.applied_choice.as_deref(), Some("1"));
        assert_eq!(result.debug.next_seed, Engine::next_seed(3));

        let page = result.journal_page.unwrap();
        assert_eq!(page.frontmatter.place_id, offered.unit.place_id);
        assert_eq!(page.frontmatter.unit_id.as_deref(), Some(offered.unit.unit_id.as_str()));
        assert!(page.frontmatter.page_id.ends_with("_20260301_1"));
    }

    #[test]
    fn next_offer_is_for_the_new_place() {
        let repo = sample_repo();
        let e = engine();
        let state = PlayerState::new("s", "cottage_home");
        // Find a seed whose offer includes a move.
        let (seed, choice_id, dest) = (0..512)
            .find_map(|seed| {
                let unit = e.current_offer(&state, &repo, seed).unwrap().unit;
                unit.choices.iter().find_map(|c| {
                    c.effects.iter().find_map(|eff| match eff {
                        Effect::MoveTo(dest) => {
                            Some((seed, c.choice_id.clone(), dest.clone()))
                        }
                        _ => None,
                    })
                })
            })
            .unwrap();
        let result = e
            .step(&state, Command::Choose, Some(choice_id.as_str()), &repo, seed)
            .unwrap();
        assert_eq!(result.new_state.current_place_id, dest);
        assert_eq!(result.unit.place_id, dest);
    }

    #[test]
    fn invalid_choice_is_rejected() {
        let repo = sample_repo();
        let state = PlayerState::new("s", "cottage_home");
        let err = engine()
            .step(&state, Command::Choose, Some("4"), &repo, 3)
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidAction(_)));
        assert!(err.is_client_error());

        let err = engine()
            .step(&state, Command::Choose, None, &repo, 3)
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidAction(_)));
    }

    #[test]
    fn unknown_place_is_a_client_error() {
        let repo = sample_repo();
        let state = PlayerState::new("s", "attic");
        let err = engine()
            .step(&state, Command::Enter, None, &repo, 3)
            .unwrap_err();
        assert!(matches!(err, EngineError::UnknownPlace(_)));
    }

    #[test]
    fn steps_are_reproducible() {
        let repo = sample_repo();
        let state = PlayerState::new("s", "cottage_garden");
        let e = engine();
        let a = e.step(&state, Command::Choose, Some("2"), &repo, 77).unwrap();
        let b = e.step(&state, Command::Choose, Some("2"), &repo, 77).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn a_walk_of_many_turns_never_goes_negative() {
        let repo = sample_repo();
        let e = engine();
        let mut state = PlayerState::new("s", "cottage_home");
        let mut seed = 1;
        for turn in 0..40 {
            let choice = ["1", "2", "3"][turn % 3];
            let result = e
                .step(&state, Command::Choose, Some(choice), &repo, seed)
                .unwrap();
            state = result.new_state;
            seed = result.debug.next_seed;
        }
        assert_eq!(state.time_tick, 40);
        assert!(repo.place(&state.current_place_id).is_ok());
    }
}
