//! Selector: merges authored units with generated candidates and picks one.

use ic_content::{NarrativeUnit, Repository};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::generator::generate;
use crate::state::PlayerState;

/// Generate `n` candidates from sub-seeds of one seeded generator.
///
/// A candidate that fails schema validation is dropped with a warning; any
/// other error aborts.
pub fn generate_candidates(
    state: &PlayerState,
    repo: &Repository,
    seed: u64,
    n: usize,
) -> EngineResult<Vec<NarrativeUnit>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut out = Vec::with_capacity(n);
    for _ in 0..n {
        let sub_seed: u64 = rng.random();
        match generate(state, repo, sub_seed) {
            Ok(unit) => out.push(unit),
            Err(EngineError::SchemaValidation(violation)) => {
                tracing::warn!(sub_seed, %violation, "generated candidate rejected");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(out)
}

/// Authored units first, then generated candidates.
pub fn merge_with_authored(
    candidates: Vec<NarrativeUnit>,
    authored: Vec<NarrativeUnit>,
) -> Vec<NarrativeUnit> {
    let mut merged = authored;
    merged.extend(candidates);
    merged
}

/// Pick one unit uniformly with a seeded generator.
pub fn choose(units: &[NarrativeUnit], seed: u64) -> EngineResult<&NarrativeUnit> {
    if units.is_empty() {
        return Err(EngineError::NoEligibleContent(
            "no narrative units to choose from".to_string(),
        ));
    }
    let mut rng = StdRng::seed_from_u64(seed);
    Ok(&units[rng.random_range(0..units.len())])
}

/// The unit offered to a player for one OFFERING step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    /// The selected unit.
    pub unit: NarrativeUnit,
    /// How many units were eligible.
    pub eligible_count: usize,
}

/// Build the offer for the player's current place.
///
/// A pure function of `(state, repository, seed)`, so a later choose step
/// can re-derive exactly what was shown.
pub fn offer(
    state: &PlayerState,
    repo: &Repository,
    seed: u64,
    candidates: usize,
) -> EngineResult<Offer> {
    let mut rng = StdRng::seed_from_u64(seed);
    let candidate_seed: u64 = rng.random();
    let choose_seed: u64 = rng.random();

    let generated = generate_candidates(state, repo, candidate_seed, candidates)?;
    let authored: Vec<NarrativeUnit> = repo
        .units_for_place(&state.current_place_id)
        .cloned()
        .collect();
    let merged = merge_with_authored(generated, authored);
    let unit = choose(&merged, choose_seed)?.clone();

    tracing::debug!(
        place = %state.current_place_id,
        eligible = merged.len(),
        unit = %unit.unit_id,
        "unit selected"
    );
    Ok(Offer {
        unit,
        eligible_count: merged.len(),
    })
}
