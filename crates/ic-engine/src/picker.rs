//! Ingredient locality picker.
//!
//! Picks item ids relevant to the player's place, preferring strict locality
//! and widening one tier at a time: the same place, then the same zone, then
//! the whole item pool. Never widens past the whole pool.

use std::fmt;

use ic_content::{EntryType, Item, OriginScope, Repository};
use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::state::PlayerState;

/// A locality tier, narrowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocalityTier {
    /// Items found at the current place.
    SamePlace,
    /// Items found anywhere in the current zone.
    SameZone,
    /// Every item.
    AnyPlace,
}

impl fmt::Display for LocalityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SamePlace => write!(f, "same_place"),
            Self::SameZone => write!(f, "same_zone"),
            Self::AnyPlace => write!(f, "any_place"),
        }
    }
}

/// The result of a pick: the tier that satisfied it and the chosen ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pick {
    /// The narrowest tier holding enough candidates.
    pub tier: LocalityTier,
    /// The sampled item ids.
    pub item_ids: Vec<String>,
}

/// Pick `n` item ids for the player's place.
///
/// Shorthand for [`pick_with_tier`] when the tier is not needed.
pub fn pick(
    state: &PlayerState,
    repo: &Repository,
    entry_type: EntryType,
    n: usize,
    seed: Option<u64>,
) -> EngineResult<Vec<String>> {
    pick_with_tier(state, repo, entry_type, n, seed).map(|p| p.item_ids)
}

/// Pick `n` item ids, reporting which locality tier was used.
///
/// Only items suited to `entry_type` are candidates. With no seed the draw
/// uses fresh entropy.
pub fn pick_with_tier(
    state: &PlayerState,
    repo: &Repository,
    entry_type: EntryType,
    n: usize,
    seed: Option<u64>,
) -> EngineResult<Pick> {
    let place = repo
        .place(&state.current_place_id)
        .map_err(|_| EngineError::UnknownPlace(state.current_place_id.clone()))?;

    let suited = |item: &&Item| item.suits(entry_type);

    let tiers: [(LocalityTier, Vec<&Item>); 3] = [
        (
            LocalityTier::SamePlace,
            repo.items_at(&place.place_id).filter(suited).collect(),
        ),
        (
            LocalityTier::SameZone,
            repo.items()
                .iter()
                .filter(suited)
                .filter(|item| in_zone(repo, item, &place.zone_id))
                .collect(),
        ),
        (
            LocalityTier::AnyPlace,
            repo.items().iter().filter(suited).collect(),
        ),
    ];

    let available = tiers[2].1.len();
    let Some((tier, pool)) = tiers.into_iter().find(|(_, pool)| pool.len() >= n) else {
        return Err(EngineError::InsufficientContent {
            requested: n,
            available,
        });
    };

    let seed = seed.unwrap_or_else(|| rand::rng().random());
    let mut rng = StdRng::seed_from_u64(seed);
    let item_ids: Vec<String> = index::sample(&mut rng, pool.len(), n)
        .into_iter()
        .map(|i| pool[i].item_id.clone())
        .collect();

    tracing::debug!(
        place = %place.place_id,
        %tier,
        pool = pool.len(),
        picked = item_ids.len(),
        "ingredients picked"
    );
    Ok(Pick { tier, item_ids })
}

/// Whether `item` belongs to `zone_id`, either through its origin place or
/// because it is zone-scoped there.
fn in_zone(repo: &Repository, item: &Item, zone_id: &str) -> bool {
    match item.origin_scope {
        OriginScope::Place => item
            .origin_ref
            .as_deref()
            .and_then(|p| repo.place(p).ok())
            .is_some_and(|p| p.zone_id == zone_id),
        OriginScope::Zone => item.origin_ref.as_deref() == Some(zone_id),
        OriginScope::Global | OriginScope::Other => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{item, place, repo_with};
    use ic_content::ContentSet;

    fn locality_repo() -> Repository {
        repo_with(ContentSet {
            places: vec![
                place("home", "cottage", false),
                place("garden", "cottage", false),
                place("shore", "coast", false),
            ],
            items: vec![
                item("kettle_lid", "home"),
                item("mint", "garden"),
                item("balm", "garden"),
                item("thyme", "garden"),
                item("shell", "shore"),
                item("kelp", "shore"),
            ],
            ..ContentSet::default()
        })
    }

    #[test]
    fn strict_tier_wins_when_it_has_enough() {
        let repo = locality_repo();
        let state = PlayerState::new("s", "garden");
        let p = pick_with_tier(&state, &repo, EntryType::Tea, 2, Some(7)).unwrap();
        assert_eq!(p.tier, LocalityTier::SamePlace);
        assert!(p.item_ids.iter().all(|id| ["mint", "balm", "thyme"].contains(&id.as_str())));
    }

    #[test]
    fn zone_tier_never_reaches_other_zones() {
        let repo = locality_repo();
        let state = PlayerState::new("s", "home");
        for seed in 0..50 {
            let p = pick_with_tier(&state, &repo, EntryType::Tea, 3, Some(seed)).unwrap();
            assert_eq!(p.tier, LocalityTier::SameZone);
            assert!(!p.item_ids.iter().any(|id| id == "shell" || id == "kelp"));
        }
    }

    #[test]
    fn falls_back_to_any_place() {
        let repo = locality_repo();
        let state = PlayerState::new("s", "shore");
        let p = pick_with_tier(&state, &repo, EntryType::Tea, 5, Some(1)).unwrap();
        assert_eq!(p.tier, LocalityTier::AnyPlace);
        assert_eq!(p.item_ids.len(), 5);
    }

    #[test]
    fn picks_are_distinct() {
        let repo = locality_repo();
        let state = PlayerState::new("s", "shore");
        let mut ids = pick(&state, &repo, EntryType::Tea, 6, Some(3)).unwrap();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 6);
    }

    #[test]
    fn too_few_items_is_insufficient_content() {
        let repo = locality_repo();
        let state = PlayerState::new("s", "home");
        let err = pick(&state, &repo, EntryType::Tea, 7, Some(1)).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InsufficientContent { requested: 7, available: 6 }
        ));
    }

    #[test]
    fn same_seed_same_pick() {
        let repo = locality_repo();
        let state = PlayerState::new("s", "home");
        let a = pick(&state, &repo, EntryType::Tea, 3, Some(99)).unwrap();
        let b = pick(&state, &repo, EntryType::Tea, 3, Some(99)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn unseeded_pick_still_respects_tiers() {
        let repo = locality_repo();
        let state = PlayerState::new("s", "garden");
        let ids = pick(&state, &repo, EntryType::Tea, 3, None).unwrap();
        assert_eq!(ids.len(), 3);
        assert!(ids.iter().all(|id| ["mint", "balm", "thyme"].contains(&id.as_str())));
    }

    #[test]
    fn entry_type_filters_candidates() {
        let mut set = ContentSet {
            places: vec![place("shrine", "hills", true)],
            items: vec![item("candle", "shrine"), item("mint", "shrine")],
            ..ContentSet::default()
        };
        set.items[0].entry_types = vec![EntryType::Spell];
        let repo = repo_with(set);
        let state = PlayerState::new("s", "shrine");
        assert_eq!(pick(&state, &repo, EntryType::Tea, 1, Some(0)).unwrap(), vec!["mint"]);
        assert!(pick(&state, &repo, EntryType::Tea, 2, Some(0)).is_err());
    }

    #[test]
    fn unknown_place_is_reported() {
        let repo = locality_repo();
        let state = PlayerState::new("s", "attic");
        assert!(matches!(
            pick(&state, &repo, EntryType::Tea, 1, Some(0)),
            Err(EngineError::UnknownPlace(_))
        ));
    }
}
