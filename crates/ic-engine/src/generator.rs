//! Narrative unit generator.
//!
//! `generate` is a pure function of `(state, repository, seed)`: every random
//! decision is drawn, in a fixed order, from one call-scoped generator seeded
//! with `seed`.

use std::collections::BTreeMap;

use ic_content::lexicon::{descriptive_words, is_banned};
use ic_content::schema::{NARRATIVE_UNIT, SchemaViolation};
use ic_content::unit::CHOICE_IDS;
use ic_content::{Choice, Effect, EntryType, NarrativeUnit, Place, Repository, UnitDebug};
use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};

use crate::error::{EngineError, EngineResult};
use crate::families::{ChoiceShape, FAMILIES, Family, GENERIC_PROMPT, SAFE_CHOICES};
use crate::picker::pick_with_tier;
use crate::state::PlayerState;

/// One in this many units may offer a move to a neighbouring place.
const WANDER_ODDS: u32 = 8;

/// The entry type a place calls for.
///
/// Threshold places get spells, everything else tea. Depends only on the
/// place and state, never on history.
pub fn entry_type_for(place: &Place, _state: &PlayerState) -> EntryType {
    if place.is_threshold {
        EntryType::Spell
    } else {
        EntryType::Tea
    }
}

/// Generate one narrative unit for the player's current place.
pub fn generate(state: &PlayerState, repo: &Repository, seed: u64) -> EngineResult<NarrativeUnit> {
    let place = repo
        .place(&state.current_place_id)
        .map_err(|_| EngineError::UnknownPlace(state.current_place_id.clone()))?;
    let entry_type = entry_type_for(place, state);

    let mut rng = StdRng::seed_from_u64(seed);
    let family = &FAMILIES[rng.random_range(0..FAMILIES.len())];
    let mut notes = Vec::new();

    let prompt = build_prompt(repo, place, entry_type, family, &mut rng, &mut notes);
    let title = family.title.replace("{place}", place.name());
    let title = (!is_banned(&title, repo)).then_some(title);
    let choices = build_choices(state, repo, place, entry_type, family, &mut rng, &mut notes)?;

    let unit = NarrativeUnit {
        unit_id: format!("gen_{}_{}_{seed:016x}", place.place_id, family.id),
        place_id: place.place_id.clone(),
        entry_type,
        title,
        prompt,
        need_hint: Some(entry_type.need().to_string()),
        mood_hint: Some(entry_type.mood().to_string()),
        tags: vec![
            entry_type.to_string(),
            family.id.to_string(),
            format!("zone:{}", place.zone_id),
        ],
        conditions: BTreeMap::new(),
        choices,
        debug: Some(UnitDebug {
            seed,
            family: family.id.to_string(),
            template_id: family.template_id(),
            notes,
        }),
    };

    let value = serde_json::to_value(&unit).map_err(|e| SchemaViolation {
        schema: NARRATIVE_UNIT.to_string(),
        path: "$".to_string(),
        message: e.to_string(),
    })?;
    repo.schemas().validate(NARRATIVE_UNIT, &value)?;
    Ok(unit)
}

fn build_prompt(
    repo: &Repository,
    place: &Place,
    entry_type: EntryType,
    family: &Family,
    rng: &mut StdRng,
    notes: &mut Vec<String>,
) -> Option<String> {
    let words: Vec<String> = descriptive_words(repo, &place.place_id, &place.zone_id)
        .into_iter()
        .filter(|w| !is_banned(w, repo))
        .collect();
    let reflection = entry_type.reflection();

    let mut lead = None;
    if words.is_empty() {
        notes.push("prompt: generic".to_string());
    } else {
        let frame = family.frames[rng.random_range(0..family.frames.len())];
        let drawn = index::sample(rng, words.len(), words.len().min(2));
        let w1 = &words[drawn.index(0)];
        let w2 = if drawn.len() > 1 {
            &words[drawn.index(1)]
        } else {
            w1
        };
        let text = frame.replace("{w1}", w1).replace("{w2}", w2);
        if is_banned(&text, repo) {
            notes.push("prompt: generic (frame rejected)".to_string());
        } else {
            notes.push(format!("prompt: lexicon ({w1}, {w2})"));
            lead = Some(text);
        }
    }

    // The first clean variant wins; the reflection is dropped before the lead.
    let mut variants = Vec::with_capacity(4);
    if let Some(lead) = &lead {
        variants.push(format!("{lead} {reflection}"));
        variants.push(lead.clone());
    }
    variants.push(format!("{GENERIC_PROMPT} {reflection}"));
    variants.push(GENERIC_PROMPT.to_string());

    let prompt = variants.into_iter().find(|p| !is_banned(p, repo));
    match &prompt {
        Some(p) if !p.ends_with(reflection) => {
            notes.push("prompt: reflection dropped".to_string());
        }
        None => notes.push("prompt: omitted".to_string()),
        _ => {}
    }
    prompt
}

struct Draft {
    shape: ChoiceShape,
    label: String,
    effects: Vec<Effect>,
}

fn one(item_id: &str) -> BTreeMap<String, u32> {
    BTreeMap::from([(item_id.to_string(), 1)])
}

fn build_choices(
    state: &PlayerState,
    repo: &Repository,
    place: &Place,
    entry_type: EntryType,
    family: &Family,
    rng: &mut StdRng,
    notes: &mut Vec<String>,
) -> EngineResult<[Choice; 3]> {
    let wander_allowed = rng.random_range(0..WANDER_ODDS) == 0;
    let gather_seed: u64 = rng.random();

    let found = match pick_with_tier(state, repo, entry_type, 1, Some(gather_seed)) {
        Ok(p) => {
            notes.push(format!("gather tier: {}", p.tier));
            p.item_ids
                .into_iter()
                .next()
                .and_then(|id| repo.item(&id).ok())
        }
        Err(_) => None,
    };

    let held: Vec<&str> = state.held_items().collect();
    let offered = if held.is_empty() {
        None
    } else {
        Some(held[rng.random_range(0..held.len())])
    };
    let offered_name = offered.map(|id| {
        repo.item(id)
            .map(|i| i.name().to_lowercase())
            .unwrap_or_else(|_| id.to_string())
    });

    let neighbours: Vec<&str> = repo
        .zone(&place.zone_id)
        .map(|z| {
            z.place_ids
                .iter()
                .map(String::as_str)
                .filter(|p| *p != place.place_id)
                .collect()
        })
        .unwrap_or_default();
    let destination = if wander_allowed && !neighbours.is_empty() {
        Some(neighbours[rng.random_range(0..neighbours.len())])
    } else {
        None
    };

    let mut drafts: Vec<Draft> = Vec::new();
    for safe in SAFE_CHOICES {
        let draft = match safe.shape {
            ChoiceShape::Linger => Some((safe.label.to_string(), vec![])),
            ChoiceShape::SetFlag(flag) => Some((
                safe.label.to_string(),
                vec![Effect::SetFlags([flag.to_string()].into())],
            )),
            ChoiceShape::ClearFlag(flag) => state.has_flag(flag).then(|| {
                (
                    safe.label.to_string(),
                    vec![Effect::ClearFlags([flag.to_string()].into())],
                )
            }),
            ChoiceShape::Gather => found.map(|item| {
                (
                    safe.label.replace("{item}", &item.name().to_lowercase()),
                    vec![Effect::AddItems(one(&item.item_id))],
                )
            }),
            ChoiceShape::Offer => offered.zip(offered_name.as_deref()).map(|(id, name)| {
                (
                    safe.label.replace("{held}", name),
                    vec![Effect::RemoveItems(one(id))],
                )
            }),
            ChoiceShape::Trade => match (offered.zip(offered_name.as_deref()), found) {
                (Some((id, name)), Some(item)) if id != item.item_id => Some((
                    safe.label
                        .replace("{held}", name)
                        .replace("{item}", &item.name().to_lowercase()),
                    vec![
                        Effect::RemoveItems(one(id)),
                        Effect::AddItems(one(&item.item_id)),
                    ],
                )),
                _ => None,
            },
            ChoiceShape::Wander => destination.map(|dest| {
                let name = repo.place(dest).map(Place::name).unwrap_or(dest);
                (
                    safe.label.replace("{place}", name),
                    vec![Effect::MoveTo(dest.to_string())],
                )
            }),
        };
        if let Some((label, effects)) = draft {
            if is_banned(&label, repo) {
                notes.push(format!("rejected label: {}", safe.label));
                continue;
            }
            drafts.push(Draft {
                shape: safe.shape,
                label,
                effects,
            });
        }
    }

    // Lead with the family's preferred shape when one is available, then
    // fill from a seeded shuffle of the rest.
    let mut order: Vec<usize> = Vec::with_capacity(drafts.len());
    let leads: Vec<usize> = (0..drafts.len())
        .filter(|&i| drafts[i].shape == family.lead)
        .collect();
    if !leads.is_empty() {
        order.push(leads[rng.random_range(0..leads.len())]);
    }
    for i in index::sample(rng, drafts.len(), drafts.len()) {
        if !order.contains(&i) {
            order.push(i);
        }
    }

    let mut chosen: Vec<Draft> = Vec::with_capacity(3);
    let mut slots = drafts.into_iter().map(Some).collect::<Vec<_>>();
    for i in order {
        if chosen.len() == 3 {
            break;
        }
        if let Some(draft) = slots[i].take() {
            if !chosen.iter().any(|c| c.label == draft.label) {
                chosen.push(draft);
            }
        }
    }
    notes.push(format!("wander: {}", destination.is_some()));

    let available = chosen.len();
    let [a, b, c]: [Draft; 3] = chosen
        .try_into()
        .map_err(|_| EngineError::InsufficientContent {
            requested: 3,
            available,
        })?;
    let [id1, id2, id3] = CHOICE_IDS;
    let choice = |choice_id: &str, d: Draft| Choice {
        choice_id: choice_id.to_string(),
        label: d.label,
        effects: d.effects,
    };
    Ok([choice(id1, a), choice(id2, b), choice(id3, c)])
}
