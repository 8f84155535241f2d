//! Boot-time referential integrity.
//!
//! Every foreign-key-like field in the content (character homes, item
//! origins, interaction gates, recipe ingredients, lexicon scopes, and the
//! places and items named by authored units) must resolve to an existing
//! record. There is no degraded mode: [`validate`] fails on the first
//! dangling reference and the caller aborts startup.

use crate::error::{ContentError, ContentResult};
use crate::model::{ContentKind, LexiconScope, OriginScope, is_wildcard};
use crate::repository::Repository;
use crate::unit::Effect;

/// What a reference must resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// A place id.
    Place,
    /// A zone id.
    Zone,
    /// A place id or a zone id.
    PlaceOrZone,
    /// A character id.
    Npc,
    /// An item id.
    Item,
}

impl Target {
    /// The kind reported when the reference dangles.
    pub fn kind(self) -> ContentKind {
        match self {
            Self::Place | Self::PlaceOrZone => ContentKind::Place,
            Self::Zone => ContentKind::Zone,
            Self::Npc => ContentKind::Npc,
            Self::Item => ContentKind::Item,
        }
    }
}

/// One cross-record reference found in the content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// Kind of the record holding the reference.
    pub referrer_kind: ContentKind,
    /// Id of the record holding the reference.
    pub referrer: String,
    /// What the reference must resolve to.
    pub target: Target,
    /// The referenced id.
    pub id: String,
}

impl Reference {
    fn new(referrer_kind: ContentKind, referrer: &str, target: Target, id: &str) -> Self {
        Self {
            referrer_kind,
            referrer: referrer.to_string(),
            target,
            id: id.to_string(),
        }
    }

    /// Whether the reference resolves in `repo`.
    pub fn resolves(&self, repo: &Repository) -> bool {
        match self.target {
            Target::Place => repo.places().contains(&self.id),
            Target::Zone => repo.zone(&self.id).is_ok(),
            Target::PlaceOrZone => {
                repo.places().contains(&self.id) || repo.zone(&self.id).is_ok()
            }
            Target::Npc => repo.npcs().contains(&self.id),
            Target::Item => repo.items().contains(&self.id),
        }
    }

    fn to_error(&self) -> ContentError {
        ContentError::ReferentialIntegrity {
            kind: self.target.kind(),
            missing_id: self.id.clone(),
            referrer_kind: self.referrer_kind,
            referrer: self.referrer.clone(),
        }
    }
}

/// Placeholder id reported when a place-scoped item has no `origin_ref`.
const NO_ORIGIN: &str = "(none)";

/// Collect every reference in the content, in a fixed order.
pub fn references(repo: &Repository) -> Vec<Reference> {
    let mut refs = Vec::new();

    for npc in repo.npcs().iter() {
        if let Some(home) = &npc.home_place_id {
            refs.push(Reference::new(ContentKind::Npc, &npc.npc_id, Target::Place, home));
        }
    }

    for item in repo.items().iter() {
        let target = match item.origin_scope {
            OriginScope::Place => Target::Place,
            OriginScope::Zone => Target::Zone,
            OriginScope::Global | OriginScope::Other => continue,
        };
        let origin = item.origin_ref.as_deref().unwrap_or(NO_ORIGIN);
        refs.push(Reference::new(ContentKind::Item, &item.item_id, target, origin));
    }

    for interaction in repo.interactions().iter() {
        let id = &interaction.interaction_id;
        if let Some(npc_id) = &interaction.conditions.npc_id {
            refs.push(Reference::new(ContentKind::Interaction, id, Target::Npc, npc_id));
        }
        if let Some(place_id) = &interaction.conditions.place_id {
            refs.push(Reference::new(ContentKind::Interaction, id, Target::Place, place_id));
        }
    }

    for recipe in repo.recipes().iter() {
        for ingredient in &recipe.ingredients {
            if !is_wildcard(&ingredient.ingredient_ref) {
                refs.push(Reference::new(
                    ContentKind::Recipe,
                    &recipe.recipe_id,
                    Target::Item,
                    &ingredient.ingredient_ref,
                ));
            }
        }
    }

    for entry in repo.lexicon().iter() {
        if let LexiconScope::Local(scope) = &entry.scope {
            refs.push(Reference::new(
                ContentKind::Lexicon,
                &entry.key,
                Target::PlaceOrZone,
                scope,
            ));
        }
    }

    for unit in repo.units().iter() {
        let id = &unit.unit_id;
        refs.push(Reference::new(ContentKind::NarrativeUnit, id, Target::Place, &unit.place_id));
        for effect in unit.choices.iter().flat_map(|c| &c.effects) {
            match effect {
                Effect::MoveTo(place) => {
                    refs.push(Reference::new(ContentKind::NarrativeUnit, id, Target::Place, place));
                }
                Effect::AddItems(items) | Effect::RemoveItems(items) => {
                    for item_id in items.keys() {
                        refs.push(Reference::new(
                            ContentKind::NarrativeUnit,
                            id,
                            Target::Item,
                            item_id,
                        ));
                    }
                }
                Effect::SetFlags(_) | Effect::ClearFlags(_) => {}
            }
        }
    }

    refs
}

/// Fail on the first reference that does not resolve.
pub fn validate(repo: &Repository) -> ContentResult<()> {
    let refs = references(repo);
    match refs.iter().find(|r| !r.resolves(repo)) {
        Some(r) => Err(r.to_error()),
        None => {
            tracing::debug!(references = refs.len(), "cross-file references resolved");
            Ok(())
        }
    }
}

/// Every dangling reference, for reporting.
pub fn dangling(repo: &Repository) -> Vec<ContentError> {
    references(repo)
        .iter()
        .filter(|r| !r.resolves(repo))
        .map(Reference::to_error)
        .collect()
}
