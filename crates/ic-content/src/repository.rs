use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;

use crate::error::{ContentError, ContentResult};
use crate::loader;
use crate::manifest::ContentManifest;
use crate::model::{
    ContentKind, EntryType, Interaction, Item, JournalTemplate, LexiconEntry, LexiconType, Npc,
    Place, Recipe, Zone,
};
use crate::schema::{self, BuiltinSchemas, SchemaValidator};
use crate::unit::NarrativeUnit;

/// A record with an id unique within its kind.
pub trait Keyed {
    /// The kind reported in duplicate and not-found errors.
    const KIND: ContentKind;
    /// The record's id.
    fn key(&self) -> &str;
}

macro_rules! keyed {
    ($ty:ty, $kind:expr, $field:ident) => {
        impl Keyed for $ty {
            const KIND: ContentKind = $kind;
            fn key(&self) -> &str {
                &self.$field
            }
        }
    };
}

keyed!(Place, ContentKind::Place, place_id);
keyed!(Npc, ContentKind::Npc, npc_id);
keyed!(Item, ContentKind::Item, item_id);
keyed!(Interaction, ContentKind::Interaction, interaction_id);
keyed!(Recipe, ContentKind::Recipe, recipe_id);
keyed!(LexiconEntry, ContentKind::Lexicon, key);
keyed!(JournalTemplate, ContentKind::JournalTemplate, template_id);
keyed!(NarrativeUnit, ContentKind::NarrativeUnit, unit_id);

/// Records of one kind in load order, indexed by id.
#[derive(Debug, Clone)]
pub struct Table<T> {
    rows: Vec<T>,
    by_id: HashMap<String, usize>,
}

impl<T: Keyed> Table<T> {
    /// Index `rows`, failing on the first repeated id.
    pub fn build(rows: Vec<T>) -> ContentResult<Self> {
        let mut by_id = HashMap::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            if by_id.insert(row.key().to_string(), i).is_some() {
                return Err(ContentError::DuplicateId {
                    kind: T::KIND,
                    id: row.key().to_string(),
                });
            }
        }
        Ok(Self { rows, by_id })
    }

    /// Look up a record by id.
    pub fn get(&self, id: &str) -> Option<&T> {
        self.by_id.get(id).map(|&i| &self.rows[i])
    }

    /// Look up a record by id, reporting a not-found error.
    pub fn require(&self, id: &str) -> ContentResult<&T> {
        self.get(id).ok_or_else(|| ContentError::NotFound {
            kind: T::KIND,
            id: id.to_string(),
        })
    }

    /// Whether a record with this id exists.
    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Records in load order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.rows.iter()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn at(&self, positions: Option<&Vec<usize>>) -> impl Iterator<Item = &T> {
        positions
            .into_iter()
            .flatten()
            .map(move |&i| &self.rows[i])
    }
}

type MultiMap<K> = HashMap<K, Vec<usize>>;

fn multimap<T, K, F>(rows: &[T], key: F) -> MultiMap<K>
where
    K: std::hash::Hash + Eq,
    F: Fn(&T) -> Option<K>,
{
    let mut map: MultiMap<K> = HashMap::new();
    for (i, row) in rows.iter().enumerate() {
        if let Some(k) = key(row) {
            map.entry(k).or_default().push(i);
        }
    }
    map
}

/// Typed records for every content kind, before indexing.
#[derive(Debug, Clone, Default)]
pub struct ContentSet {
    /// Places.
    pub places: Vec<Place>,
    /// Characters.
    pub npcs: Vec<Npc>,
    /// Collectible items.
    pub items: Vec<Item>,
    /// Character interactions.
    pub interactions: Vec<Interaction>,
    /// Tea and spell recipes.
    pub recipes: Vec<Recipe>,
    /// Lexicon entries from both lexicon files.
    pub lexicon: Vec<LexiconEntry>,
    /// Journal templates.
    pub templates: Vec<JournalTemplate>,
    /// Authored narrative units.
    pub units: Vec<NarrativeUnit>,
}

/// Per-kind record counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositorySummary {
    /// Count per kind.
    pub counts: BTreeMap<ContentKind, usize>,
}

impl RepositorySummary {
    /// Count for one kind.
    pub fn count(&self, kind: ContentKind) -> usize {
        self.counts.get(&kind).copied().unwrap_or(0)
    }
}

impl fmt::Display for RepositorySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .counts
            .iter()
            .map(|(kind, n)| format!("{n} {kind}"))
            .collect();
        f.write_str(&parts.join(", "))
    }
}

/// Immutable, indexed world content.
///
/// Built once at startup and shared read-only afterwards; nothing mutates it
/// once [`Repository::build`] returns.
pub struct Repository {
    schemas: Arc<dyn SchemaValidator>,

    places: Table<Place>,
    npcs: Table<Npc>,
    items: Table<Item>,
    interactions: Table<Interaction>,
    recipes: Table<Recipe>,
    lexicon: Table<LexiconEntry>,
    templates: Table<JournalTemplate>,
    units: Table<NarrativeUnit>,
    zones: Vec<Zone>,

    // Indexes
    zone_by_id: HashMap<String, usize>,
    items_by_place: MultiMap<String>,
    recipes_by_entry_type: MultiMap<EntryType>,
    units_by_place_id: MultiMap<String>,
    units_by_entry_type: MultiMap<EntryType>,
    templates_by_entry_type: MultiMap<EntryType>,
    interactions_by_npc_kind: MultiMap<String>,
    interactions_by_place_id: MultiMap<String>,
    banned_words: Vec<String>,
}

impl fmt::Debug for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository")
            .field("summary", &self.summary().to_string())
            .finish_non_exhaustive()
    }
}

impl Repository {
    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    /// Index a content set. Fails on duplicate ids or malformed authored units.
    ///
    /// References are not checked here; run [`crate::validate`] afterwards.
    pub fn build(set: ContentSet, schemas: Arc<dyn SchemaValidator>) -> ContentResult<Self> {
        for unit in &set.units {
            let value = serde_json::to_value(unit).map_err(|e| {
                ContentError::SchemaValidation(schema::SchemaViolation {
                    schema: schema::NARRATIVE_UNIT.to_string(),
                    path: "$".to_string(),
                    message: e.to_string(),
                })
            })?;
            schemas.validate(schema::NARRATIVE_UNIT, &value)?;
        }

        let places = Table::build(set.places)?;
        let npcs = Table::build(set.npcs)?;
        let items = Table::build(set.items)?;
        let interactions = Table::build(set.interactions)?;
        let recipes = Table::build(set.recipes)?;
        let lexicon = Table::build(set.lexicon)?;
        let templates = Table::build(set.templates)?;
        let units = Table::build(set.units)?;

        let mut zones: Vec<Zone> = Vec::new();
        let mut zone_by_id: HashMap<String, usize> = HashMap::new();
        for place in places.iter() {
            let i = *zone_by_id.entry(place.zone_id.clone()).or_insert_with(|| {
                zones.push(Zone {
                    zone_id: place.zone_id.clone(),
                    place_ids: Vec::new(),
                });
                zones.len() - 1
            });
            zones[i].place_ids.push(place.place_id.clone());
        }

        let mut banned_words: Vec<String> = Vec::new();
        for entry in lexicon
            .iter()
            .filter(|e| e.lexicon_type == LexiconType::NotAllowed)
        {
            for word in &entry.words {
                let word = word.trim().to_lowercase();
                if !word.is_empty() && !banned_words.contains(&word) {
                    banned_words.push(word);
                }
            }
        }

        let repo = Self {
            items_by_place: multimap(&items.rows, |i: &Item| {
                i.origin_place().map(str::to_string)
            }),
            recipes_by_entry_type: multimap(&recipes.rows, |r: &Recipe| Some(r.entry_type)),
            units_by_place_id: multimap(&units.rows, |u: &NarrativeUnit| {
                Some(u.place_id.clone())
            }),
            units_by_entry_type: multimap(&units.rows, |u: &NarrativeUnit| Some(u.entry_type)),
            templates_by_entry_type: multimap(&templates.rows, |t: &JournalTemplate| {
                Some(t.entry_type)
            }),
            interactions_by_npc_kind: multimap(&interactions.rows, |i: &Interaction| {
                Some(i.npc_kind.clone())
            }),
            interactions_by_place_id: multimap(&interactions.rows, |i: &Interaction| {
                i.conditions.place_id.clone()
            }),
            schemas,
            places,
            npcs,
            items,
            interactions,
            recipes,
            lexicon,
            templates,
            units,
            zones,
            zone_by_id,
            banned_words,
        };
        tracing::info!(summary = %repo.summary(), "content repository built");
        Ok(repo)
    }

    /// Index a content set using the built-in schemas.
    pub fn from_content(set: ContentSet) -> ContentResult<Self> {
        Self::build(set, Arc::new(BuiltinSchemas))
    }

    /// Load every content file under `root` and index it.
    pub fn load(
        root: &Path,
        manifest: &ContentManifest,
        schemas: Arc<dyn SchemaValidator>,
    ) -> ContentResult<Self> {
        let set = loader::load_all(root, manifest, schemas.as_ref())?;
        Self::build(set, schemas)
    }

    /// Boot sequence: read the manifest, load with the built-in schemas, and
    /// run the cross-file validator. Any failure aborts.
    pub fn open(root: &Path) -> ContentResult<Self> {
        let manifest = ContentManifest::from_dir(root)?;
        let repo = Self::load(root, &manifest, Arc::new(BuiltinSchemas))?;
        crate::validate::validate(&repo)?;
        Ok(repo)
    }

    /// The schema capability this repository was built with.
    pub fn schemas(&self) -> &dyn SchemaValidator {
        self.schemas.as_ref()
    }

    // -----------------------------------------------------------------------
    // Lookups
    // -----------------------------------------------------------------------

    /// A place by id.
    pub fn place(&self, id: &str) -> ContentResult<&Place> {
        self.places.require(id)
    }

    /// A character by id.
    pub fn npc(&self, id: &str) -> ContentResult<&Npc> {
        self.npcs.require(id)
    }

    /// An item by id.
    pub fn item(&self, id: &str) -> ContentResult<&Item> {
        self.items.require(id)
    }

    /// An interaction by id.
    pub fn interaction(&self, id: &str) -> ContentResult<&Interaction> {
        self.interactions.require(id)
    }

    /// A recipe by id.
    pub fn recipe(&self, id: &str) -> ContentResult<&Recipe> {
        self.recipes.require(id)
    }

    /// A journal template by id.
    pub fn template(&self, id: &str) -> ContentResult<&JournalTemplate> {
        self.templates.require(id)
    }

    /// An authored narrative unit by id.
    pub fn unit(&self, id: &str) -> ContentResult<&NarrativeUnit> {
        self.units.require(id)
    }

    /// A lexicon entry by key.
    pub fn lexicon_entry(&self, key: &str) -> ContentResult<&LexiconEntry> {
        self.lexicon.require(key)
    }

    /// A derived zone by id.
    pub fn zone(&self, id: &str) -> ContentResult<&Zone> {
        self.zone_by_id
            .get(id)
            .map(|&i| &self.zones[i])
            .ok_or_else(|| ContentError::NotFound {
                kind: ContentKind::Zone,
                id: id.to_string(),
            })
    }

    // -----------------------------------------------------------------------
    // Tables
    // -----------------------------------------------------------------------

    /// All places.
    pub fn places(&self) -> &Table<Place> {
        &self.places
    }

    /// All characters.
    pub fn npcs(&self) -> &Table<Npc> {
        &self.npcs
    }

    /// All items.
    pub fn items(&self) -> &Table<Item> {
        &self.items
    }

    /// All interactions.
    pub fn interactions(&self) -> &Table<Interaction> {
        &self.interactions
    }

    /// All recipes.
    pub fn recipes(&self) -> &Table<Recipe> {
        &self.recipes
    }

    /// All lexicon entries.
    pub fn lexicon(&self) -> &Table<LexiconEntry> {
        &self.lexicon
    }

    /// All journal templates.
    pub fn templates(&self) -> &Table<JournalTemplate> {
        &self.templates
    }

    /// All authored narrative units.
    pub fn units(&self) -> &Table<NarrativeUnit> {
        &self.units
    }

    /// All zones in first-seen order.
    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    // -----------------------------------------------------------------------
    // Secondary indexes
    // -----------------------------------------------------------------------

    /// Items whose origin is `place_id`.
    pub fn items_at(&self, place_id: &str) -> impl Iterator<Item = &Item> {
        self.items.at(self.items_by_place.get(place_id))
    }

    /// Recipes of one entry type.
    pub fn recipes_for(&self, entry_type: EntryType) -> impl Iterator<Item = &Recipe> {
        self.recipes.at(self.recipes_by_entry_type.get(&entry_type))
    }

    /// Authored units placed at `place_id`, in load order.
    pub fn units_for_place(&self, place_id: &str) -> impl Iterator<Item = &NarrativeUnit> {
        self.units.at(self.units_by_place_id.get(place_id))
    }

    /// Authored units of one entry type.
    pub fn units_for_entry_type(
        &self,
        entry_type: EntryType,
    ) -> impl Iterator<Item = &NarrativeUnit> {
        self.units.at(self.units_by_entry_type.get(&entry_type))
    }

    /// Journal templates of one entry type, in load order.
    pub fn templates_for(&self, entry_type: EntryType) -> impl Iterator<Item = &JournalTemplate> {
        self.templates.at(self.templates_by_entry_type.get(&entry_type))
    }

    /// Interactions for a character kind.
    pub fn interactions_for_kind(&self, npc_kind: &str) -> impl Iterator<Item = &Interaction> {
        self.interactions
            .at(self.interactions_by_npc_kind.get(npc_kind))
    }

    /// Interactions gated to `place_id`.
    pub fn interactions_at(&self, place_id: &str) -> impl Iterator<Item = &Interaction> {
        self.interactions
            .at(self.interactions_by_place_id.get(place_id))
    }

    /// Lowercased not-allowed words, deduplicated.
    pub fn banned_words(&self) -> &[String] {
        &self.banned_words
    }

    /// Per-kind counts.
    pub fn summary(&self) -> RepositorySummary {
        let counts = BTreeMap::from([
            (ContentKind::Place, self.places.len()),
            (ContentKind::Zone, self.zones.len()),
            (ContentKind::Npc, self.npcs.len()),
            (ContentKind::Item, self.items.len()),
            (ContentKind::Interaction, self.interactions.len()),
            (ContentKind::Recipe, self.recipes.len()),
            (ContentKind::Lexicon, self.lexicon.len()),
            (ContentKind::JournalTemplate, self.templates.len()),
            (ContentKind::NarrativeUnit, self.units.len()),
        ]);
        RepositorySummary { counts }
    }
}
