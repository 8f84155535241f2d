use std::fmt;

use serde::{Deserialize, Serialize};

/// Reserved prefix on an `ingredient_ref` meaning "any item of a kind".
///
/// `any:leaf` is satisfied by any item tagged `leaf`; it never has to resolve
/// to a concrete item id.
pub const WILDCARD_PREFIX: &str = "any:";

/// Returns true when `ingredient_ref` is a wildcard substitution token.
pub fn is_wildcard(ingredient_ref: &str) -> bool {
    ingredient_ref.starts_with(WILDCARD_PREFIX)
}

// ---------------------------------------------------------------------------
// Content kinds
// ---------------------------------------------------------------------------

/// Every kind of record the repository indexes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    /// A location node.
    Place,
    /// A group of places.
    Zone,
    /// A character.
    Npc,
    /// A collectible item.
    Item,
    /// A character interaction.
    Interaction,
    /// A tea or spell recipe.
    Recipe,
    /// A scoped word list.
    Lexicon,
    /// A journal body pattern.
    JournalTemplate,
    /// An authored or generated narrative unit.
    NarrativeUnit,
}

impl ContentKind {
    /// All kinds in listing order.
    pub const ALL: [ContentKind; 9] = [
        Self::Place,
        Self::Zone,
        Self::Npc,
        Self::Item,
        Self::Interaction,
        Self::Recipe,
        Self::Lexicon,
        Self::JournalTemplate,
        Self::NarrativeUnit,
    ];

    /// The canonical lowercase name of the kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Place => "place",
            Self::Zone => "zone",
            Self::Npc => "npc",
            Self::Item => "item",
            Self::Interaction => "interaction",
            Self::Recipe => "recipe",
            Self::Lexicon => "lexicon",
            Self::JournalTemplate => "journal_template",
            Self::NarrativeUnit => "narrative_unit",
        }
    }

    /// Parse a kind name, accepting plurals and a few common aliases.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "place" | "places" => Some(Self::Place),
            "zone" | "zones" => Some(Self::Zone),
            "npc" | "npcs" | "character" | "characters" => Some(Self::Npc),
            "item" | "items" | "collectible" | "collectibles" => Some(Self::Item),
            "interaction" | "interactions" => Some(Self::Interaction),
            "recipe" | "recipes" => Some(Self::Recipe),
            "lexicon" | "lexicons" => Some(Self::Lexicon),
            "template" | "templates" | "journal_template" | "journal_templates" => {
                Some(Self::JournalTemplate)
            }
            "unit" | "units" | "storylet" | "storylets" | "narrative_unit"
            | "narrative_units" => Some(Self::NarrativeUnit),
            _ => None,
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Entry types
// ---------------------------------------------------------------------------

/// The thematic category of a narrative unit or journal page.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
    /// A tea brewed from gathered ingredients.
    #[default]
    Tea,
    /// A small spell, offered at threshold places.
    Spell,
    /// A short observation.
    FieldNote,
    /// A half-remembered dream.
    DreamFragment,
}

impl EntryType {
    /// All entry types.
    pub const ALL: [EntryType; 4] = [
        Self::Tea,
        Self::Spell,
        Self::FieldNote,
        Self::DreamFragment,
    ];

    /// The snake_case name used in content files.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tea => "tea",
            Self::Spell => "spell",
            Self::FieldNote => "field_note",
            Self::DreamFragment => "dream_fragment",
        }
    }

    /// Parse a snake_case entry type name.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }

    /// The mood attached to pages of this type.
    pub fn mood(self) -> &'static str {
        match self {
            Self::Tea => "soft",
            Self::Spell => "tender",
            Self::FieldNote => "curious",
            Self::DreamFragment => "hushed",
        }
    }

    /// The default need when nothing more specific is known.
    pub fn need(self) -> &'static str {
        match self {
            Self::Tea => "comfort",
            Self::Spell => "courage",
            Self::FieldNote => "wonder",
            Self::DreamFragment => "rest",
        }
    }

    /// A reflective question closing a page of this type.
    pub fn reflection(self) -> &'static str {
        match self {
            Self::Tea => "What does this cup ask you to slow down for?",
            Self::Spell => "What are you ready to carry across the threshold?",
            Self::FieldNote => "What small thing did you nearly miss?",
            Self::DreamFragment => "What lingers after the dream has gone?",
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// World records
// ---------------------------------------------------------------------------

/// A location node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    /// Unique place id.
    pub place_id: String,
    /// The zone grouping this place with its neighbours.
    pub zone_id: String,
    /// Threshold places offer spells instead of tea.
    #[serde(default)]
    pub is_threshold: bool,
    /// Human-readable name.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Free-text description.
    #[serde(default)]
    pub description: Option<String>,
    /// Author tags.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Place {
    /// The display name, or the id when none is authored.
    pub fn name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.place_id)
    }
}

/// A group of places, derived from `Place::zone_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    /// Zone id.
    pub zone_id: String,
    /// Member places in load order.
    pub place_ids: Vec<String>,
}

/// A character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Npc {
    /// Unique character id.
    pub npc_id: String,
    /// Character kind, matched by interactions.
    #[serde(default)]
    pub npc_kind: Option<String>,
    /// Human-readable name.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Where the character usually is.
    #[serde(default)]
    pub home_place_id: Option<String>,
    /// Free-text description.
    #[serde(default)]
    pub description: Option<String>,
}

/// How an item's origin is scoped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OriginScope {
    /// Found at one place; `origin_ref` names it.
    Place,
    /// Found anywhere in a zone; `origin_ref` names the zone.
    Zone,
    /// Found everywhere.
    Global,
    /// Any other authored scope.
    #[serde(other)]
    Other,
}

/// A collectible item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Unique item id.
    pub item_id: String,
    /// Human-readable name.
    #[serde(default)]
    pub display_name: Option<String>,
    /// How `origin_ref` is interpreted.
    pub origin_scope: OriginScope,
    /// The owning place (or zone) id.
    #[serde(default)]
    pub origin_ref: Option<String>,
    /// Kind tags, matched by wildcard ingredient refs.
    #[serde(default)]
    pub tags: Vec<String>,
    /// The need this item speaks to.
    #[serde(default)]
    pub player_need_satisfied: Option<String>,
    /// Entry types this item suits; empty means all.
    #[serde(default)]
    pub entry_types: Vec<EntryType>,
}

impl Item {
    /// The display name, or the id when none is authored.
    pub fn name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.item_id)
    }

    /// The owning place id, only when the item is place-scoped.
    pub fn origin_place(&self) -> Option<&str> {
        match self.origin_scope {
            OriginScope::Place => self.origin_ref.as_deref(),
            _ => None,
        }
    }

    /// Whether this item can be used on a page of `entry_type`.
    pub fn suits(&self, entry_type: EntryType) -> bool {
        self.entry_types.is_empty() || self.entry_types.contains(&entry_type)
    }
}

/// Optional gates on an interaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InteractionConditions {
    /// Only with this character.
    #[serde(default)]
    pub npc_id: Option<String>,
    /// Only at this place.
    #[serde(default)]
    pub place_id: Option<String>,
    /// Only at this time of day.
    #[serde(default)]
    pub time_of_day: Option<String>,
}

/// A character interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    /// Unique interaction id.
    pub interaction_id: String,
    /// Character kind this interaction applies to.
    pub npc_kind: String,
    /// Optional gates.
    #[serde(default)]
    pub conditions: InteractionConditions,
    /// Text offered to the player.
    #[serde(default)]
    pub prompt: Option<String>,
}

/// One ingredient line of a recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    /// An item id or a wildcard token.
    pub ingredient_ref: String,
    /// Role in the recipe (base, accent, ...).
    #[serde(default)]
    pub role: Option<String>,
    /// Free-form amount.
    #[serde(default)]
    pub quantity: Option<String>,
}

/// A tea or spell recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    /// Unique recipe id.
    pub recipe_id: String,
    /// Human-readable name.
    #[serde(default)]
    pub display_name: Option<String>,
    /// What the recipe is for.
    #[serde(default)]
    pub intent: Option<String>,
    /// The need the recipe answers.
    #[serde(default)]
    pub target_need: Option<String>,
    /// Ingredient lines.
    pub ingredients: Vec<Ingredient>,
    /// Preparation steps.
    #[serde(default)]
    pub steps: Vec<String>,
    /// A sensory prompt for the journal.
    #[serde(default)]
    pub sensory_prompt: Option<String>,
    /// Tea or spell; set from the file the recipe was loaded from.
    #[serde(default)]
    pub entry_type: EntryType,
}

/// Whether a lexicon supplies vocabulary or forbids it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LexiconType {
    /// Descriptive vocabulary.
    Sensory,
    /// Terms that must never appear in generated text.
    #[serde(rename = "Not_Allowed")]
    NotAllowed,
}

/// Where a lexicon entry applies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LexiconScope {
    /// Everywhere.
    Global,
    /// One place or zone id.
    Local(String),
}

impl From<String> for LexiconScope {
    fn from(s: String) -> Self {
        if s == "Global" {
            Self::Global
        } else {
            Self::Local(s)
        }
    }
}

impl From<LexiconScope> for String {
    fn from(scope: LexiconScope) -> Self {
        match scope {
            LexiconScope::Global => "Global".to_string(),
            LexiconScope::Local(id) => id,
        }
    }
}

impl fmt::Display for LexiconScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => f.write_str("Global"),
            Self::Local(id) => f.write_str(id),
        }
    }
}

/// A scoped word list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LexiconEntry {
    /// Unique key across all lexicon files.
    pub key: String,
    /// Sensory or not-allowed.
    pub lexicon_type: LexiconType,
    /// Global, or a place/zone id.
    pub scope: LexiconScope,
    /// The words.
    pub words: Vec<String>,
}

impl LexiconEntry {
    /// Whether this entry applies at `place_id` in `zone_id`.
    pub fn applies_to(&self, place_id: &str, zone_id: &str) -> bool {
        match &self.scope {
            LexiconScope::Global => true,
            LexiconScope::Local(id) => id == place_id || id == zone_id,
        }
    }
}

/// A journal body pattern for one entry type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalTemplate {
    /// Unique template id.
    pub template_id: String,
    /// The entry type this template renders.
    pub entry_type: EntryType,
    /// Body with `{{placeholder}}` slots.
    pub body: String,
    /// Tags added to every page rendered with this template.
    #[serde(default)]
    pub tags: Vec<String>,
}
