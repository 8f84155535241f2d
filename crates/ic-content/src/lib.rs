//! Content repository for Idle Chapters.
//!
//! Authored world content (places, characters, items, interactions, recipes,
//! lexicons, journal templates, and authored narrative units) is read from
//! JSON files, checked against its schema, converted into typed records, and
//! indexed in an immutable [`Repository`]. A boot-time [`validate`] pass makes
//! sure every cross-file reference resolves before anything else runs.

/// Error types used throughout the crate.
pub mod error;
/// Lexicon lookups: descriptive word pools and banned-term checks.
pub mod lexicon;
/// Reading content files from disk.
pub mod loader;
/// Which file holds which content kind.
pub mod manifest;
/// Typed records for every authored content kind.
pub mod model;
/// The immutable, indexed content repository.
pub mod repository;
/// Structural schema checks for content files and generated objects.
pub mod schema;
/// Narrative units, their choices, and the closed set of effects.
pub mod unit;
/// Cross-file referential integrity checks.
pub mod validate;

/// Re-export error types.
pub use error::{ContentError, ContentResult};
/// Re-export manifest types.
pub use manifest::{ContentFile, ContentManifest};
/// Re-export content records.
pub use model::{
    ContentKind, EntryType, Ingredient, Interaction, Item, JournalTemplate, LexiconEntry,
    LexiconScope, LexiconType, Npc, OriginScope, Place, Recipe, Zone,
};
/// Re-export repository types.
pub use repository::{ContentSet, Repository, RepositorySummary};
/// Re-export schema capability.
pub use schema::{BuiltinSchemas, SchemaValidator, SchemaViolation};
/// Re-export narrative unit types.
pub use unit::{Choice, ChoiceView, Effect, NarrativeUnit, UnitDebug};
/// Re-export the boot-time validator.
pub use validate::validate;
