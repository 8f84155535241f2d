use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ContentError, ContentResult};
use crate::manifest::{ContentFile, ContentManifest};
use crate::model::{EntryType, Recipe};
use crate::repository::ContentSet;
use crate::schema::{SchemaValidator, SchemaViolation};

/// Read and parse one JSON file.
pub fn read_json(path: &Path) -> ContentResult<Value> {
    let text = fs::read_to_string(path).map_err(|e| ContentError::ContentLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    serde_json::from_str(&text).map_err(|e| ContentError::ContentLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Load one content file: read, check against its schema, convert to records.
///
/// A missing optional file yields an empty list.
pub fn load_collection<T: DeserializeOwned>(
    root: &Path,
    manifest: &ContentManifest,
    file: ContentFile,
    schemas: &dyn SchemaValidator,
) -> ContentResult<Vec<T>> {
    let path = manifest.path(root, file);
    if file.is_optional() && !path.exists() {
        tracing::debug!(file = ?file, path = %path.display(), "optional content file absent");
        return Ok(Vec::new());
    }
    let mut doc = read_json(&path)?;
    schemas.validate(file.schema(), &doc)?;

    let entries = doc
        .get_mut(file.collection_key())
        .map(Value::take)
        .unwrap_or(Value::Array(Vec::new()));
    let records: Vec<T> = serde_json::from_value(entries).map_err(|e| {
        ContentError::SchemaValidation(SchemaViolation {
            schema: file.schema().to_string(),
            path: format!("$.{}", file.collection_key()),
            message: e.to_string(),
        })
    })?;
    tracing::debug!(file = ?file, count = records.len(), "loaded content file");
    Ok(records)
}

/// Load every file named by `manifest` into a [`ContentSet`].
///
/// Recipes take their entry type from the file they come from.
pub fn load_all(
    root: &Path,
    manifest: &ContentManifest,
    schemas: &dyn SchemaValidator,
) -> ContentResult<ContentSet> {
    let mut recipes = Vec::new();
    for (file, entry_type) in [
        (ContentFile::Tea, EntryType::Tea),
        (ContentFile::Spells, EntryType::Spell),
    ] {
        let mut batch: Vec<Recipe> =
            load_collection(root, manifest, file, schemas)?;
        for recipe in &mut batch {
            recipe.entry_type = entry_type;
        }
        recipes.extend(batch);
    }

    let mut lexicon = load_collection(root, manifest, ContentFile::DescriptiveLexicon, schemas)?;
    lexicon.extend(load_collection(
        root,
        manifest,
        ContentFile::NotAllowedLexicon,
        schemas,
    )?);

    Ok(ContentSet {
        places: load_collection(root, manifest, ContentFile::Places, schemas)?,
        npcs: load_collection(root, manifest, ContentFile::Npcs, schemas)?,
        items: load_collection(root, manifest, ContentFile::Collectibles, schemas)?,
        interactions: load_collection(root, manifest, ContentFile::Interactions, schemas)?,
        recipes,
        lexicon,
        templates: load_collection(root, manifest, ContentFile::JournalTemplates, schemas)?,
        units: load_collection(root, manifest, ContentFile::Storylets, schemas)?,
    })
}
