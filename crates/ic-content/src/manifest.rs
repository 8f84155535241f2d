use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ContentError, ContentResult};
use crate::schema;

/// The name of the optional manifest override at the content root.
pub const MANIFEST_FILE: &str = "manifest.json";

/// One content file the repository reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentFile {
    /// Places.
    Places,
    /// Characters.
    Npcs,
    /// Collectible items.
    Collectibles,
    /// Character interactions.
    Interactions,
    /// Tea recipes.
    Tea,
    /// Spell recipes.
    Spells,
    /// Journal templates.
    JournalTemplates,
    /// Sensory lexicon entries.
    DescriptiveLexicon,
    /// Not-allowed lexicon entries.
    NotAllowedLexicon,
    /// Authored narrative units.
    Storylets,
}

impl ContentFile {
    /// All files in load order.
    pub const ALL: [ContentFile; 10] = [
        Self::Places,
        Self::Npcs,
        Self::Collectibles,
        Self::Interactions,
        Self::Tea,
        Self::Spells,
        Self::JournalTemplates,
        Self::DescriptiveLexicon,
        Self::NotAllowedLexicon,
        Self::Storylets,
    ];

    /// The schema the file is checked against.
    pub fn schema(self) -> &'static str {
        match self {
            Self::Places => schema::PLACES,
            Self::Npcs => schema::NPCS,
            Self::Collectibles => schema::COLLECTIBLES,
            Self::Interactions => schema::INTERACTIONS,
            Self::Tea => schema::TEA,
            Self::Spells => schema::SPELLS,
            Self::JournalTemplates => schema::JOURNAL_TEMPLATES,
            Self::DescriptiveLexicon | Self::NotAllowedLexicon => schema::LEXICON,
            Self::Storylets => schema::NARRATIVE_UNITS,
        }
    }

    /// The top-level key holding the file's entries.
    pub fn collection_key(self) -> &'static str {
        match self {
            Self::Places => "places",
            Self::Npcs => "npcs",
            Self::Collectibles => "collectibles",
            Self::Interactions => "interactions",
            Self::Tea => "tea_recipes",
            Self::Spells => "spells",
            Self::JournalTemplates => "journal_templates",
            Self::DescriptiveLexicon | Self::NotAllowedLexicon => "lexicon",
            Self::Storylets => "storylets",
        }
    }

    /// Whether a missing file is an empty collection rather than an error.
    pub fn is_optional(self) -> bool {
        matches!(self, Self::Storylets)
    }

    /// The path relative to the content root in the standard layout.
    pub fn default_path(self) -> &'static str {
        match self {
            Self::Places => "places.json",
            Self::Npcs => "npcs.json",
            Self::Collectibles => "collectibles.json",
            Self::Interactions => "interactions.json",
            Self::Tea => "tea.json",
            Self::Spells => "spells.json",
            Self::JournalTemplates => "journal_templates.json",
            Self::DescriptiveLexicon => "lexicons/descriptive_lexicon.json",
            Self::NotAllowedLexicon => "lexicons/not_allowed_lexicon.json",
            Self::Storylets => "storylets.json",
        }
    }
}

/// Maps each content file to a path relative to the content root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentManifest {
    /// Relative paths, keyed by file.
    pub files: BTreeMap<ContentFile, String>,
}

impl Default for ContentManifest {
    fn default() -> Self {
        Self {
            files: ContentFile::ALL
                .into_iter()
                .map(|f| (f, f.default_path().to_string()))
                .collect(),
        }
    }
}

impl ContentManifest {
    /// Override the path of one file.
    pub fn with_path(mut self, file: ContentFile, path: impl Into<String>) -> Self {
        self.files.insert(file, path.into());
        self
    }

    /// The absolute path of `file` under `root`.
    pub fn path(&self, root: &Path, file: ContentFile) -> PathBuf {
        let rel = self
            .files
            .get(&file)
            .map(String::as_str)
            .unwrap_or_else(|| file.default_path());
        root.join(rel)
    }

    /// Read `manifest.json` from `root` if present, else the default layout.
    ///
    /// Files the override does not mention keep their default path.
    pub fn from_dir(root: &Path) -> ContentResult<Self> {
        let path = root.join(MANIFEST_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(&path).map_err(|e| ContentError::ContentLoad {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        let overrides: ContentManifest =
            serde_json::from_str(&text).map_err(|e| ContentError::ContentLoad {
                path: path.clone(),
                reason: e.to_string(),
            })?;
        let mut manifest = Self::default();
        manifest.files.extend(overrides.files);
        Ok(manifest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_manifest_covers_every_file() {
        let m = ContentManifest::default();
        assert_eq!(m.files.len(), ContentFile::ALL.len());
        assert_eq!(
            m.path(Path::new("content"), ContentFile::NotAllowedLexicon),
            Path::new("content/lexicons/not_allowed_lexicon.json")
        );
    }

    #[test]
    fn only_storylets_are_optional() {
        let optional: Vec<_> = ContentFile::ALL
            .into_iter()
            .filter(|f| f.is_optional())
            .collect();
        assert_eq!(optional, vec![ContentFile::Storylets]);
    }

    #[test]
    fn override_file_merges_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(MANIFEST_FILE),
            r#"{"files": {"places": "world/places.json"}}"#,
        )
        .unwrap();
        let m = ContentManifest::from_dir(dir.path()).unwrap();
        assert_eq!(m.files[&ContentFile::Places], "world/places.json");
        assert_eq!(m.files[&ContentFile::Tea], "tea.json");
    }

    #[test]
    fn malformed_override_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(MANIFEST_FILE), "{not json").unwrap();
        let err = ContentManifest::from_dir(dir.path()).unwrap_err();
        assert!(matches!(err, ContentError::ContentLoad { .. }));
    }

    #[test]
    fn builder_overrides_one_path() {
        let m = ContentManifest::default().with_path(ContentFile::Storylets, "units.json");
        assert_eq!(m.path(Path::new("c"), ContentFile::Storylets), Path::new("c/units.json"));
    }
}
