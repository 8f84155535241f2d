use std::path::PathBuf;

use crate::model::ContentKind;
use crate::schema::SchemaViolation;

/// Alias for `Result<T, ContentError>`.
pub type ContentResult<T> = Result<T, ContentError>;

/// Errors raised while loading, indexing, validating, or browsing content.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// A content file is missing or could not be parsed.
    #[error("failed to load content file {}: {reason}", path.display())]
    ContentLoad {
        /// The file that failed to load.
        path: PathBuf,
        /// Why it failed.
        reason: String,
    },

    /// A content file or generated object does not match its schema.
    #[error("schema validation failed: {0}")]
    SchemaValidation(SchemaViolation),

    /// Two records of the same kind share an id.
    #[error("duplicate {kind} id: \"{id}\"")]
    DuplicateId {
        /// The content kind holding the duplicate.
        kind: ContentKind,
        /// The repeated id.
        id: String,
    },

    /// A record references an id that does not exist.
    #[error("{referrer_kind} \"{referrer}\" references missing {kind} \"{missing_id}\"")]
    ReferentialIntegrity {
        /// The kind the reference should resolve to.
        kind: ContentKind,
        /// The id that did not resolve.
        missing_id: String,
        /// The kind of the record holding the reference.
        referrer_kind: ContentKind,
        /// The id of the record holding the reference.
        referrer: String,
    },

    /// A lookup by id found nothing.
    #[error("{kind} not found: \"{id}\"")]
    NotFound {
        /// The kind that was searched.
        kind: ContentKind,
        /// The requested id.
        id: String,
    },
}

impl From<SchemaViolation> for ContentError {
    fn from(violation: SchemaViolation) -> Self {
        Self::SchemaValidation(violation)
    }
}
