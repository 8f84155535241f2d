//! Error types for the narrative engine.

use ic_content::{ContentError, EntryType, SchemaViolation};
use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur while generating, selecting, rendering or stepping.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The player state names a place the repository does not have.
    #[error("unknown place: \"{0}\"")]
    UnknownPlace(String),

    /// The chosen id is not among the offered choices.
    #[error("invalid action: {0}")]
    InvalidAction(String),

    /// An effect would drive an inventory count below zero.
    #[error("inventory underflow: cannot remove {requested} \"{item}\" (holding {held})")]
    InventoryUnderflow {
        /// The item being removed.
        item: String,
        /// The count currently held.
        held: u32,
        /// The count the effect tried to remove.
        requested: u32,
    },

    /// No journal template exists for an entry type.
    #[error("no journal template for entry type {0}")]
    MissingTemplate(EntryType),

    /// The pool is smaller than the number of picks requested.
    #[error("insufficient content: requested {requested}, only {available} available")]
    InsufficientContent {
        /// How many were asked for.
        requested: usize,
        /// How many exist.
        available: usize,
    },

    /// Nothing eligible to offer.
    #[error("no eligible content: {0}")]
    NoEligibleContent(String),

    /// A generated unit or rendered page failed its schema.
    #[error("schema validation failed: {0}")]
    SchemaValidation(SchemaViolation),

    /// A command string could not be parsed.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// The store has no state for this session.
    #[error("unknown session: {0}")]
    UnknownSession(String),

    /// The store has no record for this player.
    #[error("unknown player: {0}")]
    UnknownPlayer(String),

    /// The session store failed.
    #[error("store error: {0}")]
    Store(String),

    /// Content repository error.
    #[error("{0}")]
    Content(#[from] ContentError),
}

impl From<SchemaViolation> for EngineError {
    fn from(violation: SchemaViolation) -> Self {
        Self::SchemaValidation(violation)
    }
}

impl EngineError {
    /// Whether the error is the caller's fault rather than the server's.
    pub fn is_client_error(&self) -> bool {
        match self {
            Self::UnknownPlace(_)
            | Self::InvalidAction(_)
            | Self::InventoryUnderflow { .. }
            | Self::UnknownCommand(_)
            | Self::UnknownSession(_)
            | Self::UnknownPlayer(_) => true,
            Self::Content(ContentError::NotFound { .. }) => true,
            Self::MissingTemplate(_)
            | Self::InsufficientContent { .. }
            | Self::NoEligibleContent(_)
            | Self::SchemaValidation(_)
            | Self::Store(_)
            | Self::Content(_) => false,
        }
    }
}
