//! Configuration for the narrative engine.

use chrono::NaiveDate;

/// Configuration for an [`crate::Engine`].
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Generated candidates drawn per offer.
    pub candidates_per_offer: usize,
    /// Ingredients picked for each journal page.
    pub ingredients_per_page: usize,
    /// Fixed journal date; today's UTC date when unset.
    pub journal_date: Option<NaiveDate>,
    /// Shortest label word that counts as an intent keyword.
    pub intent_min_keyword_len: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            candidates_per_offer: 3,
            ingredients_per_page: 3,
            journal_date: None,
            intent_min_keyword_len: 4,
        }
    }
}

impl EngineConfig {
    /// Set the number of generated candidates per offer (at least 1).
    pub fn with_candidates(mut self, n: usize) -> Self {
        self.candidates_per_offer = n.max(1);
        self
    }

    /// Set the number of ingredients per journal page.
    pub fn with_ingredients(mut self, n: usize) -> Self {
        self.ingredients_per_page = n;
        self
    }

    /// Pin the journal date.
    pub fn with_journal_date(mut self, date: NaiveDate) -> Self {
        self.journal_date = Some(date);
        self
    }

    /// Set the minimum intent keyword length (at least 1).
    pub fn with_intent_min_keyword_len(mut self, len: usize) -> Self {
        self.intent_min_keyword_len = len.max(1);
        self
    }
}
