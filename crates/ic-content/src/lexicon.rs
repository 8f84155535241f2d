use crate::model::LexiconType;
use crate::repository::Repository;

/// Allowed descriptive words for a place.
///
/// The union of every `Sensory` entry scoped `Global`, to `place_id`, or to
/// `zone_id`, in load order with duplicates removed.
pub fn descriptive_words(repo: &Repository, place_id: &str, zone_id: &str) -> Vec<String> {
    let mut words: Vec<String> = Vec::new();
    for entry in repo
        .lexicon()
        .iter()
        .filter(|e| e.lexicon_type == LexiconType::Sensory && e.applies_to(place_id, zone_id))
    {
        for word in &entry.words {
            let word = word.trim();
            if !word.is_empty() && !words.iter().any(|w| w == word) {
                words.push(word.to_string());
            }
        }
    }
    words
}

/// Whether `candidate` contains any not-allowed word.
///
/// Case-insensitive substring match, so "Gored" is caught by "gore".
pub fn is_banned(candidate: &str, repo: &Repository) -> bool {
    let lower = candidate.to_lowercase();
    repo.banned_words().iter().any(|w| lower.contains(w.as_str()))
}

/// The first not-allowed word found in `candidate`, if any.
pub fn first_banned<'r>(candidate: &str, repo: &'r Repository) -> Option<&'r str> {
    let lower = candidate.to_lowercase();
    repo.banned_words()
        .iter()
        .find(|w| lower.contains(w.as_str()))
        .map(String::as_str)
}
