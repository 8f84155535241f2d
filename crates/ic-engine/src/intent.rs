//! Mapping free-text player input to an offered choice.
//!
//! Deliberately simple: substring and keyword matching only.

use ic_content::ChoiceView;

/// Find the choice that `input` most plausibly refers to.
///
/// In order: a choice whose whole label appears in the input, then the
/// choice sharing the most keywords (label words of at least
/// `min_keyword_len` characters) with the input, then a bare choice id.
/// A keyword tie is ambiguous and matches nothing.
pub fn match_intent<'c>(
    input: &str,
    choices: &'c [ChoiceView],
    min_keyword_len: usize,
) -> Option<&'c ChoiceView> {
    let lower = input.trim().to_lowercase();
    if lower.is_empty() {
        return None;
    }

    if let Some(c) = choices
        .iter()
        .find(|c| lower.contains(&c.label.to_lowercase()))
    {
        return Some(c);
    }

    let input_words: Vec<&str> = words(&lower).collect();
    let mut best: Option<(&ChoiceView, usize)> = None;
    let mut tied = false;
    for choice in choices {
        let label = choice.label.to_lowercase();
        let score = words(&label)
            .filter(|w| w.chars().count() >= min_keyword_len)
            .filter(|w| input_words.contains(w))
            .count();
        if score == 0 {
            continue;
        }
        match best {
            Some((_, top)) if score < top => {}
            Some((_, top)) if score == top => tied = true,
            _ => {
                best = Some((choice, score));
                tied = false;
            }
        }
    }
    if let Some((choice, _)) = best {
        return (!tied).then_some(choice);
    }

    choices.iter().find(|c| c.choice_id == lower)
}

fn words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn views() -> Vec<ChoiceView> {
        [
            ("1", "Spoon honey into a cup"),
            ("2", "Open the window"),
            ("3", "Step into the garden"),
        ]
        .iter()
        .map(|(id, label)| ChoiceView {
            choice_id: id.to_string(),
            label: label.to_string(),
        })
        .collect()
    }

    #[test]
    fn whole_label_match() {
        let v = views();
        let m = match_intent("I want to OPEN THE WINDOW please", &v, 4).unwrap();
        assert_eq!(m.choice_id, "2");
    }

    #[test]
    fn keyword_match() {
        let v = views();
        assert_eq!(match_intent("honey, definitely", &v, 4).unwrap().choice_id, "1");
        assert_eq!(match_intent("go to the garden", &v, 4).unwrap().choice_id, "3");
    }

    #[test]
    fn short_words_are_not_keywords() {
        let v = views();
        assert!(match_intent("the", &v, 4).is_none());
    }

    #[test]
    fn tie_is_ambiguous() {
        let v = views();
        assert!(match_intent("honey or window?", &v, 4).is_none());
    }

    #[test]
    fn bare_id_match() {
        let v = views();
        assert_eq!(match_intent(" 3 ", &v, 4).unwrap().choice_id, "3");
        assert!(match_intent("7", &v, 4).is_none());
    }

    #[test]
    fn empty_input_matches_nothing() {
        assert!(match_intent("   ", &views(), 4).is_none());
    }
}
