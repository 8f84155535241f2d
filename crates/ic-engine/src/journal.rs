//! Journal renderer.
//!
//! Turns a narrative unit, the player's state and the picked ingredients into
//! a page: schema-checked front matter plus a body filled in from the entry
//! type's template. Rendering performs no I/O; persisting the page is the
//! caller's job.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use ic_content::schema::{JOURNAL_PAGE, SchemaViolation};
use ic_content::{EntryType, NarrativeUnit, Repository};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::state::PlayerState;

/// Unit tags with this prefix are internal and never reach a page.
const INTERNAL_TAG_PREFIX: &str = "element_";

/// Structured page metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frontmatter {
    /// `<place>_<entry type>_<yyyymmdd>_<tick>`.
    pub page_id: String,
    /// Page date.
    pub date: NaiveDate,
    /// Where the page was written.
    pub place_id: String,
    /// Thematic category.
    pub entry_type: EntryType,
    /// Page mood.
    pub mood: String,
    /// The need the page speaks to.
    pub need: String,
    /// Picked ingredient ids.
    pub ingredients: Vec<String>,
    /// Page tags.
    pub tags: Vec<String>,
    /// The unit the page was rendered from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_id: Option<String>,
}

/// A rendered journal page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalPage {
    /// Structured metadata.
    pub frontmatter: Frontmatter,
    /// Free-text body.
    pub body: String,
}

impl JournalPage {
    /// The page as Markdown with `---` delimited front matter.
    pub fn to_markdown(&self) -> String {
        let fm = &self.frontmatter;
        let mut out = String::from("---\n");
        out.push_str(&format!("page_id: {}\n", fm.page_id));
        out.push_str(&format!("date: {}\n", fm.date.format("%Y-%m-%d")));
        out.push_str(&format!("place_id: {}\n", fm.place_id));
        out.push_str(&format!("entry_type: {}\n", fm.entry_type));
        out.push_str(&format!("mood: {}\n", fm.mood));
        out.push_str(&format!("need: {}\n", fm.need));
        out.push_str(&format!("ingredients: [{}]\n", fm.ingredients.join(", ")));
        out.push_str(&format!("tags: [{}]\n", fm.tags.join(", ")));
        if let Some(unit_id) = &fm.unit_id {
            out.push_str(&format!("unit_id: {unit_id}\n"));
        }
        out.push_str("---\n\n");
        out.push_str(&self.body);
        if !self.body.ends_with('\n') {
            out.push('\n');
        }
        out
    }
}

/// Call-specific inputs that are not part of the unit or state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContext {
    /// The page date. Metadata only; never used for selection.
    pub date: NaiveDate,
    /// Label of the choice that was made, if any.
    pub choice: Option<String>,
}

/// Render a page for `unit` at `place_id`.
///
/// Uses the first template registered for `entry_type`. The page need comes
/// from the first picked ingredient, then the unit, then the entry type. Page
/// tags are the unit's, the template's and the picked ingredients' tags.
pub fn render(
    place_id: &str,
    entry_type: EntryType,
    unit: &NarrativeUnit,
    state: &PlayerState,
    repo: &Repository,
    ingredient_picks: &[String],
    ctx: &PageContext,
) -> EngineResult<JournalPage> {
    let template = repo
        .templates_for(entry_type)
        .next()
        .ok_or(EngineError::MissingTemplate(entry_type))?;
    let place = repo
        .place(place_id)
        .map_err(|_| EngineError::UnknownPlace(place_id.to_string()))?;

    let need = ingredient_picks
        .first()
        .and_then(|id| repo.item(id).ok())
        .and_then(|item| item.player_need_satisfied.clone())
        .or_else(|| unit.need_hint.clone())
        .unwrap_or_else(|| entry_type.need().to_string());
    let mood = unit
        .mood_hint
        .clone()
        .unwrap_or_else(|| entry_type.mood().to_string());

    let ingredient_tags: BTreeSet<&str> = ingredient_picks
        .iter()
        .filter_map(|id| repo.item(id).ok())
        .flat_map(|item| item.tags.iter().map(String::as_str))
        .collect();
    let mut tags: Vec<String> = Vec::new();
    for tag in unit
        .tags
        .iter()
        .chain(&template.tags)
        .map(String::as_str)
        .chain(ingredient_tags)
    {
        if !tag.starts_with(INTERNAL_TAG_PREFIX) && !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }

    let frontmatter = Frontmatter {
        page_id: format!(
            "{place_id}_{entry_type}_{}_{}",
            ctx.date.format("%Y%m%d"),
            state.time_tick
        ),
        date: ctx.date,
        place_id: place_id.to_string(),
        entry_type,
        mood,
        need,
        ingredients: ingredient_picks.to_vec(),
        tags,
        unit_id: Some(unit.unit_id.clone()),
    };

    let ingredient_names: Vec<&str> = ingredient_picks
        .iter()
        .map(|id| repo.item(id).map(|i| i.name()).unwrap_or(id.as_str()))
        .collect();
    let ingredients = if ingredient_names.is_empty() {
        "nothing yet".to_string()
    } else {
        ingredient_names.join(", ")
    };
    let choice = ctx
        .choice
        .as_deref()
        .map(lower_first)
        .unwrap_or_else(|| "wait and see".to_string());

    let body = fill(&template.body, |key| match key {
        "prompt" => Some(unit.prompt.clone().unwrap_or_default()),
        "title" => Some(unit.title.clone().unwrap_or_else(|| place.name().to_string())),
        "place_id" => Some(place_id.to_string()),
        "place_name" => Some(place.name().to_string()),
        "entry_type" => Some(entry_type.to_string()),
        "mood" => Some(frontmatter.mood.clone()),
        "need" => Some(frontmatter.need.clone()),
        "ingredients" => Some(ingredients.clone()),
        "choice" => Some(choice.clone()),
        _ => None,
    });

    let value = serde_json::to_value(&frontmatter).map_err(|e| SchemaViolation {
        schema: JOURNAL_PAGE.to_string(),
        path: "$".to_string(),
        message: e.to_string(),
    })?;
    repo.schemas().validate(JOURNAL_PAGE, &value)?;

    Ok(JournalPage { frontmatter, body })
}

/// Replace `{{key}}` placeholders. Unknown keys and unterminated braces are
/// left as written.
fn fill(pattern: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut rest = pattern;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };
        let key = after[..end].trim();
        match lookup(key) {
            Some(value) => out.push_str(&value),
            None => out.push_str(&rest[start..start + 2 + end + 2]),
        }
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    out
}

fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{authored_unit, repo_with, sample_repo, sample_set};
    use ic_content::{BuiltinSchemas, SchemaValidator};

    fn ctx(choice: Option<&str>) -> PageContext {
        PageContext {
            date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            choice: choice.map(str::to_string),
        }
    }

    #[test]
    fn renders_tea_page() {
        let repo = sample_repo();
        let mut state = PlayerState::new("s", "cottage_home");
        state.time_tick = 4;
        let unit = authored_unit();
        let picks = vec!["honey".to_string(), "mint".to_string()];
        let page = render(
            "cottage_home",
            EntryType::Tea,
            &unit,
            &state,
            &repo,
            &picks,
            &ctx(Some("Spoon honey into a cup")),
        )
        .unwrap();

        assert_eq!(page.frontmatter.page_id, "cottage_home_tea_20260301_4");
        assert_eq!(page.frontmatter.need, "comfort");
        assert_eq!(page.frontmatter.mood, "soft");
        assert_eq!(page.frontmatter.ingredients, picks);
        assert_eq!(page.frontmatter.tags, vec!["authored", "journal"]);
        assert!(page.body.starts_with("# The Morning Kettle\n"));
        assert!(page.body.contains("I chose to spoon honey into a cup."));
        assert!(page.body.contains("In the cup: honey, mint."));
    }

    #[test]
    fn unknown_placeholders_stay_verbatim() {
        let repo = sample_repo();
        let state = PlayerState::new("s", "cottage_home");
        let page = render(
            "cottage_home",
            EntryType::Tea,
            &authored_unit(),
            &state,
            &repo,
            &[],
            &ctx(None),
        )
        .unwrap();
        assert!(page.body.contains("{{unknown}}"));
        assert!(page.body.contains("I chose to wait and see."));
        assert!(page.body.contains("In the cup: nothing yet."));
    }

    #[test]
    fn need_falls_back_to_first_ingredient_then_entry_type() {
        let repo = sample_repo();
        let state = PlayerState::new("s", "cottage_garden");
        let mut unit = authored_unit();
        unit.need_hint = None;

        let picks = vec!["chamomile".to_string()];
        let page = render(
            "cottage_garden",
            EntryType::Tea,
            &unit,
            &state,
            &repo,
            &picks,
            &ctx(None),
        )
        .unwrap();
        assert_eq!(page.frontmatter.need, "rest");

        let page = render(
            "cottage_garden",
            EntryType::Tea,
            &unit,
            &state,
            &repo,
            &[],
            &ctx(None),
        )
        .unwrap();
        assert_eq!(page.frontmatter.need, "comfort");
    }

    #[test]
    fn internal_tags_are_dropped() {
        let repo = sample_repo();
        let state = PlayerState::new("s", "cottage_home");
        let mut unit = authored_unit();
        unit.tags = vec!["element_water".into(), "journal".into(), "morning".into()];
        let page = render(
            "cottage_home",
            EntryType::Tea,
            &unit,
            &state,
            &repo,
            &[],
            &ctx(None),
        )
        .unwrap();
        assert_eq!(page.frontmatter.tags, vec!["journal", "morning"]);
    }

    #[test]
    fn ingredient_need_wins_over_unit_hint() {
        let repo = sample_repo();
        let state = PlayerState::new("s", "cottage_garden");
        let unit = authored_unit();
        assert!(unit.need_hint.is_some());
        let page = render(
            "cottage_garden",
            EntryType::Tea,
            &unit,
            &state,
            &repo,
            &["chamomile".to_string(), "mint".to_string()],
            &ctx(None),
        )
        .unwrap();
        assert_eq!(page.frontmatter.need, "rest");
    }

    #[test]
    fn ingredient_tags_join_the_page_without_internal_ones() {
        let mut set = sample_set();
        for item in &mut set.items {
            match item.item_id.as_str() {
                "honey" => item.tags = vec!["sweet".into(), "herb".into()],
                "mint" => item.tags = vec!["herb".into(), "element_air".into()],
                _ => {}
            }
        }
        let repo = repo_with(set);
        let state = PlayerState::new("s", "cottage_home");
        let page = render(
            "cottage_home",
            EntryType::Tea,
            &authored_unit(),
            &state,
            &repo,
            &["honey".to_string(), "mint".to_string()],
            &ctx(None),
        )
        .unwrap();
        assert_eq!(
            page.frontmatter.tags,
            vec!["authored", "journal", "herb", "sweet"]
        );
    }

    #[test]
    fn missing_template_is_an_error() {
        let repo = sample_repo();
        let state = PlayerState::new("s", "cottage_home");
        let err = render(
            "cottage_home",
            EntryType::DreamFragment,
            &authored_unit(),
            &state,
            &repo,
            &[],
            &ctx(None),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::MissingTemplate(EntryType::DreamFragment)));
    }

    #[test]
    fn frontmatter_matches_journal_schema() {
        let repo = sample_repo();
        let state = PlayerState::new("s", "shrine_of_dawn");
        let page = render(
            "shrine_of_dawn",
            EntryType::Spell,
            &authored_unit(),
            &state,
            &repo,
            &["dawn_candle".to_string()],
            &ctx(Some("Light the candle")),
        )
        .unwrap();
        let value = serde_json::to_value(&page.frontmatter).unwrap();
        assert!(BuiltinSchemas.validate(JOURNAL_PAGE, &value).is_ok());
        assert!(page.body.contains("At shrine_of_dawn:"));
    }

    #[test]
    fn markdown_has_front_matter_block() {
        let repo = sample_repo();
        let state = PlayerState::new("s", "cottage_home");
        let page = render(
            "cottage_home",
            EntryType::Tea,
            &authored_unit(),
            &state,
            &repo,
            &["honey".to_string()],
            &ctx(None),
        )
        .unwrap();
        let md = page.to_markdown();
        assert!(md.starts_with("---\npage_id: cottage_home_tea_20260301_0\n"));
        assert!(md.contains("date: 2026-03-01\n"));
        assert!(md.contains("ingredients: [honey]\n"));
        assert!(md.contains("unit_id: kettle_morning\n---\n\n# The Morning Kettle"));
    }

    #[test]
    fn fill_handles_edge_cases() {
        let lookup = |k: &str| (k == "a").then(|| "X".to_string());
        assert_eq!(fill("{{a}}-{{ a }}-{{b}}", lookup), "X-X-{{b}}");
        assert_eq!(fill("open {{a", lookup), "open {{a");
        assert_eq!(fill("no slots", lookup), "no slots");
    }
}
