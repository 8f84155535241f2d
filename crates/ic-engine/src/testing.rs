//! Shared fixtures for unit tests.

use ic_content::{
    ContentSet, EntryType, Item, JournalTemplate, LexiconEntry, LexiconScope, LexiconType,
    NarrativeUnit, OriginScope, Place, Repository,
};

pub fn place(id: &str, zone: &str, threshold: bool) -> Place {
    Place {
        place_id: id.into(),
        zone_id: zone.into(),
        is_threshold: threshold,
        display_name: None,
        description: None,
        tags: vec![],
    }
}

pub fn item(id: &str, origin: &str) -> Item {
    Item {
        item_id: id.into(),
        display_name: None,
        origin_scope: OriginScope::Place,
        origin_ref: Some(origin.into()),
        tags: vec![],
        player_need_satisfied: None,
        entry_types: vec![],
    }
}

pub fn lexicon(key: &str, ty: LexiconType, scope: &str, words: &[&str]) -> LexiconEntry {
    LexiconEntry {
        key: key.into(),
        lexicon_type: ty,
        scope: LexiconScope::from(scope.to_string()),
        words: words.iter().map(|w| w.to_string()).collect(),
    }
}

pub fn template(id: &str, entry_type: EntryType, body: &str) -> JournalTemplate {
    JournalTemplate {
        template_id: id.into(),
        entry_type,
        body: body.into(),
        tags: vec!["journal".into()],
    }
}

pub fn authored_unit() -> NarrativeUnit {
    serde_json::from_value(serde_json::json!({
        "unit_id": "kettle_morning",
        "place_id": "cottage_home",
        "entry_type": "tea",
        "title": "The Morning Kettle",
        "prompt": "The kettle ticks as it cools.",
        "need_hint": "comfort",
        "tags": ["authored"],
        "choices": [
            {"choice_id": "1", "label": "Spoon honey into a cup",
             "effects": [{"add_items": {"honey": 1}}]},
            {"choice_id": "2", "label": "Open the window",
             "effects": [{"set_flags": ["window_open"]}]},
            {"choice_id": "3", "label": "Step into the garden",
             "effects": [{"move_to": "cottage_garden"}]}
        ]
    }))
    .unwrap()
}

pub fn repo_with(set: ContentSet) -> Repository {
    Repository::from_content(set).unwrap()
}

/// A small world: a two-place cottage zone, a threshold shrine, a lone
/// beach, lexicons, tea and spell templates, and one authored unit.
pub fn sample_set() -> ContentSet {
    let mut candle = item("dawn_candle", "shrine_of_dawn");
    candle.entry_types = vec![EntryType::Spell];
    let mut stone = item("pale_stone", "shrine_of_dawn");
    stone.entry_types = vec![EntryType::Spell];
    let mut chamomile = item("chamomile", "cottage_garden");
    chamomile.player_need_satisfied = Some("rest".into());

    ContentSet {
        places: vec![
            place("cottage_home", "cottage", false),
            place("cottage_garden", "cottage", false),
            place("shrine_of_dawn", "hills", true),
            place("meadow_path", "hills", false),
            place("beach", "coast", false),
        ],
        items: vec![
            item("honey", "cottage_home"),
            chamomile,
            item("mint", "cottage_garden"),
            item("balm", "cottage_garden"),
            candle,
            stone,
            item("clover", "meadow_path"),
            item("shell", "beach"),
        ],
        lexicon: vec![
            lexicon("g", LexiconType::Sensory, "Global", &["quiet", "soft"]),
            lexicon("home", LexiconType::Sensory, "cottage_home", &["steam", "kettle"]),
            lexicon("cottage", LexiconType::Sensory, "cottage", &["mossy"]),
            lexicon("hills", LexiconType::Sensory, "hills", &["golden"]),
            lexicon("ban", LexiconType::NotAllowed, "Global", &["gore", "scream"]),
        ],
        templates: vec![
            template(
                "tea_page",
                EntryType::Tea,
                "# {{title}}\n{{prompt}}\nI chose to {{choice}}.\nIn the cup: {{ingredients}}. {{unknown}}\n",
            ),
            template(
                "spell_page",
                EntryType::Spell,
                "# {{title}}\nAt {{place_name}}: {{prompt}}\nGathered: {{ingredients}}.\n",
            ),
        ],
        units: vec![authored_unit()],
        ..ContentSet::default()
    }
}

pub fn sample_repo() -> Repository {
    repo_with(sample_set())
}
