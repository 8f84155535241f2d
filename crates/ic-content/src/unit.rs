use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::model::EntryType;

/// The ids every narrative unit's choices carry, in order.
pub const CHOICE_IDS: [&str; 3] = ["1", "2", "3"];

/// A state mutation attached to a choice.
///
/// Serialized externally tagged, e.g. `{"add_items": {"mint": 1}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    /// Add counts to the inventory.
    AddItems(BTreeMap<String, u32>),
    /// Remove counts from the inventory; never below zero.
    RemoveItems(BTreeMap<String, u32>),
    /// Set flags.
    SetFlags(BTreeSet<String>),
    /// Clear flags.
    ClearFlags(BTreeSet<String>),
    /// Move the player to another place.
    MoveTo(String),
}

/// One of the three options of a narrative unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    /// `"1"`, `"2"` or `"3"`.
    pub choice_id: String,
    /// Text shown to the player.
    pub label: String,
    /// Applied in order when chosen.
    #[serde(default)]
    pub effects: Vec<Effect>,
}

/// The player-facing view of a choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceView {
    /// Choice id.
    pub choice_id: String,
    /// Choice label.
    pub label: String,
}

impl From<&Choice> for ChoiceView {
    fn from(choice: &Choice) -> Self {
        Self {
            choice_id: choice.choice_id.clone(),
            label: choice.label.clone(),
        }
    }
}

/// Generation metadata. Never shown to players.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitDebug {
    /// The seed the unit was generated from.
    pub seed: u64,
    /// The family (narrative shape) drawn.
    pub family: String,
    /// Versioned template id of the family.
    pub template_id: String,
    /// Free-form notes.
    #[serde(default)]
    pub notes: Vec<String>,
}

/// One beat of play: a prompt and exactly three choices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrativeUnit {
    /// Unique unit id.
    pub unit_id: String,
    /// Where the unit takes place.
    pub place_id: String,
    /// Thematic category.
    pub entry_type: EntryType,
    /// Optional title.
    #[serde(default)]
    pub title: Option<String>,
    /// The prompt.
    #[serde(default)]
    pub prompt: Option<String>,
    /// The need this beat speaks to.
    #[serde(default)]
    pub need_hint: Option<String>,
    /// The mood of this beat.
    #[serde(default)]
    pub mood_hint: Option<String>,
    /// Tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Authored conditions; only their presence is recorded.
    #[serde(default)]
    pub conditions: BTreeMap<String, serde_json::Value>,
    /// Exactly three choices.
    pub choices: [Choice; 3],
    /// Generation metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug: Option<UnitDebug>,
}

impl NarrativeUnit {
    /// Look up a choice by id.
    pub fn choice(&self, choice_id: &str) -> Option<&Choice> {
        self.choices.iter().find(|c| c.choice_id == choice_id)
    }

    /// Player-facing views of the three choices.
    pub fn choice_views(&self) -> Vec<ChoiceView> {
        self.choices.iter().map(ChoiceView::from).collect()
    }

    /// Whether this unit was authored rather than generated.
    pub fn is_authored(&self) -> bool {
        self.debug.is_none()
    }

    /// All player-visible text: title, prompt and choice labels.
    pub fn text_fragments(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::with_capacity(5);
        out.extend(self.title.as_deref());
        out.extend(self.prompt.as_deref());
        out.extend(self.choices.iter().map(|c| c.label.as_str()));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn unit_json() -> serde_json::Value {
        json!({
            "unit_id": "kettle_morning",
            "place_id": "cottage_home",
            "entry_type": "tea",
            "prompt": "The kettle ticks as it cools.",
            "choices": [
                {"choice_id": "1", "label": "Pour a cup", "effects": [{"set_flags": ["poured"]}]},
                {"choice_id": "2", "label": "Open the window"},
                {"choice_id": "3", "label": "Step into the garden", "effects": [{"move_to": "cottage_garden"}]}
            ]
        })
    }

    #[test]
    fn deserializes_authored_unit() {
        let unit: NarrativeUnit = serde_json::from_value(unit_json()).unwrap();
        assert!(unit.is_authored());
        assert_eq!(unit.choice("3").unwrap().effects, vec![Effect::MoveTo("cottage_garden".into())]);
        assert!(unit.choice("4").is_none());
    }

    #[test]
    fn rejects_wrong_choice_count() {
        let mut value = unit_json();
        value["choices"].as_array_mut().unwrap().pop();
        assert!(serde_json::from_value::<NarrativeUnit>(value).is_err());
    }

    #[test]
    fn effect_wire_format_is_externally_tagged() {
        let effect = Effect::AddItems(BTreeMap::from([("mint".to_string(), 2)]));
        assert_eq!(serde_json::to_value(&effect).unwrap(), json!({"add_items": {"mint": 2}}));
    }

    #[test]
    fn text_fragments_cover_prompt_and_labels() {
        let unit: NarrativeUnit = serde_json::from_value(unit_json()).unwrap();
        let text = unit.text_fragments();
        assert_eq!(text.len(), 4);
        assert_eq!(text[0], "The kettle ticks as it cools.");
        assert_eq!(unit.choice_views()[1].label, "Open the window");
    }
}
