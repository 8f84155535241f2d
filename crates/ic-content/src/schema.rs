use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::model::EntryType;
use crate::unit::CHOICE_IDS;

/// Schema for `places.json`.
pub const PLACES: &str = "places";
/// Schema for `npcs.json`.
pub const NPCS: &str = "npcs";
/// Schema for `collectibles.json`.
pub const COLLECTIBLES: &str = "collectibles";
/// Schema for `interactions.json`.
pub const INTERACTIONS: &str = "interactions";
/// Schema for `tea.json`.
pub const TEA: &str = "tea";
/// Schema for `spells.json`.
pub const SPELLS: &str = "spells";
/// Schema for `journal_templates.json`.
pub const JOURNAL_TEMPLATES: &str = "journal_templates";
/// Schema for both lexicon files.
pub const LEXICON: &str = "lexicon";
/// Schema for `storylets.json`.
pub const NARRATIVE_UNITS: &str = "narrative_units";
/// Schema for a single narrative unit.
pub const NARRATIVE_UNIT: &str = "narrative_unit";
/// Schema for journal page front matter.
pub const JOURNAL_PAGE: &str = "journal_page";

/// A schema mismatch, located by a JSON path such as `$.places[2].zone_id`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{schema}: {path}: {message}")]
pub struct SchemaViolation {
    /// The schema that was checked.
    pub schema: String,
    /// Where in the instance the mismatch is.
    pub path: String,
    /// What is wrong.
    pub message: String,
}

/// The external "validate instance against schema" capability.
///
/// The repository holds one of these and hands it to anything that builds
/// objects which must match a schema at runtime.
pub trait SchemaValidator: Send + Sync {
    /// Check `instance` against the schema named `schema`.
    fn validate(&self, schema: &str, instance: &Value) -> Result<(), SchemaViolation>;
}

/// Structural checks for every schema the engine uses.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinSchemas;

impl SchemaValidator for BuiltinSchemas {
    fn validate(&self, schema: &str, instance: &Value) -> Result<(), SchemaViolation> {
        let check = Checker { schema };
        match schema {
            PLACES => check.collection(instance, "places", PLACE_FIELDS, None),
            NPCS => check.collection(instance, "npcs", NPC_FIELDS, None),
            COLLECTIBLES => check.collection(instance, "collectibles", ITEM_FIELDS, None),
            INTERACTIONS => check.collection(instance, "interactions", INTERACTION_FIELDS, None),
            TEA => check.collection(instance, "tea_recipes", RECIPE_FIELDS, Some(ingredients)),
            SPELLS => check.collection(instance, "spells", RECIPE_FIELDS, Some(ingredients)),
            JOURNAL_TEMPLATES => {
                check.collection(instance, "journal_templates", TEMPLATE_FIELDS, None)
            }
            LEXICON => check.collection(instance, "lexicon", LEXICON_FIELDS, None),
            NARRATIVE_UNITS => check.collection(instance, "storylets", UNIT_FIELDS, Some(choices)),
            NARRATIVE_UNIT => check.record(instance, "$", UNIT_FIELDS, Some(choices)),
            JOURNAL_PAGE => check.record(instance, "$", PAGE_FIELDS, None),
            other => Err(check.fail("$", format!("unknown schema \"{other}\""))),
        }
    }
}

// ---------------------------------------------------------------------------
// Field tables
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
enum FieldType {
    Id,
    Str,
    Bool,
    StrList,
    List,
    Object,
    EntryType,
    EntryTypeList,
    LexiconType,
    Date,
}

#[derive(Debug, Clone, Copy)]
struct Field {
    name: &'static str,
    ty: FieldType,
    required: bool,
}

const fn req(name: &'static str, ty: FieldType) -> Field {
    Field { name, ty, required: true }
}

const fn opt(name: &'static str, ty: FieldType) -> Field {
    Field { name, ty, required: false }
}

use FieldType as T;

const PLACE_FIELDS: &[Field] = &[
    req("place_id", T::Id),
    req("zone_id", T::Id),
    opt("is_threshold", T::Bool),
    opt("display_name", T::Str),
    opt("description", T::Str),
    opt("tags", T::StrList),
];

const NPC_FIELDS: &[Field] = &[
    req("npc_id", T::Id),
    opt("npc_kind", T::Str),
    opt("display_name", T::Str),
    opt("home_place_id", T::Str),
    opt("description", T::Str),
];

const ITEM_FIELDS: &[Field] = &[
    req("item_id", T::Id),
    req("origin_scope", T::Str),
    opt("origin_ref", T::Str),
    opt("display_name", T::Str),
    opt("tags", T::StrList),
    opt("player_need_satisfied", T::Str),
    opt("entry_types", T::EntryTypeList),
];

const INTERACTION_FIELDS: &[Field] = &[
    req("interaction_id", T::Id),
    req("npc_kind", T::Str),
    opt("conditions", T::Object),
    opt("prompt", T::Str),
];

const RECIPE_FIELDS: &[Field] = &[
    req("recipe_id", T::Id),
    req("ingredients", T::List),
    opt("display_name", T::Str),
    opt("intent", T::Str),
    opt("target_need", T::Str),
    opt("steps", T::StrList),
    opt("sensory_prompt", T::Str),
];

const INGREDIENT_FIELDS: &[Field] = &[
    req("ingredient_ref", T::Id),
    opt("role", T::Str),
    opt("quantity", T::Str),
];

const TEMPLATE_FIELDS: &[Field] = &[
    req("template_id", T::Id),
    req("entry_type", T::EntryType),
    req("body", T::Str),
    opt("tags", T::StrList),
];

const LEXICON_FIELDS: &[Field] = &[
    req("key", T::Id),
    req("lexicon_type", T::LexiconType),
    req("scope", T::Id),
    req("words", T::StrList),
];

const UNIT_FIELDS: &[Field] = &[
    req("unit_id", T::Id),
    req("place_id", T::Id),
    req("entry_type", T::EntryType),
    req("choices", T::List),
    opt("title", T::Str),
    opt("prompt", T::Str),
    opt("need_hint", T::Str),
    opt("mood_hint", T::Str),
    opt("tags", T::StrList),
    opt("conditions", T::Object),
    opt("debug", T::Object),
];

const CHOICE_FIELDS: &[Field] = &[
    req("choice_id", T::Id),
    req("label", T::Id),
    opt("effects", T::List),
];

const EFFECT_KEYS: [&str; 5] = [
    "add_items",
    "remove_items",
    "set_flags",
    "clear_flags",
    "move_to",
];

const PAGE_FIELDS: &[Field] = &[
    req("page_id", T::Id),
    req("date", T::Date),
    req("place_id", T::Id),
    req("entry_type", T::EntryType),
    req("mood", T::Str),
    req("need", T::Str),
    req("ingredients", T::StrList),
    req("tags", T::StrList),
    opt("unit_id", T::Str),
];

// ---------------------------------------------------------------------------
// Checker
// ---------------------------------------------------------------------------

type Extra = fn(&Checker<'_>, &Map<String, Value>, &str) -> Result<(), SchemaViolation>;

struct Checker<'a> {
    schema: &'a str,
}

impl Checker<'_> {
    fn fail(&self, path: &str, message: impl Into<String>) -> SchemaViolation {
        SchemaViolation {
            schema: self.schema.to_string(),
            path: path.to_string(),
            message: message.into(),
        }
    }

    fn collection(
        &self,
        instance: &Value,
        key: &str,
        fields: &[Field],
        extra: Option<Extra>,
    ) -> Result<(), SchemaViolation> {
        let obj = instance
            .as_object()
            .ok_or_else(|| self.fail("$", "expected an object"))?;
        if obj.len() != 1 || !obj.contains_key(key) {
            return Err(self.fail("$", format!("expected exactly one top-level key \"{key}\"")));
        }
        let entries = obj[key]
            .as_array()
            .ok_or_else(|| self.fail(&format!("$.{key}"), "expected an array"))?;
        for (i, entry) in entries.iter().enumerate() {
            self.record(entry, &format!("$.{key}[{i}]"), fields, extra)?;
        }
        Ok(())
    }

    fn record(
        &self,
        value: &Value,
        path: &str,
        fields: &[Field],
        extra: Option<Extra>,
    ) -> Result<(), SchemaViolation> {
        let map = value
            .as_object()
            .ok_or_else(|| self.fail(path, "expected an object"))?;
        for field in fields {
            let field_path = format!("{path}.{}", field.name);
            match map.get(field.name) {
                None | Some(Value::Null) if field.required => {
                    return Err(self.fail(&field_path, "missing required field"));
                }
                None | Some(Value::Null) => {}
                Some(v) => self.field(v, &field_path, field.ty)?,
            }
        }
        match extra {
            Some(extra) => extra(self, map, path),
            None => Ok(()),
        }
    }

    fn field(&self, v: &Value, path: &str, ty: FieldType) -> Result<(), SchemaViolation> {
        let ok = match ty {
            T::Id => v.as_str().is_some_and(|s| !s.trim().is_empty()),
            T::Str => v.is_string(),
            T::Bool => v.is_boolean(),
            T::List => v.is_array(),
            T::Object => v.is_object(),
            T::StrList => v
                .as_array()
                .is_some_and(|a| a.iter().all(Value::is_string)),
            T::EntryType => v.as_str().and_then(EntryType::parse).is_some(),
            T::EntryTypeList => v.as_array().is_some_and(|a| {
                a.iter()
                    .all(|t| t.as_str().and_then(EntryType::parse).is_some())
            }),
            T::LexiconType => matches!(v.as_str(), Some("Sensory" | "Not_Allowed")),
            T::Date => v
                .as_str()
                .is_some_and(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()),
        };
        if ok {
            Ok(())
        } else {
            Err(self.fail(path, format!("expected {}", describe(ty))))
        }
    }
}

fn describe(ty: FieldType) -> &'static str {
    match ty {
        T::Id => "a non-empty string",
        T::Str => "a string",
        T::Bool => "a boolean",
        T::List => "an array",
        T::Object => "an object",
        T::StrList => "an array of strings",
        T::EntryType => "one of tea, spell, field_note, dream_fragment",
        T::EntryTypeList => "an array of entry types",
        T::LexiconType => "one of Sensory, Not_Allowed",
        T::Date => "a YYYY-MM-DD date",
    }
}

fn ingredients(
    check: &Checker<'_>,
    map: &Map<String, Value>,
    path: &str,
) -> Result<(), SchemaViolation> {
    let list = map.get("ingredients").and_then(Value::as_array);
    for (i, ingredient) in list.into_iter().flatten().enumerate() {
        check.record(
            ingredient,
            &format!("{path}.ingredients[{i}]"),
            INGREDIENT_FIELDS,
            None,
        )?;
    }
    Ok(())
}

fn choices(
    check: &Checker<'_>,
    map: &Map<String, Value>,
    path: &str,
) -> Result<(), SchemaViolation> {
    let list = map
        .get("choices")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    if list.len() != CHOICE_IDS.len() {
        return Err(check.fail(
            &format!("{path}.choices"),
            format!("expected exactly 3 choices, found {}", list.len()),
        ));
    }
    for (i, (choice, expected)) in list.iter().zip(CHOICE_IDS).enumerate() {
        let choice_path = format!("{path}.choices[{i}]");
        check.record(choice, &choice_path, CHOICE_FIELDS, Some(effects))?;
        if choice.get("choice_id").and_then(Value::as_str) != Some(expected) {
            return Err(check.fail(
                &format!("{choice_path}.choice_id"),
                format!("expected \"{expected}\""),
            ));
        }
    }
    Ok(())
}

fn effects(
    check: &Checker<'_>,
    map: &Map<String, Value>,
    path: &str,
) -> Result<(), SchemaViolation> {
    let list = map.get("effects").and_then(Value::as_array);
    for (i, effect) in list.into_iter().flatten().enumerate() {
        let known = effect
            .as_object()
            .is_some_and(|o| o.len() == 1 && o.keys().all(|k| EFFECT_KEYS.contains(&k.as_str())));
        if !known {
            return Err(check.fail(
                &format!("{path}.effects[{i}]"),
                format!("expected one of {}", EFFECT_KEYS.join(", ")),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn unit() -> Value {
        json!({
            "unit_id": "u1",
            "place_id": "cottage_home",
            "entry_type": "tea",
            "choices": [
                {"choice_id": "1", "label": "a"},
                {"choice_id": "2", "label": "b", "effects": [{"set_flags": ["x"]}]},
                {"choice_id": "3", "label": "c"}
            ]
        })
    }

    #[test]
    fn accepts_well_formed_collection() {
        let doc = json!({"places": [{"place_id": "cottage_home", "zone_id": "cottage"}]});
        assert!(BuiltinSchemas.validate(PLACES, &doc).is_ok());
    }

    #[test]
    fn rejects_extra_top_level_key() {
        let doc = json!({"places": [], "npcs": []});
        let err = BuiltinSchemas.validate(PLACES, &doc).unwrap_err();
        assert_eq!(err.path, "$");
    }

    #[test]
    fn reports_path_of_missing_id() {
        let doc = json!({"places": [
            {"place_id": "a", "zone_id": "z"},
            {"zone_id": "z"}
        ]});
        let err = BuiltinSchemas.validate(PLACES, &doc).unwrap_err();
        assert_eq!(err.path, "$.places[1].place_id");
        assert_eq!(err.message, "missing required field");
    }

    #[test]
    fn empty_id_is_rejected() {
        let doc = json!({"npcs": [{"npc_id": "  "}]});
        assert!(BuiltinSchemas.validate(NPCS, &doc).is_err());
    }

    #[test]
    fn lexicon_type_is_enumerated() {
        let doc = json!({"lexicon": [
            {"key": "k", "lexicon_type": "Smelly", "scope": "Global", "words": []}
        ]});
        let err = BuiltinSchemas.validate(LEXICON, &doc).unwrap_err();
        assert_eq!(err.path, "$.lexicon[0].lexicon_type");
    }

    #[test]
    fn ingredients_need_refs() {
        let doc = json!({"tea_recipes": [
            {"recipe_id": "r", "ingredients": [{"role": "base"}]}
        ]});
        let err = BuiltinSchemas.validate(TEA, &doc).unwrap_err();
        assert_eq!(err.path, "$.tea_recipes[0].ingredients[0].ingredient_ref");
    }

    #[test]
    fn unit_needs_exactly_three_choices() {
        assert!(BuiltinSchemas.validate(NARRATIVE_UNIT, &unit()).is_ok());
        let mut two = unit();
        two["choices"].as_array_mut().unwrap().pop();
        let err = BuiltinSchemas.validate(NARRATIVE_UNIT, &two).unwrap_err();
        assert!(err.message.contains("exactly 3"));
    }

    #[test]
    fn unit_choice_ids_are_fixed() {
        let mut v = unit();
        v["choices"][2]["choice_id"] = json!("9");
        let err = BuiltinSchemas.validate(NARRATIVE_UNIT, &v).unwrap_err();
        assert_eq!(err.path, "$.choices[2].choice_id");
    }

    #[test]
    fn unknown_effect_is_rejected() {
        let mut v = unit();
        v["choices"][0]["effects"] = json!([{"teleport": "moon"}]);
        assert!(BuiltinSchemas.validate(NARRATIVE_UNIT, &v).is_err());
    }

    #[test]
    fn journal_page_date_must_parse() {
        let mut page = json!({
            "page_id": "p",
            "date": "2026-03-01",
            "place_id": "cottage_home",
            "entry_type": "tea",
            "mood": "soft",
            "need": "comfort",
            "ingredients": ["mint"],
            "tags": []
        });
        assert!(BuiltinSchemas.validate(JOURNAL_PAGE, &page).is_ok());
        page["date"] = json!("March first");
        assert!(BuiltinSchemas.validate(JOURNAL_PAGE, &page).is_err());
    }

    #[test]
    fn unknown_schema_name_is_a_violation() {
        assert!(BuiltinSchemas.validate("potions", &json!({})).is_err());
    }
}
