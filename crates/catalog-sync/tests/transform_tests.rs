use proptest::prelude::*;
use serde_json::json;

use catalog_core::constants::{CONTENT_TYPES, LANGUAGES};
use catalog_core::types::{ContentType, Document, Record, Value};
use catalog_sync::DocumentTransformer;

fn transformer() -> DocumentTransformer {
    let types: Vec<ContentType> = CONTENT_TYPES.iter().map(|name| ContentType::new(*name)).collect();
    DocumentTransformer::new(&types)
}

fn record(value: serde_json::Value) -> Record {
    serde_json::from_value(value).unwrap()
}

fn transform(ct: &str, value: serde_json::Value) -> Option<Document> {
    transformer().transform(&ContentType::new(ct), &record(value))
}

#[test]
fn gendered_titles_combine_both_names() {
    let input = json!({ "Name_en": "A", "NameFemale_en": "B" });

    let title = transform("Title", input.clone()).unwrap();
    let item = transform("Item", input).unwrap();

    assert_eq!(title.text("NameCombined_en"), "A B");
    assert_eq!(item.text("NameCombined_en"), "A");
}

#[test]
fn gendered_names_trim_a_missing_variant() {
    let doc = transform("Title", json!({ "Name_en": "the Lost", "NameFemale_ja": "迷子" })).unwrap();

    assert_eq!(doc.text("NameCombined_en"), "the Lost");
    assert_eq!(doc.text("NameCombined_ja"), "迷子");
    assert_eq!(doc.text("NameLocale"), "the Lost 迷子");
}

#[test]
fn balloons_take_names_from_dialogue() {
    let doc = transform(
        "Balloon",
        json!({ "Name_en": "Moogle", "Name_fr": "stale", "Dialogue_en": "Kupo!", "Dialogue_de": "Kupo?" }),
    )
    .unwrap();

    assert_eq!(doc.text("Name_en"), "Kupo!");
    assert_eq!(doc.text("NameCombined_de"), "Kupo?");
    assert_eq!(doc.get("Name_fr"), Some(&Value::from("")));
    assert_eq!(doc.get("Name_ja"), Some(&Value::from("")));
    assert_eq!(doc.text("NameLocale"), "Kupo!  Kupo?");
}

#[test]
fn balloons_without_a_primary_name_are_rejected() {
    assert!(transform("Balloon", json!({ "Dialogue_en": "Kupo!" })).is_none());
    assert!(transform("Balloon", json!({ "Name_en": "", "Dialogue_en": "Kupo!" })).is_none());
}

#[test]
fn quest_step_fields_are_pruned_at_top_level_and_in_previous_quest() {
    let doc = transform(
        "Quest",
        json!({
            "Name_en": "Close to Home",
            "Level0": 1,
            "Level12Target": 5,
            "ScriptInstruction3_en": "SEQ_0",
            "ScriptInstruction3_cn": "SEQ_0",
            "TextData_en": { "Journal": [] },
            "ClassJobLevel0": "1",
            "PreviousQuest0": { "Name_en": "Way of the Archer", "Level4": 2, "ScriptArg9": 0, "ID": "65564" },
            "PreviousQuest1": { "Name_en": "dropped" }
        }),
    )
    .unwrap();

    for field in ["Level0", "Level12Target", "ScriptInstruction3_en", "TextData_en", "PreviousQuest1"] {
        assert!(doc.get(field).is_none(), "{} should be pruned", field);
    }
    assert_eq!(doc.text("ScriptInstruction3_cn"), "SEQ_0");
    assert_eq!(doc.get("ClassJobLevel0"), Some(&Value::Int(1)));

    let Some(Value::Map(previous)) = doc.get("PreviousQuest0") else { panic!("PreviousQuest0 kept") };
    assert!(previous.get("Level4").is_none());
    assert!(previous.get("ScriptArg9").is_none());
    assert_eq!(previous.get("ID"), Some(&Value::Int(65564)));
    assert_eq!(previous.get("Name_en"), Some(&Value::from("Way of the Archer")));
}

#[test]
fn scalar_types_are_consistent_across_records() {
    let first = transform("Item", json!({ "Name_en": "Potion", "PriceMid": "25", "IsUnique": "false", "Name_ja": 42 })).unwrap();
    let second = transform("Item", json!({ "Name_en": "Ether", "PriceMid": 30, "IsUnique": false, "Name_ja": "エーテル" })).unwrap();

    for field in ["PriceMid", "IsUnique", "Name_ja"] {
        assert_eq!(first.get(field).map(Value::kind), second.get(field).map(Value::kind), "{}", field);
    }
    assert_eq!(first.text("Name_ja"), "42");
}

#[test]
fn derived_fields_are_always_text() {
    let doc = transform("Item", json!({ "Name_en": 1234 })).unwrap();

    assert_eq!(doc.get("NameCombined_en"), Some(&Value::from("1234")));
    assert_eq!(doc.get("NameLocale"), Some(&Value::from("1234")));
}

proptest! {
    #[test]
    fn name_locale_joins_combined_names_in_language_order(
        primary in "[A-Za-z][A-Za-z ]{0,8}",
        others in proptest::collection::vec(proptest::option::of("[A-Za-z ]{0,8}"), 5),
    ) {
        let mut input = serde_json::Map::new();
        input.insert("Name_en".into(), json!(primary));
        for (lang, name) in LANGUAGES[1..].iter().zip(&others) {
            if let Some(name) = name {
                input.insert(format!("Name_{}", lang), json!(name));
            }
        }

        let doc = transform("Item", serde_json::Value::Object(input)).unwrap();

        let combined: Vec<String> = LANGUAGES.iter().map(|lang| doc.text(&format!("NameCombined_{}", lang))).collect();
        prop_assert_eq!(doc.text("NameLocale"), combined.join(" ").trim().to_string());
        prop_assert_eq!(&combined[0], primary.trim());
    }
}
