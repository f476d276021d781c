use std::collections::BTreeMap;
use tempfile::TempDir;

use catalog_core::mapping::IndexMapping;
use catalog_core::traits::SearchIndex;
use catalog_core::types::{Document, RefreshInterval, SettingsPatch, Value};
use catalog_core::Error;
use catalog_text::TantivySearchIndex;

fn doc(pairs: &[(&str, Value)]) -> Document {
	Document::new(pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect())
}

fn named(id: i64, name: &str) -> Document {
	doc(&[("ID", Value::Int(id)), ("Name_en", Value::from(name)), ("NameLocale", Value::from(name))])
}

fn fresh(name: &str) -> (TempDir, TantivySearchIndex) {
	let tmp = TempDir::new().unwrap();
	let index = TantivySearchIndex::new(tmp.path().join("indexes")).expect("index root");
	index.create_index(name, &IndexMapping::game_data("search")).expect("create");
	(tmp, index)
}

#[test]
fn bulk_documents_are_searchable_by_id() {
	let (_tmp, index) = fresh("item");
	let docs = BTreeMap::from([(1, named(1, "Potion")), (2, named(2, "Ether"))]);
	let response = index.bulk_index("item", "search", &docs).expect("bulk");
	assert!(!response.has_failures());
	assert_eq!(index.doc_count("item").unwrap(), 2);

	let stored = index.get_document("item", 2).unwrap().expect("doc 2");
	assert_eq!(stored["Name_en"], "Ether");
	assert!(index.get_document("item", 3).unwrap().is_none());
}

#[test]
fn bulk_upserts_by_id() {
	let (_tmp, index) = fresh("item");
	index.bulk_index("item", "search", &BTreeMap::from([(1, named(1, "Potion"))])).unwrap();
	index.bulk_index("item", "search", &BTreeMap::from([(1, named(1, "Hi-Potion"))])).unwrap();
	assert_eq!(index.doc_count("item").unwrap(), 1);
	assert_eq!(index.get_document("item", 1).unwrap().expect("doc")["Name_en"], "Hi-Potion");
}

#[test]
fn disabled_refresh_defers_visibility_until_restored() {
	let (_tmp, index) = fresh("quest");
	index.put_settings("quest", &SettingsPatch::refresh(RefreshInterval::Disabled)).unwrap();
	assert_eq!(index.refresh_interval("quest").unwrap(), "-1");

	index.bulk_index("quest", "search", &BTreeMap::from([(10, named(10, "Close to Home"))])).unwrap();
	assert_eq!(index.doc_count("quest").unwrap(), 0);

	index.put_settings("quest", &SettingsPatch::refresh(RefreshInterval::Every("1s".into()))).unwrap();
	assert_eq!(index.doc_count("quest").unwrap(), 1);
}

#[test]
fn conflicting_field_kinds_are_rejected_per_item() {
	let (_tmp, index) = fresh("item");
	index.bulk_index("item", "search", &BTreeMap::from([(1, named(1, "Potion"))])).unwrap();

	let mut bad = named(2, "Ether").into_fields();
	bad.insert("ID".into(), Value::from("two"));
	let docs = BTreeMap::from([(2, Document::new(bad.clone())), (3, named(3, "Elixir"))]);
	let response = index.bulk_index("item", "search", &docs).expect("bulk call succeeds");
	assert_eq!(response.failed().map(|item| item.id).collect::<Vec<_>>(), vec![2]);
	assert_eq!(index.doc_count("item").unwrap(), 2);

	let err = index.add_document("item", "search", 2, &Document::new(bad)).unwrap_err();
	assert!(matches!(err, Error::Rejected { id: 2, .. }));
}

#[test]
fn recreate_requires_delete_first() {
	let (_tmp, index) = fresh("title");
	index.add_document("title", "search", 1, &named(1, "the Liberator")).unwrap();
	assert!(index.create_index("title", &IndexMapping::game_data("search")).is_err());

	index.delete_index("title").unwrap();
	assert!(!index.exists("title"));
	index.create_index("title", &IndexMapping::game_data("search")).unwrap();
	assert_eq!(index.doc_count("title").unwrap(), 0);
	assert!(index.mapping("title").unwrap()["mappings"]["search"].is_object());
}

#[test]
fn deleting_a_missing_index_is_not_an_error() {
	let tmp = TempDir::new().unwrap();
	let index = TantivySearchIndex::new(tmp.path()).unwrap();
	index.delete_index("nothing").unwrap();
}

#[test]
fn settings_on_a_missing_index_fail() {
	let tmp = TempDir::new().unwrap();
	let index = TantivySearchIndex::new(tmp.path()).unwrap();
	let err = index.put_settings("item", &SettingsPatch::refresh(RefreshInterval::Disabled)).unwrap_err();
	assert!(matches!(err, Error::NotFound(_)));
}

#[test]
fn committed_documents_survive_reopen() {
	let tmp = TempDir::new().unwrap();
	{
		let index = TantivySearchIndex::new(tmp.path()).unwrap();
		index.create_index("mount", &IndexMapping::game_data("search")).unwrap();
		index.bulk_index("mount", "search", &BTreeMap::from([(4, named(4, "Chocobo"))])).unwrap();
	}
	let reopened = TantivySearchIndex::new(tmp.path()).unwrap();
	assert_eq!(reopened.doc_count("mount").unwrap(), 1);
}
