use std::collections::{BTreeMap, HashMap};

use catalog_core::constants::LANGUAGES;
use catalog_core::types::{ContentType, Document, Record, Value};

use crate::coerce::FieldTypes;
use crate::rules::{ContentRules, ExclusionSet, NameSource};

pub const NAME_LOCALE_FIELD: &str = "NameLocale";

/// Turns cached records into index-ready documents.
///
/// Rules are resolved once per content type at construction; `transform` is
/// then a pure function of the record.
#[derive(Debug, Clone)]
pub struct DocumentTransformer {
    rules: HashMap<ContentType, ContentRules>,
    fallback: ContentRules,
    field_types: FieldTypes,
}

impl DocumentTransformer {
    pub fn new(content_types: &[ContentType]) -> Self {
        let rules = content_types.iter().map(|ct| (ct.clone(), ContentRules::for_content_type(ct))).collect();
        Self { rules, fallback: ContentRules::default(), field_types: FieldTypes::for_languages(&LANGUAGES) }
    }

    pub fn rules(&self, ct: &ContentType) -> &ContentRules {
        self.rules.get(ct).unwrap_or(&self.fallback)
    }

    /// `None` when the record has no primary-language name and must not be
    /// indexed.
    pub fn transform(&self, ct: &ContentType, record: &Record) -> Option<Document> {
        let rules = self.rules(ct);
        if record.get(&rules.primary_name_field).map_or(true, Value::is_blank) {
            return None;
        }

        let mut fields = prune(rules, record);
        self.field_types.coerce_fields(&mut fields);
        derive_names(rules, &mut fields);
        Some(Document::new(fields))
    }
}

fn prune(rules: &ContentRules, record: &Record) -> BTreeMap<String, Value> {
    let mut fields = BTreeMap::new();
    for (field, value) in record {
        if rules.exclusions.excludes(field) {
            continue;
        }
        if value.is_composite() && !rules.keeps_composite(field) {
            continue;
        }
        let value = match (value, nested_exclusions(rules, field)) {
            (Value::Map(inner), Some(excluded)) => Value::Map(
                inner
                    .iter()
                    .filter(|(name, _)| !excluded.excludes(name))
                    .map(|(name, v)| (name.clone(), v.clone()))
                    .collect(),
            ),
            _ => value.clone(),
        };
        fields.insert(field.clone(), value);
    }
    fields
}

fn nested_exclusions<'a>(rules: &'a ContentRules, field: &str) -> Option<&'a ExclusionSet> {
    rules.nested_exclusions.iter().find(|(name, _)| name == field).map(|(_, set)| set)
}

fn text_of(fields: &BTreeMap<String, Value>, field: &str) -> String {
    fields.get(field).and_then(Value::as_text).unwrap_or_default()
}

fn derive_names(rules: &ContentRules, fields: &mut BTreeMap<String, Value>) {
    let mut combined_names = Vec::with_capacity(LANGUAGES.len());
    for lang in LANGUAGES {
        let name_field = format!("Name_{}", lang);
        if let NameSource::Dialogue { field } = &rules.name_source {
            let dialogue = text_of(fields, &format!("{}_{}", field, lang));
            fields.insert(name_field.clone(), Value::Str(dialogue));
        }

        let name = text_of(fields, &name_field);
        let combined = match &rules.name_source {
            NameSource::Gendered { second } => {
                let other = text_of(fields, &format!("{}_{}", second, lang));
                format!("{} {}", name, other).trim().to_string()
            }
            NameSource::Single | NameSource::Dialogue { .. } => name.trim().to_string(),
        };
        combined_names.push(combined.clone());
        fields.insert(format!("NameCombined_{}", lang), Value::Str(combined));
    }
    fields.insert(NAME_LOCALE_FIELD.to_string(), Value::Str(combined_names.join(" ").trim().to_string()));
}
