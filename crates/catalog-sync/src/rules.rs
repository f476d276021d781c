//! Per-content-type transformation rules.
//!
//! Rules are declarative and built once per content type: which field gates
//! indexing, how locale names are sourced, which composite fields survive
//! pruning, and which families of numbered fields are dropped.

use std::collections::HashSet;
use std::ops::RangeInclusive;

use catalog_core::constants::PRIMARY_LANGUAGE;
use catalog_core::types::ContentType;

/// Composite fields every content type keeps.
pub const KEPT_COMPOSITES: [&str; 1] = ["Recipes"];

const QUEST_STEPS: RangeInclusive<u32> = 0..=170;
const QUEST_SCRIPT_LANGUAGES: [&str; 4] = ["en", "de", "fr", "ja"];
const QUEST_TEXT_DATA_LANGUAGES: [&str; 6] = ["en", "de", "fr", "ja", "kr", "cn"];
const QUEST_PREVIOUS: &str = "PreviousQuest0";

/// A field name, or a family `{prefix}{N}{suffix}` over a numeric range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldPattern {
    Exact(String),
    Numbered { prefix: String, suffix: String, range: RangeInclusive<u32> },
}

impl FieldPattern {
    pub fn exact(name: impl Into<String>) -> Self {
        Self::Exact(name.into())
    }

    pub fn numbered(prefix: impl Into<String>, suffix: impl Into<String>, range: RangeInclusive<u32>) -> Self {
        Self::Numbered { prefix: prefix.into(), suffix: suffix.into(), range }
    }

    pub fn matches(&self, field: &str) -> bool {
        match self {
            FieldPattern::Exact(name) => name == field,
            FieldPattern::Numbered { prefix, suffix, range } => field
                .strip_prefix(prefix.as_str())
                .and_then(|rest| rest.strip_suffix(suffix.as_str()))
                .and_then(parse_canonical_number)
                .is_some_and(|n| range.contains(&n)),
        }
    }
}

/// Decimal digits without a leading zero (other than "0" itself).
fn parse_canonical_number(digits: &str) -> Option<u32> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return None;
    }
    digits.parse().ok()
}

/// Field exclusion patterns applied in a single pass per record.
#[derive(Debug, Clone, Default)]
pub struct ExclusionSet {
    exact: HashSet<String>,
    numbered: Vec<FieldPattern>,
}

impl ExclusionSet {
    pub fn new<I: IntoIterator<Item = FieldPattern>>(patterns: I) -> Self {
        let mut set = Self::default();
        for pattern in patterns {
            match pattern {
                FieldPattern::Exact(name) => {
                    set.exact.insert(name);
                }
                numbered => set.numbered.push(numbered),
            }
        }
        set
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.numbered.is_empty()
    }

    pub fn excludes(&self, field: &str) -> bool {
        self.exact.contains(field) || self.numbered.iter().any(|p| p.matches(field))
    }
}

/// Where `Name_{lang}` and `NameCombined_{lang}` come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameSource {
    /// `NameCombined_{lang}` = `Name_{lang}`.
    Single,
    /// Two gendered variants: `Name_{lang}` + " " + `{second}_{lang}`.
    Gendered { second: String },
    /// `Name_{lang}` is overwritten with `{field}_{lang}` (empty when absent).
    Dialogue { field: String },
}

#[derive(Debug, Clone)]
pub struct ContentRules {
    pub primary_name_field: String,
    pub name_source: NameSource,
    pub kept_composites: HashSet<String>,
    pub exclusions: ExclusionSet,
    /// Exclusions applied inside a kept nested sub-record.
    pub nested_exclusions: Vec<(String, ExclusionSet)>,
}

impl Default for ContentRules {
    fn default() -> Self {
        Self {
            primary_name_field: format!("Name_{}", PRIMARY_LANGUAGE),
            name_source: NameSource::Single,
            kept_composites: KEPT_COMPOSITES.iter().map(|f| f.to_string()).collect(),
            exclusions: ExclusionSet::default(),
            nested_exclusions: Vec::new(),
        }
    }
}

impl ContentRules {
    pub fn for_content_type(ct: &ContentType) -> Self {
        let mut rules = Self::default();
        match ct.as_str() {
            "Title" => {
                rules.name_source = NameSource::Gendered { second: "NameFemale".to_string() };
            }
            "Balloon" => {
                rules.name_source = NameSource::Dialogue { field: "Dialogue".to_string() };
            }
            "Quest" => {
                let mut top_level = quest_step_patterns();
                top_level.extend(QUEST_TEXT_DATA_LANGUAGES.iter().map(|lang| FieldPattern::exact(format!("TextData_{}", lang))));
                rules.exclusions = ExclusionSet::new(top_level);
                rules.kept_composites.insert(QUEST_PREVIOUS.to_string());
                rules.nested_exclusions.push((QUEST_PREVIOUS.to_string(), ExclusionSet::new(quest_step_patterns())));
            }
            _ => {}
        }
        rules
    }

    pub fn keeps_composite(&self, field: &str) -> bool {
        self.kept_composites.contains(field)
    }
}

/// Per-step quest fields: levels, targets and script instructions.
fn quest_step_patterns() -> Vec<FieldPattern> {
    let mut patterns = vec![
        FieldPattern::numbered("Level", "", QUEST_STEPS),
        FieldPattern::numbered("Level", "Target", QUEST_STEPS),
        FieldPattern::numbered("Level", "TargetID", QUEST_STEPS),
        FieldPattern::numbered("ScriptArg", "", QUEST_STEPS),
    ];
    patterns.extend(
        QUEST_SCRIPT_LANGUAGES
            .iter()
            .map(|lang| FieldPattern::numbered("ScriptInstruction", format!("_{}", lang), QUEST_STEPS)),
    );
    patterns
}
