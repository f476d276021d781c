//! Strict scalar typing of document fields.
//!
//! The index maps a field from the first document that carries it, so the
//! same field must have the same type in every record of a content type.
//! Locale fields (`*_{lang}`) are declared text; every other string holding a
//! number or boolean literal becomes that number or boolean.

use std::collections::BTreeMap;

use catalog_core::types::Value;

#[derive(Debug, Clone)]
pub struct FieldTypes {
    text_suffixes: Vec<String>,
}

impl FieldTypes {
    pub fn for_languages<S: AsRef<str>>(languages: &[S]) -> Self {
        Self { text_suffixes: languages.iter().map(|lang| format!("_{}", lang.as_ref())).collect() }
    }

    pub fn is_text(&self, field: &str) -> bool {
        self.text_suffixes.iter().any(|suffix| field.ends_with(suffix.as_str()))
    }

    pub fn coerce_fields(&self, fields: &mut BTreeMap<String, Value>) {
        for (field, value) in fields.iter_mut() {
            let taken = std::mem::replace(value, Value::Null);
            *value = self.coerce(field, taken);
        }
    }

    fn coerce(&self, field: &str, value: Value) -> Value {
        match value {
            Value::Map(mut inner) => {
                self.coerce_fields(&mut inner);
                Value::Map(inner)
            }
            Value::List(items) => Value::List(items.into_iter().map(|item| self.coerce(field, item)).collect()),
            scalar if self.is_text(field) => as_text_value(scalar),
            scalar => coerce_scalar(scalar),
        }
    }
}

fn as_text_value(value: Value) -> Value {
    match value {
        Value::Null | Value::Str(_) => value,
        other => other.as_text().map(Value::Str).unwrap_or(Value::Null),
    }
}

pub fn coerce_scalar(value: Value) -> Value {
    let Value::Str(s) = value else { return value };
    if let Ok(i) = s.parse::<i64>() {
        return Value::Int(i);
    }
    if looks_numeric(&s) {
        if let Ok(f) = s.parse::<f64>() {
            if f.is_finite() {
                return Value::Float(f);
            }
        }
    }
    match s.as_str() {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::Str(s),
    }
}

/// Rust's float parser accepts "inf" and "NaN"; numeric literals only here.
fn looks_numeric(s: &str) -> bool {
    !s.is_empty()
        && s.bytes().any(|b| b.is_ascii_digit())
        && s.bytes().all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'-' | b'+' | b'e' | b'E'))
}
