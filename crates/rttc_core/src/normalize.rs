//! crates/rttc_core/src/normalize.rs
//!
//! Flattens the loosely shaped replies of the remote services into plain values.

use serde_json::Value;

/// Keys that carry the readable text when a service answers with an object.
const TEXT_KEYS: &[&str] = &[
    "text",
    "extracted_text",
    "extractedText",
    "translation",
    "translatedText",
    "translated_text",
    "result",
];

/// Reduces a service reply to a single string.
///
/// * a JSON string is returned as is;
/// * an object yields the first string found under one of the known text keys,
///   searched one level deep (e.g. `{"data": {"text": "..."}}`);
/// * an array of strings is joined with newlines;
/// * `null` becomes the empty string;
/// * anything else is serialized back to compact JSON so nothing is lost.
pub fn coerce_to_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        Value::Object(_) => find_text(value).unwrap_or_else(|| value.to_string()),
        Value::Array(items) if items.iter().all(Value::is_string) => items
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join("\n"),
        other => other.to_string(),
    }
}

fn find_text(value: &Value) -> Option<String> {
    let object = value.as_object()?;
    for key in TEXT_KEYS {
        if let Some(Value::String(text)) = object.get(*key) {
            return Some(text.clone());
        }
    }
    object
        .values()
        .filter(|nested| nested.is_object())
        .find_map(find_text)
}

/// Extracts the translated text from a translation reply.
pub fn extract_translation(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(text) => Some(text.clone()),
        Value::Object(object) => ["translation", "translatedText", "translated_text"]
            .iter()
            .find_map(|key| object.get(*key).and_then(Value::as_str))
            .map(str::to_string)
            .or_else(|| object.get("data").and_then(extract_translation)),
        _ => None,
    }?;
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Extracts the language code and optional confidence from a detection reply.
pub fn extract_detection(value: &Value) -> Option<(String, Option<f64>)> {
    let language = match value {
        Value::String(code) => Some(code.clone()),
        Value::Object(object) => ["lang", "detectedLanguage", "language"]
            .iter()
            .find_map(|key| object.get(*key).and_then(Value::as_str))
            .map(str::to_string),
        _ => None,
    }?;
    let language = language.trim().to_lowercase();
    if language.is_empty() {
        return None;
    }
    let confidence = value.get("confidence").and_then(Value::as_f64);
    Some((language, confidence))
}
