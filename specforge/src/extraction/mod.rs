//! Structured extraction of JSON payloads from generative-model text.
//!
//! Models wrap valid JSON in prose and code fences often enough that strict
//! parsing alone would abort most runs. The salvage ladder here tries, in
//! order: fence-stripped strict parse, then the first-`{`-to-last-`}`
//! substring, then gives up with an empty mapping. Extraction never fails;
//! callers distinguish a useful parse from a recovered fallback through
//! [`ExtractionOrigin`] rather than an error.

use regex::Regex;
use serde::de::DeserializeOwned;
use std::sync::OnceLock;

/// How an extraction result was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionOrigin {
    /// The fence-stripped text parsed strictly as a JSON object.
    Parsed,
    /// Only the brace-delimited substring parsed; wrapper prose was dropped.
    Salvaged,
    /// Both attempts failed; the mapping is the empty fallback.
    Recovered,
}

impl ExtractionOrigin {
    /// Returns true when the extraction degraded to the empty fallback.
    #[must_use]
    pub fn is_recovered(&self) -> bool {
        matches!(self, Self::Recovered)
    }
}

/// The outcome of one extraction attempt: a mapping plus its origin.
///
/// All-or-nothing per attempt: there is no partial/best-effort shape. A
/// recovered result always carries the empty mapping.
#[derive(Debug, Clone)]
pub struct Extraction {
    mapping: serde_json::Map<String, serde_json::Value>,
    origin: ExtractionOrigin,
}

impl Extraction {
    fn recovered() -> Self {
        Self {
            mapping: serde_json::Map::new(),
            origin: ExtractionOrigin::Recovered,
        }
    }

    /// Returns how this result was obtained.
    #[must_use]
    pub fn origin(&self) -> ExtractionOrigin {
        self.origin
    }

    /// Returns true when the mapping carries no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }

    /// Borrows the extracted mapping.
    #[must_use]
    pub fn mapping(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.mapping
    }

    /// Consumes the result, yielding the mapping.
    #[must_use]
    pub fn into_mapping(self) -> serde_json::Map<String, serde_json::Value> {
        self.mapping
    }
}

#[allow(clippy::unwrap_used)]
fn fence_open() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^```[A-Za-z0-9_-]*").unwrap())
}

/// Removes a leading/trailing fenced-code marker, if present.
fn strip_fences(text: &str) -> &str {
    let mut cleaned = text.trim();
    if let Some(m) = fence_open().find(cleaned) {
        cleaned = cleaned[m.end()..].trim_start();
        if let Some(rest) = cleaned.strip_suffix("```") {
            cleaned = rest.trim_end();
        }
    }
    cleaned
}

fn parse_object(text: &str) -> Option<serde_json::Map<String, serde_json::Value>> {
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(serde_json::Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Extracts a JSON object from potentially noisy model text.
///
/// Never panics and never errors; a result with
/// [`ExtractionOrigin::Recovered`] and an empty mapping is the failure
/// signal.
#[must_use]
pub fn extract(raw_text: &str) -> Extraction {
    let cleaned = strip_fences(raw_text);

    if let Some(mapping) = parse_object(cleaned) {
        return Extraction {
            mapping,
            origin: ExtractionOrigin::Parsed,
        };
    }

    let start = cleaned.find('{');
    let end = cleaned.rfind('}');
    if let (Some(start), Some(end)) = (start, end) {
        if end > start {
            if let Some(mapping) = parse_object(&cleaned[start..=end]) {
                return Extraction {
                    mapping,
                    origin: ExtractionOrigin::Salvaged,
                };
            }
        }
    }

    Extraction::recovered()
}

/// Extracts and deserializes a typed per-stage payload.
///
/// A shape mismatch between the mapping and `T` degrades to `T::default()`
/// with a [`ExtractionOrigin::Recovered`] origin, the same all-or-nothing
/// contract as the untyped path.
#[must_use]
pub fn extract_payload<T>(raw_text: &str) -> (T, ExtractionOrigin)
where
    T: DeserializeOwned + Default,
{
    let extraction = extract(raw_text);
    if extraction.origin().is_recovered() {
        return (T::default(), ExtractionOrigin::Recovered);
    }

    let origin = extraction.origin();
    match serde_json::from_value(serde_json::Value::Object(extraction.into_mapping())) {
        Ok(payload) => (payload, origin),
        Err(err) => {
            tracing::debug!(error = %err, "extracted mapping did not match payload shape");
            (T::default(), ExtractionOrigin::Recovered)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde::Deserialize;

    #[test]
    fn parses_a_bare_object() {
        let result = extract(r#"{"a": 1, "b": "two"}"#);
        assert_eq!(result.origin(), ExtractionOrigin::Parsed);
        assert_eq!(result.mapping()["a"], 1);
    }

    #[test]
    fn parses_a_fenced_object() {
        let result = extract("```json\n{\"name\": \"blog\"}\n```");
        assert_eq!(result.origin(), ExtractionOrigin::Parsed);
        assert_eq!(result.mapping()["name"], "blog");
    }

    #[test]
    fn fenced_round_trip_is_lossless() {
        let mut mapping = serde_json::Map::new();
        mapping.insert("k".to_string(), serde_json::json!(["x", "y"]));
        mapping.insert("n".to_string(), serde_json::json!(3));

        let encoded = format!(
            "```json\n{}\n```",
            serde_json::Value::Object(mapping.clone())
        );
        let result = extract(&encoded);

        assert_eq!(result.into_mapping(), mapping);
    }

    #[test]
    fn salvages_an_object_wrapped_in_prose() {
        let result = extract("Sure thing! Here you go: {\"domain\": \"chat\"} Hope that helps.");
        assert_eq!(result.origin(), ExtractionOrigin::Salvaged);
        assert_eq!(result.mapping()["domain"], "chat");
    }

    #[test]
    fn garbage_recovers_to_empty() {
        let result = extract("not json at all");
        assert_eq!(result.origin(), ExtractionOrigin::Recovered);
        assert!(result.is_empty());
    }

    #[test]
    fn trailing_comma_fails_both_attempts() {
        let result = extract("Sure! ```json {\"a\": 1,} ```");
        assert_eq!(result.origin(), ExtractionOrigin::Recovered);
        assert!(result.is_empty());
    }

    #[test]
    fn non_object_json_is_not_accepted() {
        let result = extract("[1, 2, 3]");
        assert!(result.origin().is_recovered());
    }

    #[test]
    fn typed_payload_deserializes() {
        #[derive(Debug, Default, Deserialize, PartialEq)]
        struct Payload {
            #[serde(default)]
            features: Vec<String>,
        }

        let (payload, origin) =
            extract_payload::<Payload>(r#"{"features": ["login", "search"]}"#);
        assert_eq!(origin, ExtractionOrigin::Parsed);
        assert_eq!(payload.features.len(), 2);
    }

    #[test]
    fn typed_payload_shape_mismatch_degrades_to_default() {
        #[derive(Debug, Default, Deserialize)]
        struct Payload {
            features: Vec<String>,
        }

        // `features` is a string, not an array: the whole attempt degrades.
        let (payload, origin) = extract_payload::<Payload>(r#"{"features": "login"}"#);
        assert!(origin.is_recovered());
        assert!(payload.features.is_empty());
    }
}
