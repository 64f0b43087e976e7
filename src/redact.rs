//! Sensitive-field redaction for logged payloads
//!
//! Walks JSON values recursively and overwrites the value of any key on the
//! sensitivity list with a fixed substitute marker. Keys match
//! case-insensitively. Mapping values that are strings holding a serialized
//! literal are promoted to their structural form before the walk continues,
//! so secrets inside serialized payloads are still caught.

use serde_json::Value;
use std::collections::HashSet;

/// Field names always treated as sensitive, regardless of configuration.
pub const SENSITIVE_FIELDS: [&str; 5] = ["api", "key", "password", "signature", "secret"];

/// Marker stored in place of a redacted value.
pub const DEFAULT_CLEANED_SUBSTITUTE: &str = "********";

/// Recursive redactor over JSON payloads.
///
/// Holds the lower-cased sensitivity set (the base list unioned with any
/// configured extra fields) and the substitute marker. Redaction is
/// idempotent: cleaning an already-cleaned value changes nothing.
#[derive(Debug, Clone)]
pub struct Redactor {
    sensitive: HashSet<String>,
    substitute: String,
}

impl Redactor {
    /// Redactor marking the base field list plus `extra_fields`.
    pub fn new<I, S>(extra_fields: I, substitute: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut sensitive: HashSet<String> =
            SENSITIVE_FIELDS.iter().map(|field| field.to_string()).collect();
        sensitive.extend(extra_fields.into_iter().map(|field| field.as_ref().to_lowercase()));
        Self {
            sensitive,
            substitute: substitute.into(),
        }
    }

    /// The marker stored in place of redacted values.
    pub fn substitute(&self) -> &str {
        &self.substitute
    }

    /// Decode raw bytes to text, substituting replacement characters for
    /// invalid sequences, and clean the result.
    pub fn clean_body(&self, body: &[u8]) -> Value {
        self.clean(Value::String(String::from_utf8_lossy(body).into_owned()))
    }

    /// Return `value` with every sensitive field overwritten by the marker.
    ///
    /// Sequences are cleaned element-wise with order preserved. In mappings
    /// a sensitive key wins over everything else, including recursion into
    /// its value. Scalars pass through unchanged.
    pub fn clean(&self, value: Value) -> Value {
        match value {
            Value::Array(items) => {
                Value::Array(items.into_iter().map(|item| self.clean(item)).collect())
            }
            Value::Object(map) => {
                let cleaned = map
                    .into_iter()
                    .map(|(key, field)| {
                        let field = if self.sensitive.contains(&key.to_lowercase()) {
                            Value::String(self.substitute.clone())
                        } else {
                            self.clean_field(field)
                        };
                        (key, field)
                    })
                    .collect();
                Value::Object(cleaned)
            }
            scalar => scalar,
        }
    }

    // Mapping values only: serialized structures are promoted and cleaned;
    // promoted numbers are not kept, the original string stands.
    fn clean_field(&self, value: Value) -> Value {
        match value {
            Value::String(text) => match parse_literal(&text) {
                Some(parsed @ (Value::Array(_) | Value::Object(_))) => self.clean(parsed),
                _ => Value::String(text),
            },
            structural @ (Value::Array(_) | Value::Object(_)) => self.clean(structural),
            scalar => scalar,
        }
    }
}

impl Default for Redactor {
    fn default() -> Self {
        Self::new(std::iter::empty::<&str>(), DEFAULT_CLEANED_SUBSTITUTE)
    }
}

/// Parse a string that may hold a serialized literal.
///
/// Accepts JSON arrays, objects, and numbers only; everything else is
/// `None`. Input is parsed as data, never evaluated.
fn parse_literal(raw: &str) -> Option<Value> {
    let trimmed = raw.trim();
    let first = trimmed.chars().next()?;
    if first != '[' && first != '{' && first != '-' && !first.is_ascii_digit() {
        return None;
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(parsed @ (Value::Array(_) | Value::Object(_) | Value::Number(_))) => Some(parsed),
        _ => None,
    }
}
