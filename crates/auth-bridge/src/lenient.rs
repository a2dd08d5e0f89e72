//! Deserialisation helpers for text fields whose source guesses types.
//!
//! KeyAuth replies carry timestamps as strings or numbers depending on the
//! endpoint, and layered configuration parses `KEYAUTH_VERSION=1.0` as a
//! float. Both are read back as text.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Reads an optional scalar as text. Numbers and booleans are rendered with
/// their JSON spelling; `null` is `None`.
pub(crate) fn optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text),
        Some(other) => Some(other.to_string()),
    })
}
