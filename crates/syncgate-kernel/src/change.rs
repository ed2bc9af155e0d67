//! Field change detection between two revisions.

use crate::document::Document;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How two sequence-valued fields are compared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SequenceEquality {
    /// Concatenate each sequence's elements into one token and compare the
    /// tokens. `["a", "bc"]` and `["ab", "c"]` compare equal.
    #[default]
    Joined,
    /// Compare element by element.
    ElementWise,
}

/// Whether a field value differs between the old and new revision.
///
/// - both absent: unchanged
/// - one absent: changed
/// - both sequences: compared per `sequences`
/// - otherwise: direct equality
pub fn changed(old: Option<&Value>, new: Option<&Value>, sequences: SequenceEquality) -> bool {
    match (old, new) {
        (None, None) => false,
        (None, Some(_)) | (Some(_), None) => true,
        (Some(Value::Array(old)), Some(Value::Array(new))) => match sequences {
            SequenceEquality::Joined => joined(old) != joined(new),
            SequenceEquality::ElementWise => old != new,
        },
        (Some(old), Some(new)) => old != new,
    }
}

/// Whether the field `name` differs between two revisions.
pub fn field_changed(
    old: &Document,
    new: &Document,
    name: &str,
    sequences: SequenceEquality,
) -> bool {
    changed(
        old.field(name).as_deref(),
        new.field(name).as_deref(),
        sequences,
    )
}

/// The first of `fields`, in listed order, that differs between revisions.
pub fn first_changed<'f>(
    old: &Document,
    new: &Document,
    fields: &'f [String],
    sequences: SequenceEquality,
) -> Option<&'f str> {
    fields
        .iter()
        .map(String::as_str)
        .find(|name| field_changed(old, new, name, sequences))
}

fn joined(items: &[Value]) -> String {
    let mut token = String::new();
    for item in items {
        push_token(&mut token, item);
    }
    token
}

// Strings contribute their raw text, null contributes nothing, nested
// sequences flatten in place, and anything else contributes its JSON text.
fn push_token(token: &mut String, value: &Value) {
    match value {
        Value::String(s) => token.push_str(s),
        Value::Null => {}
        Value::Array(items) => items.iter().for_each(|item| push_token(token, item)),
        other => token.push_str(&other.to_string()),
    }
}
