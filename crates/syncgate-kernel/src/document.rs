//! Document revisions as the host hands them to the sync function.
//!
//! A revision carries a handful of well-known attributes the gates read
//! directly (`_id`, `type`, `owner_name`, `channels`, `access`, `_deleted`)
//! plus an open map of type-specific fields. [`Document::field`] addresses
//! all of them by name and distinguishes an absent field from an empty one.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;

pub const ID_FIELD: &str = "_id";
pub const TYPE_FIELD: &str = "type";
pub const OWNER_FIELD: &str = "owner_name";
pub const CHANNELS_FIELD: &str = "channels";
pub const ACCESS_FIELD: &str = "access";
pub const DELETED_FIELD: &str = "_deleted";

/// One revision of a document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "_id", default)]
    pub id: String,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channels: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access: Option<Vec<String>>,

    #[serde(rename = "_deleted", default, skip_serializing_if = "is_false")]
    pub deleted: bool,

    /// Type-specific fields, keyed by name.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl Document {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_type(mut self, doc_type: impl Into<String>) -> Self {
        self.doc_type = Some(doc_type.into());
        self
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner_name = Some(owner.into());
        self
    }

    pub fn with_channels<I, S>(mut self, channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.channels = Some(channels.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_access<I, S>(mut self, access: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.access = Some(access.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    /// Mark this revision as a deletion tombstone.
    pub fn deleted(mut self) -> Self {
        self.deleted = true;
        self
    }

    /// The document type, if one was given.
    pub fn doc_type(&self) -> Option<&str> {
        self.doc_type.as_deref()
    }

    /// Declared channels; an absent list reads as empty.
    pub fn channels(&self) -> &[String] {
        self.channels.as_deref().unwrap_or_default()
    }

    /// Declared access tokens; an absent list reads as empty.
    pub fn access(&self) -> &[String] {
        self.access.as_deref().unwrap_or_default()
    }

    /// Look up any field by name.
    ///
    /// Returns `None` when the field is absent. A present-but-empty value
    /// (`""`, `[]`, `null`) comes back as `Some`.
    pub fn field(&self, name: &str) -> Option<Cow<'_, Value>> {
        match name {
            ID_FIELD => Some(Cow::Owned(Value::String(self.id.clone()))),
            TYPE_FIELD => self.doc_type.as_ref().map(|t| owned_string(t)),
            OWNER_FIELD => self.owner_name.as_ref().map(|o| owned_string(o)),
            CHANNELS_FIELD => self.channels.as_deref().map(owned_list),
            ACCESS_FIELD => self.access.as_deref().map(owned_list),
            DELETED_FIELD => self.deleted.then_some(Cow::Owned(Value::Bool(true))),
            _ => self.fields.get(name).map(Cow::Borrowed),
        }
    }
}

fn owned_string(value: &str) -> Cow<'static, Value> {
    Cow::Owned(Value::String(value.to_string()))
}

fn owned_list(items: &[String]) -> Cow<'static, Value> {
    Cow::Owned(Value::Array(
        items.iter().cloned().map(Value::String).collect(),
    ))
}
