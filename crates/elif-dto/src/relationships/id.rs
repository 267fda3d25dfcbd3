//! Related ids - the values stored in to-one and to-many relations

use serde::{Deserialize, Serialize};
use std::fmt;

use super::meta::Meta;

/// Id of a related entity, either an integer or a string key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RelatedId {
    Int(i64),
    Str(String),
}

impl RelatedId {
    /// Runtime kind of this id
    pub fn kind(&self) -> IdKind {
        match self {
            RelatedId::Int(_) => IdKind::Integer,
            RelatedId::Str(_) => IdKind::String,
        }
    }

    /// Extract as i64 if this is an integer id
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            RelatedId::Int(id) => Some(*id),
            RelatedId::Str(_) => None,
        }
    }

    /// Extract as str if this is a string id
    pub fn as_str(&self) -> Option<&str> {
        match self {
            RelatedId::Int(_) => None,
            RelatedId::Str(id) => Some(id),
        }
    }
}

impl fmt::Display for RelatedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelatedId::Int(id) => write!(f, "{}", id),
            RelatedId::Str(id) => write!(f, "{}", id),
        }
    }
}

impl From<i64> for RelatedId {
    fn from(id: i64) -> Self {
        RelatedId::Int(id)
    }
}

impl From<i32> for RelatedId {
    fn from(id: i32) -> Self {
        RelatedId::Int(id.into())
    }
}

impl From<u32> for RelatedId {
    fn from(id: u32) -> Self {
        RelatedId::Int(id.into())
    }
}

impl From<&str> for RelatedId {
    fn from(id: &str) -> Self {
        RelatedId::Str(id.to_string())
    }
}

impl From<String> for RelatedId {
    fn from(id: String) -> Self {
        RelatedId::Str(id)
    }
}

/// Related entity references normalise to their key
impl<T: Keyed> From<&T> for RelatedId {
    fn from(entity: &T) -> Self {
        entity.key()
    }
}

/// Capability of a related entity to expose its key
pub trait Keyed {
    fn key(&self) -> RelatedId;
}

/// Kind of a value written into a relation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdKind {
    Integer,
    String,
    Null,
    Empty,
}

impl IdKind {
    pub fn as_str(self) -> &'static str {
        match self {
            IdKind::Integer => "integer",
            IdKind::String => "string",
            IdKind::Null => "null",
            IdKind::Empty => "empty",
        }
    }

    /// Runtime kind of an optional id; `None` is a null write
    pub fn of(id: Option<&RelatedId>) -> Self {
        id.map_or(IdKind::Null, RelatedId::kind)
    }
}

impl fmt::Display for IdKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One element of a to-many replacement: a bare id, or an id carrying its
/// own metadata
#[derive(Debug, Clone, PartialEq)]
pub enum RelatedEntry {
    Id(RelatedId),
    WithMeta { id: RelatedId, meta: Meta },
}

impl RelatedEntry {
    pub fn with_meta(id: impl Into<RelatedId>, meta: Meta) -> Self {
        RelatedEntry::WithMeta {
            id: id.into(),
            meta,
        }
    }

    pub fn id(&self) -> &RelatedId {
        match self {
            RelatedEntry::Id(id) => id,
            RelatedEntry::WithMeta { id, .. } => id,
        }
    }

    pub(crate) fn into_parts(self) -> (RelatedId, Option<Meta>) {
        match self {
            RelatedEntry::Id(id) => (id, None),
            RelatedEntry::WithMeta { id, meta } => (id, Some(meta)),
        }
    }
}

impl From<RelatedId> for RelatedEntry {
    fn from(id: RelatedId) -> Self {
        RelatedEntry::Id(id)
    }
}

impl From<i64> for RelatedEntry {
    fn from(id: i64) -> Self {
        RelatedEntry::Id(id.into())
    }
}

impl From<i32> for RelatedEntry {
    fn from(id: i32) -> Self {
        RelatedEntry::Id(id.into())
    }
}

impl From<u32> for RelatedEntry {
    fn from(id: u32) -> Self {
        RelatedEntry::Id(id.into())
    }
}

impl From<&str> for RelatedEntry {
    fn from(id: &str) -> Self {
        RelatedEntry::Id(id.into())
    }
}

impl From<String> for RelatedEntry {
    fn from(id: String) -> Self {
        RelatedEntry::Id(id.into())
    }
}
