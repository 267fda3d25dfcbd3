//! Pivot metadata attached to ids of a to-many relation

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::{DtoError, DtoResult};

use super::id::RelatedId;

/// Metadata of a single related id
pub type Meta = serde_json::Map<String, Value>;

/// Metadata of a to-many relation, keyed by related id
pub type RelationMeta = BTreeMap<RelatedId, Meta>;

/// Anything that can be turned into a metadata map
///
/// Implemented for every `Serialize` type; the value must serialize to an
/// object.
pub trait MetaSource {
    fn to_meta(&self) -> DtoResult<Meta>;
}

impl<T: Serialize + ?Sized> MetaSource for T {
    fn to_meta(&self) -> DtoResult<Meta> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            other => Err(DtoError::Serialization(format!(
                "Relation metadata must serialize to an object, got `{}`",
                other
            ))),
        }
    }
}
