//! Transferable - serde-backed serializer boundary of a DTO
//!
//! A DTO lists its serializable fields through its `Serialize`/`Deserialize`
//! derives. Bookkeeping fields are kept out with `#[serde(skip)]`.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{DtoError, DtoResult};

/// Plain attribute map of a DTO
pub type Attributes = Map<String, Value>;

pub trait Transferable: Serialize + DeserializeOwned {
    /// Create an instance from an attribute map
    fn make(attributes: Value) -> DtoResult<Self> {
        Ok(serde_json::from_value(attributes)?)
    }

    /// Serialize the declared attributes as they are
    fn to_raw_array(&self) -> DtoResult<Attributes> {
        match serde_json::to_value(self)? {
            Value::Object(attributes) => Ok(attributes),
            other => Err(DtoError::Serialization(format!(
                "A transferable must serialize to an object, got `{}`",
                other
            ))),
        }
    }

    /// Serialize for output; types rewriting their outgoing keys override
    /// this
    fn to_array(&self) -> DtoResult<Attributes> {
        self.to_raw_array()
    }

    fn get_attributes(&self) -> DtoResult<Attributes> {
        self.to_raw_array()
    }
}
