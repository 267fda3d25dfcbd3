//! Storable - full and patch payloads for DTOs with relationships
//!
//! A creation DTO stores every attribute and relation. A patching DTO only
//! stores what was explicitly provided: attributes holding a value,
//! relations that were set or incrementally changed, and any name forced
//! by the caller.

use crate::error::DtoResult;
use crate::relationships::{RelationSpec, Relationships};
use crate::transferable::{Attributes, Transferable};

/// Bookkeeping a storable DTO carries next to its attributes
///
/// Embed it with `#[serde(skip)]` so it never reaches the attribute map.
#[derive(Debug, Clone, Default)]
pub struct StorableState {
    relationships: Option<Relationships>,
    forced: Vec<String>,
}

impl StorableState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The relationship container, if it has been created yet
    pub fn relationships(&self) -> Option<&Relationships> {
        self.relationships.as_ref()
    }

    /// Get the relationship container, creating it on first access
    pub fn relationships_or_try_init<F>(&mut self, declare: F) -> DtoResult<&mut Relationships>
    where
        F: FnOnce() -> DtoResult<RelationSpec>,
    {
        let relationships = match self.relationships.take() {
            Some(relationships) => relationships,
            None => {
                let spec = declare()?;
                tracing::trace!("Creating relationship container for {} relations", spec.len());
                Relationships::new(spec)
            }
        };

        Ok(self.relationships.insert(relationships))
    }

    pub fn forced(&self) -> &[String] {
        &self.forced
    }

    pub fn set_forced(&mut self, forced: Vec<String>) {
        self.forced = forced;
    }

    fn is_forced(&self, name: &str) -> bool {
        self.forced.iter().any(|forced| forced == name)
    }

    fn is_relation_touched(&self, name: &str) -> bool {
        self.relationships
            .as_ref()
            .map(|relationships| relationships.is_touched(name))
            .unwrap_or(false)
    }
}

/// A DTO that can produce a storage payload
pub trait Storable: Transferable {
    /// Relations of this DTO type
    fn declare_relations() -> DtoResult<RelationSpec> {
        Ok(RelationSpec::default())
    }

    /// Whether this DTO describes a partial update
    fn is_patching(&self) -> bool {
        false
    }

    fn storable_state(&self) -> &StorableState;

    fn storable_state_mut(&mut self) -> &mut StorableState;

    /// Manage the relationships of this DTO
    fn relationships(&mut self) -> DtoResult<&mut Relationships> {
        self.storable_state_mut()
            .relationships_or_try_init(Self::declare_relations)
    }

    /// Serialize every declared relation
    fn get_relationships(&self) -> DtoResult<Attributes> {
        match self.storable_state().relationships() {
            Some(relationships) => Ok(relationships.to_array()),
            None => Ok(Relationships::new(Self::declare_relations()?).to_array()),
        }
    }

    /// Check if an attribute or relation belongs in the storage payload
    fn is_storable(&self, name: &str) -> DtoResult<bool> {
        if !self.is_patching() {
            return Ok(true);
        }

        let raw = self.to_raw_array()?;
        Ok(is_provided(self.storable_state(), &raw, name))
    }

    fn forced(&self) -> &[String] {
        self.storable_state().forced()
    }

    /// Store the named attributes or relations even when patching and
    /// unset; replaces any previously forced names
    fn force<I, S>(&mut self, names: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let forced: Vec<String> = names.into_iter().map(Into::into).collect();
        tracing::debug!("Forcing storable names {:?}", forced);

        self.storable_state_mut().set_forced(forced);
        self
    }

    /// Attributes and relations to store
    ///
    /// When patching, only provided or forced names are kept. An attribute
    /// takes precedence over a relation of the same name.
    fn to_storable_array(&self) -> DtoResult<Attributes> {
        let raw = self.to_raw_array()?;
        let relations = self.get_relationships()?;
        let state = self.storable_state();
        let patching = self.is_patching();

        let mut payload = Attributes::new();
        for (name, value) in raw.iter().chain(relations.iter()) {
            if payload.contains_key(name) {
                continue;
            }
            if !patching || is_provided(state, &raw, name) {
                payload.insert(name.clone(), value.clone());
            }
        }

        Ok(payload)
    }
}

fn is_provided(state: &StorableState, raw: &Attributes, name: &str) -> bool {
    let has_value = raw.get(name).map(|value| !value.is_null()).unwrap_or(false);

    has_value || state.is_relation_touched(name) || state.is_forced(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DtoError;
    use crate::relationships::RelatedId;
    use serde::{Deserialize, Serialize};
    use serde_json::{json, Value};

    #[derive(Debug, Default, Serialize, Deserialize)]
    struct PatchData {
        foo: Option<String>,
        bar: Option<i64>,
        #[serde(default)]
        baz: Vec<String>,
        #[serde(skip)]
        storable: StorableState,
    }

    impl Transferable for PatchData {}

    impl Storable for PatchData {
        fn declare_relations() -> DtoResult<RelationSpec> {
            RelationSpec::declare([("parent", "int|null")], [("children", "int|empty|null")])
        }

        fn is_patching(&self) -> bool {
            true
        }

        fn storable_state(&self) -> &StorableState {
            &self.storable
        }

        fn storable_state_mut(&mut self) -> &mut StorableState {
            &mut self.storable
        }
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    struct BrokenData {
        #[serde(skip)]
        storable: StorableState,
    }

    impl Transferable for BrokenData {}

    impl Storable for BrokenData {
        fn declare_relations() -> DtoResult<RelationSpec> {
            RelationSpec::declare([("parent", "int|uuid")], Vec::<&str>::new())
        }

        fn storable_state(&self) -> &StorableState {
            &self.storable
        }

        fn storable_state_mut(&mut self) -> &mut StorableState {
            &mut self.storable
        }
    }

    fn patch(foo: Option<&str>) -> PatchData {
        PatchData {
            foo: foo.map(str::to_string),
            ..PatchData::default()
        }
    }

    #[test]
    fn test_relationships_are_created_once() {
        let mut data = patch(None);
        assert!(data.storable_state().relationships().is_none());

        data.relationships().unwrap().set_one_related("parent", Some(RelatedId::Int(10))).unwrap();
        assert_eq!(
            data.relationships().unwrap().get_one_related("parent").unwrap(),
            Some(RelatedId::Int(10))
        );
    }

    #[test]
    fn test_patch_mode_reports_provided_attributes() {
        let data = patch(Some(":-)"));

        assert!(data.is_storable("foo").unwrap());
        assert!(!data.is_storable("bar").unwrap());
        assert!(data.is_storable("baz").unwrap());
        assert!(!data.is_storable("parent").unwrap());
    }

    #[test]
    fn test_force_replaces_previous_names() {
        let mut data = patch(None);
        data.force(["bar"]).force(["children"]);

        assert_eq!(data.forced(), &["children".to_string()]);
        assert!(!data.is_storable("bar").unwrap());
        assert!(data.is_storable("children").unwrap());
    }

    #[test]
    fn test_relations_are_filtered_when_patching() {
        let mut data = patch(Some(":-)"));
        data.relationships().unwrap().set_one_related("parent", Some(RelatedId::Int(10))).unwrap();

        assert_eq!(
            Value::Object(data.to_storable_array().unwrap()),
            json!({"foo": ":-)", "baz": [], "parent": 10})
        );
    }

    #[test]
    fn test_relationships_output_without_container() {
        let data = patch(None);
        assert_eq!(
            Value::Object(data.get_relationships().unwrap()),
            json!({"parent": null, "children": null})
        );
    }

    #[test]
    fn test_declaration_errors_propagate() {
        let mut data = BrokenData::default();

        assert!(matches!(data.relationships(), Err(DtoError::RelationConstraintViolation { .. })));
        assert!(data.get_relationships().is_err());
        assert!(data.to_storable_array().is_err());
        assert!(data.storable_state().relationships().is_none());
    }
}
