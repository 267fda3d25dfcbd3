//! Relationship Container - Per-DTO store of relation changes
//!
//! Holds the to-one values and the to-many base/overlay state of a single
//! DTO instance. Every mutation is validated against the shared
//! [`RelationSpec`] before any state is touched, so a failed call leaves the
//! container exactly as it was.

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

use super::diff::{ManyDiff, ToManySlot};
use super::id::{IdKind, RelatedEntry, RelatedId};
use super::meta::{MetaSource, RelationMeta};
use super::spec::{RelationDef, RelationKind, RelationSpec};
use crate::error::{DtoError, DtoResult};

/// State of one to-many relation
#[derive(Debug, Clone, Default, PartialEq)]
struct ToManyState {
    base: ToManySlot,
    additions: Vec<RelatedId>,
    removals: Vec<RelatedId>,
    meta: RelationMeta,
}

/// Relationship changes of a single DTO
#[derive(Debug, Clone)]
pub struct Relationships {
    spec: Arc<RelationSpec>,
    /// Presence means the relation was set; `None` is an explicit null
    one: HashMap<String, Option<RelatedId>>,
    many: HashMap<String, ToManyState>,
}

impl Relationships {
    pub fn new(spec: impl Into<Arc<RelationSpec>>) -> Self {
        Self {
            spec: spec.into(),
            one: HashMap::new(),
            many: HashMap::new(),
        }
    }

    /// The declarations this container validates against
    pub fn spec(&self) -> &RelationSpec {
        &self.spec
    }

    /// Check if `relation` is declared as a to-one relation
    pub fn has_to_one(&self, relation: &str) -> bool {
        self.spec.is_to_one(relation)
    }

    /// Check if a to-one value (null included) has been set
    pub fn is_to_one_set(&self, relation: &str) -> bool {
        self.has_to_one(relation) && self.one.contains_key(relation)
    }

    /// Get the related id of a to-one relation
    pub fn get_one_related(&self, relation: &str) -> DtoResult<Option<RelatedId>> {
        self.spec.require(relation, RelationKind::ToOne)?;

        Ok(self.one.get(relation).cloned().flatten())
    }

    /// Set the related id, or null, of a to-one relation
    ///
    /// Entity references are passed as `RelatedId::from(&entity)`.
    pub fn set_one_related(&mut self, relation: &str, id: Option<RelatedId>) -> DtoResult<()> {
        let def = self.spec.require(relation, RelationKind::ToOne)?;
        check_id_kind(def, id.as_ref())?;

        tracing::debug!("Setting to-one relation '{}' to {:?}", relation, id);
        self.one.insert(relation.to_string(), id);

        Ok(())
    }

    /// Forget the value of a to-one relation; it reads as null afterwards
    pub fn unset_one_related(&mut self, relation: &str) -> DtoResult<()> {
        self.spec.require(relation, RelationKind::ToOne)?;

        self.one.remove(relation);
        Ok(())
    }

    /// Check if `relation` is declared as a to-many relation
    pub fn has_to_many(&self, relation: &str) -> bool {
        self.spec.is_to_many(relation)
    }

    /// Check if a to-many replacement (null included) has been set
    pub fn is_to_many_set(&self, relation: &str) -> bool {
        self.many
            .get(relation)
            .map(|state| !state.base.is_unset())
            .unwrap_or(false)
    }

    /// Check if `relation` has an explicitly set value of either kind
    pub fn is_set(&self, relation: &str) -> bool {
        self.is_to_one_set(relation) || self.is_to_many_set(relation)
    }

    /// Check if a relation was explicitly touched: a to-one value set, a
    /// to-many replaced, or a to-many with pending additions or removals
    pub fn is_touched(&self, relation: &str) -> bool {
        if self.is_set(relation) {
            return true;
        }

        match self.spec.get(relation) {
            Some(def) if def.kind == RelationKind::ToMany => self.diff_of(def).has_changes(),
            _ => false,
        }
    }

    /// Get the effective ids of a to-many relation: the replacement, plus
    /// any additions, minus any removals
    pub fn get_many_related(&self, relation: &str) -> DtoResult<Option<Vec<RelatedId>>> {
        Ok(self.many_diff(relation)?.merged())
    }

    /// Get the pending additions of a to-many relation
    pub fn get_many_additions(&self, relation: &str) -> DtoResult<&[RelatedId]> {
        Ok(self.many_diff(relation)?.additions())
    }

    /// Get the pending removals of a to-many relation
    pub fn get_many_removals(&self, relation: &str) -> DtoResult<&[RelatedId]> {
        Ok(self.many_diff(relation)?.removals())
    }

    /// Borrow the base and overlays of a to-many relation
    pub fn many_diff(&self, relation: &str) -> DtoResult<ManyDiff<'_>> {
        let def = self.spec.require(relation, RelationKind::ToMany)?;
        Ok(self.diff_of(def))
    }

    fn diff_of(&self, def: &RelationDef) -> ManyDiff<'_> {
        static UNTOUCHED: ToManyState = ToManyState {
            base: ToManySlot::Unset,
            additions: Vec::new(),
            removals: Vec::new(),
            meta: RelationMeta::new(),
        };

        let state = self.many.get(&def.name).unwrap_or(&UNTOUCHED);

        ManyDiff::new(
            &state.base,
            &state.additions,
            &state.removals,
            def.shape.allows_null(),
        )
    }

    /// Add an id to a to-many relation, with optional metadata
    ///
    /// Additions are not de-duplicated. A pending removal of the same id is
    /// dropped.
    pub fn add_to_many_relation(
        &mut self,
        relation: &str,
        id: impl Into<RelatedId>,
        meta: Option<&dyn MetaSource>,
    ) -> DtoResult<()> {
        let id = id.into();
        let def = self.spec.require(relation, RelationKind::ToMany)?;
        check_id_kind(def, Some(&id))?;
        let meta = meta.map(|source| source.to_meta()).transpose()?;

        tracing::debug!("Adding {} to to-many relation '{}'", id, relation);

        let state = self.many.entry(relation.to_string()).or_default();
        state.removals.retain(|removed| removed != &id);
        if let Some(meta) = meta {
            state.meta.insert(id.clone(), meta);
        }
        state.additions.push(id);

        Ok(())
    }

    /// Remove an id from a to-many relation
    ///
    /// Removing an id that is pending addition cancels the addition instead
    /// of recording a removal.
    pub fn remove_to_many_relation(&mut self, relation: &str, id: impl Into<RelatedId>) -> DtoResult<()> {
        let id = id.into();
        let def = self.spec.require(relation, RelationKind::ToMany)?;
        check_id_kind(def, Some(&id))?;

        let state = self.many.entry(relation.to_string()).or_default();
        if state.additions.contains(&id) {
            tracing::debug!("Cancelling pending addition of {} to '{}'", id, relation);
            state.additions.retain(|added| added != &id);
        } else {
            tracing::debug!("Removing {} from to-many relation '{}'", id, relation);
            state.removals.push(id);
        }

        Ok(())
    }

    /// Replace a to-many relation, discarding any pending additions,
    /// removals and metadata
    ///
    /// `None` replaces with null and needs a nullable shape; an empty list
    /// needs a shape that permits empty. Metadata carried by
    /// [`RelatedEntry::WithMeta`] entries is merged over `meta`.
    pub fn replace_to_many(
        &mut self,
        relation: &str,
        ids: Option<Vec<RelatedEntry>>,
        meta: Option<RelationMeta>,
    ) -> DtoResult<()> {
        let def = self.spec.require(relation, RelationKind::ToMany)?;
        let mut meta = meta.unwrap_or_default();

        let base = match ids {
            None => {
                if !def.shape.allows_null() {
                    return Err(DtoError::constraint(
                        relation,
                        format!("The {} relationship must not be null.", relation),
                    ));
                }
                ToManySlot::ExplicitNull
            }
            Some(entries) if entries.is_empty() => {
                if !def.shape.allows_empty() {
                    return Err(DtoError::constraint(
                        relation,
                        format!("The {} relationship must not be empty.", relation),
                    ));
                }
                ToManySlot::ExplicitList(Vec::new())
            }
            Some(entries) => {
                let mut ids = Vec::with_capacity(entries.len());
                for entry in entries {
                    check_id_kind(def, Some(entry.id()))?;

                    let (id, inline) = entry.into_parts();
                    if let Some(inline) = inline {
                        meta.insert(id.clone(), inline);
                    }
                    ids.push(id);
                }
                ToManySlot::ExplicitList(ids)
            }
        };

        tracing::debug!("Replacing to-many relation '{}' with {:?}", relation, base);
        self.many.insert(
            relation.to_string(),
            ToManyState {
                base,
                meta,
                ..ToManyState::default()
            },
        );

        Ok(())
    }

    /// Reset a to-many relation to its untouched state
    ///
    /// Only allowed when the relation may be null or empty.
    pub fn reset_to_many(&mut self, relation: &str) -> DtoResult<()> {
        let def = self.spec.require(relation, RelationKind::ToMany)?;

        if !def.shape.allows_null() && !def.shape.allows_empty() {
            return Err(DtoError::constraint(
                relation,
                format!("The {} relationship must be set.", relation),
            ));
        }

        tracing::debug!("Resetting to-many relation '{}'", relation);
        self.many.remove(relation);

        Ok(())
    }

    /// Get the metadata of a to-many relation
    pub fn get_meta_data(&self, relation: &str) -> DtoResult<&RelationMeta> {
        static NO_META: RelationMeta = RelationMeta::new();

        self.spec.require(relation, RelationKind::ToMany)?;

        Ok(self
            .many
            .get(relation)
            .map(|state| &state.meta)
            .unwrap_or(&NO_META))
    }

    /// Overwrite the metadata of a to-many relation
    ///
    /// Accepts a [`RelationMeta`] or any id/value pairs whose values
    /// normalise through [`MetaSource`].
    pub fn set_meta_data<I, K, M>(&mut self, relation: &str, meta: I) -> DtoResult<()>
    where
        I: IntoIterator<Item = (K, M)>,
        K: Into<RelatedId>,
        M: MetaSource,
    {
        self.spec.require(relation, RelationKind::ToMany)?;

        let meta = meta
            .into_iter()
            .map(|(id, source)| Ok((id.into(), source.to_meta()?)))
            .collect::<DtoResult<RelationMeta>>()?;

        self.many.entry(relation.to_string()).or_default().meta = meta;
        Ok(())
    }

    /// Serialize every declared relation into a flat map
    ///
    /// To-one relations map to an id or null; to-many relations map to
    /// their effective id list, or null.
    pub fn to_array(&self) -> Map<String, Value> {
        let mut output = Map::new();

        for def in self.spec.iter() {
            let value = match def.kind {
                RelationKind::ToOne => {
                    let id = self.one.get(&def.name).cloned().flatten();
                    id.map_or(Value::Null, id_to_value)
                }
                RelationKind::ToMany => {
                    self.diff_of(def).merged().map_or(Value::Null, |ids| {
                        Value::Array(ids.into_iter().map(id_to_value).collect())
                    })
                }
            };
            output.insert(def.name.clone(), value);
        }

        output
    }
}

fn id_to_value(id: RelatedId) -> Value {
    match id {
        RelatedId::Int(id) => Value::from(id),
        RelatedId::Str(id) => Value::String(id),
    }
}

/// Validate the runtime kind of an id written into `def`
fn check_id_kind(def: &RelationDef, id: Option<&RelatedId>) -> DtoResult<()> {
    let given = IdKind::of(id);

    if def.shape.contains(given) {
        return Ok(());
    }

    Err(DtoError::RelationTypeMismatch {
        relation: def.name.clone(),
        expected: def.shape.clone(),
        value: id.map(ToString::to_string).unwrap_or_default(),
        given,
    })
}
