//! Relation Spec - Immutable declaration of a DTO's relations
//!
//! A spec maps every relation name to its kind (to-one or to-many) and the
//! id shape it accepts. It is built once, then shared read-only by the
//! container that validates mutations against it.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use super::shape::IdShape;
use crate::error::{DtoError, DtoResult};

/// Cardinality of a relation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationKind {
    /// Holds at most one id
    ToOne,
    /// Holds an ordered collection of ids
    ToMany,
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelationKind::ToOne => f.write_str("To-one"),
            RelationKind::ToMany => f.write_str("To-many"),
        }
    }
}

/// A single relation declaration before parsing: a bare name, or a name
/// with a shape expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationDecl {
    pub name: String,
    pub shape: Option<String>,
}

impl RelationDecl {
    pub fn bare(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shape: None,
        }
    }

    pub fn shaped(name: impl Into<String>, shape: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shape: Some(shape.into()),
        }
    }
}

impl From<&str> for RelationDecl {
    fn from(name: &str) -> Self {
        RelationDecl::bare(name)
    }
}

impl From<String> for RelationDecl {
    fn from(name: String) -> Self {
        RelationDecl::bare(name)
    }
}

impl From<(&str, &str)> for RelationDecl {
    fn from((name, shape): (&str, &str)) -> Self {
        RelationDecl::shaped(name, shape)
    }
}

impl From<(String, String)> for RelationDecl {
    fn from((name, shape): (String, String)) -> Self {
        RelationDecl::shaped(name, shape)
    }
}

/// Parsed definition of one relation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationDef {
    pub name: String,
    pub kind: RelationKind,
    pub shape: IdShape,
}

/// Declared relations of a DTO, in declaration order (to-one first)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelationSpec {
    defs: Vec<RelationDef>,
    index: HashMap<String, usize>,
}

impl RelationSpec {
    /// Declare the to-one and to-many relations of a DTO
    ///
    /// Bare names accept any id shape. A malformed shape expression or a
    /// name declared twice fails with `RelationConstraintViolation`.
    pub fn declare<O, M>(to_one: O, to_many: M) -> DtoResult<Self>
    where
        O: IntoIterator,
        O::Item: Into<RelationDecl>,
        M: IntoIterator,
        M::Item: Into<RelationDecl>,
    {
        let mut spec = Self::default();

        for decl in to_one {
            spec.push(RelationKind::ToOne, decl.into())?;
        }
        for decl in to_many {
            spec.push(RelationKind::ToMany, decl.into())?;
        }

        tracing::debug!(
            "Declared relation spec with {} to-one and {} to-many relations",
            spec.to_one_names().count(),
            spec.to_many_names().count()
        );

        Ok(spec)
    }

    fn push(&mut self, kind: RelationKind, decl: RelationDecl) -> DtoResult<()> {
        if self.index.contains_key(&decl.name) {
            return Err(DtoError::constraint(
                &decl.name,
                format!("The {} relationship is declared more than once.", decl.name),
            ));
        }

        let shape = match decl.shape.as_deref() {
            Some(expr) => IdShape::parse(&decl.name, expr)?,
            None => IdShape::permissive(),
        };

        self.index.insert(decl.name.clone(), self.defs.len());
        self.defs.push(RelationDef {
            name: decl.name,
            kind,
            shape,
        });

        Ok(())
    }

    /// Get the definition of a relation
    pub fn get(&self, name: &str) -> Option<&RelationDef> {
        self.index.get(name).map(|&position| &self.defs[position])
    }

    /// Get the definition of a relation, requiring the given kind
    pub fn require(&self, name: &str, kind: RelationKind) -> DtoResult<&RelationDef> {
        self.get(name)
            .filter(|def| def.kind == kind)
            .ok_or_else(|| DtoError::not_found(name, kind))
    }

    pub fn kind_of(&self, name: &str) -> Option<RelationKind> {
        self.get(name).map(|def| def.kind)
    }

    pub fn shape_of(&self, name: &str) -> Option<&IdShape> {
        self.get(name).map(|def| &def.shape)
    }

    pub fn is_to_one(&self, name: &str) -> bool {
        self.kind_of(name) == Some(RelationKind::ToOne)
    }

    pub fn is_to_many(&self, name: &str) -> bool {
        self.kind_of(name) == Some(RelationKind::ToMany)
    }

    /// All definitions in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &RelationDef> {
        self.defs.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.defs.iter().map(|def| def.name.as_str())
    }

    pub fn to_one_names(&self) -> impl Iterator<Item = &str> {
        self.names_of(RelationKind::ToOne)
    }

    pub fn to_many_names(&self) -> impl Iterator<Item = &str> {
        self.names_of(RelationKind::ToMany)
    }

    fn names_of(&self, kind: RelationKind) -> impl Iterator<Item = &str> {
        self.defs
            .iter()
            .filter(move |def| def.kind == kind)
            .map(|def| def.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relationships::IdKind;

    #[test]
    fn test_declare_with_definitions() {
        let spec = RelationSpec::declare([("parent", "int|null")], [("children", "int|empty")]).unwrap();

        assert_eq!(spec.len(), 2);
        assert!(spec.is_to_one("parent"));
        assert!(spec.is_to_many("children"));
        assert!(!spec.is_to_one("children"));
        assert_eq!(spec.shape_of("parent").unwrap().to_string(), "integer|null");
        assert_eq!(spec.kind_of("missing"), None);
    }

    #[test]
    fn test_declare_without_definitions() {
        let spec = RelationSpec::declare(Vec::<RelationDecl>::new(), Vec::<RelationDecl>::new()).unwrap();
        assert!(spec.is_empty());
        assert_eq!(spec, RelationSpec::default());
    }

    #[test]
    fn test_bare_names_get_the_permissive_shape() {
        let spec = RelationSpec::declare(["author"], ["tags"]).unwrap();
        let shape = spec.shape_of("tags").unwrap();

        for kind in [IdKind::Integer, IdKind::String, IdKind::Null, IdKind::Empty] {
            assert!(shape.contains(kind));
        }
    }

    #[test]
    fn test_declaration_order_is_preserved() {
        let spec = RelationSpec::declare(
            [RelationDecl::shaped("b", "int"), RelationDecl::bare("a")],
            [RelationDecl::shaped("d", "string"), RelationDecl::bare("c")],
        )
        .unwrap();

        assert_eq!(spec.names().collect::<Vec<_>>(), vec!["b", "a", "d", "c"]);
        assert_eq!(spec.to_one_names().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(spec.to_many_names().collect::<Vec<_>>(), vec!["d", "c"]);
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let err = RelationSpec::declare(["owner"], ["owner"]).unwrap_err();
        assert!(matches!(err, DtoError::RelationConstraintViolation { .. }));
    }

    #[test]
    fn test_malformed_shape_is_fatal() {
        let err = RelationSpec::declare([("parent", "int|object")], Vec::<RelationDecl>::new()).unwrap_err();
        assert_eq!(err.relation(), Some("parent"));
    }

    #[test]
    fn test_require_checks_kind() {
        let spec = RelationSpec::declare(["parent"], ["children"]).unwrap();

        assert!(spec.require("parent", RelationKind::ToOne).is_ok());
        assert_eq!(
            spec.require("parent", RelationKind::ToMany).unwrap_err(),
            DtoError::RelationNotFound {
                name: "parent".to_string(),
                kind: RelationKind::ToMany,
            }
        );
    }
}
