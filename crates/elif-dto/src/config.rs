//! Declarative relation configuration
//!
//! Relations can be declared in YAML or JSON instead of code:
//!
//! ```yaml
//! to_one:
//!   parent: int|null
//! to_many:
//!   children: int|empty
//!   tags: ~            # bare name, any id shape
//! ```
//!
//! Either side may also be a plain list of bare names.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::DtoResult;
use crate::relationships::{RelationDecl, RelationSpec};

/// Relation declarations of one kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RelationDeclarations {
    /// Bare names only
    Names(Vec<String>),
    /// Names with an optional shape expression
    Shapes(BTreeMap<String, Option<String>>),
}

impl Default for RelationDeclarations {
    fn default() -> Self {
        RelationDeclarations::Names(Vec::new())
    }
}

impl RelationDeclarations {
    pub fn decls(&self) -> Vec<RelationDecl> {
        match self {
            RelationDeclarations::Names(names) => names.iter().cloned().map(RelationDecl::bare).collect(),
            RelationDeclarations::Shapes(shapes) => shapes
                .iter()
                .map(|(name, shape)| match shape.as_deref().map(str::trim) {
                    Some(expr) if !expr.is_empty() => RelationDecl::shaped(name.clone(), expr),
                    _ => RelationDecl::bare(name.clone()),
                })
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            RelationDeclarations::Names(names) => names.is_empty(),
            RelationDeclarations::Shapes(shapes) => shapes.is_empty(),
        }
    }
}

/// Relation configuration of a DTO type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationConfig {
    #[serde(default, alias = "toOne")]
    pub to_one: RelationDeclarations,
    #[serde(default, alias = "toMany")]
    pub to_many: RelationDeclarations,
}

impl RelationConfig {
    pub fn from_yaml_str(source: &str) -> DtoResult<Self> {
        Ok(serde_yaml::from_str(source)?)
    }

    pub fn from_json_str(source: &str) -> DtoResult<Self> {
        Ok(serde_json::from_str(source)?)
    }

    /// Parse the declarations into a relation spec
    pub fn into_spec(self) -> DtoResult<RelationSpec> {
        RelationSpec::declare(self.to_one.decls(), self.to_many.decls())
    }
}

impl RelationSpec {
    /// Build a spec from a YAML relation configuration
    pub fn from_yaml_str(source: &str) -> DtoResult<Self> {
        RelationConfig::from_yaml_str(source)?.into_spec()
    }

    /// Build a spec from a JSON relation configuration
    pub fn from_json_str(source: &str) -> DtoResult<Self> {
        RelationConfig::from_json_str(source)?.into_spec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DtoError;
    use crate::relationships::{IdKind, RelationKind};

    #[test]
    fn test_yaml_config() {
        let spec = RelationSpec::from_yaml_str(
            r#"
to_one:
  parent: int|null
to_many:
  children: int|empty
  tags: ~
"#,
        )
        .unwrap();

        assert_eq!(spec.kind_of("parent"), Some(RelationKind::ToOne));
        assert_eq!(spec.shape_of("children").unwrap().to_string(), "integer|empty");
        assert!(spec.shape_of("tags").unwrap().contains(IdKind::Null));
    }

    #[test]
    fn test_json_config_with_camel_keys_and_name_lists() {
        let spec = RelationSpec::from_json_str(r#"{"toOne": ["author"], "toMany": {"tags": "string|empty"}}"#).unwrap();

        assert!(spec.is_to_one("author"));
        assert!(spec.shape_of("author").unwrap().contains(IdKind::Integer));
        assert!(spec.is_to_many("tags"));
        assert!(!spec.shape_of("tags").unwrap().allows_null());
    }

    #[test]
    fn test_missing_sections_default_to_nothing() {
        let config = RelationConfig::from_yaml_str("to_many: [children]").unwrap();
        assert!(config.to_one.is_empty());

        let spec = config.into_spec().unwrap();
        assert_eq!(spec.len(), 1);
    }

    #[test]
    fn test_blank_shape_is_bare() {
        let config = RelationConfig::from_json_str(r#"{"to_one": {"owner": "  "}}"#).unwrap();
        assert_eq!(config.to_one.decls(), vec![RelationDecl::bare("owner")]);
    }

    #[test]
    fn test_bad_token_in_config() {
        let err = RelationSpec::from_yaml_str("to_one:\n  parent: int|float\n").unwrap_err();
        assert!(matches!(err, DtoError::RelationConstraintViolation { .. }));
    }

    #[test]
    fn test_malformed_document() {
        let err = RelationConfig::from_json_str("{\"to_one\": 5}").unwrap_err();
        assert!(matches!(err, DtoError::Serialization(_)));
    }
}
