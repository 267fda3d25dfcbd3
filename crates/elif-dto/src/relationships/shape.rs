//! Id shapes - the permitted kinds of value for a relation
//!
//! A shape is written as a small expression of `|`-separated tokens:
//! `int`, `string`, `null` and `empty`. Array-style hints such as `int[]`
//! are accepted and read as their element token.

use std::fmt;

use super::id::IdKind;
use crate::error::{DtoError, DtoResult};

pub const SHAPE_SEPARATOR: char = '|';

/// Ordered set of id kinds a relation accepts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdShape {
    kinds: Vec<IdKind>,
}

impl IdShape {
    /// Shape used for bare-name declarations: anything goes
    pub fn permissive() -> Self {
        Self {
            kinds: vec![IdKind::Integer, IdKind::String, IdKind::Empty, IdKind::Null],
        }
    }

    /// Build a shape from explicit kinds, dropping repeats
    pub fn from_kinds(kinds: impl IntoIterator<Item = IdKind>) -> Self {
        let mut shape = Self { kinds: Vec::new() };
        for kind in kinds {
            if !shape.kinds.contains(&kind) {
                shape.kinds.push(kind);
            }
        }
        shape
    }

    /// Parse a shape expression declared for `relation`
    pub fn parse(relation: &str, expr: &str) -> DtoResult<Self> {
        let kinds = expr
            .split(SHAPE_SEPARATOR)
            .map(|token| parse_token(relation, expr, token))
            .collect::<DtoResult<Vec<_>>>()?;

        Ok(Self::from_kinds(kinds))
    }

    pub fn contains(&self, kind: IdKind) -> bool {
        self.kinds.contains(&kind)
    }

    pub fn allows_null(&self) -> bool {
        self.contains(IdKind::Null)
    }

    pub fn allows_empty(&self) -> bool {
        self.contains(IdKind::Empty)
    }

    pub fn kinds(&self) -> &[IdKind] {
        &self.kinds
    }
}

impl Default for IdShape {
    fn default() -> Self {
        Self::permissive()
    }
}

impl fmt::Display for IdShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.kinds.iter().map(|kind| kind.as_str()).collect();
        write!(f, "{}", names.join("|"))
    }
}

fn parse_token(relation: &str, expr: &str, token: &str) -> DtoResult<IdKind> {
    let token = token.trim();
    let token = token.strip_suffix("[]").unwrap_or(token);

    match token {
        "int" | "integer" => Ok(IdKind::Integer),
        "string" => Ok(IdKind::String),
        "null" => Ok(IdKind::Null),
        "empty" => Ok(IdKind::Empty),
        _ => Err(DtoError::constraint(
            relation,
            format!(
                "Unknown id type `{}` in the {} relationship declaration `{}`.",
                token, relation, expr
            ),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tokens_in_declared_order() {
        let shape = IdShape::parse("parent", "int|null").unwrap();
        assert_eq!(shape.kinds(), &[IdKind::Integer, IdKind::Null]);
        assert_eq!(shape.to_string(), "integer|null");
        assert!(shape.allows_null());
        assert!(!shape.allows_empty());
    }

    #[test]
    fn test_parse_tolerates_whitespace_and_array_hints() {
        let shape = IdShape::parse("tags", " string[] | empty ").unwrap();
        assert_eq!(shape.kinds(), &[IdKind::String, IdKind::Empty]);
    }

    #[test]
    fn test_parse_drops_repeated_tokens() {
        let shape = IdShape::parse("tags", "int|int|null").unwrap();
        assert_eq!(shape.to_string(), "integer|null");
    }

    #[test]
    fn test_unknown_token_is_rejected() {
        let err = IdShape::parse("parent", "int|uuid").unwrap_err();
        assert!(matches!(err, DtoError::RelationConstraintViolation { ref relation, .. } if relation == "parent"));
        assert!(err.to_string().contains("`uuid`"));

        assert!(IdShape::parse("parent", "").is_err());
        assert!(IdShape::parse("parent", "int|").is_err());
    }

    #[test]
    fn test_permissive_shape() {
        let shape = IdShape::default();
        assert_eq!(shape.to_string(), "integer|string|empty|null");
    }
}
