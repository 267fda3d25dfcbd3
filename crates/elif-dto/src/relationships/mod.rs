//! Relationships Module - Relation declarations, change tracking and diffing

pub mod container;
pub mod diff;
pub mod id;
pub mod meta;
pub mod shape;
pub mod spec;

pub use container::Relationships;
pub use diff::{merge, ManyDiff, ToManySlot};
pub use id::{IdKind, Keyed, RelatedEntry, RelatedId};
pub use meta::{Meta, MetaSource, RelationMeta};
pub use shape::IdShape;
pub use spec::{RelationDecl, RelationDef, RelationKind, RelationSpec};
