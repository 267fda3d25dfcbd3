//! # elif-dto
//!
//! Storable data-transfer objects for the elif framework.
//! Tracks to-one and to-many relationship changes on a DTO, validates the
//! shape of related ids, and produces full or patch storage payloads.

pub mod config;
pub mod error;
pub mod relationships;
pub mod storable;
pub mod transferable;

// Re-exports for easy access
pub use config::{RelationConfig, RelationDeclarations};
pub use error::{DtoError, DtoResult};
pub use relationships::{
    merge, IdKind, IdShape, Keyed, ManyDiff, Meta, MetaSource, RelatedEntry, RelatedId, RelationDecl,
    RelationDef, RelationKind, RelationMeta, RelationSpec, Relationships, ToManySlot,
};
pub use storable::{Storable, StorableState};
pub use transferable::{Attributes, Transferable};
