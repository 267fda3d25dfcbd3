//! To-many diff resolution
//!
//! A to-many relation is a base slot plus two overlays: pending additions
//! and pending removals. Reading the relation merges them; producers that
//! write incremental attach/detach operations read the overlays directly.

use super::id::RelatedId;

/// Base value of a to-many relation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ToManySlot {
    /// Never replaced
    #[default]
    Unset,
    /// Explicitly replaced with null
    ExplicitNull,
    /// Explicitly replaced with a list (duplicates permitted)
    ExplicitList(Vec<RelatedId>),
}

impl ToManySlot {
    pub fn is_unset(&self) -> bool {
        matches!(self, ToManySlot::Unset)
    }

    pub fn ids(&self) -> &[RelatedId] {
        match self {
            ToManySlot::ExplicitList(ids) => ids,
            ToManySlot::Unset | ToManySlot::ExplicitNull => &[],
        }
    }
}

/// Borrowed view over a to-many relation's base and overlays
#[derive(Debug, Clone, Copy)]
pub struct ManyDiff<'a> {
    base: &'a ToManySlot,
    additions: &'a [RelatedId],
    removals: &'a [RelatedId],
    nullable: bool,
}

impl<'a> ManyDiff<'a> {
    /// `nullable` is whether the relation's shape permits null, which
    /// decides how an untouched relation reads
    pub fn new(
        base: &'a ToManySlot,
        additions: &'a [RelatedId],
        removals: &'a [RelatedId],
        nullable: bool,
    ) -> Self {
        Self {
            base,
            additions,
            removals,
            nullable,
        }
    }

    pub fn base(&self) -> &'a ToManySlot {
        self.base
    }

    pub fn additions(&self) -> &'a [RelatedId] {
        self.additions
    }

    pub fn removals(&self) -> &'a [RelatedId] {
        self.removals
    }

    /// Whether the base was explicitly replaced (with a list or null)
    pub fn is_replacement(&self) -> bool {
        !self.base.is_unset()
    }

    /// Whether there are pending incremental changes
    pub fn has_changes(&self) -> bool {
        !self.additions.is_empty() || !self.removals.is_empty()
    }

    /// Effective value: base followed by additions, without any removed id
    ///
    /// An explicit null with nothing added reads as null. An untouched
    /// relation with nothing added reads as null only when the shape
    /// permits null, and as an empty list otherwise.
    pub fn merged(&self) -> Option<Vec<RelatedId>> {
        if self.additions.is_empty() {
            match self.base {
                ToManySlot::ExplicitNull => return None,
                ToManySlot::Unset if self.nullable => return None,
                _ => {}
            }
        }

        Some(merge(self.base.ids(), self.additions, self.removals))
    }
}

/// Concatenate `base` and `additions`, dropping every occurrence of an id
/// listed in `removals`; order and remaining duplicates are kept
pub fn merge(base: &[RelatedId], additions: &[RelatedId], removals: &[RelatedId]) -> Vec<RelatedId> {
    base.iter()
        .chain(additions)
        .filter(|id| !removals.contains(id))
        .cloned()
        .collect()
}
