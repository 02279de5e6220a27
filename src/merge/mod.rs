//! Generic entity-graph merge: copy fields from a partially-populated source
//! into a persisted target according to per-field policy, recursing through
//! nested entities, collections, and maps, and report whether anything changed.

pub mod builder;
pub mod cache;
pub mod descriptor;
pub mod engine;
pub mod field;
mod strategy;

pub use builder::{FieldRule, TypeBuilder};
pub use cache::DescriptorCache;
pub use descriptor::TypeDescriptor;
pub use engine::MergeEngine;
pub use field::{FieldDescriptor, FieldKind, NullPolicy, SkipReason, SkippedField};

use crate::error::MergeError;
use std::hash::Hash;

/// A type whose fields can be merged from another instance of itself.
///
/// `configure` declares the participating fields in order; declaration order
/// is the order fields are merged in. The identity field is not declared here,
/// it is exposed through [`Identified`] and only keys reconciliation.
pub trait Mergeable: Sized + 'static {
    fn configure(fields: &mut TypeBuilder<Self>);

    /// Merge `source` into `self`, returning whether anything changed.
    fn merge_from(&mut self, source: &Self, engine: &MergeEngine) -> Result<bool, MergeError> {
        engine.update(self, source)
    }
}

/// Primary-key accessor pair. Required on element types of entity collections
/// and entity maps; the key correlates elements across reconciliation and is
/// never treated as a business field.
pub trait Identified {
    type Key: Eq + Hash + Clone;

    fn identity(&self) -> Option<Self::Key>;
    fn set_identity(&mut self, key: Option<Self::Key>);
}
