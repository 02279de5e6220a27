//! Update orchestrator: the entry point callers and recursing strategies share.

use crate::error::{DescriptorError, MergeError};
use crate::merge::cache::DescriptorCache;
use crate::merge::descriptor::TypeDescriptor;
use crate::merge::Mergeable;
use std::sync::Arc;

/// Merges source object graphs into targets. Owns the descriptor cache;
/// construct one per application and share it (`Arc`) across threads.
///
/// Merging runs synchronously on the caller's thread. Target and source are
/// assumed exclusively owned for the duration of a call; concurrent updates
/// against the same target must be serialized by the caller.
#[derive(Default)]
pub struct MergeEngine {
    cache: DescriptorCache,
}

impl MergeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Descriptor lookup, building on first use.
    pub fn describe<T: Mergeable>(&self) -> Result<Arc<TypeDescriptor<T>>, DescriptorError> {
        self.cache.describe::<T>()
    }

    /// Merge `source` into `target` field by field, in declaration order,
    /// and report whether anything changed. Nested entities, collections,
    /// and maps recurse through this same entry point.
    ///
    /// On a per-field failure the call aborts with the field's context;
    /// mutation already applied to `target` is the caller's to roll back.
    pub fn update<T: Mergeable>(&self, target: &mut T, source: &T) -> Result<bool, MergeError> {
        let descriptor = self.cache.describe::<T>()?;
        let changed = descriptor.apply(self, target, source)?;
        tracing::debug!(entity = descriptor.type_name(), changed, "update");
        Ok(changed)
    }
}
