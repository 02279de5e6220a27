//! Process-lifetime descriptor cache keyed by type identity.

use crate::error::DescriptorError;
use crate::merge::descriptor::TypeDescriptor;
use crate::merge::Mergeable;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Compute-if-absent store of [`TypeDescriptor`]s. Explicit and injectable:
/// owned by a [`crate::MergeEngine`], never a process-wide singleton. Never
/// evicts; published descriptors are immutable and read without locking.
#[derive(Default)]
pub struct DescriptorCache {
    types: RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
}

impl DescriptorCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the descriptor for `T`, building it on first use. At most one
    /// build per distinct type, even under concurrent first access: the build
    /// runs under the write lock, and field declaration never re-enters the
    /// cache, so this cannot deadlock. A failed build is not cached; every
    /// caller sees the error until the declaration is fixed.
    pub fn describe<T: Mergeable>(&self) -> Result<Arc<TypeDescriptor<T>>, DescriptorError> {
        let key = TypeId::of::<T>();
        {
            let types = read_guard(&self.types);
            if let Some(entry) = types.get(&key) {
                if let Ok(descriptor) = Arc::clone(entry).downcast::<TypeDescriptor<T>>() {
                    return Ok(descriptor);
                }
            }
        }
        let mut types = write_guard(&self.types);
        if let Some(entry) = types.get(&key) {
            if let Ok(descriptor) = Arc::clone(entry).downcast::<TypeDescriptor<T>>() {
                return Ok(descriptor);
            }
        }
        let descriptor = Arc::new(TypeDescriptor::<T>::build()?);
        types.insert(key, descriptor.clone());
        Ok(descriptor)
    }
}

type TypeMap = HashMap<TypeId, Arc<dyn Any + Send + Sync>>;

fn read_guard(lock: &RwLock<TypeMap>) -> std::sync::RwLockReadGuard<'_, TypeMap> {
    lock.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write_guard(lock: &RwLock<TypeMap>) -> std::sync::RwLockWriteGuard<'_, TypeMap> {
    lock.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}
