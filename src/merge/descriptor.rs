//! Immutable per-type field description, built once and cached.

use crate::error::{DescriptorError, MergeError};
use crate::merge::builder::TypeBuilder;
use crate::merge::field::{FieldDescriptor, SkippedField};
use crate::merge::{MergeEngine, Mergeable};
use std::collections::HashMap;

/// Ordered mergeable fields of one type. Contains only fields that were
/// declared, not excluded, and valid; everything else either never joined or
/// sits in the skipped list.
pub struct TypeDescriptor<T> {
    type_name: &'static str,
    fields: Vec<FieldDescriptor<T>>,
    by_name: HashMap<&'static str, usize>,
    skipped: Vec<SkippedField>,
}

impl<T: Mergeable> TypeDescriptor<T> {
    pub(crate) fn build() -> Result<Self, DescriptorError> {
        let mut builder = TypeBuilder::new();
        T::configure(&mut builder);
        builder.finish(std::any::type_name::<T>())
    }
}

impl<T> TypeDescriptor<T> {
    pub(crate) fn from_parts(
        type_name: &'static str,
        fields: Vec<FieldDescriptor<T>>,
        skipped: Vec<SkippedField>,
    ) -> Self {
        let by_name = fields
            .iter()
            .enumerate()
            .map(|(idx, field)| (field.name(), idx))
            .collect();
        Self {
            type_name,
            fields,
            by_name,
            skipped,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Active fields in declaration order.
    pub fn fields(&self) -> &[FieldDescriptor<T>] {
        &self.fields
    }

    /// Look up an active field by name. Collaborators use this to read a
    /// named scalar generically, without per-entity code.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor<T>> {
        self.by_name.get(name).map(|idx| &self.fields[*idx])
    }

    /// Fields declared but excluded at build time, with reasons.
    pub fn skipped(&self) -> &[SkippedField] {
        &self.skipped
    }

    /// Merge every active field in declaration order and OR the changed
    /// flags. No early exit: each field is always evaluated so the target
    /// reaches full consistency with the source.
    pub(crate) fn apply(
        &self,
        engine: &MergeEngine,
        target: &mut T,
        source: &T,
    ) -> Result<bool, MergeError> {
        let mut changed = false;
        for field in &self.fields {
            changed |= field.apply(engine, target, source).map_err(|e| MergeError::Field {
                type_name: self.type_name,
                field: field.name(),
                source: Box::new(e),
            })?;
        }
        Ok(changed)
    }
}
