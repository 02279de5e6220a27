//! Field declaration API. Entities opt fields in here; the builder validates
//! the configuration and binds each field's merge strategy exactly once.

use crate::error::DescriptorError;
use crate::merge::descriptor::TypeDescriptor;
use crate::merge::field::{
    FieldDescriptor, FieldKind, MergeFn, NullPolicy, ProbeFn, ReadFn, SkipReason, SkippedField,
};
use crate::merge::{strategy, Identified, Mergeable};
use serde::Serialize;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;

struct BoundField<T> {
    merge: MergeFn<T>,
    probe: ProbeFn<T>,
    read: Option<ReadFn<T>>,
}

type BindFn<T> = Box<dyn FnOnce(NullPolicy) -> BoundField<T>>;

struct PendingField<T> {
    name: &'static str,
    kind: FieldKind,
    participates: bool,
    excluded: bool,
    /// Explicit null-policy override; `None` means "not declared".
    not_null: Option<bool>,
    required: bool,
    bind: BindFn<T>,
}

/// Collects field declarations for one type. Accessors are plain function
/// references so binding happens once and merge time pays no lookup cost.
pub struct TypeBuilder<T> {
    pending: Vec<PendingField<T>>,
}

impl<T: Mergeable> TypeBuilder<T> {
    pub(crate) fn new() -> Self {
        Self {
            pending: Vec::new(),
        }
    }

    /// Declare a plain value field.
    pub fn scalar<V>(
        &mut self,
        name: &'static str,
        get: fn(&T) -> &Option<V>,
        get_mut: fn(&mut T) -> &mut Option<V>,
    ) -> FieldRule<'_, T>
    where
        V: Clone + PartialEq + Serialize + 'static,
    {
        self.push(
            name,
            FieldKind::Scalar,
            Box::new(move |policy| BoundField {
                merge: strategy::scalar(get, get_mut, policy),
                probe: Box::new(move |instance| get(instance).is_none()),
                read: Some(Box::new(move |instance| {
                    serde_json::to_value(get(instance)).unwrap_or(Value::Null)
                })),
            }),
        )
    }

    /// Declare a one-to-one nested entity.
    pub fn nested<C>(
        &mut self,
        name: &'static str,
        get: fn(&T) -> &Option<C>,
        get_mut: fn(&mut T) -> &mut Option<C>,
    ) -> FieldRule<'_, T>
    where
        C: Mergeable + Default,
    {
        self.push(
            name,
            FieldKind::NestedEntity,
            Box::new(move |policy| BoundField {
                merge: strategy::nested(get, get_mut, policy),
                probe: Box::new(move |instance| get(instance).is_none()),
                read: None,
            }),
        )
    }

    /// Declare a collection of plain values (whole-collection replace).
    pub fn scalar_vec<V>(
        &mut self,
        name: &'static str,
        get: fn(&T) -> &Option<Vec<V>>,
        get_mut: fn(&mut T) -> &mut Option<Vec<V>>,
    ) -> FieldRule<'_, T>
    where
        V: Clone + PartialEq + 'static,
    {
        self.push(
            name,
            FieldKind::ScalarCollection,
            Box::new(move |policy| BoundField {
                merge: strategy::scalar_vec(get, get_mut, policy),
                probe: Box::new(move |instance| get(instance).is_none()),
                read: None,
            }),
        )
    }

    /// Declare a map of plain values (key-level diff).
    pub fn scalar_map<K, V>(
        &mut self,
        name: &'static str,
        get: fn(&T) -> &Option<HashMap<K, V>>,
        get_mut: fn(&mut T) -> &mut Option<HashMap<K, V>>,
    ) -> FieldRule<'_, T>
    where
        K: Eq + Hash + Clone + 'static,
        V: Clone + PartialEq + 'static,
    {
        self.push(
            name,
            FieldKind::ScalarMap,
            Box::new(move |policy| BoundField {
                merge: strategy::scalar_map(get, get_mut, policy),
                probe: Box::new(move |instance| get(instance).is_none()),
                read: None,
            }),
        )
    }

    /// Declare a collection of identified entities (keyed reconciliation).
    pub fn entity_vec<C>(
        &mut self,
        name: &'static str,
        get: fn(&T) -> &Option<Vec<C>>,
        get_mut: fn(&mut T) -> &mut Option<Vec<C>>,
    ) -> FieldRule<'_, T>
    where
        C: Mergeable + Identified + Default + Clone + PartialEq,
    {
        self.push(
            name,
            FieldKind::EntityCollection,
            Box::new(move |policy| BoundField {
                merge: strategy::entity_vec(get, get_mut, policy),
                probe: Box::new(move |instance| get(instance).is_none()),
                read: None,
            }),
        )
    }

    /// Declare a map of identified entities keyed by their identity type.
    pub fn entity_map<C>(
        &mut self,
        name: &'static str,
        get: fn(&T) -> &Option<HashMap<C::Key, C>>,
        get_mut: fn(&mut T) -> &mut Option<HashMap<C::Key, C>>,
    ) -> FieldRule<'_, T>
    where
        C: Mergeable + Identified + Default,
    {
        self.push(
            name,
            FieldKind::EntityMap,
            Box::new(move |policy| BoundField {
                merge: strategy::entity_map(get, get_mut, policy),
                probe: Box::new(move |instance| get(instance).is_none()),
                read: None,
            }),
        )
    }

    fn push(&mut self, name: &'static str, kind: FieldKind, bind: BindFn<T>) -> FieldRule<'_, T> {
        self.pending.push(PendingField {
            name,
            kind,
            participates: true,
            excluded: false,
            not_null: None,
            required: false,
            bind,
        });
        let idx = self.pending.len() - 1;
        FieldRule {
            pending: &mut self.pending[idx],
        }
    }

    pub(crate) fn finish(self, type_name: &'static str) -> Result<TypeDescriptor<T>, DescriptorError> {
        let mut fields = Vec::new();
        let mut skipped = Vec::new();
        let mut seen: HashSet<&'static str> = HashSet::new();
        for pending in self.pending {
            if !pending.participates || pending.excluded {
                continue;
            }
            if pending.name.is_empty() {
                tracing::warn!(entity = type_name, "skipping field with empty name");
                skipped.push(SkippedField {
                    name: pending.name,
                    reason: SkipReason::EmptyName,
                });
                continue;
            }
            if !seen.insert(pending.name) {
                tracing::warn!(entity = type_name, field = pending.name, "skipping duplicate field");
                skipped.push(SkippedField {
                    name: pending.name,
                    reason: SkipReason::DuplicateName,
                });
                continue;
            }
            if pending.required && pending.not_null == Some(false) {
                return Err(DescriptorError::NullPolicyConflict {
                    type_name,
                    field: pending.name,
                });
            }
            let policy = if !pending.required && pending.not_null == Some(false) {
                NullPolicy::Accept
            } else {
                NullPolicy::Reject
            };
            let bound = (pending.bind)(policy);
            fields.push(FieldDescriptor::new(
                pending.name,
                pending.kind,
                policy,
                pending.required,
                bound.merge,
                bound.probe,
                bound.read,
            ));
        }
        Ok(TypeDescriptor::from_parts(type_name, fields, skipped))
    }
}

/// Per-field configuration handle returned by each declaration.
pub struct FieldRule<'a, T> {
    pending: &'a mut PendingField<T>,
}

impl<'a, T> FieldRule<'a, T> {
    /// A null source value clears the target field.
    pub fn accept_null(self) -> Self {
        self.pending.not_null = Some(false);
        self
    }

    /// A null source value is ignored (the default).
    pub fn reject_null(self) -> Self {
        self.pending.not_null = Some(true);
        self
    }

    /// Externally-owned required marker. Forces reject-null; combining it
    /// with an explicit `accept_null` fails descriptor construction.
    pub fn required(self) -> Self {
        self.pending.required = true;
        self
    }

    /// Drop the field from the active list.
    pub fn excluded(self) -> Self {
        self.pending.excluded = true;
        self
    }

    pub fn participates(self, participates: bool) -> Self {
        self.pending.participates = participates;
        self
    }
}
