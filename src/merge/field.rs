//! Per-field metadata: bound accessors, null policy, and field kind.

use crate::error::MergeError;
use crate::merge::MergeEngine;
use serde_json::Value;

/// How a field merges. Classified once at declaration time; merge dispatch is
/// a bound closure, not a runtime type test.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Scalar,
    NestedEntity,
    ScalarCollection,
    EntityCollection,
    ScalarMap,
    EntityMap,
}

/// What a `None` source value does to the target field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NullPolicy {
    /// Ignore the null; the target keeps its current value. The default.
    Reject,
    /// Actively clear the target field to null.
    Accept,
}

/// Why a declared field was left out of the active list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    DuplicateName,
    EmptyName,
}

/// A declared field excluded at build time. Skipped fields never participate
/// in merging but stay visible for diagnostics.
#[derive(Clone, Debug)]
pub struct SkippedField {
    pub name: &'static str,
    pub reason: SkipReason,
}

pub(crate) type MergeFn<T> =
    Box<dyn Fn(&MergeEngine, &mut T, &T) -> Result<bool, MergeError> + Send + Sync>;
pub(crate) type ProbeFn<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;
pub(crate) type ReadFn<T> = Box<dyn Fn(&T) -> Value + Send + Sync>;

/// One mergeable field of `T`: accessors resolved and strategy bound exactly
/// once, at descriptor construction.
pub struct FieldDescriptor<T> {
    name: &'static str,
    kind: FieldKind,
    null_policy: NullPolicy,
    required: bool,
    merge: MergeFn<T>,
    probe: ProbeFn<T>,
    read: Option<ReadFn<T>>,
}

impl<T> FieldDescriptor<T> {
    pub(crate) fn new(
        name: &'static str,
        kind: FieldKind,
        null_policy: NullPolicy,
        required: bool,
        merge: MergeFn<T>,
        probe: ProbeFn<T>,
        read: Option<ReadFn<T>>,
    ) -> Self {
        Self {
            name,
            kind,
            null_policy,
            required,
            merge,
            probe,
            read,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn null_policy(&self) -> NullPolicy {
        self.null_policy
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Whether the field is currently null on `instance`.
    pub fn is_unset(&self, instance: &T) -> bool {
        (self.probe)(instance)
    }

    /// Read the field as JSON. `Some` for scalar fields only; container and
    /// nested kinds have no generic reader.
    pub fn read_value(&self, instance: &T) -> Option<Value> {
        self.read.as_ref().map(|read| read(instance))
    }

    pub(crate) fn apply(
        &self,
        engine: &MergeEngine,
        target: &mut T,
        source: &T,
    ) -> Result<bool, MergeError> {
        (self.merge)(engine, target, source)
    }
}
