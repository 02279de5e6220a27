//! One merge algorithm per field kind, bound to a field's accessors at
//! descriptor-build time. Every strategy is idempotent: re-running a merge
//! with an unchanged source reports `false`.

use crate::merge::field::{MergeFn, NullPolicy};
use crate::merge::{Identified, Mergeable};
use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// Apply the null policy for a `None` source value. Accept-null clears the
/// target slot and reports whether it held a value.
fn null_cleared<X>(slot: &mut Option<X>, policy: NullPolicy) -> bool {
    match policy {
        NullPolicy::Reject => false,
        NullPolicy::Accept => slot.take().is_some(),
    }
}

/// Null-safe value replacement with an equality short-circuit.
pub(crate) fn scalar<T, V>(
    get: fn(&T) -> &Option<V>,
    get_mut: fn(&mut T) -> &mut Option<V>,
    policy: NullPolicy,
) -> MergeFn<T>
where
    T: 'static,
    V: Clone + PartialEq + 'static,
{
    Box::new(move |_engine, target, source| {
        Ok(match get(source) {
            None => null_cleared(get_mut(target), policy),
            Some(value) => {
                let slot = get_mut(target);
                if slot.as_ref() == Some(value) {
                    false
                } else {
                    *slot = Some(value.clone());
                    true
                }
            }
        })
    })
}

/// One-to-one aggregate: merge into the existing child in place (identity
/// preserved), or construct a fresh child for a null target.
pub(crate) fn nested<T, C>(
    get: fn(&T) -> &Option<C>,
    get_mut: fn(&mut T) -> &mut Option<C>,
    policy: NullPolicy,
) -> MergeFn<T>
where
    T: 'static,
    C: Mergeable + Default,
{
    Box::new(move |engine, target, source| match get(source) {
        None => Ok(null_cleared(get_mut(target), policy)),
        Some(src_child) => {
            let slot = get_mut(target);
            match slot {
                Some(existing) => engine.update(existing, src_child),
                None => {
                    let mut fresh = C::default();
                    engine.update(&mut fresh, src_child)?;
                    *slot = Some(fresh);
                    Ok(true)
                }
            }
        }
    })
}

/// Whole-collection replace. No element-level diff; equal contents are the
/// only no-op.
pub(crate) fn scalar_vec<T, V>(
    get: fn(&T) -> &Option<Vec<V>>,
    get_mut: fn(&mut T) -> &mut Option<Vec<V>>,
    policy: NullPolicy,
) -> MergeFn<T>
where
    T: 'static,
    V: Clone + PartialEq + 'static,
{
    Box::new(move |_engine, target, source| {
        Ok(match get(source) {
            None => null_cleared(get_mut(target), policy),
            Some(src_items) => {
                let slot = get_mut(target);
                match slot {
                    Some(items) if *items == *src_items => false,
                    Some(items) => {
                        items.clear();
                        items.extend(src_items.iter().cloned());
                        true
                    }
                    None => {
                        *slot = Some(src_items.clone());
                        true
                    }
                }
            }
        })
    })
}

/// Key-level diff: drop target-only keys, replace unequal values, insert
/// source-only keys.
pub(crate) fn scalar_map<T, K, V>(
    get: fn(&T) -> &Option<HashMap<K, V>>,
    get_mut: fn(&mut T) -> &mut Option<HashMap<K, V>>,
    policy: NullPolicy,
) -> MergeFn<T>
where
    T: 'static,
    K: Eq + Hash + Clone + 'static,
    V: Clone + PartialEq + 'static,
{
    Box::new(move |_engine, target, source| {
        let src_map = match get(source) {
            None => return Ok(null_cleared(get_mut(target), policy)),
            Some(m) => m,
        };
        let slot = get_mut(target);
        let map = match slot {
            Some(map) => map,
            None => {
                *slot = Some(src_map.clone());
                return Ok(true);
            }
        };
        let mut changed = false;
        let before = map.len();
        map.retain(|key, _| src_map.contains_key(key));
        changed |= map.len() != before;
        for (key, value) in src_map {
            match map.get_mut(key) {
                Some(current) if *current == *value => {}
                Some(current) => {
                    *current = value.clone();
                    changed = true;
                }
                None => {
                    map.insert(key.clone(), value.clone());
                    changed = true;
                }
            }
        }
        Ok(changed)
    })
}

/// Reconciliation by identity. Keyed source elements merge into their target
/// counterpart or become freshly constructed entities; unkeyed source elements
/// are always new inserts; target elements missing from the source (or
/// carrying no identity) are dropped. Duplicate identities within one source
/// list collapse last-write-wins.
pub(crate) fn entity_vec<T, C>(
    get: fn(&T) -> &Option<Vec<C>>,
    get_mut: fn(&mut T) -> &mut Option<Vec<C>>,
    policy: NullPolicy,
) -> MergeFn<T>
where
    T: 'static,
    C: Mergeable + Identified + Default + Clone + PartialEq,
{
    Box::new(move |engine, target, source| {
        let src_items = match get(source) {
            None => return Ok(null_cleared(get_mut(target), policy)),
            Some(items) => items,
        };
        let slot = get_mut(target);
        let was_null = slot.is_none();
        let empty = Vec::new();
        let original = slot.as_ref().unwrap_or(&empty);

        let mut existing: HashMap<C::Key, C> = HashMap::new();
        for item in original {
            if let Some(key) = item.identity() {
                existing.insert(key, item.clone());
            }
        }
        // Last occurrence wins for duplicate identities in the source.
        let mut latest: HashMap<C::Key, &C> = HashMap::new();
        for item in src_items {
            if let Some(key) = item.identity() {
                latest.insert(key, item);
            }
        }

        let mut rebuilt: Vec<C> = Vec::with_capacity(src_items.len());
        let mut emitted: HashSet<C::Key> = HashSet::new();
        for item in src_items {
            match item.identity() {
                Some(key) => {
                    if !emitted.insert(key.clone()) {
                        continue;
                    }
                    let src_child = latest.get(&key).copied().unwrap_or(item);
                    match existing.remove(&key) {
                        Some(mut kept) => {
                            engine.update(&mut kept, src_child)?;
                            rebuilt.push(kept);
                        }
                        None => {
                            let mut fresh = C::default();
                            fresh.set_identity(Some(key));
                            engine.update(&mut fresh, src_child)?;
                            rebuilt.push(fresh);
                        }
                    }
                }
                None => rebuilt.push(item.clone()),
            }
        }

        let changed = was_null || rebuilt != *original;
        *slot = Some(rebuilt);
        Ok(changed)
    })
}

/// Entity-map reconciliation against the map's own key set: target-only keys
/// are removed, shared keys merge in place, source-only keys are inserted as
/// freshly constructed then fully merged values.
pub(crate) fn entity_map<T, C>(
    get: fn(&T) -> &Option<HashMap<C::Key, C>>,
    get_mut: fn(&mut T) -> &mut Option<HashMap<C::Key, C>>,
    policy: NullPolicy,
) -> MergeFn<T>
where
    T: 'static,
    C: Mergeable + Identified + Default,
{
    Box::new(move |engine, target, source| {
        let src_map = match get(source) {
            None => return Ok(null_cleared(get_mut(target), policy)),
            Some(m) => m,
        };
        let slot = get_mut(target);
        let was_null = slot.is_none();
        let map = slot.get_or_insert_with(HashMap::new);
        let mut changed = was_null;
        let before = map.len();
        map.retain(|key, _| src_map.contains_key(key));
        changed |= map.len() != before;
        for (key, src_child) in src_map {
            match map.get_mut(key) {
                Some(existing) => {
                    changed |= engine.update(existing, src_child)?;
                }
                None => {
                    let mut fresh = C::default();
                    fresh.set_identity(Some(key.clone()));
                    engine.update(&mut fresh, src_child)?;
                    map.insert(key.clone(), fresh);
                    changed = true;
                }
            }
        }
        Ok(changed)
    })
}
