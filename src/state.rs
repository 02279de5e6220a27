//! Shared per-entity state for the resource routes.

use crate::merge::MergeEngine;
use crate::store::Repository;
use std::sync::Arc;

/// Engine plus repository for one entity type. One instance per mounted
/// resource; the engine is shared across all of them.
pub struct EntityState<E> {
    pub engine: Arc<MergeEngine>,
    pub repo: Arc<dyn Repository<E>>,
}

impl<E> EntityState<E> {
    pub fn new(engine: Arc<MergeEngine>, repo: Arc<dyn Repository<E>>) -> Self {
        Self { engine, repo }
    }
}

impl<E> Clone for EntityState<E> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            repo: Arc::clone(&self.repo),
        }
    }
}
