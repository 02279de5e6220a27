//! Generic CRUD execution over a repository, driven by the merge engine.

use crate::error::{AppError, MergeError};
use crate::merge::{FieldKind, Identified, MergeEngine, Mergeable};
use crate::service::RequestValidator;
use crate::store::Repository;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

/// Everything the resource layer needs from an entity type.
pub trait RestEntity:
    Mergeable
    + Identified<Key = Uuid>
    + Default
    + Clone
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
{
}

impl<E> RestEntity for E where
    E: Mergeable
        + Identified<Key = Uuid>
        + Default
        + Clone
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
{
}

pub struct CrudService;

impl CrudService {
    /// List entities with optional exact-match scalar filters, limit
    /// (default 100, max 1000), offset (default 0). Ordered by identity so
    /// pagination is stable.
    pub async fn list<E: RestEntity>(
        repo: &dyn Repository<E>,
        engine: &MergeEngine,
        filters: &[(String, Value)],
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<Vec<E>, AppError> {
        const DEFAULT_LIMIT: u32 = 100;
        let limit = limit.unwrap_or(DEFAULT_LIMIT).min(1000) as usize;
        let offset = offset.unwrap_or(0) as usize;
        let descriptor = engine.describe::<E>().map_err(MergeError::from)?;
        let mut rows = repo.all().await?;
        rows.retain(|row| {
            filters.iter().all(|(name, expected)| {
                descriptor
                    .field(name)
                    .and_then(|field| field.read_value(row))
                    .map(|value| &value == expected)
                    .unwrap_or(false)
            })
        });
        rows.sort_by_key(|row| row.identity());
        Ok(rows.into_iter().skip(offset).take(limit).collect())
    }

    pub async fn read<E: RestEntity>(
        repo: &dyn Repository<E>,
        id: Uuid,
    ) -> Result<Option<E>, AppError> {
        repo.fetch(id).await
    }

    /// Create from a transfer body: a fresh default with identity assigned
    /// (body identity or a new v4), body merged in. Returns the stored entity.
    pub async fn create<E: RestEntity>(
        repo: &dyn Repository<E>,
        engine: &MergeEngine,
        source: &E,
    ) -> Result<E, AppError> {
        RequestValidator::validate_create(engine, source)?;
        let id = source.identity().unwrap_or_else(Uuid::new_v4);
        let mut entity = E::default();
        entity.set_identity(Some(id));
        engine.update(&mut entity, source)?;
        repo.save(id, entity.clone()).await?;
        Ok(entity)
    }

    /// Merge into the stored entity under `id`, or create one when absent.
    /// Returns (entity, changed, created).
    pub async fn upsert<E: RestEntity>(
        repo: &dyn Repository<E>,
        engine: &MergeEngine,
        id: Uuid,
        source: &E,
    ) -> Result<(E, bool, bool), AppError> {
        match repo.fetch(id).await? {
            Some(mut entity) => {
                let changed = engine.update(&mut entity, source)?;
                repo.save(id, entity.clone()).await?;
                Ok((entity, changed, false))
            }
            None => {
                RequestValidator::validate_create(engine, source)?;
                let mut entity = E::default();
                entity.set_identity(Some(id));
                engine.update(&mut entity, source)?;
                repo.save(id, entity.clone()).await?;
                Ok((entity, true, true))
            }
        }
    }

    /// Merge into the stored entity under `id`. None when absent.
    pub async fn patch<E: RestEntity>(
        repo: &dyn Repository<E>,
        engine: &MergeEngine,
        id: Uuid,
        source: &E,
    ) -> Result<Option<(E, bool)>, AppError> {
        let Some(mut entity) = repo.fetch(id).await? else {
            return Ok(None);
        };
        let changed = engine.update(&mut entity, source)?;
        repo.save(id, entity.clone()).await?;
        Ok(Some((entity, changed)))
    }

    pub async fn delete<E: RestEntity>(
        repo: &dyn Repository<E>,
        id: Uuid,
    ) -> Result<Option<E>, AppError> {
        repo.remove(id).await
    }

    /// Distinct non-null values of a named scalar field across the store.
    /// Backs autocomplete; rejects unknown and non-scalar fields.
    pub async fn distinct_values<E: RestEntity>(
        repo: &dyn Repository<E>,
        engine: &MergeEngine,
        name: &str,
    ) -> Result<Vec<Value>, AppError> {
        let descriptor = engine.describe::<E>().map_err(MergeError::from)?;
        let field = descriptor
            .field(name)
            .ok_or_else(|| AppError::BadRequest(format!("unknown field '{}'", name)))?;
        if field.kind() != FieldKind::Scalar {
            return Err(AppError::BadRequest(format!(
                "field '{}' is not a scalar field",
                name
            )));
        }
        let mut rows = repo.all().await?;
        rows.sort_by_key(|row| row.identity());
        let mut values: Vec<Value> = Vec::new();
        for row in &rows {
            if let Some(value) = field.read_value(row) {
                if !value.is_null() && !values.contains(&value) {
                    values.push(value);
                }
            }
        }
        Ok(values)
    }
}
