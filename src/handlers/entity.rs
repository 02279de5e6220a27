//! Entity resource handlers: list, read, create, upsert, merge, delete,
//! distinct values. PUT and PATCH are both backed by the merge engine; the
//! response meta reports whether the merge changed anything.

use crate::error::{AppError, MergeError};
use crate::response;
use crate::service::{CrudService, RestEntity};
use crate::state::EntityState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::Value;
use std::collections::HashMap;

fn parse_id(id_str: &str) -> Result<uuid::Uuid, AppError> {
    uuid::Uuid::parse_str(id_str).map_err(|_| AppError::BadRequest("invalid uuid".into()))
}

/// Interpret a query-string value: bool, integer, and float literals compare
/// as their JSON type, anything else as a string.
fn query_value(s: &str) -> Value {
    if s.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if s.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    if let Ok(n) = s.parse::<i64>() {
        return Value::Number(n.into());
    }
    if let Ok(f) = s.parse::<f64>() {
        if let Some(n) = serde_json::Number::from_f64(f) {
            return Value::Number(n);
        }
    }
    Value::String(s.to_string())
}

pub async fn list<E: RestEntity>(
    State(state): State<EntityState<E>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let descriptor = state.engine.describe::<E>().map_err(MergeError::from)?;
    let mut limit: Option<u32> = None;
    let mut offset: Option<u32> = None;
    let mut filters: Vec<(String, Value)> = Vec::new();
    for (k, v) in params {
        match k.as_str() {
            "limit" => {
                limit = v.parse().ok();
            }
            "offset" => {
                offset = v.parse().ok();
            }
            _ => {
                if descriptor.field(&k).is_some() {
                    filters.push((k, query_value(&v)));
                }
            }
        }
    }
    let rows =
        CrudService::list(state.repo.as_ref(), state.engine.as_ref(), &filters, limit, offset)
            .await?;
    Ok(response::success_many(rows))
}

pub async fn create<E: RestEntity>(
    State(state): State<EntityState<E>>,
    Json(body): Json<E>,
) -> Result<impl IntoResponse, AppError> {
    let entity = CrudService::create(state.repo.as_ref(), state.engine.as_ref(), &body).await?;
    Ok(response::created(entity))
}

pub async fn read<E: RestEntity>(
    State(state): State<EntityState<E>>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    let entity = CrudService::read(state.repo.as_ref(), id)
        .await?
        .ok_or(AppError::NotFound(id_str))?;
    Ok(response::success_one(entity))
}

pub async fn upsert<E: RestEntity>(
    State(state): State<EntityState<E>>,
    Path(id_str): Path<String>,
    Json(body): Json<E>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    let (entity, changed, created) =
        CrudService::upsert(state.repo.as_ref(), state.engine.as_ref(), id, &body).await?;
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok(response::merged(entity, changed, status))
}

pub async fn merge<E: RestEntity>(
    State(state): State<EntityState<E>>,
    Path(id_str): Path<String>,
    Json(body): Json<E>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    let (entity, changed) =
        CrudService::patch(state.repo.as_ref(), state.engine.as_ref(), id, &body)
            .await?
            .ok_or(AppError::NotFound(id_str))?;
    Ok(response::merged(entity, changed, StatusCode::OK))
}

pub async fn delete<E: RestEntity>(
    State(state): State<EntityState<E>>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    CrudService::delete(state.repo.as_ref(), id)
        .await?
        .ok_or(AppError::NotFound(id_str))?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn values<E: RestEntity>(
    State(state): State<EntityState<E>>,
    Path(field): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let values =
        CrudService::distinct_values::<E>(state.repo.as_ref(), state.engine.as_ref(), &field)
            .await?;
    Ok(response::success_many(values))
}
