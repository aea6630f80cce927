//! Generic CRUD handlers, instantiated once per entity by the router.
//!
//! - `GET /<plural>/all?include=`: every record
//! - `GET /<plural>/:id?include=`: one record
//! - `POST /<plural>`: create, answers 201 with the stored record
//! - `PUT /<plural>/:id`: full replace
//! - `DELETE /<plural>/:id`

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, IncludeParams, MessageBody};
use crate::db::{self, Entity, Filter, Key, Repository, SqlRepository};

/// An entity that can cross the HTTP boundary as JSON.
pub trait Resource: Entity + Serialize + DeserializeOwned {}

impl<T> Resource for T where T: Entity + Serialize + DeserializeOwned {}

fn with_includes<T: Entity>(
    query: db::Query<T>,
    params: &IncludeParams,
) -> Result<db::Query<T>, ApiError> {
    match params.include.as_deref() {
        Some(names) => Ok(query.include_names(names)?),
        None => Ok(query),
    }
}

pub(crate) fn checked_key<K: Key>(id: K) -> Result<K, ApiError> {
    if id.is_valid() {
        Ok(id)
    } else {
        Err(ApiError::BadRequest(
            "Id must be provided and greater than 0".into(),
        ))
    }
}

fn not_found<T: Entity>(id: &T::Key) -> ApiError {
    ApiError::NotFound(format!("No {} exists with Id = {id}", T::NAME))
}

pub async fn list<T: Resource>(
    State(ctx): State<ApiContext>,
    Query(params): Query<IncludeParams>,
) -> Result<Json<Vec<T>>, ApiError> {
    let query = with_includes(db::Query::<T>::all(), &params)?;
    let items = SqlRepository::<T>::new(ctx.store).get_all(query).await?;
    if items.is_empty() {
        return Err(ApiError::NotFound(format!("No {} records exist", T::NAME)));
    }
    Ok(Json(items))
}

pub async fn detail<T: Resource>(
    State(ctx): State<ApiContext>,
    Path(id): Path<T::Key>,
    Query(params): Query<IncludeParams>,
) -> Result<Json<T>, ApiError> {
    let id = checked_key(id)?;
    let query = with_includes(db::Query::<T>::by_key(id.clone()), &params)?;
    SqlRepository::<T>::new(ctx.store)
        .get(query)
        .await?
        .map(Json)
        .ok_or_else(|| not_found::<T>(&id))
}

pub async fn create<T: Resource>(
    State(ctx): State<ApiContext>,
    Json(entity): Json<T>,
) -> Result<(StatusCode, Json<T>), ApiError> {
    let mut repo = SqlRepository::<T>::new(ctx.store);
    repo.add(entity);
    let summary = repo.save().await?;
    let key = summary
        .inserted
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::Internal(format!("{} insert returned no key", T::NAME)))?;
    let created = repo
        .get(db::Query::by_key(key.clone()))
        .await?
        .ok_or_else(|| ApiError::Internal(format!("{} {key} vanished after insert", T::NAME)))?;
    tracing::info!(entity = T::NAME, id = %key, "Record created");
    Ok((StatusCode::CREATED, Json(created)))
}

/// The path id wins over any id in the body.
pub async fn update<T: Resource>(
    State(ctx): State<ApiContext>,
    Path(id): Path<T::Key>,
    Json(mut body): Json<serde_json::Value>,
) -> Result<Json<MessageBody>, ApiError> {
    let id = checked_key(id)?;
    let fields = body
        .as_object_mut()
        .ok_or_else(|| ApiError::BadRequest("Model is not valid".into()))?;
    let key = serde_json::to_value(&id).map_err(|e| ApiError::Internal(e.to_string()))?;
    fields.insert("id".to_string(), key);
    let entity: T = serde_json::from_value(body)
        .map_err(|e| ApiError::BadRequest(format!("Model is not valid: {e}")))?;

    let mut repo = SqlRepository::<T>::new(ctx.store);
    if !repo.any(Filter::key(id.clone())).await? {
        return Err(not_found::<T>(&id));
    }
    repo.update(entity);
    repo.save().await?;
    tracing::info!(entity = T::NAME, id = %id, "Record updated");
    Ok(Json(MessageBody::new("Model was updated successfully")))
}

pub async fn delete<T: Resource>(
    State(ctx): State<ApiContext>,
    Path(id): Path<T::Key>,
) -> Result<Json<MessageBody>, ApiError> {
    let id = checked_key(id)?;
    let mut repo = SqlRepository::<T>::new(ctx.store);
    let Some(entity) = repo.get(db::Query::by_key(id.clone())).await? else {
        return Err(not_found::<T>(&id));
    };
    repo.remove(&entity);
    repo.save().await?;
    tracing::info!(entity = T::NAME, id = %id, "Record deleted");
    Ok(Json(MessageBody::new("Model was deleted successfully")))
}
