//! Reads by field value instead of by key.
//!
//! - `GET /<plural>/<field>?<field>=`: first record whose text column
//!   matches, ignoring case
//! - `GET /<plural>/user/:user_id`: every record owned by one user

use std::collections::HashMap;

use axum::Json;

use super::entities::{checked_key, Resource};
use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db::{self, Filter, Repository, SqlRepository};

fn label(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub async fn find_one<T: Resource>(
    ctx: ApiContext,
    params: HashMap<String, String>,
    field: &'static str,
    column: T::Column,
    include: &'static [T::Relation],
) -> Result<Json<T>, ApiError> {
    let value = params.get(field).map(|v| v.trim()).unwrap_or_default();
    if value.is_empty() {
        return Err(ApiError::BadRequest(format!("{} must have a value", label(field))));
    }
    let query = db::Query::matching(Filter::eq_ignore_case(column, value))
        .include_all(include.iter().copied());
    SqlRepository::<T>::new(ctx.store)
        .get(query)
        .await?
        .map(Json)
        .ok_or_else(|| {
            ApiError::NotFound(format!(
                "No {} exists with {} = {value}",
                T::NAME,
                label(field)
            ))
        })
}

pub async fn owned_by<T: Resource>(
    ctx: ApiContext,
    user_id: String,
    column: T::Column,
    include: &'static [T::Relation],
) -> Result<Json<Vec<T>>, ApiError> {
    let user_id = checked_key(user_id)?;
    let query =
        db::Query::matching(Filter::eq(column, user_id)).include_all(include.iter().copied());
    let items = SqlRepository::<T>::new(ctx.store).get_all(query).await?;
    if items.is_empty() {
        return Err(ApiError::NotFound(format!(
            "No {} records found for the user",
            T::NAME
        )));
    }
    Ok(Json(items))
}
