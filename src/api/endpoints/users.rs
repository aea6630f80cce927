//! User account endpoints behind the bearer token.
//!
//! Accounts made here go through the same registration rules as
//! `/auth/register`; edits keep the credential untouched.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::entities::checked_key;
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, MessageBody};
use crate::auth::{ProfileUpdate, RegistrationRequest};
use crate::db::{self, Filter, Repository, SqlRepository, UserColumn};
use crate::models::ApplicationUser;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdateRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub about: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    /// When present, becomes the user's only role.
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EmailParams {
    #[serde(default)]
    pub email: String,
}

/// `GET /users/email?email=`: case-insensitive lookup.
pub async fn by_email(
    State(ctx): State<ApiContext>,
    Query(params): Query<EmailParams>,
) -> Result<Json<ApplicationUser>, ApiError> {
    let email = params.email.trim();
    if email.is_empty() {
        return Err(ApiError::BadRequest("Email must be provided".into()));
    }
    let query = db::Query::matching(Filter::eq(
        UserColumn::NormalizedEmail,
        ApplicationUser::normalize(email),
    ));
    SqlRepository::<ApplicationUser>::new(ctx.store)
        .get(query)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("No user exists with email = {email}")))
}

/// `POST /users`: create an account and grant its role, answers 201 with
/// the stored record.
pub async fn create(
    State(ctx): State<ApiContext>,
    Json(request): Json<RegistrationRequest>,
) -> Result<(StatusCode, Json<ApplicationUser>), ApiError> {
    let summary = ctx.auth.register(request).await?;
    let created = SqlRepository::<ApplicationUser>::new(ctx.store)
        .get(db::Query::by_key(summary.id.clone()))
        .await?
        .ok_or_else(|| ApiError::Internal(format!("user {} vanished after insert", summary.id)))?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `PUT /users/:id`: replace profile fields and, if asked, the role.
///
/// Profile and role are written together or not at all.
pub async fn update(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
    Json(request): Json<UserUpdateRequest>,
) -> Result<Json<MessageBody>, ApiError> {
    let id = checked_key(id)?;
    let email = request.email.trim().to_string();
    if request.name.trim().is_empty() || email.is_empty() {
        return Err(ApiError::BadRequest("Model is not valid".into()));
    }
    let role = request
        .role
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string);

    let user = ApplicationUser {
        id: id.clone(),
        user_name: email.clone(),
        email,
        name: request.name,
        about: request.about,
        details: request.details,
        phone_number: request.phone_number,
        password_hash: None,
    };
    match ctx.auth.update_profile(user, role.clone()).await? {
        ProfileUpdate::Updated => {
            tracing::info!(user_id = %id, "User profile updated");
            Ok(Json(MessageBody::new("User was updated successfully")))
        }
        ProfileUpdate::UnknownUser => Err(ApiError::NotFound(format!(
            "No user exists with Id = {id}"
        ))),
        ProfileUpdate::UnknownRole => Err(ApiError::BadRequest(format!(
            "Role '{}' does not exist",
            role.unwrap_or_default()
        ))),
    }
}
