//! Account endpoints. These are reachable without a bearer token.
//!
//! - `POST /api/v1/auth/register`
//! - `POST /api/v1/auth/login`
//! - `POST /api/v1/auth/assign-role?email=&role=`

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, MessageBody};
use crate::auth::{LoginRequest, LoginResponse, RegistrationRequest, UserSummary};

/// `POST /auth/register`: create an identity, optionally with a role.
pub async fn register(
    State(ctx): State<ApiContext>,
    Json(request): Json<RegistrationRequest>,
) -> Result<Json<UserSummary>, ApiError> {
    let user = ctx.auth.register(request).await?;
    Ok(Json(user))
}

/// `POST /auth/login`: 404 for an unknown user or a wrong password alike.
pub async fn login(
    State(ctx): State<ApiContext>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let response = ctx.auth.login(request).await?;
    if !response.is_authenticated() {
        return Err(ApiError::NotFound(
            "Email or password is not correct".into(),
        ));
    }
    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
pub struct AssignRoleParams {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: String,
}

/// `POST /auth/assign-role`: additive role grant.
pub async fn assign_role(
    State(ctx): State<ApiContext>,
    Query(params): Query<AssignRoleParams>,
) -> Result<Json<MessageBody>, ApiError> {
    let (email, role) = (params.email.trim(), params.role.trim());
    if email.is_empty() || role.is_empty() {
        return Err(ApiError::BadRequest("Email or role is not valid".into()));
    }
    if !ctx.auth.assign_role(email, role).await? {
        return Err(ApiError::NotFound("Email or role does not exist".into()));
    }
    Ok(Json(MessageBody::new(
        "Role was assigned to user successfully",
    )))
}
