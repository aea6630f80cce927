//! `PUT /<plural>/payment-status?id=&status=` for billable records.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use super::entities::checked_key;
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, MessageBody};
use crate::db::{Billable, Repository, SqlRepository};

#[derive(Debug, Deserialize)]
pub struct PaymentStatusParams {
    #[serde(default)]
    pub id: i64,
    #[serde(default, alias = "paymentStatus", alias = "PaymentStatus")]
    pub status: String,
}

pub async fn update_status<T: Billable>(
    State(ctx): State<ApiContext>,
    Query(params): Query<PaymentStatusParams>,
) -> Result<Json<MessageBody>, ApiError> {
    let id = checked_key(params.id)?;
    if params.status.trim().is_empty() {
        return Err(ApiError::BadRequest("Payment status must be provided".into()));
    }

    let mut repo = SqlRepository::<T>::new(ctx.store);
    if !repo.update_payment_status(id, &params.status).await? {
        return Err(ApiError::NotFound(format!(
            "No {} exists with Id = {id}",
            T::NAME
        )));
    }
    repo.save().await?;
    tracing::info!(entity = T::NAME, id, status = %params.status.trim(), "Payment status updated");
    Ok(Json(MessageBody::new("Model was updated successfully")))
}
