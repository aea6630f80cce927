//! Payment-status specialization for billable records.

use super::{Entity, Repository, SqlRepository};
use crate::db::query::Query;
use crate::db::DatabaseError;
use crate::models::enums::PaymentStatus;
use crate::models::*;

/// Records that carry a payment status.
pub trait Billable: Entity<Key = i64> {
    fn set_payment_status(&mut self, status: PaymentStatus);
}

impl Billable for Expense {
    fn set_payment_status(&mut self, status: PaymentStatus) {
        self.payment_status = Some(status);
    }
}

impl Billable for Consultation {
    fn set_payment_status(&mut self, status: PaymentStatus) {
        self.payment_status = Some(status);
    }
}

impl Billable for TestResult {
    fn set_payment_status(&mut self, status: PaymentStatus) {
        self.payment_status = Some(status);
    }
}

impl Billable for Prescription {
    fn set_payment_status(&mut self, status: PaymentStatus) {
        self.payment_status = Some(status);
    }
}

impl<T: Billable> SqlRepository<T> {
    /// Change the payment status of one record.
    ///
    /// Returns `false` when no record has `id` or `status` is blank. An
    /// unknown status fails before anything is read. The record is loaded
    /// tracked and edited in place; the change is written by the caller's
    /// next `save`.
    pub async fn update_payment_status(
        &mut self,
        id: i64,
        status: &str,
    ) -> Result<bool, DatabaseError> {
        let status = status.trim();
        if status.is_empty() {
            return Ok(false);
        }
        let status: PaymentStatus = status.parse()?;
        if self.get(Query::by_key(id).tracked()).await?.is_none() {
            return Ok(false);
        }
        match self.tracked_mut(&id) {
            Some(entity) => {
                entity.set_payment_status(status);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
