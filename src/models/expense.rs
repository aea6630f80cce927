use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::enums::PaymentStatus;
use super::facility::Department;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    pub department_id: i64,
    pub amount: f64,
    pub description: Option<String>,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    /// Store default: `Un-Paid`.
    pub payment_status: Option<PaymentStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<Box<Department>>,
}
