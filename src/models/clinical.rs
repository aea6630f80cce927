use serde::{Deserialize, Serialize};

use super::enums::{DayTime, PaymentStatus};
use super::patient::PatientDetails;
use super::staff::DoctorDetails;
use super::user::ApplicationUser;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConsultCategory {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub cost: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Consultation {
    #[serde(default)]
    pub id: i64,
    pub patient_id: i64,
    pub consult_category_id: i64,
    pub description: Option<String>,
    /// Store default: `Un-Paid`.
    pub payment_status: Option<PaymentStatus>,
    /// Store default: `false`.
    pub approved: Option<bool>,
    pub doctor_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient: Option<Box<PatientDetails>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consult_category: Option<Box<ConsultCategory>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor: Option<Box<DoctorDetails>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Treatment {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub cost: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TestCategory {
    #[serde(default)]
    pub id: i64,
    pub test_name: String,
    pub min_value: f64,
    pub max_value: f64,
    pub cost: f64,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TestResult {
    #[serde(default)]
    pub id: i64,
    pub user_id: String,
    pub test_id: i64,
    pub result: String,
    pub description: Option<String>,
    /// Store default: `Un-Paid`.
    pub payment_status: Option<PaymentStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Box<ApplicationUser>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test: Option<Box<TestCategory>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Prescription {
    #[serde(default)]
    pub id: i64,
    pub user_id: String,
    pub treatment_id: i64,
    pub medicine: String,
    pub times: i64,
    pub days: i64,
    /// Store default: `Morning`.
    pub day_time: Option<DayTime>,
    pub test_category_id: Option<i64>,
    pub payment_status: Option<PaymentStatus>,
    pub history: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Box<ApplicationUser>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub treatment: Option<Box<Treatment>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_category: Option<Box<TestCategory>>,
}
