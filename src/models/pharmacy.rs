use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::enums::{DayTime, MedicineType, VaccineType};
use super::patient::PatientDetails;
use super::user::ApplicationUser;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Vendor {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    pub address: String,
    pub email: String,
    pub phone_number: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Medicine {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    pub generic_name: String,
    pub batch_no: String,
    pub bar_code: String,
    pub description: Option<String>,
    pub quantity: i64,
    pub unit_weight: f64,
    /// Store default: `Tablet`.
    #[serde(rename = "type")]
    pub medicine_type: Option<MedicineType>,
    pub man_date: NaiveDate,
    pub exp_date: NaiveDate,
    pub cost: f64,
    pub retail_cost: f64,
    pub effects: String,
    pub vendor_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<Box<Vendor>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vaccine {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    /// Store default: `Subcutaneous`.
    #[serde(rename = "type")]
    pub vaccine_type: Option<VaccineType>,
    pub description: String,
    pub medicine_id: i64,
    pub effects: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medicine: Option<Box<Medicine>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VaccineAppointment {
    #[serde(default)]
    pub id: i64,
    pub patient_id: i64,
    pub nurse_id: String,
    pub vaccine_id: i64,
    pub date: NaiveDate,
    pub time_in: NaiveDateTime,
    /// Store default: `true`.
    pub taken: Option<bool>,
    /// Store default: `Morning`.
    pub day_time: Option<DayTime>,
    pub room: String,
    pub remarks: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient: Option<Box<PatientDetails>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nurse: Option<Box<ApplicationUser>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vaccine: Option<Box<Vaccine>>,
}
