use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::enums::{Gender, PatientStatus, PatientType};
use super::user::ApplicationUser;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientDetails {
    #[serde(default)]
    pub id: i64,
    pub user_id: String,
    pub last_name: String,
    pub id_number: String,
    pub registration_date: NaiveDateTime,
    pub address: String,
    pub cell: String,
    pub birth_date: Option<NaiveDate>,
    pub residence: String,
    pub email: String,
    pub guardian: String,
    pub relation: String,
    /// Store default: `Male`.
    pub gender: Option<Gender>,
    /// Store default: `Cured`.
    pub status_patient: Option<PatientStatus>,
    /// Store default: `In Patient`.
    pub patient_type: Option<PatientType>,
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Box<ApplicationUser>>,
}
