use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use super::enums::{DayTime, Gender, Weekday};
use super::facility::Department;
use super::user::ApplicationUser;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Specialization {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Designation {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorDetails {
    #[serde(default)]
    pub id: i64,
    pub user_id: String,
    pub last_name: String,
    pub id_number: String,
    pub registration_date: NaiveDateTime,
    pub address: String,
    pub cell: Option<String>,
    pub specialization_id: i64,
    pub department_id: i64,
    pub designation_id: i64,
    pub residence: String,
    pub email: String,
    /// Store default: `Male`.
    pub gender: Option<Gender>,
    /// Store default: `Morning`.
    pub duty: Option<DayTime>,
    pub room: String,
    pub fee: f64,
    pub time_in: Option<NaiveTime>,
    pub time_out: Option<NaiveTime>,
    /// Store default: `Monday`.
    pub days: Option<Weekday>,
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Box<ApplicationUser>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialization: Option<Box<Specialization>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub designation: Option<Box<Designation>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<Box<Department>>,
}
