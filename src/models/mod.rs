//! Entity records for the hospital schema.
//!
//! Plain serde structs; foreign keys are carried as ids and the matching
//! navigation field is only populated when a query eager-loads it.

pub mod clinical;
pub mod enums;
pub mod expense;
pub mod facility;
pub mod patient;
pub mod pharmacy;
pub mod staff;
pub mod user;

pub use clinical::*;
pub use expense::*;
pub use facility::*;
pub use patient::*;
pub use pharmacy::*;
pub use staff::*;
pub use user::*;

/// Built-in role names, seeded by the initial migration.
pub mod roles {
    pub const ADMIN: &str = "admin";
    pub const EMPLOYEE: &str = "employee";
    pub const DOCTOR: &str = "doctor";
    pub const PATIENT: &str = "patient";
    pub const NURSE: &str = "nurse";

    pub const ALL: [&str; 5] = [ADMIN, EMPLOYEE, DOCTOR, PATIENT, NURSE];
}
