use rusqlite::types::Value;
use rusqlite::{Connection, Row};

use super::{load_parent, sql_value, Entity};
use crate::db::query::NoRelation;
use crate::db::DatabaseError;
use crate::models::*;

entity_columns!(SpecializationColumn {
    Id => "id",
    Name => "name",
    Description => "description",
});

impl Entity for Specialization {
    type Key = i64;
    type Column = SpecializationColumn;
    type Relation = NoRelation;

    const NAME: &'static str = "Specialization";
    const TABLE: &'static str = "specializations";

    fn key(&self) -> Option<i64> {
        (self.id != 0).then_some(self.id)
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            description: row.get("description")?,
        })
    }

    fn values(&self) -> rusqlite::Result<Vec<(&'static str, Value)>> {
        Ok(vec![
            ("name", sql_value(&self.name)?),
            ("description", sql_value(&self.description)?),
        ])
    }
}

entity_columns!(DesignationColumn {
    Id => "id",
    Name => "name",
    Description => "description",
});

impl Entity for Designation {
    type Key = i64;
    type Column = DesignationColumn;
    type Relation = NoRelation;

    const NAME: &'static str = "Designation";
    const TABLE: &'static str = "designations";

    fn key(&self) -> Option<i64> {
        (self.id != 0).then_some(self.id)
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            description: row.get("description")?,
        })
    }

    fn values(&self) -> rusqlite::Result<Vec<(&'static str, Value)>> {
        Ok(vec![
            ("name", sql_value(&self.name)?),
            ("description", sql_value(&self.description)?),
        ])
    }
}

entity_columns!(DoctorColumn {
    Id => "id",
    UserId => "user_id",
    LastName => "last_name",
    IdNumber => "id_number",
    RegistrationDate => "registration_date",
    Address => "address",
    Cell => "cell",
    SpecializationId => "specialization_id",
    DepartmentId => "department_id",
    DesignationId => "designation_id",
    Residence => "residence",
    Email => "email",
    Gender => "gender",
    Duty => "duty",
    Room => "room",
    Fee => "fee",
    TimeIn => "time_in",
    TimeOut => "time_out",
    Days => "days",
    Image => "image",
});

entity_relations!(DoctorRelation {
    User => "User",
    Specialization => "Specialization",
    Designation => "Designation",
    Department => "Department",
});

impl Entity for DoctorDetails {
    type Key = i64;
    type Column = DoctorColumn;
    type Relation = DoctorRelation;

    const NAME: &'static str = "DoctorDetails";
    const TABLE: &'static str = "doctor_details";
    const STORE_DEFAULTS: &'static [&'static str] = &["gender", "duty", "days"];

    fn key(&self) -> Option<i64> {
        (self.id != 0).then_some(self.id)
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            last_name: row.get("last_name")?,
            id_number: row.get("id_number")?,
            registration_date: row.get("registration_date")?,
            address: row.get("address")?,
            cell: row.get("cell")?,
            specialization_id: row.get("specialization_id")?,
            department_id: row.get("department_id")?,
            designation_id: row.get("designation_id")?,
            residence: row.get("residence")?,
            email: row.get("email")?,
            gender: row.get("gender")?,
            duty: row.get("duty")?,
            room: row.get("room")?,
            fee: row.get("fee")?,
            time_in: row.get("time_in")?,
            time_out: row.get("time_out")?,
            days: row.get("days")?,
            image: row.get("image")?,
            user: None,
            specialization: None,
            designation: None,
            department: None,
        })
    }

    fn values(&self) -> rusqlite::Result<Vec<(&'static str, Value)>> {
        Ok(vec![
            ("user_id", sql_value(&self.user_id)?),
            ("last_name", sql_value(&self.last_name)?),
            ("id_number", sql_value(&self.id_number)?),
            ("registration_date", sql_value(&self.registration_date)?),
            ("address", sql_value(&self.address)?),
            ("cell", sql_value(&self.cell)?),
            ("specialization_id", sql_value(&self.specialization_id)?),
            ("department_id", sql_value(&self.department_id)?),
            ("designation_id", sql_value(&self.designation_id)?),
            ("residence", sql_value(&self.residence)?),
            ("email", sql_value(&self.email)?),
            ("gender", sql_value(&self.gender)?),
            ("duty", sql_value(&self.duty)?),
            ("room", sql_value(&self.room)?),
            ("fee", sql_value(&self.fee)?),
            ("time_in", sql_value(&self.time_in)?),
            ("time_out", sql_value(&self.time_out)?),
            ("days", sql_value(&self.days)?),
            ("image", sql_value(&self.image)?),
        ])
    }

    fn load_relations(
        conn: &Connection,
        items: &mut [Self],
        relations: &[DoctorRelation],
    ) -> Result<(), DatabaseError> {
        for relation in relations {
            match relation {
                DoctorRelation::User => load_parent::<_, ApplicationUser>(
                    conn,
                    items,
                    |d| Some(d.user_id.clone()),
                    |d, u| d.user = Some(Box::new(u)),
                )?,
                DoctorRelation::Specialization => load_parent::<_, Specialization>(
                    conn,
                    items,
                    |d| Some(d.specialization_id),
                    |d, s| d.specialization = Some(Box::new(s)),
                )?,
                DoctorRelation::Designation => load_parent::<_, Designation>(
                    conn,
                    items,
                    |d| Some(d.designation_id),
                    |d, s| d.designation = Some(Box::new(s)),
                )?,
                DoctorRelation::Department => load_parent::<_, Department>(
                    conn,
                    items,
                    |d| Some(d.department_id),
                    |d, dept| d.department = Some(Box::new(dept)),
                )?,
            }
        }
        Ok(())
    }
}
