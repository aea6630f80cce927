use rusqlite::types::Value;
use rusqlite::{Connection, Row};

use super::{load_parent, sql_value, Entity};
use crate::db::query::NoRelation;
use crate::db::DatabaseError;
use crate::models::*;

entity_columns!(VendorColumn {
    Id => "id",
    Name => "name",
    Address => "address",
    Email => "email",
    PhoneNumber => "phone_number",
});

impl Entity for Vendor {
    type Key = i64;
    type Column = VendorColumn;
    type Relation = NoRelation;

    const NAME: &'static str = "Vendor";
    const TABLE: &'static str = "vendors";

    fn key(&self) -> Option<i64> {
        (self.id != 0).then_some(self.id)
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            address: row.get("address")?,
            email: row.get("email")?,
            phone_number: row.get("phone_number")?,
        })
    }

    fn values(&self) -> rusqlite::Result<Vec<(&'static str, Value)>> {
        Ok(vec![
            ("name", sql_value(&self.name)?),
            ("address", sql_value(&self.address)?),
            ("email", sql_value(&self.email)?),
            ("phone_number", sql_value(&self.phone_number)?),
        ])
    }
}

entity_columns!(MedicineColumn {
    Id => "id",
    Name => "name",
    GenericName => "generic_name",
    BatchNo => "batch_no",
    BarCode => "bar_code",
    Description => "description",
    Quantity => "quantity",
    UnitWeight => "unit_weight",
    Type => "type",
    ManDate => "man_date",
    ExpDate => "exp_date",
    Cost => "cost",
    RetailCost => "retail_cost",
    Effects => "effects",
    VendorId => "vendor_id",
});

entity_relations!(MedicineRelation {
    Vendor => "Vendor",
});

impl Entity for Medicine {
    type Key = i64;
    type Column = MedicineColumn;
    type Relation = MedicineRelation;

    const NAME: &'static str = "Medicine";
    const TABLE: &'static str = "medicines";
    const STORE_DEFAULTS: &'static [&'static str] = &["type"];

    fn key(&self) -> Option<i64> {
        (self.id != 0).then_some(self.id)
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            generic_name: row.get("generic_name")?,
            batch_no: row.get("batch_no")?,
            bar_code: row.get("bar_code")?,
            description: row.get("description")?,
            quantity: row.get("quantity")?,
            unit_weight: row.get("unit_weight")?,
            medicine_type: row.get("type")?,
            man_date: row.get("man_date")?,
            exp_date: row.get("exp_date")?,
            cost: row.get("cost")?,
            retail_cost: row.get("retail_cost")?,
            effects: row.get("effects")?,
            vendor_id: row.get("vendor_id")?,
            vendor: None,
        })
    }

    fn values(&self) -> rusqlite::Result<Vec<(&'static str, Value)>> {
        Ok(vec![
            ("name", sql_value(&self.name)?),
            ("generic_name", sql_value(&self.generic_name)?),
            ("batch_no", sql_value(&self.batch_no)?),
            ("bar_code", sql_value(&self.bar_code)?),
            ("description", sql_value(&self.description)?),
            ("quantity", sql_value(&self.quantity)?),
            ("unit_weight", sql_value(&self.unit_weight)?),
            ("type", sql_value(&self.medicine_type)?),
            ("man_date", sql_value(&self.man_date)?),
            ("exp_date", sql_value(&self.exp_date)?),
            ("cost", sql_value(&self.cost)?),
            ("retail_cost", sql_value(&self.retail_cost)?),
            ("effects", sql_value(&self.effects)?),
            ("vendor_id", sql_value(&self.vendor_id)?),
        ])
    }

    fn load_relations(
        conn: &Connection,
        items: &mut [Self],
        relations: &[MedicineRelation],
    ) -> Result<(), DatabaseError> {
        for relation in relations {
            match relation {
                MedicineRelation::Vendor => load_parent::<_, Vendor>(
                    conn,
                    items,
                    |m| Some(m.vendor_id),
                    |m, v| m.vendor = Some(Box::new(v)),
                )?,
            }
        }
        Ok(())
    }
}

entity_columns!(VaccineColumn {
    Id => "id",
    Name => "name",
    Type => "type",
    Description => "description",
    MedicineId => "medicine_id",
    Effects => "effects",
});

entity_relations!(VaccineRelation {
    Medicine => "Medicine",
});

impl Entity for Vaccine {
    type Key = i64;
    type Column = VaccineColumn;
    type Relation = VaccineRelation;

    const NAME: &'static str = "Vaccine";
    const TABLE: &'static str = "vaccines";
    const STORE_DEFAULTS: &'static [&'static str] = &["type"];

    fn key(&self) -> Option<i64> {
        (self.id != 0).then_some(self.id)
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            vaccine_type: row.get("type")?,
            description: row.get("description")?,
            medicine_id: row.get("medicine_id")?,
            effects: row.get("effects")?,
            medicine: None,
        })
    }

    fn values(&self) -> rusqlite::Result<Vec<(&'static str, Value)>> {
        Ok(vec![
            ("name", sql_value(&self.name)?),
            ("type", sql_value(&self.vaccine_type)?),
            ("description", sql_value(&self.description)?),
            ("medicine_id", sql_value(&self.medicine_id)?),
            ("effects", sql_value(&self.effects)?),
        ])
    }

    fn load_relations(
        conn: &Connection,
        items: &mut [Self],
        relations: &[VaccineRelation],
    ) -> Result<(), DatabaseError> {
        for relation in relations {
            match relation {
                VaccineRelation::Medicine => load_parent::<_, Medicine>(
                    conn,
                    items,
                    |v| Some(v.medicine_id),
                    |v, m| v.medicine = Some(Box::new(m)),
                )?,
            }
        }
        Ok(())
    }
}

entity_columns!(VaccineAppointmentColumn {
    Id => "id",
    PatientId => "patient_id",
    NurseId => "nurse_id",
    VaccineId => "vaccine_id",
    Date => "date",
    TimeIn => "time_in",
    Taken => "taken",
    DayTime => "day_time",
    Room => "room",
    Remarks => "remarks",
});

entity_relations!(VaccineAppointmentRelation {
    Patient => "Patient",
    Nurse => "Nurse",
    Vaccine => "Vaccine",
});

impl Entity for VaccineAppointment {
    type Key = i64;
    type Column = VaccineAppointmentColumn;
    type Relation = VaccineAppointmentRelation;

    const NAME: &'static str = "VaccineAppointment";
    const TABLE: &'static str = "vaccine_appointments";
    const STORE_DEFAULTS: &'static [&'static str] = &["taken", "day_time"];

    fn key(&self) -> Option<i64> {
        (self.id != 0).then_some(self.id)
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            patient_id: row.get("patient_id")?,
            nurse_id: row.get("nurse_id")?,
            vaccine_id: row.get("vaccine_id")?,
            date: row.get("date")?,
            time_in: row.get("time_in")?,
            taken: row.get("taken")?,
            day_time: row.get("day_time")?,
            room: row.get("room")?,
            remarks: row.get("remarks")?,
            patient: None,
            nurse: None,
            vaccine: None,
        })
    }

    fn values(&self) -> rusqlite::Result<Vec<(&'static str, Value)>> {
        Ok(vec![
            ("patient_id", sql_value(&self.patient_id)?),
            ("nurse_id", sql_value(&self.nurse_id)?),
            ("vaccine_id", sql_value(&self.vaccine_id)?),
            ("date", sql_value(&self.date)?),
            ("time_in", sql_value(&self.time_in)?),
            ("taken", sql_value(&self.taken)?),
            ("day_time", sql_value(&self.day_time)?),
            ("room", sql_value(&self.room)?),
            ("remarks", sql_value(&self.remarks)?),
        ])
    }

    fn load_relations(
        conn: &Connection,
        items: &mut [Self],
        relations: &[VaccineAppointmentRelation],
    ) -> Result<(), DatabaseError> {
        for relation in relations {
            match relation {
                VaccineAppointmentRelation::Patient => load_parent::<_, PatientDetails>(
                    conn,
                    items,
                    |a| Some(a.patient_id),
                    |a, p| a.patient = Some(Box::new(p)),
                )?,
                VaccineAppointmentRelation::Nurse => load_parent::<_, ApplicationUser>(
                    conn,
                    items,
                    |a| Some(a.nurse_id.clone()),
                    |a, u| a.nurse = Some(Box::new(u)),
                )?,
                VaccineAppointmentRelation::Vaccine => load_parent::<_, Vaccine>(
                    conn,
                    items,
                    |a| Some(a.vaccine_id),
                    |a, v| a.vaccine = Some(Box::new(v)),
                )?,
            }
        }
        Ok(())
    }
}
