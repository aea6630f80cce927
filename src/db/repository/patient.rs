use rusqlite::types::Value;
use rusqlite::{Connection, Row};

use super::{load_parent, sql_value, Entity};
use crate::db::DatabaseError;
use crate::models::*;

entity_columns!(PatientColumn {
    Id => "id",
    UserId => "user_id",
    LastName => "last_name",
    IdNumber => "id_number",
    RegistrationDate => "registration_date",
    Address => "address",
    Cell => "cell",
    BirthDate => "birth_date",
    Residence => "residence",
    Email => "email",
    Guardian => "guardian",
    Relation => "relation",
    Gender => "gender",
    StatusPatient => "status_patient",
    PatientType => "patient_type",
    Image => "image",
});

entity_relations!(PatientRelation {
    User => "User",
});

impl Entity for PatientDetails {
    type Key = i64;
    type Column = PatientColumn;
    type Relation = PatientRelation;

    const NAME: &'static str = "PatientDetails";
    const TABLE: &'static str = "patient_details";
    const STORE_DEFAULTS: &'static [&'static str] = &["gender", "status_patient", "patient_type"];

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
            birth_date: row.get("birth_date")?,
            residence: row.get("residence")?,
            email: row.get("email")?,
            guardian: row.get("guardian")?,
            relation: row.get("relation")?,
            gender: row.get("gender")?,
            status_patient: row.get("status_patient")?,
            patient_type: row.get("patient_type")?,
            image: row.get("image")?,
            user: None,
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
            ("birth_date", sql_value(&self.birth_date)?),
            ("residence", sql_value(&self.residence)?),
            ("email", sql_value(&self.email)?),
            ("guardian", sql_value(&self.guardian)?),
            ("relation", sql_value(&self.relation)?),
            ("gender", sql_value(&self.gender)?),
            ("status_patient", sql_value(&self.status_patient)?),
            ("patient_type", sql_value(&self.patient_type)?),
            ("image", sql_value(&self.image)?),
        ])
    }

    fn load_relations(
        conn: &Connection,
        items: &mut [Self],
        relations: &[PatientRelation],
    ) -> Result<(), DatabaseError> {
        for relation in relations {
            match relation {
                PatientRelation::User => load_parent::<_, ApplicationUser>(
                    conn,
                    items,
                    |p| Some(p.user_id.clone()),
                    |p, u| p.user = Some(Box::new(u)),
                )?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::db::query::{Filter, Query};
    use crate::db::repository::{Repository, SqlRepository};
    use crate::db::Store;
    use crate::models::enums::{PatientStatus, PatientType};

    fn patient(last_name: &str, patient_type: Option<PatientType>) -> PatientDetails {
        PatientDetails {
            id: 0,
            user_id: "u-1".into(),
            last_name: last_name.into(),
            id_number: "P-1".into(),
            registration_date: NaiveDate::from_ymd_opt(2024, 5, 2)
                .unwrap()
                .and_hms_opt(11, 0, 0)
                .unwrap(),
            address: "2 Side St".into(),
            cell: "555-0101".into(),
            birth_date: NaiveDate::from_ymd_opt(1990, 7, 14),
            residence: "Town".into(),
            email: "pat@x.com".into(),
            guardian: "Sam".into(),
            relation: "Sibling".into(),
            gender: None,
            status_patient: None,
            patient_type,
            image: "p.png".into(),
            user: None,
        }
    }

    #[tokio::test]
    async fn filters_on_spaced_enum_values() {
        let store = Store::open_in_memory().unwrap();
        store
            .call(|conn| {
                conn.execute(
                    "INSERT INTO application_users
                         (id, user_name, normalized_user_name, email, normalized_email, name)
                     VALUES ('u-1', 'pat@x.com', 'PAT@X.COM', 'pat@x.com', 'PAT@X.COM', 'Pat')",
                    [],
                )?;
                Ok(())
            })
            .await
            .unwrap();

        let mut repo = SqlRepository::<PatientDetails>::new(store);
        repo.add(patient("Inman", None));
        repo.add(patient("Outram", Some(PatientType::OutPatient)));
        repo.save().await.unwrap();

        let inpatients = repo
            .get_all(
                Query::matching(Filter::eq(PatientColumn::PatientType, PatientType::InPatient))
                    .include(PatientRelation::User),
            )
            .await
            .unwrap();
        assert_eq!(inpatients.len(), 1);
        let row = &inpatients[0];
        assert_eq!(row.last_name, "Inman");
        assert_eq!(row.status_patient, Some(PatientStatus::Cured));
        assert_eq!(row.birth_date, NaiveDate::from_ymd_opt(1990, 7, 14));
        assert_eq!(row.user.as_ref().unwrap().name, "Pat");
    }
}
