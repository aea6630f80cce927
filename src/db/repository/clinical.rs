use rusqlite::types::Value;
use rusqlite::{Connection, Row};

use super::{load_parent, sql_value, Entity};
use crate::db::query::NoRelation;
use crate::db::DatabaseError;
use crate::models::*;

// ═══════════════════════════════════════════
// Catalogues
// ═══════════════════════════════════════════

entity_columns!(ConsultCategoryColumn {
    Id => "id",
    Name => "name",
    Description => "description",
    Cost => "cost",
});

impl Entity for ConsultCategory {
    type Key = i64;
    type Column = ConsultCategoryColumn;
    type Relation = NoRelation;

    const NAME: &'static str = "ConsultCategory";
    const TABLE: &'static str = "consult_categories";

    fn key(&self) -> Option<i64> {
        (self.id != 0).then_some(self.id)
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            description: row.get("description")?,
            cost: row.get("cost")?,
        })
    }

    fn values(&self) -> rusqlite::Result<Vec<(&'static str, Value)>> {
        Ok(vec![
            ("name", sql_value(&self.name)?),
            ("description", sql_value(&self.description)?),
            ("cost", sql_value(&self.cost)?),
        ])
    }
}

entity_columns!(TreatmentColumn {
    Id => "id",
    Name => "name",
    Description => "description",
    Cost => "cost",
});

impl Entity for Treatment {
    type Key = i64;
    type Column = TreatmentColumn;
    type Relation = NoRelation;

    const NAME: &'static str = "Treatment";
    const TABLE: &'static str = "treatments";

    fn key(&self) -> Option<i64> {
        (self.id != 0).then_some(self.id)
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            description: row.get("description")?,
            cost: row.get("cost")?,
        })
    }

    fn values(&self) -> rusqlite::Result<Vec<(&'static str, Value)>> {
        Ok(vec![
            ("name", sql_value(&self.name)?),
            ("description", sql_value(&self.description)?),
            ("cost", sql_value(&self.cost)?),
        ])
    }
}

entity_columns!(TestCategoryColumn {
    Id => "id",
    TestName => "test_name",
    MinValue => "min_value",
    MaxValue => "max_value",
    Cost => "cost",
    Description => "description",
});

impl Entity for TestCategory {
    type Key = i64;
    type Column = TestCategoryColumn;
    type Relation = NoRelation;

    const NAME: &'static str = "TestCategory";
    const TABLE: &'static str = "test_categories";

    fn key(&self) -> Option<i64> {
        (self.id != 0).then_some(self.id)
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            test_name: row.get("test_name")?,
            min_value: row.get("min_value")?,
            max_value: row.get("max_value")?,
            cost: row.get("cost")?,
            description: row.get("description")?,
        })
    }

    fn values(&self) -> rusqlite::Result<Vec<(&'static str, Value)>> {
        Ok(vec![
            ("test_name", sql_value(&self.test_name)?),
            ("min_value", sql_value(&self.min_value)?),
            ("max_value", sql_value(&self.max_value)?),
            ("cost", sql_value(&self.cost)?),
            ("description", sql_value(&self.description)?),
        ])
    }
}

// ═══════════════════════════════════════════
// Encounters
// ═══════════════════════════════════════════

entity_columns!(ConsultationColumn {
    Id => "id",
    PatientId => "patient_id",
    ConsultCategoryId => "consult_category_id",
    Description => "description",
    PaymentStatus => "payment_status",
    Approved => "approved",
    DoctorId => "doctor_id",
});

entity_relations!(ConsultationRelation {
    Patient => "Patient",
    ConsultCategory => "ConsultCategory",
    Doctor => "Doctor",
});

impl Entity for Consultation {
    type Key = i64;
    type Column = ConsultationColumn;
    type Relation = ConsultationRelation;

    const NAME: &'static str = "Consultation";
    const TABLE: &'static str = "consultations";
    const STORE_DEFAULTS: &'static [&'static str] = &["payment_status", "approved"];

    fn key(&self) -> Option<i64> {
        (self.id != 0).then_some(self.id)
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            patient_id: row.get("patient_id")?,
            consult_category_id: row.get("consult_category_id")?,
            description: row.get("description")?,
            payment_status: row.get("payment_status")?,
            approved: row.get("approved")?,
            doctor_id: row.get("doctor_id")?,
            patient: None,
            consult_category: None,
            doctor: None,
        })
    }

    fn values(&self) -> rusqlite::Result<Vec<(&'static str, Value)>> {
        Ok(vec![
            ("patient_id", sql_value(&self.patient_id)?),
            ("consult_category_id", sql_value(&self.consult_category_id)?),
            ("description", sql_value(&self.description)?),
            ("payment_status", sql_value(&self.payment_status)?),
            ("approved", sql_value(&self.approved)?),
            ("doctor_id", sql_value(&self.doctor_id)?),
        ])
    }

    fn load_relations(
        conn: &Connection,
        items: &mut [Self],
        relations: &[ConsultationRelation],
    ) -> Result<(), DatabaseError> {
        for relation in relations {
            match relation {
                ConsultationRelation::Patient => load_parent::<_, PatientDetails>(
                    conn,
                    items,
                    |c| Some(c.patient_id),
                    |c, p| c.patient = Some(Box::new(p)),
                )?,
                ConsultationRelation::ConsultCategory => load_parent::<_, ConsultCategory>(
                    conn,
                    items,
                    |c| Some(c.consult_category_id),
                    |c, cat| c.consult_category = Some(Box::new(cat)),
                )?,
                ConsultationRelation::Doctor => load_parent::<_, DoctorDetails>(
                    conn,
                    items,
                    |c| Some(c.doctor_id),
                    |c, d| c.doctor = Some(Box::new(d)),
                )?,
            }
        }
        Ok(())
    }
}

entity_columns!(TestResultColumn {
    Id => "id",
    UserId => "user_id",
    TestId => "test_id",
    Result => "result",
    Description => "description",
    PaymentStatus => "payment_status",
});

entity_relations!(TestResultRelation {
    User => "User",
    Test => "Test",
});

impl Entity for TestResult {
    type Key = i64;
    type Column = TestResultColumn;
    type Relation = TestResultRelation;

    const NAME: &'static str = "TestResult";
    const TABLE: &'static str = "test_results";
    const STORE_DEFAULTS: &'static [&'static str] = &["payment_status"];

    fn key(&self) -> Option<i64> {
        (self.id != 0).then_some(self.id)
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            test_id: row.get("test_id")?,
            result: row.get("result")?,
            description: row.get("description")?,
            payment_status: row.get("payment_status")?,
            user: None,
            test: None,
        })
    }

    fn values(&self) -> rusqlite::Result<Vec<(&'static str, Value)>> {
        Ok(vec![
            ("user_id", sql_value(&self.user_id)?),
            ("test_id", sql_value(&self.test_id)?),
            ("result", sql_value(&self.result)?),
            ("description", sql_value(&self.description)?),
            ("payment_status", sql_value(&self.payment_status)?),
        ])
    }

    fn load_relations(
        conn: &Connection,
        items: &mut [Self],
        relations: &[TestResultRelation],
    ) -> Result<(), DatabaseError> {
        for relation in relations {
            match relation {
                TestResultRelation::User => load_parent::<_, ApplicationUser>(
                    conn,
                    items,
                    |t| Some(t.user_id.clone()),
                    |t, u| t.user = Some(Box::new(u)),
                )?,
                TestResultRelation::Test => load_parent::<_, TestCategory>(
                    conn,
                    items,
                    |t| Some(t.test_id),
                    |t, c| t.test = Some(Box::new(c)),
                )?,
            }
        }
        Ok(())
    }
}

entity_columns!(PrescriptionColumn {
    Id => "id",
    UserId => "user_id",
    TreatmentId => "treatment_id",
    Medicine => "medicine",
    Times => "times",
    Days => "days",
    DayTime => "day_time",
    TestCategoryId => "test_category_id",
    PaymentStatus => "payment_status",
    History => "history",
});

entity_relations!(PrescriptionRelation {
    User => "User",
    Treatment => "Treatment",
    Test => "Test",
});

impl Entity for Prescription {
    type Key = i64;
    type Column = PrescriptionColumn;
    type Relation = PrescriptionRelation;

    const NAME: &'static str = "Prescription";
    const TABLE: &'static str = "prescriptions";
    const STORE_DEFAULTS: &'static [&'static str] = &["day_time"];

    fn key(&self) -> Option<i64> {
        (self.id != 0).then_some(self.id)
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            treatment_id: row.get("treatment_id")?,
            medicine: row.get("medicine")?,
            times: row.get("times")?,
            days: row.get("days")?,
            day_time: row.get("day_time")?,
            test_category_id: row.get("test_category_id")?,
            payment_status: row.get("payment_status")?,
            history: row.get("history")?,
            user: None,
            treatment: None,
            test_category: None,
        })
    }

    fn values(&self) -> rusqlite::Result<Vec<(&'static str, Value)>> {
        Ok(vec![
            ("user_id", sql_value(&self.user_id)?),
            ("treatment_id", sql_value(&self.treatment_id)?),
            ("medicine", sql_value(&self.medicine)?),
            ("times", sql_value(&self.times)?),
            ("days", sql_value(&self.days)?),
            ("day_time", sql_value(&self.day_time)?),
            ("test_category_id", sql_value(&self.test_category_id)?),
            ("payment_status", sql_value(&self.payment_status)?),
            ("history", sql_value(&self.history)?),
        ])
    }

    fn load_relations(
        conn: &Connection,
        items: &mut [Self],
        relations: &[PrescriptionRelation],
    ) -> Result<(), DatabaseError> {
        for relation in relations {
            match relation {
                PrescriptionRelation::User => load_parent::<_, ApplicationUser>(
                    conn,
                    items,
                    |p| Some(p.user_id.clone()),
                    |p, u| p.user = Some(Box::new(u)),
                )?,
                PrescriptionRelation::Treatment => load_parent::<_, Treatment>(
                    conn,
                    items,
                    |p| Some(p.treatment_id),
                    |p, t| p.treatment = Some(Box::new(t)),
                )?,
                PrescriptionRelation::Test => load_parent::<_, TestCategory>(
                    conn,
                    items,
                    |p| p.test_category_id,
                    |p, c| p.test_category = Some(Box::new(c)),
                )?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::query::Query;
    use crate::db::repository::{Repository, SqlRepository};
    use crate::db::Store;
    use crate::models::enums::{DayTime, PaymentStatus};

    async fn seeded() -> Store {
        let store = Store::open_in_memory().unwrap();
        store
            .call(|conn| {
                conn.execute_batch(
                    "INSERT INTO application_users
                         (id, user_name, normalized_user_name, email, normalized_email, name)
                         VALUES ('u-1', 'pat@x.com', 'PAT@X.COM', 'pat@x.com', 'PAT@X.COM', 'Pat');
                     INSERT INTO treatments (name, cost) VALUES ('Physio', 40);
                     INSERT INTO test_categories (test_name, min_value, max_value, cost)
                         VALUES ('Glucose', 70, 110, 15);",
                )?;
                Ok(())
            })
            .await
            .unwrap();
        store
    }

    fn prescription(test_category_id: Option<i64>) -> Prescription {
        Prescription {
            user_id: "u-1".into(),
            treatment_id: 1,
            medicine: "Ibuprofen".into(),
            times: 2,
            days: 5,
            test_category_id,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn prescription_test_relation_tolerates_missing_category() {
        let store = seeded().await;
        let mut repo = SqlRepository::<Prescription>::new(store);
        repo.add(prescription(Some(1)));
        repo.add(prescription(None));
        repo.save().await.unwrap();

        let rows = repo
            .get_all(Query::all().include_names("User, Treatment, Test").unwrap())
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        for row in &rows {
            assert_eq!(row.day_time, Some(DayTime::Morning));
            assert_eq!(row.user.as_ref().unwrap().name, "Pat");
            assert_eq!(row.treatment.as_ref().unwrap().name, "Physio");
            assert_eq!(
                row.test_category.as_ref().map(|c| c.test_name.as_str()),
                row.test_category_id.map(|_| "Glucose")
            );
        }
        // No store default for prescription payment status.
        assert!(rows.iter().all(|r| r.payment_status.is_none()));
    }

    #[tokio::test]
    async fn test_result_defaults_to_unpaid() {
        let store = seeded().await;
        let mut repo = SqlRepository::<TestResult>::new(store);
        repo.add(TestResult {
            user_id: "u-1".into(),
            test_id: 1,
            result: "95".into(),
            ..Default::default()
        });
        let id = repo.save().await.unwrap().inserted[0];
        let row = repo
            .get(Query::by_key(id).include(TestResultRelation::Test))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.payment_status, Some(PaymentStatus::Unpaid));
        assert_eq!(row.test.unwrap().max_value, 110.0);
    }
}
