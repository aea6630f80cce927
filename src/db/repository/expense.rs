use rusqlite::types::Value;
use rusqlite::{Connection, Row};

use super::{load_parent, sql_value, Entity};
use crate::db::DatabaseError;
use crate::models::*;

entity_columns!(ExpenseColumn {
    Id => "id",
    Name => "name",
    DepartmentId => "department_id",
    Amount => "amount",
    Description => "description",
    FromDate => "from_date",
    ToDate => "to_date",
    PaymentStatus => "payment_status",
});

entity_relations!(ExpenseRelation {
    Department => "Department",
});

impl Entity for Expense {
    type Key = i64;
    type Column = ExpenseColumn;
    type Relation = ExpenseRelation;

    const NAME: &'static str = "Expense";
    const TABLE: &'static str = "expenses";
    const STORE_DEFAULTS: &'static [&'static str] = &["payment_status"];

    fn key(&self) -> Option<i64> {
        (self.id != 0).then_some(self.id)
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            department_id: row.get("department_id")?,
            amount: row.get("amount")?,
            description: row.get("description")?,
            from_date: row.get("from_date")?,
            to_date: row.get("to_date")?,
            payment_status: row.get("payment_status")?,
            department: None,
        })
    }

    fn values(&self) -> rusqlite::Result<Vec<(&'static str, Value)>> {
        Ok(vec![
            ("name", sql_value(&self.name)?),
            ("department_id", sql_value(&self.department_id)?),
            ("amount", sql_value(&self.amount)?),
            ("description", sql_value(&self.description)?),
            ("from_date", sql_value(&self.from_date)?),
            ("to_date", sql_value(&self.to_date)?),
            ("payment_status", sql_value(&self.payment_status)?),
        ])
    }

    fn load_relations(
        conn: &Connection,
        items: &mut [Self],
        relations: &[ExpenseRelation],
    ) -> Result<(), DatabaseError> {
        for relation in relations {
            match relation {
                ExpenseRelation::Department => load_parent::<_, Department>(
                    conn,
                    items,
                    |e| Some(e.department_id),
                    |e, d| e.department = Some(Box::new(d)),
                )?,
            }
        }
        Ok(())
    }
}
