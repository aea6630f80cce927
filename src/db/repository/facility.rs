use rusqlite::types::Value;
use rusqlite::{Connection, Row};

use super::{load_parent, sql_value, Entity};
use crate::db::query::NoRelation;
use crate::db::DatabaseError;
use crate::models::*;

entity_columns!(BuildingColumn {
    Id => "id",
    Name => "name",
    Code => "code",
    Description => "description",
});

impl Entity for Building {
    type Key = i64;
    type Column = BuildingColumn;
    type Relation = NoRelation;

    const NAME: &'static str = "Building";
    const TABLE: &'static str = "buildings";

    fn key(&self) -> Option<i64> {
        (self.id != 0).then_some(self.id)
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            code: row.get("code")?,
            description: row.get("description")?,
        })
    }

    fn values(&self) -> rusqlite::Result<Vec<(&'static str, Value)>> {
        Ok(vec![
            ("name", sql_value(&self.name)?),
            ("code", sql_value(&self.code)?),
            ("description", sql_value(&self.description)?),
        ])
    }
}

entity_columns!(FloorColumn {
    Id => "id",
    Name => "name",
    Description => "description",
    BuildingId => "building_id",
});

entity_relations!(FloorRelation {
    Building => "Building",
});

impl Entity for Floor {
    type Key = i64;
    type Column = FloorColumn;
    type Relation = FloorRelation;

    const NAME: &'static str = "Floor";
    const TABLE: &'static str = "floors";

    fn key(&self) -> Option<i64> {
        (self.id != 0).then_some(self.id)
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            description: row.get("description")?,
            building_id: row.get("building_id")?,
            building: None,
        })
    }

    fn values(&self) -> rusqlite::Result<Vec<(&'static str, Value)>> {
        Ok(vec![
            ("name", sql_value(&self.name)?),
            ("description", sql_value(&self.description)?),
            ("building_id", sql_value(&self.building_id)?),
        ])
    }

    fn load_relations(
        conn: &Connection,
        items: &mut [Self],
        relations: &[FloorRelation],
    ) -> Result<(), DatabaseError> {
        for relation in relations {
            match relation {
                FloorRelation::Building => load_parent::<_, Building>(
                    conn,
                    items,
                    |f| Some(f.building_id),
                    |f, b| f.building = Some(Box::new(b)),
                )?,
            }
        }
        Ok(())
    }
}

entity_columns!(DepartmentColumn {
    Id => "id",
    Name => "name",
    Head => "head",
    Address => "address",
    FloorId => "floor_id",
    Phone => "phone",
});

entity_relations!(DepartmentRelation {
    Floor => "Floor",
});

impl Entity for Department {
    type Key = i64;
    type Column = DepartmentColumn;
    type Relation = DepartmentRelation;

    const NAME: &'static str = "Department";
    const TABLE: &'static str = "departments";

    fn key(&self) -> Option<i64> {
        (self.id != 0).then_some(self.id)
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            head: row.get("head")?,
            address: row.get("address")?,
            floor_id: row.get("floor_id")?,
            phone: row.get("phone")?,
            floor: None,
        })
    }

    fn values(&self) -> rusqlite::Result<Vec<(&'static str, Value)>> {
        Ok(vec![
            ("name", sql_value(&self.name)?),
            ("head", sql_value(&self.head)?),
            ("address", sql_value(&self.address)?),
            ("floor_id", sql_value(&self.floor_id)?),
            ("phone", sql_value(&self.phone)?),
        ])
    }

    fn load_relations(
        conn: &Connection,
        items: &mut [Self],
        relations: &[DepartmentRelation],
    ) -> Result<(), DatabaseError> {
        for relation in relations {
            match relation {
                DepartmentRelation::Floor => load_parent::<_, Floor>(
                    conn,
                    items,
                    |d| Some(d.floor_id),
                    |d, f| d.floor = Some(Box::new(f)),
                )?,
            }
        }
        Ok(())
    }
}
