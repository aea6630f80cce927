use std::collections::{HashMap, HashSet};

use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};

use super::{Change, Entity, SaveSummary};
use crate::db::query::{quote, Column, Filter, Query};
use crate::db::DatabaseError;

/// Keys per `IN (...)` batch, below SQLite's bound-parameter limit.
const IN_BATCH: usize = 500;

const KEY_COLUMN: &str = "id";

fn select_list<T: Entity>() -> String {
    T::Column::all()
        .iter()
        .map(|c| quote(c.name()))
        .collect::<Vec<_>>()
        .join(", ")
}

pub(crate) fn select<T: Entity>(
    conn: &Connection,
    filter: Option<&Filter<T::Column>>,
    limit: Option<usize>,
) -> Result<Vec<T>, DatabaseError> {
    let mut params = Vec::new();
    let mut sql = format!("SELECT {} FROM {}", select_list::<T>(), T::TABLE);
    if let Some(filter) = filter {
        sql.push_str(" WHERE ");
        sql.push_str(&filter.to_sql(&mut params));
    }
    if let Some(limit) = limit {
        sql.push_str(&format!(" LIMIT {limit}"));
    }
    tracing::debug!(entity = T::NAME, %sql, params = params.len(), "Query");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(params.iter()), |row| T::from_row(row))?;
    let mut items = Vec::new();
    for row in rows {
        items.push(row?);
    }
    Ok(items)
}

pub(crate) fn fetch<T: Entity>(
    conn: &Connection,
    query: &Query<T>,
    limit: Option<usize>,
) -> Result<Vec<T>, DatabaseError> {
    let mut items = select::<T>(conn, query.filter(), limit)?;
    if !items.is_empty() && !query.relations().is_empty() {
        T::load_relations(conn, &mut items, query.relations())?;
    }
    Ok(items)
}

pub(crate) fn exists<T: Entity>(
    conn: &Connection,
    filter: Option<&Filter<T::Column>>,
) -> Result<bool, DatabaseError> {
    let mut params = Vec::new();
    let predicate = match filter {
        Some(filter) => format!(" WHERE {}", filter.to_sql(&mut params)),
        None => String::new(),
    };
    let sql = format!("SELECT EXISTS (SELECT 1 FROM {}{predicate})", T::TABLE);
    let found: bool = conn.query_row(&sql, params_from_iter(params.iter()), |row| row.get(0))?;
    Ok(found)
}

/// Attach a parent entity to each item through a foreign key.
///
/// Parents are fetched in batches by key; items whose key is `None` or
/// points at a missing row are left untouched.
pub(crate) fn load_parent<T, P>(
    conn: &Connection,
    items: &mut [T],
    foreign_key: impl Fn(&T) -> Option<P::Key>,
    attach: impl Fn(&mut T, P),
) -> Result<(), DatabaseError>
where
    P: Entity,
{
    let mut seen = HashSet::new();
    let keys: Vec<P::Key> = items
        .iter()
        .filter_map(&foreign_key)
        .filter(|k| seen.insert(k.clone()))
        .collect();
    if keys.is_empty() {
        return Ok(());
    }

    let mut parents: HashMap<P::Key, P> = HashMap::with_capacity(keys.len());
    for batch in keys.chunks(IN_BATCH) {
        let filter = Filter::is_in(P::Column::key(), batch.iter().cloned());
        for parent in select::<P>(conn, Some(&filter), None)? {
            if let Some(key) = parent.key() {
                parents.insert(key, parent);
            }
        }
    }

    for item in items.iter_mut() {
        if let Some(parent) = foreign_key(item).and_then(|k| parents.get(&k)) {
            attach(item, parent.clone());
        }
    }
    Ok(())
}

/// Run a unit of work in one transaction.
pub(crate) fn apply<T: Entity>(
    conn: &mut Connection,
    plan: Vec<Change<T>>,
) -> Result<SaveSummary<T::Key>, DatabaseError> {
    let tx = conn.transaction()?;
    let mut summary = SaveSummary::default();
    for change in &plan {
        match change {
            Change::Insert(entity) => summary.inserted.push(insert(&tx, entity)?),
            Change::Update(entity) => summary.updated += update(&tx, entity)?,
            Change::Delete(key) => summary.deleted += delete::<T>(&tx, key)?,
        }
    }
    tx.commit()?;
    Ok(summary)
}

fn insert<T: Entity>(conn: &Connection, entity: &T) -> Result<T::Key, DatabaseError> {
    let mut columns = Vec::new();
    let mut values: Vec<Value> = Vec::new();
    if let Some(key) = entity.key() {
        columns.push(quote(KEY_COLUMN));
        values.push(key.into());
    }
    for (column, value) in entity.values()? {
        if value == Value::Null && T::STORE_DEFAULTS.contains(&column) {
            continue;
        }
        columns.push(quote(column));
        values.push(value);
    }

    let sql = if columns.is_empty() {
        format!("INSERT INTO {} DEFAULT VALUES", T::TABLE)
    } else {
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            T::TABLE,
            columns.join(", "),
            vec!["?"; values.len()].join(", ")
        )
    };
    conn.execute(&sql, params_from_iter(values.iter()))
        .map_err(DatabaseError::classify)?;

    let key = conn.query_row(
        &format!(
            "SELECT {} FROM {} WHERE rowid = last_insert_rowid()",
            quote(KEY_COLUMN),
            T::TABLE
        ),
        [],
        |row| row.get::<_, T::Key>(0),
    )?;
    Ok(key)
}

fn update<T: Entity>(conn: &Connection, entity: &T) -> Result<usize, DatabaseError> {
    let Some(key) = entity.key() else {
        return Ok(0);
    };
    let pairs = entity.values()?;
    if pairs.is_empty() {
        return Ok(0);
    }
    let assignments: Vec<String> = pairs
        .iter()
        .map(|(column, _)| format!("{} = ?", quote(column)))
        .collect();
    let mut values: Vec<Value> = pairs.into_iter().map(|(_, v)| v).collect();
    values.push(key.into());

    let sql = format!(
        "UPDATE {} SET {} WHERE {} = ?",
        T::TABLE,
        assignments.join(", "),
        quote(KEY_COLUMN)
    );
    let changed = conn
        .execute(&sql, params_from_iter(values.iter()))
        .map_err(DatabaseError::classify)?;
    Ok(changed)
}

fn delete<T: Entity>(conn: &Connection, key: &T::Key) -> Result<usize, DatabaseError> {
    let sql = format!("DELETE FROM {} WHERE {} = ?1", T::TABLE, quote(KEY_COLUMN));
    let changed = conn
        .execute(&sql, [key])
        .map_err(DatabaseError::classify)?;
    Ok(changed)
}
