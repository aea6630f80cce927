//! Generic repository layer.
//!
//! One `Repository<T>` contract serves every entity. `SqlRepository<T>` is a
//! unit of work over the shared `Store`: reads run immediately, writes are
//! staged and committed together by `save`. Per-entity metadata (table,
//! columns, relations, row mapping) lives in the `Entity` impls of the
//! sub-modules.

use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::future::Future;
use std::hash::Hash;

use rusqlite::types::{FromSql, ToSqlOutput, Value};
use rusqlite::{Connection, Row, ToSql};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::query::{Column, Filter, Query, Relation};
use super::{DatabaseError, Store};

/// Declare the column enum of an entity table.
macro_rules! entity_columns {
    ($name:ident { $($variant:ident => $col:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $crate::db::query::Column for $name {
            fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant => $col),+
                }
            }

            fn all() -> &'static [Self] {
                &[$(Self::$variant),+]
            }

            fn key() -> Self {
                Self::Id
            }
        }
    };
}

/// Declare the eager-loadable navigation properties of an entity.
macro_rules! entity_relations {
    ($name:ident { $($variant:ident => $rel:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $crate::db::query::Relation for $name {
            fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant => $rel),+
                }
            }

            fn all() -> &'static [Self] {
                &[$(Self::$variant),+]
            }
        }
    };
}

mod clinical;
mod expense;
mod facility;
mod patient;
mod payment;
mod pharmacy;
mod sql;
mod staff;
mod user;

pub use clinical::*;
pub use expense::*;
pub use facility::*;
pub use patient::*;
pub use payment::*;
pub use pharmacy::*;
pub use staff::*;
pub use user::*;

pub(crate) use sql::load_parent;

/// Primary key of an entity table.
pub trait Key:
    Clone
    + Eq
    + Hash
    + Debug
    + Display
    + Send
    + Sync
    + ToSql
    + FromSql
    + Into<Value>
    + Serialize
    + DeserializeOwned
    + 'static
{
    /// Whether the value can name a stored row.
    fn is_valid(&self) -> bool;
}

impl Key for i64 {
    fn is_valid(&self) -> bool {
        *self > 0
    }
}

impl Key for String {
    fn is_valid(&self) -> bool {
        !self.trim().is_empty()
    }
}

/// Table metadata and row mapping for a persisted record.
pub trait Entity: Clone + PartialEq + Debug + Send + Sync + 'static {
    type Key: Key;
    type Column: Column;
    type Relation: Relation;

    /// Display name used in errors.
    const NAME: &'static str;
    const TABLE: &'static str;
    /// Columns whose store default applies when the value is omitted on insert.
    const STORE_DEFAULTS: &'static [&'static str] = &[];

    /// `None` while the store has not assigned a key yet.
    fn key(&self) -> Option<Self::Key>;

    /// Called by `add` before staging; entities with client-generated keys fill them here.
    fn assign_key(&mut self) {}

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    /// Non-key column values, in column order.
    fn values(&self) -> rusqlite::Result<Vec<(&'static str, Value)>>;

    /// Attach the requested navigation properties to `items`.
    fn load_relations(
        _conn: &Connection,
        _items: &mut [Self],
        _relations: &[Self::Relation],
    ) -> Result<(), DatabaseError> {
        Ok(())
    }
}

/// Owned SQLite value of anything rusqlite can bind.
pub(crate) fn sql_value<T: ToSql + ?Sized>(value: &T) -> rusqlite::Result<Value> {
    match value.to_sql()? {
        ToSqlOutput::Owned(v) => Ok(v),
        ToSqlOutput::Borrowed(v) => Ok(v.into()),
        other => Err(rusqlite::Error::ToSqlConversionFailure(
            format!("unsupported column value: {other:?}").into(),
        )),
    }
}

/// Outcome of a committed unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveSummary<K> {
    /// Keys of inserted rows, in staging order.
    pub inserted: Vec<K>,
    pub updated: usize,
    pub deleted: usize,
}

impl<K> Default for SaveSummary<K> {
    fn default() -> Self {
        Self {
            inserted: Vec::new(),
            updated: 0,
            deleted: 0,
        }
    }
}

impl<K> SaveSummary<K> {
    pub fn is_empty(&self) -> bool {
        self.inserted.is_empty() && self.updated == 0 && self.deleted == 0
    }
}

/// Data-access contract shared by every entity.
pub trait Repository<T: Entity> {
    /// Every record matching the query; empty when nothing matches.
    fn get_all(
        &mut self,
        query: Query<T>,
    ) -> impl Future<Output = Result<Vec<T>, DatabaseError>> + Send;

    /// First match under the store's default ordering, if any.
    fn get(
        &mut self,
        query: Query<T>,
    ) -> impl Future<Output = Result<Option<T>, DatabaseError>> + Send;

    fn any(
        &self,
        filter: Filter<T::Column>,
    ) -> impl Future<Output = Result<bool, DatabaseError>> + Send;

    fn add(&mut self, entity: T);

    fn update(&mut self, entity: T);

    fn remove(&mut self, entity: &T);

    fn remove_range<'a, I>(&mut self, entities: I)
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a;

    /// Commit every staged change atomically.
    fn save(&mut self) -> impl Future<Output = Result<SaveSummary<T::Key>, DatabaseError>> + Send;
}

#[derive(Debug, Clone)]
pub(crate) enum Change<T: Entity> {
    Insert(T),
    Update(T),
    Delete(T::Key),
}

#[derive(Debug)]
struct Tracked<T> {
    snapshot: T,
    current: T,
}

/// Unit of work over the shared SQLite store.
pub struct SqlRepository<T: Entity> {
    store: Store,
    staged: Vec<Change<T>>,
    tracker: HashMap<T::Key, Tracked<T>>,
}

impl<T: Entity> SqlRepository<T> {
    pub fn new(store: Store) -> Self {
        Self {
            store,
            staged: Vec::new(),
            tracker: HashMap::new(),
        }
    }

    /// Number of changes waiting for `save`.
    pub fn pending(&self) -> usize {
        self.staged.len()
    }

    /// Mutable access to an entity loaded by a tracked read.
    pub fn tracked_mut(&mut self, key: &T::Key) -> Option<&mut T> {
        self.tracker.get_mut(key).map(|t| &mut t.current)
    }

    pub fn is_tracked(&self, key: &T::Key) -> bool {
        self.tracker.contains_key(key)
    }

    fn attach(&mut self, items: &[T]) {
        for item in items {
            if let Some(key) = item.key() {
                self.tracker.entry(key).or_insert_with(|| Tracked {
                    snapshot: item.clone(),
                    current: item.clone(),
                });
            }
        }
    }

    /// Staged changes followed by writes for dirty tracked entities.
    fn plan(&self) -> Vec<Change<T>> {
        let mut plan = self.staged.clone();
        let deleted: Vec<&T::Key> = self
            .staged
            .iter()
            .filter_map(|c| match c {
                Change::Delete(key) => Some(key),
                _ => None,
            })
            .collect();
        for (key, entry) in &self.tracker {
            if entry.current != entry.snapshot && !deleted.contains(&key) {
                plan.push(Change::Update(entry.current.clone()));
            }
        }
        plan
    }

    fn committed(&mut self) {
        for change in self.staged.drain(..) {
            if let Change::Delete(key) = change {
                self.tracker.remove(&key);
            }
        }
        for entry in self.tracker.values_mut() {
            entry.snapshot = entry.current.clone();
        }
    }
}

impl<T: Entity> Repository<T> for SqlRepository<T> {
    async fn get_all(&mut self, query: Query<T>) -> Result<Vec<T>, DatabaseError> {
        let tracked = query.is_tracked();
        let items = self
            .store
            .call(move |conn| sql::fetch(conn, &query, None))
            .await?;
        if tracked {
            self.attach(&items);
        }
        Ok(items)
    }

    async fn get(&mut self, query: Query<T>) -> Result<Option<T>, DatabaseError> {
        let tracked = query.is_tracked();
        let mut items = self
            .store
            .call(move |conn| sql::fetch(conn, &query, Some(1)))
            .await?;
        if tracked {
            self.attach(&items);
        }
        Ok(items.pop())
    }

    async fn any(&self, filter: Filter<T::Column>) -> Result<bool, DatabaseError> {
        self.store
            .call(move |conn| sql::exists::<T>(conn, Some(&filter)))
            .await
    }

    fn add(&mut self, mut entity: T) {
        entity.assign_key();
        self.staged.push(Change::Insert(entity));
    }

    fn update(&mut self, entity: T) {
        if let Some(key) = entity.key() {
            if let Some(entry) = self.tracker.get_mut(&key) {
                entry.current = entity;
                return;
            }
        }
        self.staged.push(Change::Update(entity));
    }

    fn remove(&mut self, entity: &T) {
        if let Some(key) = entity.key() {
            self.staged.push(Change::Delete(key));
        }
    }

    fn remove_range<'a, I>(&mut self, entities: I)
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        for entity in entities {
            self.remove(entity);
        }
    }

    async fn save(&mut self) -> Result<SaveSummary<T::Key>, DatabaseError> {
        let plan = self.plan();
        if plan.is_empty() {
            return Ok(SaveSummary::default());
        }
        let summary = self
            .store
            .call(move |conn| sql::apply(conn, plan))
            .await?;
        self.committed();
        tracing::debug!(
            entity = T::NAME,
            inserted = summary.inserted.len(),
            updated = summary.updated,
            deleted = summary.deleted,
            "Unit of work saved"
        );
        Ok(summary)
    }
}
