//! Query composition for the generic repository.
//!
//! A `Query<T>` is built per call from an optional `Filter` over the
//! entity's columns, a set of relations to eager-load, and a tracking flag.
//! Filters render to parameterized SQL; values are always bound.

use std::fmt::Debug;

use rusqlite::types::Value;

use super::repository::Entity;
use super::DatabaseError;

/// Column of an entity table. Every entity exposes an `Id` key column.
pub trait Column: Copy + Eq + Debug + Send + Sync + 'static {
    fn name(&self) -> &'static str;
    fn all() -> &'static [Self];
    fn key() -> Self;
}

/// Navigation property that can be eager-loaded alongside an entity.
pub trait Relation: Copy + Eq + Debug + Send + Sync + 'static {
    fn name(&self) -> &'static str;
    fn all() -> &'static [Self];

    /// Case-insensitive lookup by navigation name.
    fn parse(name: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|r| r.name().eq_ignore_ascii_case(name.trim()))
    }
}

/// Relation set of entities without navigation properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoRelation {}

impl Relation for NoRelation {
    fn name(&self) -> &'static str {
        match *self {}
    }

    fn all() -> &'static [Self] {
        &[]
    }
}

/// Predicate over the columns `C` of one entity table.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter<C> {
    Eq(C, Value),
    Ne(C, Value),
    Lt(C, Value),
    Le(C, Value),
    Gt(C, Value),
    Ge(C, Value),
    /// Case-insensitive equality on a text column.
    EqIgnoreCase(C, String),
    /// Case-insensitive substring match on a text column.
    Contains(C, String),
    IsNull(C),
    NotNull(C),
    In(C, Vec<Value>),
    And(Vec<Filter<C>>),
    Or(Vec<Filter<C>>),
    Not(Box<Filter<C>>),
}

impl<C: Column> Filter<C> {
    pub fn eq(column: C, value: impl Into<Value>) -> Self {
        Filter::Eq(column, value.into())
    }

    pub fn ne(column: C, value: impl Into<Value>) -> Self {
        Filter::Ne(column, value.into())
    }

    pub fn lt(column: C, value: impl Into<Value>) -> Self {
        Filter::Lt(column, value.into())
    }

    pub fn le(column: C, value: impl Into<Value>) -> Self {
        Filter::Le(column, value.into())
    }

    pub fn gt(column: C, value: impl Into<Value>) -> Self {
        Filter::Gt(column, value.into())
    }

    pub fn ge(column: C, value: impl Into<Value>) -> Self {
        Filter::Ge(column, value.into())
    }

    pub fn eq_ignore_case(column: C, value: impl Into<String>) -> Self {
        Filter::EqIgnoreCase(column, value.into())
    }

    pub fn contains(column: C, needle: impl Into<String>) -> Self {
        Filter::Contains(column, needle.into())
    }

    pub fn is_null(column: C) -> Self {
        Filter::IsNull(column)
    }

    pub fn not_null(column: C) -> Self {
        Filter::NotNull(column)
    }

    pub fn is_in<V: Into<Value>>(column: C, values: impl IntoIterator<Item = V>) -> Self {
        Filter::In(column, values.into_iter().map(Into::into).collect())
    }

    /// Key equality, the most common lookup.
    pub fn key(value: impl Into<Value>) -> Self {
        Filter::Eq(C::key(), value.into())
    }

    pub fn and(self, other: Filter<C>) -> Self {
        match self {
            Filter::And(mut parts) => {
                parts.push(other);
                Filter::And(parts)
            }
            first => Filter::And(vec![first, other]),
        }
    }

    pub fn or(self, other: Filter<C>) -> Self {
        match self {
            Filter::Or(mut parts) => {
                parts.push(other);
                Filter::Or(parts)
            }
            first => Filter::Or(vec![first, other]),
        }
    }

    pub fn negate(self) -> Self {
        Filter::Not(Box::new(self))
    }

    /// Render as a SQL boolean expression, appending bound values to `params`.
    pub(crate) fn to_sql(&self, params: &mut Vec<Value>) -> String {
        match self {
            Filter::Eq(c, Value::Null) => format!("{} IS NULL", quote(c.name())),
            Filter::Ne(c, Value::Null) => format!("{} IS NOT NULL", quote(c.name())),
            Filter::Eq(c, v) => binary(c, "=", v, params),
            // SQL `<>` drops NULL rows; keep them, as "not equal" does in memory.
            Filter::Ne(c, v) => {
                params.push(v.clone());
                format!("({0} IS NULL OR {0} <> ?)", quote(c.name()))
            }
            Filter::Lt(c, v) => binary(c, "<", v, params),
            Filter::Le(c, v) => binary(c, "<=", v, params),
            Filter::Gt(c, v) => binary(c, ">", v, params),
            Filter::Ge(c, v) => binary(c, ">=", v, params),
            Filter::EqIgnoreCase(c, s) => {
                params.push(Value::Text(s.clone()));
                format!("LOWER({}) = LOWER(?)", quote(c.name()))
            }
            Filter::Contains(c, s) => {
                params.push(Value::Text(format!("%{}%", escape_like(&s.to_lowercase()))));
                format!("LOWER({}) LIKE ? ESCAPE '\\'", quote(c.name()))
            }
            Filter::IsNull(c) => format!("{} IS NULL", quote(c.name())),
            Filter::NotNull(c) => format!("{} IS NOT NULL", quote(c.name())),
            Filter::In(_, values) if values.is_empty() => "0".to_string(),
            Filter::In(c, values) => {
                params.extend(values.iter().cloned());
                let marks = vec!["?"; values.len()].join(", ");
                format!("{} IN ({marks})", quote(c.name()))
            }
            Filter::And(parts) if parts.is_empty() => "1".to_string(),
            Filter::And(parts) => join(parts, " AND ", params),
            Filter::Or(parts) if parts.is_empty() => "0".to_string(),
            Filter::Or(parts) => join(parts, " OR ", params),
            Filter::Not(inner) => format!("NOT ({})", inner.to_sql(params)),
        }
    }
}

fn binary<C: Column>(column: &C, op: &str, value: &Value, params: &mut Vec<Value>) -> String {
    params.push(value.clone());
    format!("{} {op} ?", quote(column.name()))
}

fn join<C: Column>(parts: &[Filter<C>], sep: &str, params: &mut Vec<Value>) -> String {
    let rendered: Vec<String> = parts
        .iter()
        .map(|p| format!("({})", p.to_sql(params)))
        .collect();
    rendered.join(sep)
}

fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

pub(crate) fn quote(identifier: &str) -> String {
    format!("\"{identifier}\"")
}

/// Per-call query specification: filter, eager-loads, tracking.
#[derive(Debug, Clone)]
pub struct Query<T: Entity> {
    pub(crate) filter: Option<Filter<T::Column>>,
    pub(crate) include: Vec<T::Relation>,
    pub(crate) tracked: bool,
}

impl<T: Entity> Default for Query<T> {
    fn default() -> Self {
        Self {
            filter: None,
            include: Vec::new(),
            tracked: false,
        }
    }
}

impl<T: Entity> Query<T> {
    /// Every row, untracked, no eager-loads.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn matching(filter: Filter<T::Column>) -> Self {
        Self {
            filter: Some(filter),
            ..Self::default()
        }
    }

    pub fn by_key(key: T::Key) -> Self {
        Self::matching(Filter::key(key))
    }

    /// Narrow the query; combines with an existing filter by AND.
    pub fn and(mut self, filter: Filter<T::Column>) -> Self {
        self.filter = Some(match self.filter.take() {
            Some(existing) => existing.and(filter),
            None => filter,
        });
        self
    }

    pub fn include(mut self, relation: T::Relation) -> Self {
        if !self.include.contains(&relation) {
            self.include.push(relation);
        }
        self
    }

    pub fn include_all(self, relations: impl IntoIterator<Item = T::Relation>) -> Self {
        relations.into_iter().fold(self, Self::include)
    }

    /// Parse a comma-separated list of navigation names (`"User, Test"`).
    ///
    /// Unknown names fail at runtime with `UnknownRelation`; empty
    /// segments are skipped.
    pub fn include_names(mut self, names: &str) -> Result<Self, DatabaseError> {
        for name in names.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            let relation = T::Relation::parse(name).ok_or_else(|| DatabaseError::UnknownRelation {
                entity_type: T::NAME,
                relation: name.to_string(),
            })?;
            self = self.include(relation);
        }
        Ok(self)
    }

    pub fn tracked(mut self) -> Self {
        self.tracked = true;
        self
    }

    pub fn filter(&self) -> Option<&Filter<T::Column>> {
        self.filter.as_ref()
    }

    pub fn relations(&self) -> &[T::Relation] {
        &self.include
    }

    pub fn is_tracked(&self) -> bool {
        self.tracked
    }
}
