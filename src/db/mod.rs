pub mod query;
pub mod repository;
pub mod sqlite;
pub mod store;

pub use query::*;
pub use repository::*;
pub use sqlite::*;
pub use store::Store;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },

    #[error("Migration failed at version {version}: {reason}")]
    MigrationFailed { version: i64, reason: String },

    #[error("Constraint violated: {0}")]
    ConstraintViolation(String),

    #[error("Unknown relation '{relation}' on {entity_type}")]
    UnknownRelation {
        entity_type: &'static str,
        relation: String,
    },

    #[error("Database connection lock poisoned")]
    LockPoisoned,

    #[error("Blocking database task failed: {0}")]
    TaskJoin(String),
}

impl DatabaseError {
    /// Map SQLite constraint failures to `ConstraintViolation`, leave the rest untouched.
    pub(crate) fn classify(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(code, msg)
                if code.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                DatabaseError::ConstraintViolation(
                    msg.unwrap_or_else(|| code.to_string()),
                )
            }
            other => DatabaseError::Sqlite(other),
        }
    }
}
