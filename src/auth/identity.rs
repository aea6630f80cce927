//! Identity storage: accounts, credentials and role memberships.
//!
//! Synchronous over a borrowed connection, like the repository helpers;
//! callers run it on the blocking pool through `Store::call`.

use std::sync::LazyLock;

use regex::Regex;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::password::PasswordHasher;
use super::{IdentityError, RegistrationError};
use crate::db::DatabaseError;
use crate::models::ApplicationUser;

pub const MAX_NAME_LENGTH: usize = 32;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap()
});

/// Capability interface the auth service depends on.
///
/// Every method runs under the store lock, so none of them derives a
/// credential; hashing and verification go through `hasher()` off the lock.
pub trait IdentityStore: Send + Sync {
    /// Case-insensitive email lookup.
    fn find_by_email(
        &self,
        conn: &Connection,
        email: &str,
    ) -> Result<Option<ApplicationUser>, DatabaseError>;

    /// Case-insensitive user name lookup. The stored hash is loaded too.
    fn find_by_username(
        &self,
        conn: &Connection,
        user_name: &str,
    ) -> Result<Option<ApplicationUser>, DatabaseError>;

    fn find_by_id(&self, conn: &Connection, id: &str)
        -> Result<Option<ApplicationUser>, DatabaseError>;

    /// Credential hasher for this store's identities.
    fn hasher(&self) -> PasswordHasher;

    /// Name, email and uniqueness failures of a prospective identity.
    fn identity_errors(
        &self,
        conn: &Connection,
        user: &ApplicationUser,
    ) -> Result<Vec<IdentityError>, DatabaseError>;

    /// Persist a new identity with an already derived credential hash.
    /// Identity rules are checked again here, under the same lock as the insert.
    fn create_identity(
        &self,
        conn: &Connection,
        user: ApplicationUser,
        password_hash: String,
    ) -> Result<ApplicationUser, RegistrationError>;

    /// Write the profile fields of an existing identity. The credential is
    /// left alone. `false` when no identity has `user.id`.
    fn update_profile(&self, conn: &Connection, user: &ApplicationUser)
        -> Result<bool, DatabaseError>;

    /// Canonical names of the roles held, oldest membership first.
    fn roles_of(&self, conn: &Connection, user_id: &str) -> Result<Vec<String>, DatabaseError>;

    fn role_exists(&self, conn: &Connection, role: &str) -> Result<bool, DatabaseError>;

    /// Grant `role`; existing memberships are kept. `false` if the role is unknown.
    fn add_role_membership(
        &self,
        conn: &Connection,
        user_id: &str,
        role: &str,
    ) -> Result<bool, DatabaseError>;

    /// Replace every membership with `role`. `false` if the role is unknown,
    /// in which case nothing is written. Atomic only inside the caller's
    /// transaction.
    fn replace_roles(
        &self,
        conn: &Connection,
        user_id: &str,
        role: &str,
    ) -> Result<bool, DatabaseError>;
}

/// SQLite-backed identity store over `application_users`, `roles` and `user_roles`.
#[derive(Debug, Clone, Default)]
pub struct SqliteIdentityStore {
    hasher: PasswordHasher,
}

const USER_COLUMNS: &str =
    "id, user_name, email, name, about, details, phone_number, password_hash";

fn user_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ApplicationUser> {
    Ok(ApplicationUser {
        id: row.get(0)?,
        user_name: row.get(1)?,
        email: row.get(2)?,
        name: row.get(3)?,
        about: row.get(4)?,
        details: row.get(5)?,
        phone_number: row.get(6)?,
        password_hash: row.get(7)?,
    })
}

impl SqliteIdentityStore {
    pub fn new(hasher: PasswordHasher) -> Self {
        Self { hasher }
    }

    fn find_where(
        &self,
        conn: &Connection,
        column: &str,
        value: &str,
    ) -> Result<Option<ApplicationUser>, DatabaseError> {
        let sql =
            format!("SELECT {USER_COLUMNS} FROM application_users WHERE {column} = ?1 LIMIT 1");
        let user = conn.query_row(&sql, [value], user_from_row).optional()?;
        Ok(user)
    }

    fn role_id(&self, conn: &Connection, role: &str) -> Result<Option<String>, DatabaseError> {
        let id = conn
            .query_row(
                "SELECT id FROM roles WHERE normalized_name = ?1",
                [ApplicationUser::normalize(role)],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }
}

impl IdentityStore for SqliteIdentityStore {
    fn find_by_email(
        &self,
        conn: &Connection,
        email: &str,
    ) -> Result<Option<ApplicationUser>, DatabaseError> {
        self.find_where(conn, "normalized_email", &ApplicationUser::normalize(email))
    }

    fn find_by_username(
        &self,
        conn: &Connection,
        user_name: &str,
    ) -> Result<Option<ApplicationUser>, DatabaseError> {
        self.find_where(conn, "normalized_user_name", &ApplicationUser::normalize(user_name))
    }

    fn find_by_id(
        &self,
        conn: &Connection,
        id: &str,
    ) -> Result<Option<ApplicationUser>, DatabaseError> {
        self.find_where(conn, "id", id)
    }

    fn hasher(&self) -> PasswordHasher {
        self.hasher
    }

    fn identity_errors(
        &self,
        conn: &Connection,
        user: &ApplicationUser,
    ) -> Result<Vec<IdentityError>, DatabaseError> {
        let mut errors = Vec::new();
        let name_len = user.name.trim().chars().count();
        if name_len == 0 || name_len > MAX_NAME_LENGTH {
            errors.push(IdentityError::InvalidName(MAX_NAME_LENGTH));
        }
        if !EMAIL_PATTERN.is_match(user.email.trim()) {
            errors.push(IdentityError::InvalidEmail(user.email.clone()));
        }
        if self.find_by_username(conn, &user.user_name)?.is_some() {
            errors.push(IdentityError::DuplicateUserName(user.user_name.clone()));
        }
        if self.find_by_email(conn, &user.email)?.is_some() {
            errors.push(IdentityError::DuplicateEmail(user.email.clone()));
        }
        Ok(errors)
    }

    fn create_identity(
        &self,
        conn: &Connection,
        mut user: ApplicationUser,
        password_hash: String,
    ) -> Result<ApplicationUser, RegistrationError> {
        user.email = user.email.trim().to_string();
        if user.user_name.trim().is_empty() {
            user.user_name = user.email.clone();
        }
        let errors = self.identity_errors(conn, &user)?;
        if !errors.is_empty() {
            return Err(RegistrationError::Rejected(errors));
        }

        if user.id.is_empty() {
            user.id = Uuid::new_v4().to_string();
        }
        conn.execute(
            "INSERT INTO application_users
             (id, user_name, normalized_user_name, email, normalized_email, name,
              about, details, phone_number, password_hash)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                user.id,
                user.user_name,
                ApplicationUser::normalize(&user.user_name),
                user.email,
                ApplicationUser::normalize(&user.email),
                user.name,
                user.about,
                user.details,
                user.phone_number,
                password_hash,
            ],
        )
        .map_err(DatabaseError::classify)?;
        user.password_hash = Some(password_hash);
        Ok(user)
    }

    fn update_profile(
        &self,
        conn: &Connection,
        user: &ApplicationUser,
    ) -> Result<bool, DatabaseError> {
        let updated = conn
            .execute(
                "UPDATE application_users
                 SET user_name = ?2, normalized_user_name = ?3, email = ?4,
                     normalized_email = ?5, name = ?6, about = ?7, details = ?8,
                     phone_number = ?9
                 WHERE id = ?1",
                params![
                    user.id,
                    user.user_name,
                    ApplicationUser::normalize(&user.user_name),
                    user.email,
                    ApplicationUser::normalize(&user.email),
                    user.name,
                    user.about,
                    user.details,
                    user.phone_number,
                ],
            )
            .map_err(DatabaseError::classify)?;
        Ok(updated > 0)
    }

    fn roles_of(&self, conn: &Connection, user_id: &str) -> Result<Vec<String>, DatabaseError> {
        let mut stmt = conn.prepare(
            "SELECT r.name FROM user_roles ur
             JOIN roles r ON r.id = ur.role_id
             WHERE ur.user_id = ?1
             ORDER BY ur.assigned_at, r.name",
        )?;
        let rows = stmt.query_map([user_id], |row| row.get::<_, String>(0))?;
        let mut roles = Vec::new();
        for row in rows {
            roles.push(row?);
        }
        Ok(roles)
    }

    fn role_exists(&self, conn: &Connection, role: &str) -> Result<bool, DatabaseError> {
        Ok(self.role_id(conn, role)?.is_some())
    }

    fn add_role_membership(
        &self,
        conn: &Connection,
        user_id: &str,
        role: &str,
    ) -> Result<bool, DatabaseError> {
        let Some(role_id) = self.role_id(conn, role)? else {
            return Ok(false);
        };
        conn.execute(
            "INSERT OR IGNORE INTO user_roles (user_id, role_id) VALUES (?1, ?2)",
            params![user_id, role_id],
        )
        .map_err(DatabaseError::classify)?;
        Ok(true)
    }

    fn replace_roles(
        &self,
        conn: &Connection,
        user_id: &str,
        role: &str,
    ) -> Result<bool, DatabaseError> {
        let Some(role_id) = self.role_id(conn, role)? else {
            return Ok(false);
        };
        conn.execute("DELETE FROM user_roles WHERE user_id = ?1", [user_id])?;
        conn.execute(
            "INSERT INTO user_roles (user_id, role_id) VALUES (?1, ?2)",
            params![user_id, role_id],
        )
        .map_err(DatabaseError::classify)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;

    fn store() -> SqliteIdentityStore {
        SqliteIdentityStore::new(PasswordHasher::new(1_000))
    }

    fn account(email: &str) -> ApplicationUser {
        ApplicationUser {
            email: email.into(),
            name: "Doc".into(),
            ..Default::default()
        }
    }

    fn create(identities: &SqliteIdentityStore, conn: &Connection, email: &str) -> ApplicationUser {
        let hash = identities.hasher().hash("Secret1!");
        identities.create_identity(conn, account(email), hash).unwrap()
    }

    #[test]
    fn create_stores_hash_and_normalizes() {
        let conn = open_memory_database().unwrap();
        let identities = store();
        let user = create(&identities, &conn, " Doc@X.com");
        assert!(!user.id.is_empty());
        assert_eq!(user.user_name, "Doc@X.com");

        let by_email = identities.find_by_email(&conn, "doc@x.COM").unwrap().unwrap();
        let by_name = identities.find_by_username(&conn, " DOC@x.com ").unwrap().unwrap();
        assert_eq!(by_email.id, user.id);
        assert_eq!(by_name.id, user.id);

        let hash = by_name.password_hash.unwrap();
        assert!(hash.starts_with("pbkdf2-sha256$"));
        assert!(identities.hasher().verify("Secret1!", &hash));
        assert!(!identities.hasher().verify("Secret2!", &hash));
    }

    #[test]
    fn identity_errors_list_every_failure() {
        let conn = open_memory_database().unwrap();
        let identities = store();
        let errors = identities
            .identity_errors(
                &conn,
                &ApplicationUser {
                    name: "  ".into(),
                    ..account("not-an-email")
                },
            )
            .unwrap();
        assert_eq!(
            errors,
            vec![
                IdentityError::InvalidName(MAX_NAME_LENGTH),
                IdentityError::InvalidEmail("not-an-email".into()),
            ]
        );
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let conn = open_memory_database().unwrap();
        let identities = store();
        create(&identities, &conn, "doc@x.com");
        let err = identities
            .create_identity(&conn, account("DOC@x.com"), "unused".into())
            .unwrap_err();
        let RegistrationError::Rejected(errors) = err else {
            panic!("expected rejection");
        };
        assert!(errors.contains(&IdentityError::DuplicateEmail("DOC@x.com".into())));
        assert!(errors.contains(&IdentityError::DuplicateUserName("DOC@x.com".into())));
    }

    #[test]
    fn update_profile_keeps_credential() {
        let conn = open_memory_database().unwrap();
        let identities = store();
        let user = create(&identities, &conn, "doc@x.com");
        let edited = ApplicationUser {
            user_name: "house@x.com".into(),
            email: "house@x.com".into(),
            about: Some("Diagnostics".into()),
            ..user.clone()
        };
        assert!(identities.update_profile(&conn, &edited).unwrap());

        let stored = identities.find_by_email(&conn, "HOUSE@x.com").unwrap().unwrap();
        assert_eq!(stored.about.as_deref(), Some("Diagnostics"));
        assert_eq!(stored.password_hash, user.password_hash);
        assert!(identities.find_by_email(&conn, "doc@x.com").unwrap().is_none());

        let ghost = ApplicationUser {
            id: "missing".into(),
            ..edited
        };
        assert!(!identities.update_profile(&conn, &ghost).unwrap());
    }

    #[test]
    fn update_profile_to_taken_email_is_a_constraint_violation() {
        let conn = open_memory_database().unwrap();
        let identities = store();
        let first = create(&identities, &conn, "a@x.com");
        create(&identities, &conn, "b@x.com");
        let clash = ApplicationUser {
            user_name: "b@x.com".into(),
            email: "b@x.com".into(),
            ..first
        };
        let err = identities.update_profile(&conn, &clash).unwrap_err();
        assert!(matches!(err, DatabaseError::ConstraintViolation(_)));
    }

    #[test]
    fn role_lookup_is_case_insensitive_and_canonical() {
        let conn = open_memory_database().unwrap();
        let identities = store();
        let user = create(&identities, &conn, "doc@x.com");
        assert!(identities.role_exists(&conn, "Doctor").unwrap());
        assert!(!identities.role_exists(&conn, "surgeon").unwrap());

        assert!(identities.add_role_membership(&conn, &user.id, "DOCTOR").unwrap());
        // Granting twice keeps a single membership.
        assert!(identities.add_role_membership(&conn, &user.id, "doctor").unwrap());
        assert_eq!(identities.roles_of(&conn, &user.id).unwrap(), vec!["doctor"]);
        assert!(!identities.add_role_membership(&conn, &user.id, "surgeon").unwrap());
    }

    #[test]
    fn replace_roles_leaves_exactly_one() {
        let conn = open_memory_database().unwrap();
        let identities = store();
        let user = create(&identities, &conn, "doc@x.com");
        identities.add_role_membership(&conn, &user.id, "patient").unwrap();
        identities.add_role_membership(&conn, &user.id, "employee").unwrap();

        assert!(identities.replace_roles(&conn, &user.id, "Nurse").unwrap());
        assert_eq!(identities.roles_of(&conn, &user.id).unwrap(), vec!["nurse"]);

        // Unknown role: nothing is touched.
        assert!(!identities.replace_roles(&conn, &user.id, "surgeon").unwrap());
        assert_eq!(identities.roles_of(&conn, &user.id).unwrap(), vec!["nurse"]);
    }

    #[test]
    fn replace_roles_rolls_back_with_the_enclosing_transaction() {
        let mut conn = open_memory_database().unwrap();
        let identities = store();
        let user = create(&identities, &conn, "doc@x.com");
        identities.add_role_membership(&conn, &user.id, "patient").unwrap();
        {
            let tx = conn.transaction().unwrap();
            assert!(identities.replace_roles(&tx, &user.id, "admin").unwrap());
        }
        assert_eq!(identities.roles_of(&conn, &user.id).unwrap(), vec!["patient"]);
    }
}
