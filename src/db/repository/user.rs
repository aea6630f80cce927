use rusqlite::types::Value;
use rusqlite::Row;
use uuid::Uuid;

use super::{sql_value, Entity};
use crate::db::query::NoRelation;
use crate::models::ApplicationUser;

// The credential hash is owned by the identity store and is neither read
// nor written through the repository.
entity_columns!(UserColumn {
    Id => "id",
    UserName => "user_name",
    NormalizedUserName => "normalized_user_name",
    Email => "email",
    NormalizedEmail => "normalized_email",
    Name => "name",
    About => "about",
    Details => "details",
    PhoneNumber => "phone_number",
});

impl Entity for ApplicationUser {
    type Key = String;
    type Column = UserColumn;
    type Relation = NoRelation;

    const NAME: &'static str = "ApplicationUser";
    const TABLE: &'static str = "application_users";

    fn key(&self) -> Option<String> {
        (!self.id.is_empty()).then(|| self.id.clone())
    }

    fn assign_key(&mut self) {
        if self.id.is_empty() {
            self.id = Uuid::new_v4().to_string();
        }
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_name: row.get("user_name")?,
            email: row.get("email")?,
            name: row.get("name")?,
            about: row.get("about")?,
            details: row.get("details")?,
            phone_number: row.get("phone_number")?,
            password_hash: None,
        })
    }

    fn values(&self) -> rusqlite::Result<Vec<(&'static str, Value)>> {
        Ok(vec![
            ("user_name", sql_value(&self.user_name)?),
            ("normalized_user_name", Value::Text(Self::normalize(&self.user_name))),
            ("email", sql_value(&self.email)?),
            ("normalized_email", Value::Text(Self::normalize(&self.email))),
            ("name", sql_value(&self.name)?),
            ("about", sql_value(&self.about)?),
            ("details", sql_value(&self.details)?),
            ("phone_number", sql_value(&self.phone_number)?),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::query::{Filter, Query};
    use crate::db::repository::{Repository, SqlRepository};
    use crate::db::Store;

    fn user(email: &str) -> ApplicationUser {
        ApplicationUser {
            user_name: email.into(),
            email: email.into(),
            name: "Grace".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn add_generates_uuid_and_normalizes() {
        let store = Store::open_in_memory().unwrap();
        let mut repo = SqlRepository::<ApplicationUser>::new(store);
        repo.add(user("Grace@Example.com"));
        let id = repo.save().await.unwrap().inserted.remove(0);
        assert!(Uuid::parse_str(&id).is_ok());

        let found = repo
            .get(Query::matching(Filter::eq(
                UserColumn::NormalizedEmail,
                "GRACE@EXAMPLE.COM".to_string(),
            )))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, id);
        assert_eq!(found.email, "Grace@Example.com");
        assert!(found.password_hash.is_none());
    }

    #[tokio::test]
    async fn profile_update_keeps_credential() {
        let store = Store::open_in_memory().unwrap();
        let mut repo = SqlRepository::<ApplicationUser>::new(store.clone());
        repo.add(user("grace@example.com"));
        let id = repo.save().await.unwrap().inserted.remove(0);
        let hash_id = id.clone();
        store
            .call(move |conn| {
                conn.execute(
                    "UPDATE application_users SET password_hash = 'h' WHERE id = ?1",
                    [&hash_id],
                )?;
                Ok(())
            })
            .await
            .unwrap();

        let mut row = repo.get(Query::by_key(id.clone())).await.unwrap().unwrap();
        row.about = Some("Surgeon".into());
        repo.update(row);
        repo.save().await.unwrap();

        let hash: Option<String> = store
            .call(move |conn| {
                Ok(conn.query_row(
                    "SELECT password_hash FROM application_users WHERE id = ?1",
                    [&id],
                    |row| row.get(0),
                )?)
            })
            .await
            .unwrap();
        assert_eq!(hash.as_deref(), Some("h"));
    }

    #[tokio::test]
    async fn duplicate_user_name_is_a_constraint_violation() {
        let store = Store::open_in_memory().unwrap();
        let mut repo = SqlRepository::<ApplicationUser>::new(store);
        repo.add(user("grace@example.com"));
        repo.add(user("GRACE@example.com"));
        let err = repo.save().await.unwrap_err();
        assert!(matches!(err, crate::db::DatabaseError::ConstraintViolation(_)));
    }
}
