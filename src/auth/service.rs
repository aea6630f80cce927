use std::sync::Arc;

use super::identity::IdentityStore;
use super::models::{LoginRequest, LoginResponse, RegistrationRequest, UserSummary};
use super::password::password_errors;
use super::token::TokenGenerator;
use super::{AuthError, RegistrationError};
use crate::db::{DatabaseError, Store};
use crate::models::ApplicationUser;

/// Result of a profile edit that did not fail in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileUpdate {
    Updated,
    UnknownUser,
    /// The requested role does not exist; nothing was written.
    UnknownRole,
}

/// Registration, login and role membership over an identity store.
///
/// Expected outcomes (bad credentials, unknown email or role) come back as
/// values; only store failures are errors. Credentials are derived on the
/// blocking pool without holding the store, so a login never stalls other
/// requests for the length of a PBKDF2 run.
#[derive(Clone)]
pub struct AuthService {
    store: Store,
    identities: Arc<dyn IdentityStore>,
    tokens: TokenGenerator,
}

/// Run a credential derivation on the blocking pool.
async fn derive<R, F>(f: F) -> Result<R, DatabaseError>
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| DatabaseError::TaskJoin(e.to_string()))
}

impl AuthService {
    pub fn new(store: Store, identities: Arc<dyn IdentityStore>, tokens: TokenGenerator) -> Self {
        Self {
            store,
            identities,
            tokens,
        }
    }

    pub fn tokens(&self) -> &TokenGenerator {
        &self.tokens
    }

    /// Create an identity and grant the requested role.
    ///
    /// Every rule violation is reported at once. An unknown role does not
    /// fail the registration; the identity is created without it.
    pub async fn register(
        &self,
        request: RegistrationRequest,
    ) -> Result<UserSummary, RegistrationError> {
        let role = request.role.clone();
        match self.create(request).await {
            Ok((user, granted)) => {
                if !granted {
                    tracing::warn!(user_id = %user.id, role = ?role, "Registration role does not exist");
                }
                tracing::info!(user_id = %user.id, "Identity registered");
                Ok(UserSummary::from(&user))
            }
            Err(RegistrationError::Internal(e)) => {
                tracing::error!(error = %e, "Registration failed");
                Err(RegistrationError::Internal(e))
            }
            Err(rejected) => {
                tracing::warn!(reasons = rejected.messages().len(), "Registration rejected");
                Err(rejected)
            }
        }
    }

    async fn create(
        &self,
        request: RegistrationRequest,
    ) -> Result<(ApplicationUser, bool), RegistrationError> {
        let RegistrationRequest {
            email,
            name,
            phone_number,
            about,
            details,
            password,
            role,
        } = request;
        let email = email.trim().to_string();
        let user = ApplicationUser {
            user_name: email.clone(),
            email,
            name,
            about,
            details,
            phone_number,
            ..Default::default()
        };

        let identities = Arc::clone(&self.identities);
        let candidate = user.clone();
        let mut errors = self
            .store
            .call(move |conn| identities.identity_errors(conn, &candidate))
            .await?;
        errors.extend(password_errors(&password));
        if !errors.is_empty() {
            return Err(RegistrationError::Rejected(errors));
        }

        let hasher = self.identities.hasher();
        let hash = derive(move || hasher.hash(&password)).await?;

        let identities = Arc::clone(&self.identities);
        self.store
            .call(move |conn| {
                let tx = conn.transaction()?;
                let user = match identities.create_identity(&tx, user, hash) {
                    Ok(user) => user,
                    Err(RegistrationError::Internal(e)) => return Err(e),
                    Err(rejected) => return Ok(Err(rejected)),
                };
                let granted = match role.as_deref().map(str::trim) {
                    Some(role) if !role.is_empty() => {
                        identities.add_role_membership(&tx, &user.id, role)?
                    }
                    _ => true,
                };
                tx.commit()?;
                Ok(Ok((user, granted)))
            })
            .await?
    }

    /// Authenticate by user name and password.
    ///
    /// Unknown user and wrong password produce the same empty response and
    /// cost one derivation each.
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AuthError> {
        let identities = Arc::clone(&self.identities);
        let LoginRequest { email, password } = request;
        let found = self
            .store
            .call(move |conn| {
                let Some(user) = identities.find_by_username(conn, &email)? else {
                    return Ok(None);
                };
                let roles = identities.roles_of(conn, &user.id)?;
                Ok(Some((user, roles)))
            })
            .await?;

        let hasher = self.identities.hasher();
        let stored = found.as_ref().and_then(|(user, _)| user.password_hash.clone());
        let verified = derive(move || match stored {
            Some(hash) => hasher.verify(&password, &hash),
            None => {
                hasher.dummy_verify(&password);
                false
            }
        })
        .await?;

        let Some((user, roles)) = found.filter(|_| verified) else {
            tracing::warn!("Login rejected");
            return Ok(LoginResponse::rejected());
        };
        let token = self.tokens.generate_token(&user, &roles)?;
        tracing::info!(user_id = %user.id, roles = roles.len(), "Login succeeded");
        Ok(LoginResponse {
            user: Some(UserSummary::from(&user)),
            token,
        })
    }

    /// Grant `role` to the identity with `email`, keeping existing roles.
    ///
    /// `false` when the email or the role is unknown.
    pub async fn assign_role(&self, email: &str, role: &str) -> Result<bool, AuthError> {
        let identities = Arc::clone(&self.identities);
        let (lookup, wanted) = (email.to_string(), role.to_string());
        let assigned = self
            .store
            .call(move |conn| {
                let Some(user) = identities.find_by_email(conn, &lookup)? else {
                    return Ok(false);
                };
                if !identities.role_exists(conn, &wanted)? {
                    return Ok(false);
                }
                identities.add_role_membership(conn, &user.id, &wanted)
            })
            .await?;
        tracing::info!(role = %role, assigned, "Role assignment");
        Ok(assigned)
    }

    /// Overwrite the profile of `user.id` and, when `role` is given, make it
    /// the only role held.
    ///
    /// Both writes share one transaction: a rejected profile (say, an email
    /// already taken) leaves the roles as they were, and an unknown role
    /// leaves the profile as it was.
    pub async fn update_profile(
        &self,
        user: ApplicationUser,
        role: Option<String>,
    ) -> Result<ProfileUpdate, AuthError> {
        let identities = Arc::clone(&self.identities);
        let user_id = user.id.clone();
        let outcome = self
            .store
            .call(move |conn| {
                let tx = conn.transaction()?;
                if identities.find_by_id(&tx, &user.id)?.is_none() {
                    return Ok(ProfileUpdate::UnknownUser);
                }
                if let Some(role) = role.as_deref() {
                    if !identities.replace_roles(&tx, &user.id, role)? {
                        return Ok(ProfileUpdate::UnknownRole);
                    }
                }
                identities.update_profile(&tx, &user)?;
                tx.commit()?;
                Ok(ProfileUpdate::Updated)
            })
            .await?;
        tracing::info!(user_id = %user_id, outcome = ?outcome, "Profile update");
        Ok(outcome)
    }

    pub async fn roles_of(&self, user_id: &str) -> Result<Vec<String>, AuthError> {
        let identities = Arc::clone(&self.identities);
        let user_id = user_id.to_string();
        let roles = self
            .store
            .call(move |conn| identities.roles_of(conn, &user_id))
            .await?;
        Ok(roles)
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::auth::identity::SqliteIdentityStore;
    use crate::auth::password::PasswordHasher;
    use crate::auth::token::JwtOptions;

    fn service() -> AuthService {
        service_with(PasswordHasher::new(1_000))
    }

    fn service_with(hasher: PasswordHasher) -> AuthService {
        let store = Store::open_in_memory().unwrap();
        let identities = Arc::new(SqliteIdentityStore::new(hasher));
        let tokens = TokenGenerator::new(
            JwtOptions::new(
                "test-signing-key-0123456789abcdef",
                "hospital-api",
                "hospital-clients",
            )
            .unwrap(),
        );
        AuthService::new(store, identities, tokens)
    }

    fn registration(email: &str, password: &str) -> RegistrationRequest {
        RegistrationRequest {
            email: email.into(),
            name: "Doc".into(),
            phone_number: Some("555-0100".into()),
            about: None,
            details: None,
            password: password.into(),
            role: None,
        }
    }

    fn profile(id: &str, email: &str) -> ApplicationUser {
        ApplicationUser {
            id: id.into(),
            user_name: email.into(),
            email: email.into(),
            name: "Doc".into(),
            ..Default::default()
        }
    }

    fn login(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn register_assign_login_carries_role_claim() {
        let auth = service();
        let user = auth
            .register(registration("doc@x.com", "Secret1!"))
            .await
            .unwrap();
        assert!(auth.assign_role("doc@x.com", "doctor").await.unwrap());

        let response = auth.login(login("doc@x.com", "Secret1!")).await.unwrap();
        assert!(response.is_authenticated());
        assert_eq!(response.user.as_ref().unwrap().id, user.id);

        let claims = auth.tokens().verify(&response.token).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, "doc@x.com");
        assert_eq!(claims.name, "Doc");
        assert_eq!(claims.role, vec!["doctor"]);
    }

    #[tokio::test]
    async fn assign_role_misses_return_false() {
        let auth = service();
        auth.register(registration("doc@x.com", "Secret1!"))
            .await
            .unwrap();
        assert!(!auth.assign_role("ghost@x.com", "doctor").await.unwrap());
        assert!(!auth.assign_role("doc@x.com", "surgeon").await.unwrap());
    }

    #[tokio::test]
    async fn assign_role_matches_email_case_insensitively_and_is_additive() {
        let auth = service();
        let user = auth
            .register(registration("doc@x.com", "Secret1!"))
            .await
            .unwrap();
        assert!(auth.assign_role("DOC@X.COM", "patient").await.unwrap());
        assert!(auth.assign_role("doc@x.com", "Doctor").await.unwrap());
        let mut roles = auth.roles_of(&user.id).await.unwrap();
        roles.sort();
        assert_eq!(roles, vec!["doctor", "patient"]);
    }

    #[tokio::test]
    async fn update_profile_replaces_role_and_fields() {
        let auth = service();
        let user = auth
            .register(registration("doc@x.com", "Secret1!"))
            .await
            .unwrap();
        auth.assign_role("doc@x.com", "patient").await.unwrap();
        auth.assign_role("doc@x.com", "employee").await.unwrap();

        let outcome = auth
            .update_profile(profile(&user.id, "house@x.com"), Some("Nurse".into()))
            .await
            .unwrap();
        assert_eq!(outcome, ProfileUpdate::Updated);
        assert_eq!(auth.roles_of(&user.id).await.unwrap(), vec!["nurse"]);

        // The credential survives the edit and the new email logs in.
        let response = auth.login(login("house@x.com", "Secret1!")).await.unwrap();
        assert!(response.is_authenticated());
    }

    #[tokio::test]
    async fn update_profile_misses_write_nothing() {
        let auth = service();
        let user = auth
            .register(registration("doc@x.com", "Secret1!"))
            .await
            .unwrap();
        auth.assign_role("doc@x.com", "patient").await.unwrap();

        let outcome = auth
            .update_profile(profile(&user.id, "house@x.com"), Some("surgeon".into()))
            .await
            .unwrap();
        assert_eq!(outcome, ProfileUpdate::UnknownRole);
        assert_eq!(auth.roles_of(&user.id).await.unwrap(), vec!["patient"]);
        assert!(auth.login(login("doc@x.com", "Secret1!")).await.unwrap().is_authenticated());

        let outcome = auth
            .update_profile(profile("missing", "ghost@x.com"), None)
            .await
            .unwrap();
        assert_eq!(outcome, ProfileUpdate::UnknownUser);
    }

    #[tokio::test]
    async fn rejected_profile_keeps_previous_roles() {
        let auth = service();
        let first = auth
            .register(RegistrationRequest {
                role: Some("patient".into()),
                ..registration("a@x.com", "Secret1!")
            })
            .await
            .unwrap();
        auth.register(registration("b@x.com", "Secret1!"))
            .await
            .unwrap();

        let err = auth
            .update_profile(profile(&first.id, "b@x.com"), Some("admin".into()))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AuthError::Database(DatabaseError::ConstraintViolation(_))
        ));
        assert_eq!(auth.roles_of(&first.id).await.unwrap(), vec!["patient"]);
    }

    #[tokio::test]
    async fn failed_logins_are_indistinguishable() {
        let auth = service();
        auth.register(registration("doc@x.com", "Secret1!"))
            .await
            .unwrap();
        let wrong_password = auth.login(login("doc@x.com", "Wrong1!!")).await.unwrap();
        let unknown_user = auth.login(login("who@x.com", "Secret1!")).await.unwrap();
        assert_eq!(wrong_password, unknown_user);
        assert!(wrong_password.user.is_none());
        assert!(wrong_password.token.is_empty());
    }

    #[tokio::test]
    async fn login_matches_user_name_case_insensitively() {
        let auth = service();
        auth.register(registration("doc@x.com", "Secret1!"))
            .await
            .unwrap();
        let response = auth.login(login("Doc@X.com", "Secret1!")).await.unwrap();
        assert!(response.is_authenticated());
    }

    #[tokio::test]
    async fn register_with_role_grants_it() {
        let auth = service();
        let user = auth
            .register(RegistrationRequest {
                role: Some("Nurse".into()),
                ..registration("nia@x.com", "Secret1!")
            })
            .await
            .unwrap();
        assert_eq!(auth.roles_of(&user.id).await.unwrap(), vec!["nurse"]);
    }

    #[tokio::test]
    async fn rejected_registration_surfaces_every_reason() {
        let auth = service();
        let err = auth
            .register(registration("doc@x.com", "secret"))
            .await
            .unwrap_err();
        assert_eq!(
            err.first_message(),
            "Passwords must have at least one digit ('0'-'9')."
        );
        assert_eq!(err.messages().len(), 3);
        assert!(auth.login(login("doc@x.com", "secret")).await.unwrap().user.is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn login_leaves_the_store_free_while_deriving() {
        let auth = service_with(PasswordHasher::default());
        auth.register(registration("doc@x.com", "Secret1!"))
            .await
            .unwrap();

        let started = Instant::now();
        let pending = tokio::spawn({
            let auth = auth.clone();
            async move { auth.login(login("doc@x.com", "Secret1!")).await }
        });
        // Give the login time to reach its derivation.
        tokio::time::sleep(Duration::from_millis(50)).await;

        let query_started = Instant::now();
        let one: i64 = auth
            .store
            .call(|conn| Ok(conn.query_row("SELECT 1", [], |row| row.get(0))?))
            .await
            .unwrap();
        let query = query_started.elapsed();
        assert_eq!(one, 1);

        let response = pending.await.unwrap().unwrap();
        let login = started.elapsed();
        assert!(response.is_authenticated());
        assert!(
            query * 4 < login,
            "store call took {query:?} while a {login:?} login was running"
        );
    }

    #[tokio::test]
    async fn store_failure_is_an_internal_error() {
        let auth = service();
        auth.store
            .call(|conn| {
                conn.execute_batch("DROP TABLE user_roles")?;
                Ok(())
            })
            .await
            .unwrap();
        let err = auth
            .register(RegistrationRequest {
                role: Some("doctor".into()),
                ..registration("doc@x.com", "Secret1!")
            })
            .await
            .unwrap_err();
        assert!(matches!(err, RegistrationError::Internal(_)));
        assert_eq!(err.first_message(), "Error encountered");
        // Rolled back: the identity was not kept.
        let response = auth.login(login("doc@x.com", "Secret1!")).await.unwrap();
        assert!(response.user.is_none());
    }
}
