use serde::{Deserialize, Serialize};

use crate::models::ApplicationUser;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub about: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    pub password: String,
    /// Role to grant after the identity is created.
    #[serde(default)]
    pub role: Option<String>,
}

/// `email` is matched against user names (which mirror the email).
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(alias = "userName")]
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone_number: Option<String>,
}

impl From<&ApplicationUser> for UserSummary {
    fn from(user: &ApplicationUser) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            phone_number: user.phone_number.clone(),
        }
    }
}

/// Login outcome. A failed login carries no user and an empty token,
/// whatever the cause.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user: Option<UserSummary>,
    pub token: String,
}

impl LoginResponse {
    pub fn rejected() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() && !self.token.is_empty()
    }
}
