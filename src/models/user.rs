use serde::{Deserialize, Serialize};

/// Account record backing both the identity store and the user repository.
///
/// `user_name` mirrors the email at registration. The credential hash is
/// never serialized.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ApplicationUser {
    #[serde(default)]
    pub id: String,
    pub user_name: String,
    pub email: String,
    pub name: String,
    pub about: Option<String>,
    pub details: Option<String>,
    pub phone_number: Option<String>,
    #[serde(skip)]
    pub password_hash: Option<String>,
}

impl ApplicationUser {
    /// Case-insensitive lookup key for user names and emails.
    pub fn normalize(value: &str) -> String {
        value.trim().to_uppercase()
    }
}
