//! Shared types for the API layer.

use serde::{Deserialize, Serialize};

use crate::auth::{AuthService, TokenClaims};
use crate::db::Store;

// ═══════════════════════════════════════════════════════════
// API context: shared state for the router
// ═══════════════════════════════════════════════════════════

/// Shared context for all API routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub store: Store,
    pub auth: AuthService,
}

impl ApiContext {
    pub fn new(store: Store, auth: AuthService) -> Self {
        Self { store, auth }
    }
}

// ═══════════════════════════════════════════════════════════
// Caller context: injected by auth middleware
// ═══════════════════════════════════════════════════════════

/// Authenticated caller, injected into request extensions by the auth
/// middleware after the bearer token verifies.
#[derive(Debug, Clone)]
pub struct CallerContext {
    pub user_id: String,
    pub email: String,
    pub roles: Vec<String>,
}

impl From<TokenClaims> for CallerContext {
    fn from(claims: TokenClaims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
            roles: claims.role,
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Request / response shapes
// ═══════════════════════════════════════════════════════════

/// Plain acknowledgement body.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageBody {
    pub message: String,
}

impl MessageBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// `?include=User,Test` on read endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct IncludeParams {
    #[serde(default)]
    pub include: Option<String>,
}
