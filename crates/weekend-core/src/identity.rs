use crate::error::{Result, WeekendError};
use crate::types::Role;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// The authenticated caller of an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    pub role: Role,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub display_name: Option<String>,
    pub role: Role,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Resolves a session token to the user behind it.
pub trait IdentityProvider: Send + Sync {
    fn resolve(&self, token: &str) -> Result<Option<Identity>>;
}

/// Gate for mutations: no session and non-admin sessions fail differently.
pub fn require_admin(identity: Option<&Identity>) -> Result<&Identity> {
    let identity = identity.ok_or(WeekendError::NotAuthenticated)?;
    if !identity.is_admin() {
        return Err(WeekendError::NotAuthorized);
    }
    Ok(identity)
}

/// 32 random bytes, base64url without padding.
pub fn generate_session_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Sessions are stored by digest so a leaked database does not leak tokens.
pub fn token_digest(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    URL_SAFE_NO_PAD.encode(digest)
}
