//! JWT claims structure.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sitehub_entity::user::UserRole;

/// JWT claims payload embedded in every token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject — the user ID.
    pub sub: Uuid,
    /// User role at the time of token issuance.
    pub role: UserRole,
    /// Username for convenience.
    pub username: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// JWT ID.
    pub jti: Uuid,
}

impl Claims {
    /// Returns the user ID from the subject claim.
    pub fn user_id(&self) -> Uuid {
        self.sub
    }
}
