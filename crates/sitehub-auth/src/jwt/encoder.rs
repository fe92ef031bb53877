//! JWT token creation with configurable signing and TTL.

use chrono::{DateTime, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

use sitehub_core::config::auth::AuthConfig;
use sitehub_core::error::AppError;
use sitehub_entity::user::UserRole;

use super::claims::Claims;

/// Creates signed JWT tokens.
#[derive(Clone)]
pub struct JwtEncoder {
    /// HMAC secret key for signing.
    encoding_key: EncodingKey,
    /// Token TTL in hours.
    ttl_hours: i64,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("ttl_hours", &self.ttl_hours)
            .finish()
    }
}

impl JwtEncoder {
    /// Creates a new encoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            ttl_hours: config.jwt_ttl_hours as i64,
        }
    }

    /// Generates a signed token for the given user.
    pub fn generate_token(
        &self,
        user_id: Uuid,
        role: UserRole,
        username: &str,
    ) -> Result<(String, DateTime<Utc>), AppError> {
        let now = Utc::now();
        let exp = now + chrono::Duration::hours(self.ttl_hours);

        let claims = Claims {
            sub: user_id,
            role,
            username: username.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode token: {e}")))?;

        Ok((token, exp))
    }
}
