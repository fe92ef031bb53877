//! JWT token validation.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

use sitehub_core::config::auth::AuthConfig;
use sitehub_core::error::AppError;

use super::claims::Claims;

/// Validates JWT tokens.
#[derive(Clone)]
pub struct JwtDecoder {
    /// HMAC secret key for verification.
    decoding_key: DecodingKey,
    /// Validation configuration.
    validation: Validation,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 5; // seconds of clock-skew tolerance

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Decodes and validates a token string.
    pub fn decode(&self, token: &str) -> Result<Claims, AppError> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                        AppError::unauthorized("Token has expired")
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidToken => {
                        AppError::unauthorized("Invalid token format")
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                        AppError::unauthorized("Invalid token signature")
                    }
                    _ => AppError::unauthorized(format!("Token validation failed: {e}")),
                }
            })?;

        Ok(token_data.claims)
    }
}
