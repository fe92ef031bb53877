//! # sitehub-auth
//!
//! The authorization oracle for SiteHub: JWT token issuing and validation
//! plus Argon2id password hashing. Validating a bearer token yields the
//! caller's `{subject, role}` pair; everything downstream treats that as
//! opaque.

pub mod jwt;
pub mod password;

pub use jwt::claims::Claims;
pub use jwt::decoder::JwtDecoder;
pub use jwt::encoder::JwtEncoder;
pub use password::PasswordHasher;
