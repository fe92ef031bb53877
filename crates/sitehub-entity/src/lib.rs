//! # sitehub-entity
//!
//! Domain entity models for SiteHub. Every struct in this crate represents
//! a database table row or a domain value object. All entities derive
//! `Debug`, `Clone`, `Serialize`, `Deserialize`, and database entities
//! additionally derive `sqlx::FromRow`.
//!
//! The [`store`] module defines the persistence-port traits the service
//! layer depends on; `sitehub-database` provides the PostgreSQL
//! implementations.

pub mod permission;
pub mod project;
pub mod store;
pub mod user;
pub mod version;
