//! # sitehub-service
//!
//! Business logic for SiteHub. Services depend only on the persistence
//! ports from `sitehub-entity` plus the filesystem layer from
//! `sitehub-storage`; the HTTP crate wires in the PostgreSQL
//! implementations.

pub mod access;
pub mod context;
pub mod preview;
pub mod project;
pub mod publication;
pub mod user;

#[cfg(test)]
pub(crate) mod testing;
