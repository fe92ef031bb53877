//! Project permission domain entities.

pub mod model;

pub use model::{PermissionLevel, ProjectPermission};
