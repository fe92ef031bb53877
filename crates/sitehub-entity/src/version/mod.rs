//! Site version domain entities.

pub mod model;

pub use model::{CreateVersion, SiteVersion};
