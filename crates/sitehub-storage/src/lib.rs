//! # sitehub-storage
//!
//! Filesystem side of the publication pipeline: safe zip extraction,
//! entry-point synthesis for extracted sites, the on-disk version layout,
//! and content-type inference for serving.

pub mod archive;
pub mod entrypoint;
pub mod layout;
pub mod mime;
pub mod paths;

pub use archive::extract_archive;
pub use entrypoint::ensure_entry_point;
pub use layout::SiteLayout;
