//! Site storage configuration.

use serde::{Deserialize, Serialize};

/// Filesystem layout and upload limits for site content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory for extracted site versions.
    #[serde(default = "default_site_root")]
    pub site_root: String,
    /// Spool directory for uploaded archives awaiting extraction.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
    /// Maximum upload size in bytes (default 100 MB).
    #[serde(default = "default_max_upload")]
    pub max_upload_size_bytes: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            site_root: default_site_root(),
            upload_dir: default_upload_dir(),
            max_upload_size_bytes: default_max_upload(),
        }
    }
}

fn default_site_root() -> String {
    "./data/sites".to_string()
}

fn default_upload_dir() -> String {
    "./data/uploads".to_string()
}

fn default_max_upload() -> u64 {
    104_857_600 // 100 MB
}
