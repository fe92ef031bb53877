//! Entry-point synthesis for extracted site versions.
//!
//! Guarantees every extracted version has a browsable `index.html`. Runs
//! once after extraction and is idempotent: an existing `index.html` is
//! never touched.

use std::path::Path;

use tokio::fs;
use tracing::{debug, warn};

use sitehub_core::result::AppResult;

/// Ensure `dir` contains an `index.html`.
///
/// Missing entry points are synthesized: a redirect stub pointing at the
/// first top-level HTML file if one exists, otherwise a placeholder page.
/// This step never fails the upload; any I/O error is logged and
/// swallowed.
pub async fn ensure_entry_point(dir: &Path) {
    if let Err(e) = synthesize_if_missing(dir).await {
        warn!(
            dir = %dir.display(),
            error = %e,
            "Entry point synthesis failed"
        );
    }
}

async fn synthesize_if_missing(dir: &Path) -> AppResult<()> {
    let index_path = dir.join("index.html");
    if fs::try_exists(&index_path).await? {
        return Ok(());
    }

    let content = match first_html_child(dir).await? {
        Some(target) => {
            debug!(dir = %dir.display(), target = %target, "Synthesizing redirect entry point");
            redirect_stub(&target)
        }
        None => {
            debug!(dir = %dir.display(), "Synthesizing placeholder entry point");
            PLACEHOLDER_PAGE.to_string()
        }
    };

    fs::write(&index_path, content).await?;
    Ok(())
}

/// Find the first immediate-child HTML file in directory-listing order.
async fn first_html_child(dir: &Path) -> AppResult<Option<String>> {
    let mut entries = fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if name.to_lowercase().ends_with(".html") {
            return Ok(Some(name));
        }
    }
    Ok(None)
}

/// Client-side redirect stub (meta refresh plus script fallback).
fn redirect_stub(target: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta http-equiv="refresh" content="0; url=./{target}">
<title>Redirecting</title>
</head>
<body>
<script>window.location.replace("./{target}");</script>
<p>Redirecting to <a href="./{target}">{target}</a></p>
</body>
</html>
"#
    )
}

const PLACEHOLDER_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>SiteHub</title>
</head>
<body>
<h1>No HTML content</h1>
<p>No HTML content was found in this version.</p>
</body>
</html>
"#;
