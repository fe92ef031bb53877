//! Safe zip extraction for uploaded site archives.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;
use zip::ZipArchive;

use sitehub_core::error::{AppError, ErrorKind};
use sitehub_core::result::AppResult;

use crate::paths::sanitize_relative;

/// Extract a zip archive into `dest_root`, preserving relative paths.
///
/// Runs the blocking zip walk on the blocking thread pool. Extraction is
/// sequential per entry and fail-closed: the first unsafe entry or I/O
/// error aborts the whole run. The caller is responsible for discarding
/// the partially populated destination on failure.
pub async fn extract_archive(archive_path: &Path, dest_root: &Path) -> AppResult<()> {
    let archive_path = archive_path.to_path_buf();
    let dest_root = dest_root.to_path_buf();

    tokio::task::spawn_blocking(move || extract_blocking(&archive_path, &dest_root))
        .await
        .map_err(|e| AppError::internal(format!("Extraction task panicked: {e}")))?
}

fn extract_blocking(archive_path: &Path, dest_root: &Path) -> AppResult<()> {
    let file = fs::File::open(archive_path).map_err(|e| {
        AppError::with_source(ErrorKind::Extraction, "Failed to open uploaded archive", e)
    })?;

    let mut archive = ZipArchive::new(file).map_err(|e| {
        AppError::with_source(
            ErrorKind::Extraction,
            format!("Failed to read archive: {e}"),
            e,
        )
    })?;

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).map_err(|e| {
            AppError::with_source(
                ErrorKind::Extraction,
                format!("Failed to read archive entry {index}: {e}"),
                e,
            )
        })?;

        let out_path = resolve_entry_path(dest_root, entry.name())?;

        if entry.name().ends_with('/') {
            fs::create_dir_all(&out_path).map_err(|e| {
                AppError::with_source(
                    ErrorKind::Extraction,
                    format!("Failed to create directory {}", out_path.display()),
                    e,
                )
            })?;
        } else {
            if let Some(parent) = out_path.parent() {
                fs::create_dir_all(parent).map_err(|e| {
                    AppError::with_source(
                        ErrorKind::Extraction,
                        format!("Failed to create directory {}", parent.display()),
                        e,
                    )
                })?;
            }

            let mut out_file = fs::File::create(&out_path).map_err(|e| {
                AppError::with_source(
                    ErrorKind::Extraction,
                    format!("Failed to create file {}", out_path.display()),
                    e,
                )
            })?;

            io::copy(&mut entry, &mut out_file).map_err(|e| {
                AppError::with_source(
                    ErrorKind::Extraction,
                    format!("Failed to write {}", out_path.display()),
                    e,
                )
            })?;
        }
    }

    debug!(
        archive = %archive_path.display(),
        dest = %dest_root.display(),
        "Archive extracted"
    );
    Ok(())
}

/// Resolve an entry name to its output path, enforcing containment.
fn resolve_entry_path(dest_root: &Path, entry_name: &str) -> AppResult<PathBuf> {
    let clean = sanitize_relative(entry_name).ok_or_else(|| {
        AppError::unsafe_archive_entry(format!(
            "Archive entry '{entry_name}' escapes the extraction root"
        ))
    })?;

    let out_path = dest_root.join(clean);
    if !out_path.starts_with(dest_root) {
        return Err(AppError::unsafe_archive_entry(format!(
            "Archive entry '{entry_name}' escapes the extraction root"
        )));
    }
    Ok(out_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitehub_core::error::ErrorKind;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn build_zip(entries: &[(&str, Option<&[u8]>)]) -> Vec<u8> {
        let mut cursor = io::Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut cursor);
            let options = SimpleFileOptions::default();
            for (name, content) in entries {
                match content {
                    Some(bytes) => {
                        writer.start_file(name.to_string(), options).unwrap();
                        writer.write_all(bytes).unwrap();
                    }
                    None => {
                        writer.add_directory(name.to_string(), options).unwrap();
                    }
                }
            }
            writer.finish().unwrap();
        }
        cursor.into_inner()
    }

    async fn write_zip(dir: &Path, entries: &[(&str, Option<&[u8]>)]) -> PathBuf {
        let data = build_zip(entries);
        let path = dir.join("upload.zip");
        tokio::fs::write(&path, data).await.unwrap();
        path
    }

    #[tokio::test]
    async fn test_extracts_nested_entries() {
        let tmp = tempfile::tempdir().unwrap();
        let zip_path = write_zip(
            tmp.path(),
            &[
                ("index.html", Some(b"<h1>hi</h1>".as_slice())),
                ("assets/", None),
                ("assets/app.css", Some(b"body{}".as_slice())),
                ("a/b.html", Some(b"<p>deep</p>".as_slice())),
            ],
        )
        .await;

        let dest = tmp.path().join("out");
        extract_archive(&zip_path, &dest).await.unwrap();

        assert_eq!(
            tokio::fs::read(dest.join("index.html")).await.unwrap(),
            b"<h1>hi</h1>"
        );
        assert_eq!(
            tokio::fs::read(dest.join("assets/app.css")).await.unwrap(),
            b"body{}"
        );
        assert_eq!(
            tokio::fs::read(dest.join("a/b.html")).await.unwrap(),
            b"<p>deep</p>"
        );
    }

    #[tokio::test]
    async fn test_traversal_entry_aborts_extraction() {
        let tmp = tempfile::tempdir().unwrap();
        let zip_path = write_zip(
            tmp.path(),
            &[
                ("ok.html", Some(b"<p>ok</p>".as_slice())),
                ("../evil.sh", Some(b"#!/bin/sh".as_slice())),
            ],
        )
        .await;

        let dest = tmp.path().join("out");
        tokio::fs::create_dir_all(&dest).await.unwrap();

        let err = extract_archive(&zip_path, &dest).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnsafeArchiveEntry);

        // Nothing may land outside the destination.
        assert!(!tmp.path().join("evil.sh").exists());
    }

    #[tokio::test]
    async fn test_corrupt_archive_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let zip_path = tmp.path().join("broken.zip");
        tokio::fs::write(&zip_path, b"this is not a zip file")
            .await
            .unwrap();

        let dest = tmp.path().join("out");
        let err = extract_archive(&zip_path, &dest).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Extraction);
    }
}
