//! Lexical path sanitization shared by extraction and serving.

use std::path::{Component, Path, PathBuf};

/// Normalize an untrusted relative path, refusing anything that could
/// escape its containing root.
///
/// Returns `None` when the path is absolute, contains a `..` segment
/// (with either separator style), or normalizes to nothing that can be
/// safely joined. The returned path consists only of normal components,
/// so `root.join(clean)` is always a descendant of `root`.
pub fn sanitize_relative(raw: &str) -> Option<PathBuf> {
    // Zip entries and URLs use '/', but reject Windows-style traversal too.
    if raw.split(['/', '\\']).any(|seg| seg == "..") {
        return None;
    }

    let mut clean = PathBuf::new();
    for component in Path::new(raw).components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(clean)
}
