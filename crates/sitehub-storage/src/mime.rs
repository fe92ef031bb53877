//! Content-type inference for served site files.

use std::path::Path;

/// Fallback type for unknown extensions.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// HTML content type.
pub const TEXT_HTML: &str = "text/html";

/// Guess the content type of a file from its extension.
///
/// The table covers what static sites actually ship; anything else is
/// served as a generic binary.
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => ext.to_lowercase(),
        None => return OCTET_STREAM,
    };

    match ext.as_str() {
        "html" | "htm" => TEXT_HTML,
        "css" => "text/css",
        "js" => "application/javascript",
        "json" => "application/json",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "eot" => "application/vnd.ms-fontobject",
        _ => OCTET_STREAM,
    }
}

/// Whether the inferred content type is HTML (drives the protective
/// response headers for untrusted markup).
pub fn is_html(content_type: &str) -> bool {
    content_type == TEXT_HTML
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_extensions() {
        assert_eq!(content_type_for(Path::new("index.html")), "text/html");
        assert_eq!(content_type_for(Path::new("app.CSS")), "text/css");
        assert_eq!(content_type_for(Path::new("logo.svg")), "image/svg+xml");
        assert_eq!(content_type_for(Path::new("font.woff2")), "font/woff2");
    }

    #[test]
    fn test_unknown_extension_is_binary() {
        assert_eq!(content_type_for(Path::new("data.bin")), OCTET_STREAM);
        assert_eq!(content_type_for(Path::new("noext")), OCTET_STREAM);
    }
}
