use std::path::Path;

const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// Detect the mime type of an upload.
///
/// Magic bytes win; text formats that carry no signature fall back to the extension.
pub fn detect_mime_type(name: &str, bytes: &[u8]) -> String {
    if let Some(kind) = infer::get(bytes) {
        return kind.mime_type().to_string();
    }

    let extension = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    let mime = match extension.as_str() {
        "txt" | "log" => "text/plain",
        "md" | "markdown" => "text/markdown",
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "csv" => "text/csv",
        "js" => "text/javascript",
        "xml" => "application/xml",
        "json" => "application/json",
        "yaml" | "yml" => "application/x-yaml",
        "toml" => "application/toml",
        "svg" => "image/svg+xml",
        _ => FALLBACK_MIME_TYPE,
    };
    mime.to_string()
}

#[cfg(test)]
mod tests {
    use super::detect_mime_type;

    #[test]
    fn magic_bytes_take_precedence_over_extension() {
        let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
        assert_eq!(detect_mime_type("photo.txt", &png), "image/png");
    }

    #[test]
    fn text_files_resolve_by_extension() {
        assert_eq!(detect_mime_type("a.txt", b"hi"), "text/plain");
        assert_eq!(detect_mime_type("Data.JSON", b"{}"), "application/json");
    }

    #[test]
    fn unknown_content_falls_back_to_octet_stream() {
        assert_eq!(detect_mime_type("blob", b"\x01\x02"), "application/octet-stream");
        assert_eq!(detect_mime_type("a.unknownext", b"x"), "application/octet-stream");
    }
}
