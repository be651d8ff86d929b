//! Image intake — normalizes heterogeneous input sources into a `Picture`.
//!
//! Sources: an absolute file path, a `data:` URI (drag-drop and the capture
//! overlay deliver these), or a raw encoded buffer (clipboard, screenshot).
//! Intake is deliberately optimistic: the bytes are not decoded here, so a
//! corrupt file is accepted and only fails once an edit touches it.
//! Intake never mutates session state — that is the caller's job.

use crate::picture::Picture;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub enum Source {
    /// Path to an image file on disk.
    Path(PathBuf),
    /// `data:<mime>;base64,<payload>` string.
    DataUri(String),
    /// Already-encoded image bytes (clipboard read, capture frame).
    Bytes(Vec<u8>),
}

#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("unsupported image source: {0}")]
    UnsupportedSourceKind(String),

    #[error("failed to read {path}: {reason}")]
    SourceReadError { path: String, reason: String },
}

/// Converts any supported source into a `Picture`.
pub fn normalize(source: Source) -> Result<Picture, IntakeError> {
    match source {
        Source::Path(path) => {
            let bytes = std::fs::read(&path).map_err(|e| IntakeError::SourceReadError {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
            Ok(Picture::from_encoded(bytes, mime_for_path(&path)))
        }
        Source::DataUri(uri) => parse_data_uri(&uri),
        Source::Bytes(bytes) => Ok(Picture::from_encoded(bytes, "image/png")),
    }
}

fn parse_data_uri(uri: &str) -> Result<Picture, IntakeError> {
    let reject = || IntakeError::UnsupportedSourceKind(uri.chars().take(48).collect());

    let rest = uri.strip_prefix("data:").ok_or_else(reject)?;
    let (header, payload) = rest.split_once(',').ok_or_else(reject)?;
    let mime = header.strip_suffix(";base64").ok_or_else(reject)?;
    if mime.is_empty() {
        return Err(reject());
    }

    let bytes = base64::Engine::decode(&base64::engine::general_purpose::STANDARD, payload)
        .map_err(|_| reject())?;
    Ok(Picture::from_encoded(bytes, mime))
}

/// Content type from the file extension. Unknown extensions fall back to
/// PNG — the optimistic-accept policy again; the codec decides later.
fn mime_for_path(path: &Path) -> String {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        _ => "image/png",
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_uri_round_trips_payload() {
        let payload = base64::Engine::encode(
            &base64::engine::general_purpose::STANDARD,
            b"not really a png",
        );
        let pic = normalize(Source::DataUri(format!("data:image/png;base64,{payload}"))).unwrap();
        assert_eq!(pic.bytes(), b"not really a png");
        assert_eq!(pic.mime(), "image/png");
    }

    #[test]
    fn malformed_data_uri_is_unsupported() {
        for uri in [
            "data:image/png;base64",      // no payload separator
            "data:;base64,aGk=",          // empty mime
            "data:image/png,plaintext",   // not base64-flagged
            "http://example.com/a.png",   // not a data uri at all
        ] {
            let err = normalize(Source::DataUri(uri.to_string())).unwrap_err();
            assert!(
                matches!(err, IntakeError::UnsupportedSourceKind(_)),
                "expected UnsupportedSourceKind for {uri}, got {err}"
            );
        }
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = normalize(Source::Path(PathBuf::from("/definitely/not/here.png"))).unwrap_err();
        assert!(matches!(err, IntakeError::SourceReadError { .. }));
    }

    #[test]
    fn file_bytes_pass_through_unmodified() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.jpg");
        std::fs::write(&path, b"jpeg-ish bytes").unwrap();

        let pic = normalize(Source::Path(path)).unwrap();
        assert_eq!(pic.bytes(), b"jpeg-ish bytes");
        assert_eq!(pic.mime(), "image/jpeg");
    }

    #[test]
    fn raw_bytes_are_tagged_png() {
        let pic = normalize(Source::Bytes(vec![9, 9])).unwrap();
        assert_eq!(pic.mime(), "image/png");
    }
}
