//! Image payloads sent to the vision model.

use std::path::Path;

use base64::Engine;

/// MIME type assumed when the file extension is unknown.
const DEFAULT_MIME: &str = "image/jpeg";

/// A base64-encoded image ready for inline upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: String,
}

impl InlineImage {
    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
        }
    }

    /// Read a local image referenced by path or `file://` URI.
    pub async fn load(uri: &str) -> std::io::Result<Self> {
        let path = local_path(uri);
        let bytes = tokio::fs::read(path).await?;
        Ok(Self::from_bytes(&bytes, mime_for(path)))
    }
}

fn local_path(uri: &str) -> &Path {
    Path::new(uri.strip_prefix("file://").unwrap_or(uri))
}

fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("heic") => "image/heic",
        Some("heif") => "image/heif",
        _ => DEFAULT_MIME,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_standard_base64() {
        let img = InlineImage::from_bytes(b"hello", "image/png");
        assert_eq!(img.data, "aGVsbG8=");
        assert_eq!(img.mime_type, "image/png");
    }

    #[test]
    fn mime_from_extension() {
        assert_eq!(mime_for(Path::new("a/b.PNG")), "image/png");
        assert_eq!(mime_for(Path::new("shot.jpg")), "image/jpeg");
        assert_eq!(mime_for(Path::new("noext")), "image/jpeg");
    }

    #[test]
    fn file_scheme_is_stripped() {
        assert_eq!(local_path("file:///tmp/x.jpg"), Path::new("/tmp/x.jpg"));
        assert_eq!(local_path("/tmp/x.jpg"), Path::new("/tmp/x.jpg"));
    }

    #[tokio::test]
    async fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plate.webp");
        std::fs::write(&path, [1u8, 2, 3]).unwrap();

        let img = InlineImage::load(&format!("file://{}", path.display()))
            .await
            .unwrap();
        assert_eq!(img.mime_type, "image/webp");
        assert_eq!(img.data, "AQID");
    }

    #[tokio::test]
    async fn load_missing_file_errors() {
        assert!(InlineImage::load("/definitely/not/here.jpg").await.is_err());
    }
}
