use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// File extensions accepted for upload.
pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "png", "jpg", "jpeg"];

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("extension not allowed: {0}")]
    UnsupportedExtension(String),
    #[error("document is empty: {0}")]
    Empty(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The kind of an uploaded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Pdf,
    Png,
    Jpeg,
}

impl DocumentKind {
    /// Detect the kind from magic bytes, if recognizable.
    pub fn sniff(data: &[u8]) -> Option<Self> {
        if data.starts_with(b"%PDF") {
            Some(Self::Pdf)
        } else if data.starts_with(&[0x89, b'P', b'N', b'G']) {
            Some(Self::Png)
        } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(Self::Jpeg)
        } else {
            None
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            _ => None,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }

    /// Images carry no text layer and always count as a single page.
    pub fn is_image(&self) -> bool {
        !matches!(self, Self::Pdf)
    }
}

/// An uploaded document: immutable bytes plus the path they were read from.
///
/// Cloning is cheap; the bytes are shared.
#[derive(Debug, Clone)]
pub struct Document {
    id: String,
    path: PathBuf,
    kind: DocumentKind,
    bytes: Arc<[u8]>,
}

impl Document {
    /// Read a document from disk.
    ///
    /// The extension must be one of [`ALLOWED_EXTENSIONS`]. The kind is taken
    /// from the magic bytes when recognizable, otherwise from the extension.
    pub fn open(path: &Path) -> Result<Self, DocumentError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        let ext_kind = DocumentKind::from_extension(&ext)
            .ok_or_else(|| DocumentError::UnsupportedExtension(format!(".{ext}")))?;

        let data = std::fs::read(path)?;
        if data.is_empty() {
            return Err(DocumentError::Empty(path.to_path_buf()));
        }

        let kind = DocumentKind::sniff(&data).unwrap_or(ext_kind);
        let id = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("document")
            .to_string();

        Ok(Self {
            id,
            path: path.to_path_buf(),
            kind,
            bytes: data.into(),
        })
    }

    /// Build a document from in-memory bytes. `path` is informational only.
    pub fn from_bytes(id: impl Into<String>, path: impl Into<PathBuf>, data: Vec<u8>) -> Self {
        let path = path.into();
        let kind = DocumentKind::sniff(&data)
            .or_else(|| {
                path.extension()
                    .and_then(|e| e.to_str())
                    .and_then(DocumentKind::from_extension)
            })
            .unwrap_or(DocumentKind::Pdf);
        Self {
            id: id.into(),
            path,
            kind,
            bytes: data.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// File name used when uploading the document to a remote service.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .unwrap_or_else(|| match self.kind {
                DocumentKind::Pdf => "document.pdf".to_string(),
                DocumentKind::Png => "document.png".to_string(),
                DocumentKind::Jpeg => "document.jpg".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn sniff_recognizes_magic_bytes() {
        assert_eq!(DocumentKind::sniff(b"%PDF-1.7\n"), Some(DocumentKind::Pdf));
        assert_eq!(
            DocumentKind::sniff(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A]),
            Some(DocumentKind::Png)
        );
        assert_eq!(
            DocumentKind::sniff(&[0xFF, 0xD8, 0xFF, 0xE0]),
            Some(DocumentKind::Jpeg)
        );
        assert_eq!(DocumentKind::sniff(b"hello"), None);
    }

    #[test]
    fn open_rejects_disallowed_extension() {
        let mut file = tempfile::Builder::new().suffix(".docx").tempfile().unwrap();
        file.write_all(b"PK\x03\x04").unwrap();
        let err = Document::open(file.path()).unwrap_err();
        assert!(matches!(err, DocumentError::UnsupportedExtension(ext) if ext == ".docx"));
    }

    #[test]
    fn open_rejects_empty_file() {
        let file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        let err = Document::open(file.path()).unwrap_err();
        assert!(matches!(err, DocumentError::Empty(_)));
    }

    #[test]
    fn open_prefers_magic_over_extension() {
        let mut file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        file.write_all(&[0xFF, 0xD8, 0xFF, 0xE0, 0x00]).unwrap();
        let doc = Document::open(file.path()).unwrap();
        assert_eq!(doc.kind(), DocumentKind::Jpeg);
        assert!(doc.kind().is_image());
        assert_eq!(doc.bytes().len(), 5);
    }

    #[test]
    fn id_is_file_stem() {
        let mut file = tempfile::Builder::new()
            .prefix("abc123")
            .suffix(".pdf")
            .tempfile()
            .unwrap();
        file.write_all(b"%PDF-1.4").unwrap();
        let doc = Document::open(file.path()).unwrap();
        assert!(doc.id().starts_with("abc123"));
        assert_eq!(doc.kind(), DocumentKind::Pdf);
    }

    #[test]
    fn from_bytes_falls_back_to_extension() {
        let doc = Document::from_bytes("x", "scan.png", b"not really".to_vec());
        assert_eq!(doc.kind(), DocumentKind::Png);
        assert_eq!(doc.file_name(), "scan.png");
        assert_eq!(doc.kind().mime_type(), "image/png");
    }
}
