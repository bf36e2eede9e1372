//! Pure-Rust text-layer backends.
//!
//! Two independent readers of the embedded text layer, usable as fallback
//! strategies behind a primary backend:
//! - [`LopdfBackend`]: per-page extraction with `lopdf`
//! - [`PdfExtractBackend`]: the `pdf-extract` content-stream interpreter

mod lopdf_backend;
mod pdf_extract_backend;

pub use lopdf_backend::LopdfBackend;
pub use pdf_extract_backend::PdfExtractBackend;
