//! Output backends for composed documents.
//!
//! The layout engine produces backend-neutral pages; this module serialises
//! them. PDF via `lopdf` is the only backend.

pub mod pdf;

use thiserror::Error;

pub use pdf::write_pdf;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("PDF object error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("I/O error while writing PDF: {0}")]
    Io(#[from] std::io::Error),

    #[error("document has no pages")]
    EmptyDocument,
}
