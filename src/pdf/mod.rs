//! PDF rendering of computed quotes.
//!
//! - `layout` - page planning (which rows and blocks go on which page)
//! - `engine` - drawing primitives on top of `printpdf`
//! - `devis` - the quote template itself

pub mod common;
pub mod devis;
pub mod engine;
pub mod layout;

pub use devis::DevisPdfGenerator;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("PDF generation failed: {0}")]
    Pdf(String),
    #[error("failed to serialize PDF: {0}")]
    Io(#[source] std::io::Error),
}

/// Result of a successful document generation.
#[derive(Debug)]
pub struct GeneratedDocument {
    pub filename: String,
    pub pdf: Vec<u8>,
    pub page_count: usize,
}

/// Trait for document generators.
pub trait Generator<Req> {
    fn generate(&self, request: Req) -> Result<GeneratedDocument, RenderError>;
}
