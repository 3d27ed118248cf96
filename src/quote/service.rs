//! Request pipeline: validate, price, render, store.

use actix_web::web;

use super::compute::{compute_quote, to_json_number, ComputedQuote};
use super::models::{DevisRequest, DevisResponse};
use super::numbering::quote_number_from_filename;
use super::validation::Validator;
use super::QuoteError;
use crate::pdf::{GeneratedDocument, RenderError};
use crate::storage::StorageError;
use crate::AppState;

impl DevisResponse {
    pub fn from_quote(quote: &ComputedQuote, pdf_filename: String, pdf_url: String) -> Self {
        Self {
            success: true,
            numero_devis: quote.numero_devis.clone(),
            total_ht: to_json_number(&quote.totals.total_ht),
            total_ttc: to_json_number(&quote.totals.total_ttc),
            pdf_filename,
            pdf_url,
        }
    }
}

impl AppState {
    /// Run a request through the whole pipeline. Nothing is written unless
    /// validation, pricing and rendering all succeed.
    pub async fn generate_quote(&self, request: DevisRequest) -> Result<DevisResponse, QuoteError> {
        request.validate()?;
        let quote = compute_quote(&request)?;
        log::debug!(
            "Computed quote {}: total HT {}, total TTC {}",
            quote.numero_devis,
            quote.totals.total_ht,
            quote.totals.total_ttc
        );

        let (quote, document) = self.render(quote).await?;
        self.storage.save(&document.filename, &document.pdf).await?;
        log::info!(
            "Quote {} saved as {} ({} page(s), {} bytes)",
            quote.numero_devis,
            document.filename,
            document.page_count,
            document.pdf.len()
        );

        let url = self.config.download_url(&document.filename);
        Ok(DevisResponse::from_quote(&quote, document.filename, url))
    }

    async fn render(
        &self,
        quote: ComputedQuote,
    ) -> Result<(ComputedQuote, GeneratedDocument), QuoteError> {
        let generator = self.generator;
        let rendered = web::block(move || {
            let document = generator.generate(&quote);
            document.map(|document| (quote, document))
        })
        .await
        .map_err(|e| RenderError::Pdf(e.to_string()))??;
        Ok(rendered)
    }

    /// Fetch a stored quote by its download name.
    pub async fn load_document(&self, filename: &str) -> Result<Vec<u8>, QuoteError> {
        if quote_number_from_filename(filename).is_none() {
            return Err(QuoteError::NotFound(filename.to_string()));
        }
        match self.storage.load(filename).await {
            Ok(bytes) => Ok(bytes),
            Err(StorageError::NotFound(_)) | Err(StorageError::InvalidName(_)) => {
                Err(QuoteError::NotFound(filename.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
