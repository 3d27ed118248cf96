//! Quote generation: validation, pricing, rendering and storage.
//!
//! - `models` - request and response payloads
//! - `validation` - field checks collected into one report
//! - `compute` - decimal pricing of a validated request
//! - `numbering` - quote identifiers and file names
//! - `service` - the request pipeline on top of [`crate::AppState`]
//! - `handlers` - HTTP endpoints

pub mod compute;
pub mod handlers;
pub mod models;
pub mod numbering;
pub mod service;
pub mod validation;


use thiserror::Error;

use crate::pdf::RenderError;
use crate::storage::StorageError;
use validation::ValidationErrors;

#[derive(Debug, Error)]
pub enum QuoteError {
    #[error("{0}")]
    Validation(#[from] ValidationErrors),
    #[error("{0}")]
    Render(#[from] RenderError),
    #[error("{0}")]
    Storage(#[from] StorageError),
    #[error("Fichier '{0}' introuvable")]
    NotFound(String),
}
