use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpResponse, Responder};
use serde_json::json;

use crate::quote::models::{DevisRequest, DevisRequestSimple, DevisResponse, StatusResponse};
use crate::quote::QuoteError;
use crate::{AppState, ErrorResponse};

pub const SERVICE_NAME: &str = "MonDevisPro API";

fn error_response(error: &QuoteError) -> HttpResponse {
    let message = error.to_string();
    match error {
        QuoteError::Validation(_) => {
            log::warn!("Rejected quote request: {}", message);
            HttpResponse::BadRequest().json(ErrorResponse::bad_request(&message))
        }
        QuoteError::NotFound(_) => HttpResponse::NotFound().json(ErrorResponse::not_found(&message)),
        QuoteError::Render(_) | QuoteError::Storage(_) => {
            log::error!("Quote generation failed: {}", message);
            HttpResponse::InternalServerError().json(ErrorResponse::internal_error(&message))
        }
    }
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Devis",
    responses(
        (status = 200, description = "Service status", body = StatusResponse)
    )
)]
pub async fn root() -> impl Responder {
    HttpResponse::Ok().json(StatusResponse {
        message: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "ok".to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Devis",
    responses(
        (status = 200, description = "Service is up")
    )
)]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "healthy" }))
}

#[utoipa::path(
    post,
    path = "/generer-devis",
    tag = "Devis",
    request_body = DevisRequest,
    responses(
        (status = 200, description = "Quote generated and stored", body = DevisResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 500, description = "Rendering or storage failure", body = ErrorResponse)
    )
)]
pub async fn generer_devis(
    state: web::Data<AppState>,
    item: web::Json<DevisRequest>,
) -> impl Responder {
    let request = item.into_inner();
    log::info!(
        "Quote request for client '{}' with {} prestation(s)",
        request.client.nom,
        request.prestations.len()
    );

    match state.generate_quote(request).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => error_response(&e),
    }
}

#[utoipa::path(
    post,
    path = "/generer-devis-simple",
    tag = "Devis",
    request_body = DevisRequestSimple,
    responses(
        (status = 200, description = "Quote generated and stored", body = DevisResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 500, description = "Rendering or storage failure", body = ErrorResponse)
    )
)]
pub async fn generer_devis_simple(
    state: web::Data<AppState>,
    item: web::Json<DevisRequestSimple>,
) -> impl Responder {
    let request = DevisRequest::from(item.into_inner());
    log::info!(
        "Simplified quote request for client '{}' with {} prestation(s)",
        request.client.nom,
        request.prestations.len()
    );

    match state.generate_quote(request).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => error_response(&e),
    }
}

#[utoipa::path(
    get,
    path = "/download/{filename}",
    tag = "Devis",
    params(
        ("filename" = String, Path, description = "Generated file name, e.g. DEV-20250101-A1B2C3.pdf")
    ),
    responses(
        (status = 200, description = "PDF document (application/pdf)"),
        (status = 404, description = "Unknown file", body = ErrorResponse)
    )
)]
pub async fn download_file(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let filename = path.into_inner();
    log::debug!("Download requested for {}", filename);

    match state.load_document(&filename).await {
        Ok(bytes) => HttpResponse::Ok()
            .content_type("application/pdf")
            .insert_header(ContentDisposition {
                disposition: DispositionType::Attachment,
                parameters: vec![DispositionParam::Filename(filename)],
            })
            .body(bytes),
        Err(e) => error_response(&e),
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/").route(web::get().to(root)))
        .service(web::resource("/health").route(web::get().to(health)))
        .service(web::resource("/generer-devis").route(web::post().to(generer_devis)))
        .service(
            web::resource("/generer-devis-simple").route(web::post().to(generer_devis_simple)),
        )
        .service(web::resource("/download/{filename}").route(web::get().to(download_file)));
}
