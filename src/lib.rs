use actix_cors::Cors;
use actix_web::middleware::Compress;
use actix_web::{error, http::header, web, App, HttpRequest, HttpResponse, HttpServer};
use actix_web_prometheus::PrometheusMetricsBuilder;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

pub mod config;
pub mod pdf;
pub mod quote;
pub mod state;
pub mod storage;

pub use crate::config::AppConfig;
pub use crate::state::AppState;

const JSON_PAYLOAD_LIMIT: usize = 1024 * 1024;

#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub message: String,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_type: &str, message: &str) -> Self {
        Self {
            success: false,
            error: error_type.to_string(),
            message: message.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn not_found(message: &str) -> Self {
        Self::new("NotFound", message)
    }

    pub fn bad_request(message: &str) -> Self {
        Self::new("BadRequest", message)
    }

    pub fn internal_error(message: &str) -> Self {
        Self::new("InternalServerError", message)
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::quote::handlers::root,
        crate::quote::handlers::health,
        crate::quote::handlers::generer_devis,
        crate::quote::handlers::generer_devis_simple,
        crate::quote::handlers::download_file
    ),
    components(
        schemas(
            quote::models::Entreprise,
            quote::models::Client,
            quote::models::Prestation,
            quote::models::RemiseType,
            quote::models::DevisRequest,
            quote::models::DevisData,
            quote::models::DevisRequestSimple,
            quote::models::DevisResponse,
            quote::models::StatusResponse,
            ErrorResponse,
        )
    ),
    tags(
        (name = "Devis", description = "Quote generation and download endpoints.")
    )
)]
pub struct ApiDoc;

/// Malformed or mistyped JSON bodies get the same envelope as validation errors.
fn json_error_handler(err: error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let message = format!("Requête invalide : {}", err);
    log::warn!("{}", message);
    let response = HttpResponse::BadRequest().json(ErrorResponse::bad_request(&message));
    error::InternalError::from_response(err, response).into()
}

pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_PAYLOAD_LIMIT)
        .error_handler(json_error_handler)
}

/// Routes and extractors, without middleware. Shared by the server and tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config()).configure(quote::handlers::config);
}

fn cors(allowed_origins: &[String]) -> Cors {
    let cors = if allowed_origins.is_empty() {
        Cors::default().allow_any_origin()
    } else {
        allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
    };

    cors.allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
        .max_age(3600)
}

fn to_io_error(e: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
}

pub async fn run() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env().map_err(|e| {
        log::error!("Invalid configuration: {}", e);
        to_io_error(e)
    })?;
    let app_state = match AppState::with_local_storage(config.clone()) {
        Ok(state) => web::Data::new(state),
        Err(e) => {
            log::error!(
                "Cannot prepare PDF output directory {}: {}",
                config.output_dir.display(),
                e
            );
            return Err(to_io_error(e));
        }
    };

    let prometheus = PrometheusMetricsBuilder::new("devis_server")
        .endpoint("/metrics")
        .build()
        .map_err(to_io_error)?;

    log::info!("Starting server at http://{}:{}", config.host, config.port);

    let allowed_origins = config.allowed_origins.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(Compress::default())
            .wrap(prometheus.clone())
            .wrap(cors(&allowed_origins))
            .app_data(app_state.clone())
            .configure(configure)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
    })
    .keep_alive(actix_web::http::KeepAlive::Os)
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
