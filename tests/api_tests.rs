mod common;

use std::sync::Arc;

use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App};
use devis_server::quote::numbering::is_quote_number;
use devis_server::AppState;
use serde_json::{json, Value};
use tempfile::tempdir;

use common::{local_state, mock_state, sample_request, sample_simple_request, MockDocumentStorage};

macro_rules! init_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .configure(devis_server::configure),
        )
        .await
    };
}

fn files_in(dir: &std::path::Path) -> Vec<String> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect()
}

#[actix_web::test]
async fn test_root_reports_service_status() {
    let app = init_app!(mock_state(Arc::new(MockDocumentStorage::new())));

    let req = test::TestRequest::get().uri("/").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["message"], "MonDevisPro API");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[actix_web::test]
async fn test_health() {
    let app = init_app!(mock_state(Arc::new(MockDocumentStorage::new())));

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "status": "healthy" }));
}

#[actix_web::test]
async fn test_generate_writes_pdf_and_serves_it_back() {
    let dir = tempdir().unwrap();
    let app = init_app!(local_state(dir.path()));

    let req = test::TestRequest::post()
        .uri("/generer-devis")
        .set_json(sample_request())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    let numero = body["numero_devis"].as_str().unwrap();
    let filename = body["pdf_filename"].as_str().unwrap();

    assert_eq!(body["success"], true);
    assert!(is_quote_number(numero), "unexpected identifier {}", numero);
    assert_eq!(body["total_ht"], 2250.0);
    assert_eq!(body["total_ttc"], 2700.0);
    assert_eq!(filename, format!("{}.pdf", numero));
    assert_eq!(body["pdf_url"], format!("/download/{}", filename));

    let stored = std::fs::read(dir.path().join(filename)).unwrap();
    assert!(stored.starts_with(b"%PDF"));
    assert_eq!(files_in(dir.path()), vec![filename.to_string()]);

    let req = test::TestRequest::get()
        .uri(&format!("/download/{}", filename))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/pdf"
    );
    let disposition = resp
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment"));
    assert!(disposition.contains(filename));

    let downloaded = test::read_body(resp).await;
    assert_eq!(downloaded.as_ref(), stored.as_slice());
}

#[actix_web::test]
async fn test_pdf_url_uses_public_base_url() {
    let dir = tempdir().unwrap();
    let mut config = common::test_config(dir.path());
    config.public_base_url = "https://devis.example.com".to_string();
    let app = init_app!(AppState::with_local_storage(config).unwrap());

    let req = test::TestRequest::post()
        .uri("/generer-devis")
        .set_json(sample_request())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    let url = body["pdf_url"].as_str().unwrap();
    assert_eq!(
        url,
        format!(
            "https://devis.example.com/download/{}",
            body["pdf_filename"].as_str().unwrap()
        )
    );
}

#[actix_web::test]
async fn test_two_requests_give_two_documents() {
    let storage = Arc::new(MockDocumentStorage::new());
    let app = init_app!(mock_state(storage.clone()));

    let mut numbers = Vec::new();
    for _ in 0..2 {
        let req = test::TestRequest::post()
            .uri("/generer-devis")
            .set_json(sample_request())
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        numbers.push(body["numero_devis"].as_str().unwrap().to_string());
    }

    assert_ne!(numbers[0], numbers[1]);
    assert_eq!(storage.file_count().await, 2);
}

#[actix_web::test]
async fn test_discount_is_reflected_in_totals() {
    let storage = Arc::new(MockDocumentStorage::new());
    let app = init_app!(mock_state(storage));

    let mut request = sample_request();
    request["remise_type"] = json!("pourcentage");
    request["remise_valeur"] = json!(10);

    let req = test::TestRequest::post()
        .uri("/generer-devis")
        .set_json(request)
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["total_ht"], 2025.0);
    assert_eq!(body["total_ttc"], 2430.0);
}

#[actix_web::test]
async fn test_empty_prestations_still_produce_a_quote() {
    let storage = Arc::new(MockDocumentStorage::new());
    let app = init_app!(mock_state(storage.clone()));

    let mut request = sample_request();
    request["prestations"] = json!([]);

    let req = test::TestRequest::post()
        .uri("/generer-devis")
        .set_json(request)
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["success"], true);
    assert_eq!(body["total_ttc"], 0.0);
    assert!(storage.has_file(body["pdf_filename"].as_str().unwrap()).await);
}

#[actix_web::test]
async fn test_many_prestations() {
    let storage = Arc::new(MockDocumentStorage::new());
    let app = init_app!(mock_state(storage.clone()));

    let prestations: Vec<Value> = (1..=60)
        .map(|i| {
            json!({
                "description": format!("Ligne {}", i),
                "quantite": 1,
                "unite": "u",
                "prix_unitaire": 10
            })
        })
        .collect();
    let mut request = sample_request();
    request["prestations"] = json!(prestations);

    let req = test::TestRequest::post()
        .uri("/generer-devis")
        .set_json(request)
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["total_ht"], 600.0);
    assert_eq!(body["total_ttc"], 720.0);
    assert!(storage.has_file(body["pdf_filename"].as_str().unwrap()).await);
}

#[actix_web::test]
async fn test_simple_endpoint_uses_entreprise_defaults() {
    let storage = Arc::new(MockDocumentStorage::new());
    let app = init_app!(mock_state(storage.clone()));

    let req = test::TestRequest::post()
        .uri("/generer-devis-simple")
        .set_json(sample_simple_request())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["total_ht"], 220.0);
    assert_eq!(body["total_ttc"], 242.0);
    assert!(storage.has_file(body["pdf_filename"].as_str().unwrap()).await);
}

#[actix_web::test]
async fn test_invalid_values_are_rejected_without_writing() {
    let dir = tempdir().unwrap();
    let app = init_app!(local_state(dir.path()));

    let mut request = sample_request();
    request["prestations"][0]["quantite"] = json!(0);
    request["client"]["nom"] = json!("");

    let req = test::TestRequest::post()
        .uri("/generer-devis")
        .set_json(request)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "BadRequest");
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("prestations[0].quantite"));
    assert!(message.contains("client.nom"));
    assert!(body["timestamp"].is_string());

    assert!(files_in(dir.path()).is_empty());
}

#[actix_web::test]
async fn test_malformed_payloads_get_json_errors() {
    let storage = Arc::new(MockDocumentStorage::new());
    let app = init_app!(mock_state(storage.clone()));

    let mut string_number = sample_request();
    string_number["prestations"][0]["prix_unitaire"] = json!("450");
    let mut missing_client = sample_request();
    missing_client.as_object_mut().unwrap().remove("client");

    let payloads = vec![
        "{ pas du json".to_string(),
        string_number.to_string(),
        missing_client.to_string(),
    ];

    for payload in payloads {
        let req = test::TestRequest::post()
            .uri("/generer-devis")
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .set_payload(payload.clone())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "payload {}", payload);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "BadRequest");
    }

    assert_eq!(storage.file_count().await, 0);
}

#[actix_web::test]
async fn test_storage_failure_returns_500() {
    let app = init_app!(mock_state(Arc::new(MockDocumentStorage::failing())));

    let req = test::TestRequest::post()
        .uri("/generer-devis")
        .set_json(sample_request())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "InternalServerError");
}

#[actix_web::test]
async fn test_download_unknown_file_is_404() {
    let dir = tempdir().unwrap();
    let app = init_app!(local_state(dir.path()));

    let req = test::TestRequest::get()
        .uri("/download/DEV-20250101-ZZZZZZ.pdf")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "NotFound");
}

#[actix_web::test]
async fn test_download_rejects_foreign_names() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("notes.txt"), b"secret").unwrap();
    let app = init_app!(local_state(dir.path()));

    for uri in [
        "/download/notes.txt",
        "/download/..%2F..%2Fetc%2Fpasswd",
        "/download/DEV-20250101-abcdef.pdf",
    ] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{}", uri);
    }
}
