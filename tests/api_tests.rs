mod common;

use actix_web::{http::StatusCode, test, web, App};
use serde_json::{json, Value};
use std::sync::Arc;

use common::*;
use ngo_docs_server::api::{self, AppState};
use ngo_docs_server::generators::Exporter;
use ngo_docs_server::storage::{CounterStore, MemoryStore};
use ngo_docs_server::ErrorResponse;

fn state(store: Arc<MemoryStore>, exporter: Arc<dyn Exporter>) -> web::Data<AppState> {
    let pipeline = build_pipeline(store, exporter, Arc::new(RecordingTransport::default()));
    web::Data::new(AppState::new(Arc::new(pipeline)))
}

macro_rules! app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data($state.clone())
                .service(web::scope("/api").configure(api::config)),
        )
        .await
    };
}

#[actix_web::test]
async fn test_create_bill_returns_download_link() {
    let store = Arc::new(MemoryStore::with_counter(7));
    let state = state(store.clone(), Arc::new(FakeExporter::new()));
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/bills")
        .set_json(json!({
            "name": "A. Rahman",
            "amount": 5000,
            "receivedBy": "Treasurer",
            "date": "01.01.2026"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["bill"]["receiptNumber"], "7");
    assert_eq!(body["receiptDisplay"], "000007");
    assert_eq!(body["filename"], "Receipt_000007_01.01.2026.pdf");
    assert_eq!(
        body["downloadUrl"],
        "/documents/Receipt_000007_01.01.2026.pdf"
    );
    assert_eq!(store.peek(), 8);

    let req = test::TestRequest::get().uri("/api/bills").to_request();
    let bills: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(bills.as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn test_invalid_notice_is_bad_request_with_details() {
    let store = Arc::new(MemoryStore::new());
    let state = state(store, Arc::new(FakeExporter::new()));
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/notices")
        .set_json(json!({ "date": "", "noticeNumber": "NTC001", "content": "" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.error, "BadRequest");
    let fields: Vec<&str> = body.details.iter().map(|d| d.field.as_str()).collect();
    assert!(fields.contains(&"date"));
    assert!(fields.contains(&"noticeNumber"));
    assert!(fields.contains(&"content"));

    let req = test::TestRequest::get().uri("/api/notices").to_request();
    let notices: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(notices, json!([]));
}

#[actix_web::test]
async fn test_export_failure_is_bad_gateway_but_record_is_kept() {
    let store = Arc::new(MemoryStore::new());
    let state = state(store.clone(), Arc::new(UnsupportedExporter));
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/notices")
        .set_json(&notice_form())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.error, "ExportFailed");

    let req = test::TestRequest::get().uri("/api/notices").to_request();
    let notices: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(notices[0]["noticeNumber"], "NTC00001");
}

#[actix_web::test]
async fn test_counter_receivers_and_status() {
    let store = Arc::new(MemoryStore::with_counter(42));
    let state = state(store, Arc::new(FakeExporter::new()));
    let app = app!(state);

    let req = test::TestRequest::get().uri("/api/receipt-counter").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({ "counter": 42 }));

    let req = test::TestRequest::get().uri("/api/received-by").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!(["President", "Treasurer"]));

    let req = test::TestRequest::get().uri("/api/status").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({ "generating": false }));
}

#[actix_web::test]
async fn test_preview_renders_unsaved_form_without_side_effects() {
    let store = Arc::new(MemoryStore::with_counter(3));
    let state = state(store.clone(), Arc::new(FakeExporter::new()));
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/preview/bill")
        .set_json(json!({ "name": "Priya <Sen>", "amount": 150000 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/html"));

    let html = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(html.contains("000003"));
    assert!(html.contains("Priya &lt;Sen&gt;"));
    assert!(html.contains("1,50,000"));
    assert_eq!(store.peek(), 3);

    let req = test::TestRequest::post()
        .uri("/api/preview/notice")
        .set_json(json!({ "content": "<p><strong>Annual meeting</strong></p>" }))
        .to_request();
    let html = String::from_utf8(test::call_and_read_body(&app, req).await.to_vec()).unwrap();
    assert!(html.contains("<p><strong>Annual meeting</strong></p>"));
    assert!(html.contains("NOTICE"));
}

#[actix_web::test]
async fn test_error_response_omits_empty_details() {
    let json = serde_json::to_value(ErrorResponse::internal_error("disk full")).unwrap();
    assert_eq!(json["error"], "InternalServerError");
    assert!(json.get("details").is_none());
}
