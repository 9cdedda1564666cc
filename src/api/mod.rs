//! HTTP surface for generating, previewing, and listing documents.

pub mod handlers;

use actix_web::web;
use std::sync::Arc;
use utoipa::OpenApi;

use crate::pipeline::GenerationPipeline;

/// URL prefix exported files are served under.
pub const DOCUMENTS_PATH: &str = "/documents";

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<GenerationPipeline>,
    pub download_prefix: String,
}

impl AppState {
    pub fn new(pipeline: Arc<GenerationPipeline>) -> Self {
        Self {
            pipeline,
            download_prefix: DOCUMENTS_PATH.to_string(),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::create_notice,
        handlers::create_bill,
        handlers::list_notices,
        handlers::list_bills,
        handlers::get_receipt_counter,
        handlers::get_received_by,
        handlers::get_status,
        handlers::preview_notice,
        handlers::preview_bill,
    ),
    components(
        schemas(
            crate::models::Notice,
            crate::models::Bill,
            crate::models::NoticeForm,
            crate::models::BillForm,
            crate::models::DocumentKind,
            crate::generators::ValidationError,
            crate::ErrorResponse,
            handlers::CounterResponse,
            handlers::StatusResponse,
            handlers::NoticeGenerated,
            handlers::BillGenerated,
        )
    ),
    tags(
        (name = "Documents", description = "Notice and donation receipt generation."),
        (name = "Preview", description = "Live A4 previews of unsaved form state.")
    )
)]
pub struct ApiDoc;

/// Register the `/api` routes.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/notices")
            .route(web::get().to(handlers::list_notices))
            .route(web::post().to(handlers::create_notice)),
    )
    .service(
        web::resource("/bills")
            .route(web::get().to(handlers::list_bills))
            .route(web::post().to(handlers::create_bill)),
    )
    .service(web::resource("/receipt-counter").route(web::get().to(handlers::get_receipt_counter)))
    .service(web::resource("/received-by").route(web::get().to(handlers::get_received_by)))
    .service(web::resource("/status").route(web::get().to(handlers::get_status)))
    .service(web::resource("/preview/notice").route(web::post().to(handlers::preview_notice)))
    .service(web::resource("/preview/bill").route(web::post().to(handlers::preview_bill)));
}
