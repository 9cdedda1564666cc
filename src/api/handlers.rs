use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::AppState;
use crate::generators::common::pad_receipt_number;
use crate::generators::ExportedDocument;
use crate::models::{Bill, BillForm, GeneratedRecord, Notice, NoticeForm};
use crate::pipeline::{GenerateError, GenerateRequest, GenerationOutcome};
use crate::ErrorResponse;

#[derive(Serialize, Deserialize, ToSchema)]
pub struct CounterResponse {
    /// Receipt number the next bill will take.
    #[schema(example = 7)]
    pub counter: u64,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    pub generating: bool,
}

#[derive(Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NoticeGenerated {
    pub notice: Notice,
    #[schema(example = "Notice_NTC00001_01.01.2026.pdf")]
    pub filename: String,
    #[schema(example = "/documents/Notice_NTC00001_01.01.2026.pdf")]
    pub download_url: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BillGenerated {
    pub bill: Bill,
    #[schema(example = "000007")]
    pub receipt_display: String,
    #[schema(example = "Receipt_000007_01.01.2026.pdf")]
    pub filename: String,
    #[schema(example = "/documents/Receipt_000007_01.01.2026.pdf")]
    pub download_url: String,
}

fn download_url(state: &AppState, document: &ExportedDocument) -> String {
    format!("{}/{}", state.download_prefix, document.stored_as)
}

fn error_response(err: GenerateError) -> HttpResponse {
    match err {
        GenerateError::Validation(errors) => HttpResponse::BadRequest().json(
            ErrorResponse::bad_request("Validation failed").with_details(errors.errors().to_vec()),
        ),
        GenerateError::Busy => HttpResponse::Conflict().json(ErrorResponse::new(
            "Busy",
            "Another document is being generated, try again when it finishes",
        )),
        err @ GenerateError::Storage(_) => {
            HttpResponse::InternalServerError().json(ErrorResponse::internal_error(&err.to_string()))
        }
        err @ GenerateError::Export { .. } => {
            HttpResponse::BadGateway().json(ErrorResponse::new("ExportFailed", &err.to_string()))
        }
    }
}

async fn run_generation(state: &AppState, request: GenerateRequest) -> HttpResponse {
    match state.pipeline.generate(request).await {
        Ok(GenerationOutcome {
            record: GeneratedRecord::Notice(notice),
            document,
        }) => HttpResponse::Created().json(NoticeGenerated {
            notice,
            download_url: download_url(state, &document),
            filename: document.filename,
        }),
        Ok(GenerationOutcome {
            record: GeneratedRecord::Bill(bill),
            document,
        }) => HttpResponse::Created().json(BillGenerated {
            receipt_display: pad_receipt_number(&bill.receipt_number),
            bill,
            download_url: download_url(state, &document),
            filename: document.filename,
        }),
        Err(e) => error_response(e),
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Documents",
    post,
    path = "/notices",
    request_body = NoticeForm,
    responses(
        (status = 201, description = "Notice persisted and exported", body = NoticeGenerated),
        (status = 400, description = "Invalid form", body = ErrorResponse),
        (status = 409, description = "A generation is already running", body = ErrorResponse),
        (status = 502, description = "Notice persisted but export failed", body = ErrorResponse)
    )
)]
pub async fn create_notice(
    state: web::Data<AppState>,
    form: web::Json<NoticeForm>,
) -> impl Responder {
    run_generation(&state, GenerateRequest::Notice(form.into_inner())).await
}

#[utoipa::path(
    context_path = "/api",
    tag = "Documents",
    post,
    path = "/bills",
    request_body = BillForm,
    responses(
        (status = 201, description = "Receipt numbered, persisted and exported", body = BillGenerated),
        (status = 400, description = "Invalid form", body = ErrorResponse),
        (status = 409, description = "A generation is already running", body = ErrorResponse),
        (status = 502, description = "Receipt persisted but export failed", body = ErrorResponse)
    )
)]
pub async fn create_bill(state: web::Data<AppState>, form: web::Json<BillForm>) -> impl Responder {
    run_generation(&state, GenerateRequest::Bill(form.into_inner())).await
}

#[utoipa::path(
    context_path = "/api",
    tag = "Documents",
    get,
    path = "/notices",
    responses(
        (status = 200, description = "Notice history in generation order", body = [Notice])
    )
)]
pub async fn list_notices(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.pipeline.records().list_notices())
}

#[utoipa::path(
    context_path = "/api",
    tag = "Documents",
    get,
    path = "/bills",
    responses(
        (status = 200, description = "Receipt history in generation order", body = [Bill])
    )
)]
pub async fn list_bills(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.pipeline.records().list_bills())
}

#[utoipa::path(
    context_path = "/api",
    tag = "Documents",
    get,
    path = "/receipt-counter",
    responses(
        (status = 200, description = "Next receipt number", body = CounterResponse)
    )
)]
pub async fn get_receipt_counter(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(CounterResponse {
        counter: state.pipeline.counter().peek(),
    })
}

#[utoipa::path(
    context_path = "/api",
    tag = "Documents",
    get,
    path = "/received-by",
    responses(
        (status = 200, description = "Authorized receiver names", body = [String])
    )
)]
pub async fn get_received_by(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.pipeline.policy().received_by.as_slice())
}

#[utoipa::path(
    context_path = "/api",
    tag = "Documents",
    get,
    path = "/status",
    responses(
        (status = 200, description = "Whether a generation is in flight", body = StatusResponse)
    )
)]
pub async fn get_status(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(StatusResponse {
        generating: state.pipeline.is_generating(),
    })
}

#[utoipa::path(
    context_path = "/api",
    tag = "Preview",
    post,
    path = "/preview/notice",
    request_body = NoticeForm,
    responses(
        (status = 200, description = "Rendered A4 notice", content_type = "text/html", body = String)
    )
)]
pub async fn preview_notice(
    state: web::Data<AppState>,
    form: web::Json<NoticeForm>,
) -> impl Responder {
    let document = state.pipeline.preview_notice(&form);
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(document.html)
}

#[utoipa::path(
    context_path = "/api",
    tag = "Preview",
    post,
    path = "/preview/bill",
    request_body = BillForm,
    responses(
        (status = 200, description = "Rendered A4 receipt", content_type = "text/html", body = String)
    )
)]
pub async fn preview_bill(state: web::Data<AppState>, form: web::Json<BillForm>) -> impl Responder {
    let document = state.pipeline.preview_bill(&form);
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(document.html)
}
