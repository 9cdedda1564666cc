use actix_cors::Cors;
use actix_files::Files;
use actix_web::middleware::Compress;
use actix_web::{http::header, web, App, HttpServer};
use actix_web_prometheus::PrometheusMetricsBuilder;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

pub mod api;
pub mod config;
pub mod generators;
pub mod models;
pub mod notify;
pub mod pipeline;
pub mod storage;

pub use crate::api::AppState;

use crate::config::AppConfig;
use crate::generators::validation::ValidationError;
use crate::generators::{HtmlPdfEngine, TemplateRenderer, ValidationPolicy};
use crate::notify::EmailNotifier;
use crate::pipeline::GenerationPipeline;
use crate::storage::JsonFileStore;

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub timestamp: String,
    /// Per-field problems when the request failed validation.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<ValidationError>,
}

impl ErrorResponse {
    pub fn new(error_type: &str, message: &str) -> Self {
        Self {
            error: error_type.to_string(),
            message: message.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            details: Vec::new(),
        }
    }

    pub fn with_details(mut self, details: Vec<ValidationError>) -> Self {
        self.details = details;
        self
    }

    pub fn bad_request(message: &str) -> Self {
        Self::new("BadRequest", message)
    }

    pub fn internal_error(message: &str) -> Self {
        Self::new("InternalServerError", message)
    }
}

/// Wire the pipeline from configuration.
pub fn build_pipeline(config: &AppConfig, http_client: reqwest::Client) -> GenerationPipeline {
    let store = Arc::new(JsonFileStore::new(&config.data_dir));
    let exporter = Arc::new(HtmlPdfEngine::new(
        config.pdf_engine.clone(),
        &config.output_dir,
    ));
    let notifier = Arc::new(EmailNotifier::from_config(&config.notify, http_client));

    GenerationPipeline::with_store(
        store,
        TemplateRenderer::new(config.organization.clone()),
        exporter,
        notifier,
        ValidationPolicy::new(config.received_by.clone()),
    )
}

pub async fn run() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    std::fs::create_dir_all(&config.output_dir).with_context(|| {
        format!(
            "failed to create output directory {}",
            config.output_dir.display()
        )
    })?;

    let http_client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .user_agent(concat!("ngo-docs-server/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("failed to create HTTP client")?;

    let pipeline = Arc::new(build_pipeline(&config, http_client));
    log::info!(
        "Data in {}, exports in {}, next receipt number {}",
        config.data_dir.display(),
        config.output_dir.display(),
        pipeline.counter().peek()
    );
    let app_state = web::Data::new(AppState::new(pipeline));

    let prometheus = PrometheusMetricsBuilder::new("ngo_docs_server")
        .endpoint("/metrics")
        .build()
        .map_err(|e| anyhow::anyhow!("failed to create Prometheus metrics middleware: {e}"))?;

    let output_dir = config.output_dir.clone();
    let cors_origins = config.cors_origins.clone();

    log::info!("Starting server at http://{}:{}", config.host, config.port);

    HttpServer::new(move || {
        let cors = cors_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
            .max_age(3600);

        App::new()
            .wrap(Compress::default())
            .wrap(prometheus.clone())
            .wrap(cors)
            .app_data(app_state.clone())
            .service(web::scope("/api").configure(api::config))
            .service(Files::new(api::DOCUMENTS_PATH, output_dir.clone()))
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", api::ApiDoc::openapi()),
            )
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    Ok(())
}
