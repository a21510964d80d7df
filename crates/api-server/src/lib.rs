//! REST surface for the element capture service
//!
//! Routes marshal requests into the core pipeline — crop, OCR ranking,
//! prompt assembly, completion — and expose the stored records. Remote
//! collaborators and storage are resolved once at startup and shared
//! read-only across requests.

mod config;
mod handlers;
mod types;

pub use config::ApiConfig;
pub use handlers::*;
pub use types::*;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use element_insight_inference::CompletionBackend;
use element_insight_ocr::OcrBackend;
use element_insight_storage::RecordStore;

/// Server state shared across handlers
#[derive(Clone)]
pub struct ApiState {
    pub store: Arc<dyn RecordStore>,
    pub ocr: Arc<dyn OcrBackend>,
    pub completion: Arc<dyn CompletionBackend>,
    pub config: Arc<ApiConfig>,
}

impl ApiState {
    #[must_use]
    pub fn new(
        store: Arc<dyn RecordStore>,
        ocr: Arc<dyn OcrBackend>,
        completion: Arc<dyn CompletionBackend>,
        config: ApiConfig,
    ) -> Self {
        Self {
            store,
            ocr,
            completion,
            config: Arc::new(config),
        }
    }
}

/// Build the API router with all endpoints
pub fn build_router(state: ApiState) -> Router {
    Router::new()
        // Liveness
        .route("/", get(root))
        .route("/health", get(health_check))
        // Capture pipeline
        .route("/upload", post(upload))
        .route("/inference", post(inference))
        .route("/summary", post(summary))
        // Stored records
        .route("/data", get(list_records))
        .route("/data/id/{id}", get(get_record).patch(patch_record))
        .route("/data/image/id/{id}", get(get_record_image))
        .route("/data/formatted/id/{id}", get(get_record_formatted))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the API server
pub async fn start_server(addr: &str, state: ApiState) -> Result<(), std::io::Error> {
    tracing::info!("starting API server on {}", addr);

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await
}
