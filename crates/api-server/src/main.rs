//! API server binary entry point

use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use element_insight_api_server::{start_server, ApiConfig, ApiState};
use element_insight_inference::{CompletionConfig, HttpCompletionClient};
use element_insight_ocr::{HttpOcrClient, OcrConfig};
use element_insight_storage::{MemoryRecordStore, PostgresRecordStore, RecordStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "element_insight_api_server=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ApiConfig::from_env();

    // Remote collaborators and credentials resolve exactly once, here
    let ocr = Arc::new(HttpOcrClient::new(OcrConfig::from_env()?));
    let completion = Arc::new(HttpCompletionClient::new(CompletionConfig::from_env()?));
    let store = init_store().await?;

    let bind_addr = config.bind_addr.clone();
    let state = ApiState::new(store, ocr, completion, config);

    info!("starting element capture service");
    start_server(&bind_addr, state).await?;

    Ok(())
}

async fn init_store() -> anyhow::Result<Arc<dyn RecordStore>> {
    if let Ok(url) = std::env::var("DATABASE_URL") {
        let store = PostgresRecordStore::from_url(&url).await?;
        store.init_schema().await?;
        info!("using postgres record store");
        Ok(Arc::new(store))
    } else {
        warn!("DATABASE_URL not set, records will live in memory only");
        Ok(Arc::new(MemoryRecordStore::new()))
    }
}
