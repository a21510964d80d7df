//! Integration tests for the API server
//!
//! These start the real server on an ephemeral port with in-memory storage
//! and scripted remote collaborators, then drive it over HTTP.

use std::io::Cursor;
use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use element_insight_api_server::{build_router, ApiConfig, ApiState};
use element_insight_inference::{
    CompletionBackend, CompletionBody, CompletionEndpoint, CompletionReply, InferenceError,
};
use element_insight_ocr::{OcrBackend, OcrError, OcrLine, OcrRegion, OcrResponse};
use element_insight_storage::MemoryRecordStore;

struct ScriptedOcr;

#[async_trait]
impl OcrBackend for ScriptedOcr {
    async fn recognize(&self, _image: &[u8]) -> Result<OcrResponse, OcrError> {
        Ok(OcrResponse {
            regions: vec![OcrRegion {
                lines: vec![
                    OcrLine::with_words("400,400,40,10", &["unrelated", "footer"]),
                    OcrLine::with_words("115,105,30,10", &["Add", "to", "cart"]),
                ],
            }],
        })
    }
}

struct ScriptedCompletion;

#[async_trait]
impl CompletionBackend for ScriptedCompletion {
    async fn complete(
        &self,
        _endpoint: CompletionEndpoint,
        _body: &CompletionBody,
    ) -> Result<CompletionReply, InferenceError> {
        Ok(CompletionReply::Text("the add-to-cart button".to_string()))
    }
}

async fn spawn_server() -> (String, Arc<MemoryRecordStore>) {
    let store = Arc::new(MemoryRecordStore::new());
    let state = ApiState::new(
        store.clone(),
        Arc::new(ScriptedOcr),
        Arc::new(ScriptedCompletion),
        ApiConfig {
            bind_addr: "127.0.0.1:0".to_string(),
            seed_ids: vec![1, 2, 3],
        },
    );

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });

    (format!("http://{addr}"), store)
}

fn screenshot_data_uri() -> String {
    let pixels = image::RgbImage::from_pixel(640, 480, image::Rgb([230, 230, 230]));
    let mut cursor = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(pixels)
        .write_to(&mut cursor, image::ImageFormat::Png)
        .unwrap();
    format!(
        "data:image/png;base64,{}",
        STANDARD.encode(cursor.into_inner())
    )
}

fn upload_body() -> serde_json::Value {
    serde_json::json!({
        "elementCenterX": 320.0,
        "elementCenterY": 240.0,
        "elementWidth": 40.0,
        "elementHeight": 20.0,
        "windowWidth": 640.0,
        "windowHeight": 480.0,
        "imageUri": screenshot_data_uri(),
        "outerHTML": "<button>Add to cart</button>",
        "pageTitle": "Shop"
    })
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let (base, _store) = spawn_server().await;

    let response = reqwest::get(format!("{base}/health")).await.unwrap();
    assert_eq!(response.status(), 200);

    let json: serde_json::Value = response.json().await.unwrap();
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn upload_then_read_back_through_the_data_routes() {
    let (base, _store) = spawn_server().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/upload"))
        .json(&upload_body())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let ids: serde_json::Value = client
        .get(format!("{base}/data"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(ids["ids"], serde_json::json!([1]));

    let record: serde_json::Value = client
        .get(format!("{base}/data/id/1"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(record["outerHTML"], "<button>Add to cart</button>");
    // nearest line first, capped summary stored as the record's OCR data
    let ocr: serde_json::Value =
        serde_json::from_str(record["imageOcrData"].as_str().unwrap()).unwrap();
    assert_eq!(ocr[0]["text"], "Add to cart");
    assert_eq!(ocr[1]["text"], "unrelated footer");

    let image = client
        .get(format!("{base}/data/image/id/1"))
        .send()
        .await
        .unwrap();
    assert_eq!(image.headers()["content-type"], "image/jpeg");
    let bytes = image.bytes().await.unwrap();
    assert_eq!(&bytes[..2], &[0xff, 0xd8]);
}

#[tokio::test]
async fn inference_round_trip_uses_labeled_seeds() {
    let (base, _store) = spawn_server().await;
    let client = reqwest::Client::new();

    // Store three captures and label them so they can serve as seeds
    for label in ["first", "second", "third"] {
        let response = client
            .post(format!("{base}/upload"))
            .json(&upload_body())
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);

        let ids: serde_json::Value = client
            .get(format!("{base}/data"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        let id = ids["ids"].as_array().unwrap().last().unwrap().clone();

        let patched = client
            .patch(format!("{base}/data/id/{id}"))
            .json(&serde_json::json!({ "inference": label }))
            .send()
            .await
            .unwrap();
        assert_eq!(patched.status(), 200);
    }

    let response = client
        .post(format!("{base}/inference"))
        .json(&upload_body())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "the add-to-cart button");
}

#[tokio::test]
async fn unknown_record_ids_are_not_found() {
    let (base, _store) = spawn_server().await;

    let response = reqwest::get(format!("{base}/data/id/42")).await.unwrap();
    assert_eq!(response.status(), 404);
}
