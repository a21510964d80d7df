//! HTTP request handlers
//!
//! Each handler validates its request, drives the core pipeline, and maps
//! typed errors onto HTTP statuses: malformed input is 400, an exhausted
//! shrink loop is 413 so clients can say "content too large", remote
//! collaborator failures are 502, and data-integrity problems are 500.
//! Nothing is persisted until the whole pipeline has succeeded.

use axum::{
    extract::{Path, State},
    http::{header, HeaderName, StatusCode},
    Json,
};
use tracing::{debug, info};

use element_insight_common::{Point, Size};
use element_insight_inference::{
    constants::{MIN_SEED_FLOOR, MIN_TEXT_FLOOR},
    infer_with_retry, summarize_page, InferenceError, NewExample, PromptBlock, SeedExample,
};
use element_insight_ocr::{ocr_and_rank, OcrError};
use element_insight_preprocessing::{decode_data_uri, preprocess_image, PreprocessError};
use element_insight_storage::{load_seeds, NewRecord, StorageError, StoredRecord};

use crate::types::{
    HealthResponse, RecordIdsResponse, RecordPatch, RecordResponse, SummaryRequest, UploadRequest,
};
use crate::ApiState;

/// Liveness probe for the bare root path
pub async fn root() -> &'static str {
    "Element capture service is running."
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Upload a capture and persist it for later labeling
pub async fn upload(
    State(state): State<ApiState>,
    Json(request): Json<UploadRequest>,
) -> Result<String, (StatusCode, String)> {
    validate_geometry(&request)?;
    let outer_html = required(request.outer_html.as_deref(), "outerHTML")?.to_string();

    let (jpeg_data, ocr_summary) = crop_and_rank(&state, &request).await?;

    // Persist only once the whole pipeline has succeeded
    let id = state
        .store
        .insert(NewRecord {
            image_data: jpeg_data,
            image_ocr_data: ocr_summary,
            outer_html,
            page_source: request.page_source,
        })
        .await
        .map_err(|e| (storage_status(&e), e.to_string()))?;

    info!(id, "stored new capture record");
    Ok("This sample was saved to the database.".to_string())
}

/// Upload a capture and answer with a label inferred from seed examples
pub async fn inference(
    State(state): State<ApiState>,
    Json(request): Json<UploadRequest>,
) -> Result<String, (StatusCode, String)> {
    validate_geometry(&request)?;
    let outer_html = required(request.outer_html.as_deref(), "outerHTML")?.to_string();
    let page_title = required(request.page_title.as_deref(), "pageTitle")?.to_string();

    let (_jpeg_data, ocr_summary) = crop_and_rank(&state, &request).await?;

    let seeds: Vec<SeedExample> = load_seeds(state.store.as_ref(), &state.config.seed_ids)
        .await
        .map_err(|e| (storage_status(&e), e.to_string()))?
        .into_iter()
        .map(seed_from_record)
        .collect();

    let new_example = NewExample {
        outer_html,
        ocr_summary,
        page_title: Some(page_title),
    };

    infer_with_retry(
        state.completion.as_ref(),
        seeds,
        &new_example,
        MIN_SEED_FLOOR,
    )
    .await
    .map_err(|e| (inference_status(&e), e.to_string()))
}

/// Summarize a page in one sentence
pub async fn summary(
    State(state): State<ApiState>,
    Json(request): Json<SummaryRequest>,
) -> Result<String, (StatusCode, String)> {
    let page_source = required(request.page_source.as_deref(), "pageSource")?.to_string();
    let page_title = required(request.page_title.as_deref(), "pageTitle")?.to_string();
    required(request.page_url.as_deref(), "pageUrl")?;

    // Text extraction from the page HTML is an external collaborator's job;
    // the source text goes through as-is
    summarize_page(
        state.completion.as_ref(),
        Some(&page_title),
        page_source,
        MIN_TEXT_FLOOR,
    )
    .await
    .map_err(|e| (inference_status(&e), e.to_string()))
}

/// All stored record ids
pub async fn list_records(
    State(state): State<ApiState>,
) -> Result<Json<RecordIdsResponse>, (StatusCode, String)> {
    let ids = state
        .store
        .list_ids()
        .await
        .map_err(|e| (storage_status(&e), e.to_string()))?;

    Ok(Json(RecordIdsResponse { ids }))
}

/// Metadata for one stored record
pub async fn get_record(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
) -> Result<Json<RecordResponse>, (StatusCode, String)> {
    let record = fetch_record(&state, id).await?;

    Ok(Json(RecordResponse {
        image_uri: format!("/data/image/id/{id}"),
        outer_html: record.outer_html,
        image_ocr_data: record.image_ocr_data,
        inference: record.inference,
        page_source: record.page_source,
        page_summary: record.page_summary,
    }))
}

/// Edit a record's inference label
pub async fn patch_record(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
    Json(patch): Json<RecordPatch>,
) -> Result<StatusCode, (StatusCode, String)> {
    state
        .store
        .set_inference(id, patch.inference)
        .await
        .map_err(|e| (storage_status(&e), e.to_string()))?;

    Ok(StatusCode::OK)
}

/// The stored JPEG for one record
pub async fn get_record_image(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
) -> Result<([(HeaderName, &'static str); 1], Vec<u8>), (StatusCode, String)> {
    let record = fetch_record(&state, id).await?;

    Ok(([(header::CONTENT_TYPE, "image/jpeg")], record.image_data))
}

/// One record rendered as the prompt block it would contribute
pub async fn get_record_formatted(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
) -> Result<String, (StatusCode, String)> {
    let record = fetch_record(&state, id).await?;

    Ok(seed_from_record(record).render_block())
}

/// Decode, crop, and OCR-rank one uploaded screenshot
async fn crop_and_rank(
    state: &ApiState,
    request: &UploadRequest,
) -> Result<(Vec<u8>, String), (StatusCode, String)> {
    let image_bytes =
        decode_data_uri(&request.image_uri).map_err(|e| (preprocess_status(&e), e.to_string()))?;

    let crop = preprocess_image(
        &image_bytes,
        Point::new(
            request.element_center_x as i32,
            request.element_center_y as i32,
        ),
        Size::new(request.element_width as i32, request.element_height as i32),
        Size::new(request.window_width as i32, request.window_height as i32),
    )
    .map_err(|e| (preprocess_status(&e), e.to_string()))?;
    debug!("screenshot cropped in memory");

    let ocr_summary = ocr_and_rank(state.ocr.as_ref(), &crop.jpeg_data, crop.adjusted_center)
        .await
        .map_err(|e| (ocr_status(&e), e.to_string()))?;
    debug!("image ocr complete");

    Ok((crop.jpeg_data, ocr_summary))
}

fn seed_from_record(record: StoredRecord) -> SeedExample {
    SeedExample {
        id: record.id,
        outer_html: record.outer_html,
        ocr_summary: record.image_ocr_data,
        label: record.inference,
    }
}

async fn fetch_record(state: &ApiState, id: i64) -> Result<StoredRecord, (StatusCode, String)> {
    state
        .store
        .get(id)
        .await
        .map_err(|e| (storage_status(&e), e.to_string()))?
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("record {id} not found")))
}

fn validate_geometry(request: &UploadRequest) -> Result<(), (StatusCode, String)> {
    let values = [
        request.element_center_x,
        request.element_center_y,
        request.element_width,
        request.element_height,
        request.window_width,
        request.window_height,
    ];

    if values.iter().any(|value| !(*value >= 0.0)) {
        debug!("received malformed upload geometry");
        return Err((
            StatusCode::BAD_REQUEST,
            "Malformed upload: geometry fields must be non-negative".to_string(),
        ));
    }
    Ok(())
}

fn required<'a>(value: Option<&'a str>, name: &str) -> Result<&'a str, (StatusCode, String)> {
    match value {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err((
            StatusCode::BAD_REQUEST,
            format!("Malformed request: {name} is required"),
        )),
    }
}

fn preprocess_status(err: &PreprocessError) -> StatusCode {
    match err {
        PreprocessError::InvalidDataUri
        | PreprocessError::Base64(_)
        | PreprocessError::ImageDecode(_) => StatusCode::BAD_REQUEST,
        PreprocessError::ImageEncode(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn ocr_status(err: &OcrError) -> StatusCode {
    match err {
        OcrError::Serialize(_) | OcrError::MissingEnv(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_GATEWAY,
    }
}

fn inference_status(err: &InferenceError) -> StatusCode {
    match err {
        InferenceError::PromptTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
        InferenceError::PromptBuild(_) | InferenceError::MissingEnv(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        _ => StatusCode::BAD_GATEWAY,
    }
}

fn storage_status(err: &StorageError) -> StatusCode {
    match err {
        StorageError::NotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
