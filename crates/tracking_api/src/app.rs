use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::error;
use uuid::Uuid;
use validator::Validate;

use tracking_model::{
    QueryResponse, SmsDocumentPayload, SmsDocumentState, SmsTransferPayload, SmsTransferState,
};
use tracking_storage::{
    DocumentRepository, StoreError, TrackingStore, TransferRepository, UnitOfWork,
};

type ApiError = (StatusCode, Json<Value>);

#[derive(Clone)]
pub struct AppState {
    pub store: TrackingStore,
}

impl AppState {
    pub fn new(store: TrackingStore) -> Self {
        Self { store }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health/live", get(health_live))
        .route(
            "/tracking/sms_transfers",
            get(list_transfer_batches).post(create_transfer_batch),
        )
        .route(
            "/tracking/sms_transfers/{ubid}",
            delete(delete_transfer_batch),
        )
        .route(
            "/tracking/sms_transfers/{ubid}/{state}",
            put(update_transfer_batch_state),
        )
        .route("/tracking/sms_documents", post(create_batch_documents))
        .route(
            "/tracking/sms_documents/{ubid}",
            get(count_batch_documents),
        )
        .route(
            "/tracking/sms_documents/{ubid}/{state}",
            put(update_batch_documents_state),
        )
        .with_state(state)
}

async fn health_live() -> impl IntoResponse {
    Json(json!({
        "status": "live",
        "timestamp": Utc::now().to_rfc3339()
    }))
}

async fn create_transfer_batch(
    State(state): State<AppState>,
    Json(payload): Json<SmsTransferPayload>,
) -> Result<impl IntoResponse, ApiError> {
    validate_payload(&payload)?;

    let mut work = UnitOfWork::<TransferRepository>::begin(&state.store)
        .await
        .map_err(internal_error)?;
    work.repository().create(&payload).await.map_err(|err| {
        write_error(
            err,
            format!("Failed upsert of UBID '{}' in table sms_transfers", payload.ubid),
        )
    })?;
    work.commit().await.map_err(internal_error)?;

    Ok((StatusCode::CREATED, Json(payload)))
}

async fn list_transfer_batches(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let mut work = UnitOfWork::<TransferRepository>::begin(&state.store)
        .await
        .map_err(internal_error)?;
    let batches = work
        .repository()
        .read_all()
        .await
        .map_err(internal_error)?;
    work.commit().await.map_err(internal_error)?;

    Ok((StatusCode::OK, Json(batches)))
}

async fn update_transfer_batch_state(
    State(state): State<AppState>,
    Path((ubid, transfer_state)): Path<(Uuid, SmsTransferState)>,
) -> Result<impl IntoResponse, ApiError> {
    let mut work = UnitOfWork::<TransferRepository>::begin(&state.store)
        .await
        .map_err(internal_error)?;

    let Some(mut row) = work.repository().read(ubid).await.map_err(internal_error)? else {
        return Err(not_found(format!(
            "UBID '{ubid}' is not found in table sms_transfers"
        )));
    };

    work.repository()
        .update_state(ubid, transfer_state)
        .await
        .map_err(internal_error)?;
    work.repository()
        .refresh(&mut row)
        .await
        .map_err(internal_error)?;
    work.commit().await.map_err(internal_error)?;

    Ok((StatusCode::OK, Json(row)))
}

async fn delete_transfer_batch(
    State(state): State<AppState>,
    Path(ubid): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut work = UnitOfWork::<TransferRepository>::begin(&state.store)
        .await
        .map_err(internal_error)?;
    let removed = work
        .repository()
        .delete(ubid)
        .await
        .map_err(internal_error)?;
    work.commit().await.map_err(internal_error)?;

    if removed == 0 {
        return Err(not_found(format!(
            "UBID '{ubid}' is not found in table sms_transfers"
        )));
    }

    Ok(StatusCode::NO_CONTENT)
}

async fn create_batch_documents(
    State(state): State<AppState>,
    Json(payload): Json<SmsDocumentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    validate_payload(&payload)?;

    let mut work = UnitOfWork::<DocumentRepository>::begin(&state.store)
        .await
        .map_err(internal_error)?;
    let count = work.repository().create(&payload).await.map_err(|err| {
        write_error(
            err,
            format!(
                "Failed upsert of UBID '{}' document(s) in table sms_documents",
                payload.ubid
            ),
        )
    })?;
    work.commit().await.map_err(internal_error)?;

    let result = format!(
        "Inserted {count} document(s) for UBID '{}' in table sms_documents",
        payload.ubid
    );
    Ok((StatusCode::CREATED, Json(QueryResponse { result })))
}

async fn count_batch_documents(
    State(state): State<AppState>,
    Path(ubid): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut work = UnitOfWork::<DocumentRepository>::begin(&state.store)
        .await
        .map_err(internal_error)?;
    let count = work
        .repository()
        .count(ubid)
        .await
        .map_err(internal_error)?;
    work.commit().await.map_err(internal_error)?;

    if count == 0 {
        return Err(not_found(format!(
            "UBID '{ubid}' not found in table sms_documents"
        )));
    }

    let result =
        format!("Found {count} document(s) for UBID '{ubid}' in table sms_documents");
    Ok((StatusCode::OK, Json(QueryResponse { result })))
}

async fn update_batch_documents_state(
    State(state): State<AppState>,
    Path((ubid, document_state)): Path<(Uuid, SmsDocumentState)>,
) -> Result<impl IntoResponse, ApiError> {
    let mut work = UnitOfWork::<DocumentRepository>::begin(&state.store)
        .await
        .map_err(internal_error)?;
    let count = work
        .repository()
        .update_state(ubid, document_state)
        .await
        .map_err(internal_error)?;
    work.commit().await.map_err(internal_error)?;

    if count == 0 {
        return Err(not_found(format!(
            "UBID '{ubid}' not found in table sms_documents"
        )));
    }

    let result = format!(
        "Updated state to '{document_state}' in {count} row(s) for UBID '{ubid}' in table sms_documents"
    );
    Ok((StatusCode::OK, Json(QueryResponse { result })))
}

fn validate_payload<T: Validate>(payload: &T) -> Result<(), ApiError> {
    payload.validate().map_err(|err| {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "detail": err.to_string() })),
        )
    })
}

fn write_error(error: StoreError, detail: String) -> ApiError {
    if error.is_integrity() {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "detail": format!("{detail} => {error}") })),
        )
    } else {
        internal_error(error)
    }
}

fn not_found(detail: String) -> ApiError {
    (StatusCode::NOT_FOUND, Json(json!({ "detail": detail })))
}

fn internal_error(error: StoreError) -> ApiError {
    error!(error = %error, "request failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "internal_error", "detail": error.to_string() })),
    )
}
