use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use pdpscout_core::CustomStore;
use pdpscout_scraper::{JobProgress, JobTicket};
use serde::Deserialize;
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct CreateJobRequest {
    identifiers: Vec<String>,
    /// Catalog slugs; the whole catalog when absent or empty.
    #[serde(default)]
    stores: Vec<String>,
    #[serde(default)]
    custom_stores: Vec<CustomStore>,
}

fn parse_job_id(request_id: &str, raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| job_not_found(request_id, raw))
}

fn job_not_found(request_id: &str, raw: &str) -> ApiError {
    ApiError::new(request_id, "not_found", format!("job '{raw}' not found"))
}

pub(super) async fn create_job(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CreateJobRequest>,
) -> Result<(StatusCode, Json<ApiResponse<JobTicket>>), ApiError> {
    if body.identifiers.is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "identifiers must not be empty",
        ));
    }

    let stores = pdpscout_core::select_stores(&state.catalog, &body.stores, &body.custom_stores)
        .map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.to_string()))?;

    let ticket = state
        .jobs
        .start(Arc::clone(&state.engine), body.identifiers, stores)
        .map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.to_string()))?;

    Ok((
        StatusCode::ACCEPTED,
        Json(ApiResponse {
            data: ticket,
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

pub(super) async fn get_job(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(job_id): Path<String>,
) -> Result<Json<ApiResponse<JobProgress>>, ApiError> {
    let id = parse_job_id(&req_id.0, &job_id)?;
    let progress = state
        .jobs
        .progress(id)
        .ok_or_else(|| job_not_found(&req_id.0, &job_id))?;

    Ok(Json(ApiResponse {
        data: progress,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn get_job_result(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(job_id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_job_id(&req_id.0, &job_id)?;
    let table = match state.jobs.result(id) {
        Some(table) => table,
        None if state.jobs.progress(id).is_some() => {
            return Err(ApiError::new(
                req_id.0,
                "not_found",
                format!("job '{job_id}' has no result yet"),
            ));
        }
        None => return Err(job_not_found(&req_id.0, &job_id)),
    };

    Ok(Json(ApiResponse {
        data: table.as_ref(),
        meta: ResponseMeta::new(req_id.0),
    })
    .into_response())
}
