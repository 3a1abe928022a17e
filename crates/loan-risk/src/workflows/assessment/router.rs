use std::io::Cursor;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::Local;
use serde::Deserialize;
use serde_json::json;

use super::repository::{AssessmentId, AssessmentRepository, RepositoryError, UploadMetadata};
use super::service::{AssessmentServiceError, RiskAssessmentService};

const DEFAULT_HISTORY_LIMIT: usize = 20;

/// Upload payload accepted by the assessment endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct AssessmentSubmission {
    pub uploaded_by: String,
    pub filename: String,
    pub csv: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct HistoryQuery {
    pub(crate) limit: Option<usize>,
}

/// Router builder exposing HTTP endpoints for uploads and stored assessments.
pub fn assessment_router<R>(service: Arc<RiskAssessmentService<R>>) -> Router
where
    R: AssessmentRepository + 'static,
{
    Router::new()
        .route("/api/v1/risk/assessments", post(submit_handler::<R>))
        .route(
            "/api/v1/risk/assessments/:assessment_id",
            get(fetch_handler::<R>),
        )
        .route("/api/v1/risk/uploads", get(history_handler::<R>))
        .with_state(service)
}

pub(crate) async fn submit_handler<R>(
    State(service): State<Arc<RiskAssessmentService<R>>>,
    axum::Json(submission): axum::Json<AssessmentSubmission>,
) -> Response
where
    R: AssessmentRepository + 'static,
{
    let AssessmentSubmission {
        uploaded_by,
        filename,
        csv,
    } = submission;
    let upload = UploadMetadata {
        uploaded_by,
        filename,
        uploaded_at: Local::now().naive_local(),
    };

    match service.assess(upload, Cursor::new(csv.into_bytes())) {
        Ok(record) => (StatusCode::CREATED, axum::Json(record.view())).into_response(),
        Err(
            error @ (AssessmentServiceError::Upload(_) | AssessmentServiceError::Scoring(_)),
        ) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Err(AssessmentServiceError::Repository(RepositoryError::Conflict)) => {
            let payload = json!({
                "error": "assessment already exists",
            });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn fetch_handler<R>(
    State(service): State<Arc<RiskAssessmentService<R>>>,
    Path(assessment_id): Path<String>,
) -> Response
where
    R: AssessmentRepository + 'static,
{
    let id = AssessmentId(assessment_id);
    match service.get(&id) {
        Ok(record) => (StatusCode::OK, axum::Json(record.view())).into_response(),
        Err(AssessmentServiceError::Repository(RepositoryError::NotFound)) => {
            let payload = json!({
                "error": format!("assessment {} not found", id.0),
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn history_handler<R>(
    State(service): State<Arc<RiskAssessmentService<R>>>,
    Query(query): Query<HistoryQuery>,
) -> Response
where
    R: AssessmentRepository + 'static,
{
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    match service.history(limit) {
        Ok(entries) => (StatusCode::OK, axum::Json(entries)).into_response(),
        Err(other) => internal_error(other),
    }
}

fn internal_error(error: AssessmentServiceError) -> Response {
    let payload = json!({
        "error": error.to_string(),
    });
    (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
}
