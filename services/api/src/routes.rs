use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use loan_risk::error::AppError;
use loan_risk::workflows::assessment::report::views::{
    GroupScoreEntry, HistogramBin, RiskSummaryView,
};
use loan_risk::workflows::assessment::report::{average_score_by, score_histogram};
use loan_risk::workflows::assessment::{
    assessment_router, AssessmentRepository, DegradedScoring, Prediction, RiskAssessmentService,
    RiskFlag, RiskSummary, ScoredRecord,
};
use loan_risk::workflows::upload::ApplicantImporter;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io::Cursor;
use std::sync::Arc;

const DEFAULT_HISTOGRAM_BINS: usize = 10;

#[derive(Debug, Deserialize)]
pub(crate) struct ScoreRequest {
    pub(crate) csv: String,
    /// Column whose values group the average-score breakdown.
    #[serde(default)]
    pub(crate) group_by: Option<String>,
    #[serde(default)]
    pub(crate) histogram_bins: Option<usize>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ScoreResponse {
    pub(crate) summary: RiskSummaryView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) degraded: Option<DegradedScoring>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) groups: Option<Vec<GroupScoreEntry>>,
    pub(crate) histogram: Vec<HistogramBin>,
    pub(crate) records: Vec<ScoredRecord>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PredictionRequest {
    pub(crate) csv: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct PredictionResponse {
    pub(crate) total_records: usize,
    pub(crate) risky_records: usize,
    pub(crate) predictions: Vec<Prediction>,
}

pub(crate) fn with_risk_routes<R>(service: Arc<RiskAssessmentService<R>>) -> axum::Router
where
    R: AssessmentRepository + 'static,
{
    assessment_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route("/api/v1/risk/score", axum::routing::post(score_endpoint))
        .route(
            "/api/v1/risk/predictions",
            axum::routing::post(prediction_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready", "classifier_loaded": state.classifier.is_some() })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn score_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<ScoreRequest>,
) -> Result<Json<ScoreResponse>, AppError> {
    let ScoreRequest {
        csv,
        group_by,
        histogram_bins,
    } = payload;

    let table = ApplicantImporter::from_reader(Cursor::new(csv.into_bytes()))?;
    let report = state.engine.score(&table)?;

    let summary = RiskSummary::from_records(&report.records).view();
    let groups = group_by.map(|column| average_score_by(&report.records, &column));
    let histogram = score_histogram(
        &report.records,
        histogram_bins.unwrap_or(DEFAULT_HISTOGRAM_BINS),
    );

    Ok(Json(ScoreResponse {
        summary,
        degraded: report.degraded,
        groups,
        histogram,
        records: report.records,
    }))
}

pub(crate) async fn prediction_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<PredictionRequest>,
) -> Result<Json<PredictionResponse>, AppError> {
    let classifier = state.classifier.as_ref().ok_or(AppError::ModelUnavailable)?;

    let table = ApplicantImporter::from_reader(Cursor::new(payload.csv.into_bytes()))?;
    let predictions = classifier.predict(&table)?;
    let risky_records = predictions
        .iter()
        .filter(|prediction| prediction.flag == RiskFlag::Risky)
        .count();

    Ok(Json(PredictionResponse {
        total_records: predictions.len(),
        risky_records,
        predictions,
    }))
}
