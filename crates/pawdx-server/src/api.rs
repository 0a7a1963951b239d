use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusHandle;
use pawdx_schema::{DiagnosisRecord, DiagnosisRequest, DiagnosisResponse, DiseaseCatalogEntry, FollowUpRequest, FollowUpResponse, SymptomRecord};
use serde::Serialize;
use tracing::Instrument;
use uuid::Uuid;

use crate::engine::Engine;
use crate::explainer::Explainer;
use crate::store::DiagnosisStore;

pub const UNANALYZABLE_MESSAGE: &str = "Unable to analyze the provided symptoms. Please ensure you've entered valid symptoms and try again.";

/// Everything a request handler needs, built once in `main`.
pub struct AppContext {
    pub engine: Engine,
    pub store: DiagnosisStore,
    pub explainer: Explainer,
    pub metrics: Option<PrometheusHandle>,
}

type Ctx = State<Arc<AppContext>>;

#[derive(Debug, Serialize)]
pub struct ErrorBody { pub code: &'static str, pub message: String }

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Unable to analyze the provided symptoms")]
    Unanalyzable,
    #[error("Not found: {0}")]
    NotFound(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Unanalyzable => (StatusCode::BAD_REQUEST, "UNANALYZABLE"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        };
        let message = match self {
            ApiError::BadRequest(m) | ApiError::NotFound(m) => m,
            ApiError::Unanalyzable => UNANALYZABLE_MESSAGE.to_string(),
        };
        (status, Json(ErrorBody { code, message })).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(r: JsonRejection) -> Self { ApiError::BadRequest(format!("Invalid request data: {}", r.body_text())) }
}

pub fn router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/healthz", get(|| async { "ok" }))
        .route("/metrics", get(metrics_handler))
        .route("/api/symptoms", get(list_symptoms))
        .route("/api/symptoms/search", get(search_symptoms))
        .route("/api/diagnose", post(diagnose))
        .route("/api/follow-up", post(follow_up))
        .route("/api/diseases", get(list_diseases))
        .route("/api/diseases/:name", get(disease_detail))
        .route("/api/diagnoses/:id", get(diagnosis_detail))
        .with_state(ctx)
}

async fn metrics_handler(State(ctx): Ctx) -> String {
    ctx.metrics.as_ref().map(|h| h.render()).unwrap_or_default()
}

async fn list_symptoms(State(ctx): Ctx) -> Json<Vec<SymptomRecord>> { Json(ctx.engine.symptoms().to_vec()) }

async fn search_symptoms(State(ctx): Ctx, Query(params): Query<HashMap<String, String>>) -> Result<Json<Vec<SymptomRecord>>, ApiError> {
    let q = params.get("q").filter(|q| !q.is_empty()).ok_or_else(|| ApiError::BadRequest("Query parameter 'q' is required".into()))?;
    counter!("symptom_searches_total").increment(1);
    let hits = ctx.engine.search(q);
    tracing::debug!(query = %q, hits = hits.len(), "symptom search");
    Ok(Json(hits))
}

async fn diagnose(State(ctx): Ctx, body: Result<Json<DiagnosisRequest>, JsonRejection>) -> Result<Json<DiagnosisResponse>, ApiError> {
    let Json(req) = body?;
    req.validate().map_err(|e| ApiError::BadRequest(format!("Invalid request data: {e}")))?;
    let span = tracing::info_span!("diagnose", symptoms = req.symptoms.len(), follow_up = req.follow_up_question.is_some());
    async move {
        let predictions = ctx.engine.diagnose(&req.symptoms);
        if predictions.is_empty() {
            counter!("diagnoses_total", "outcome" => "unanalyzable").increment(1);
            tracing::info!("no qualifying predictions");
            return Err(ApiError::Unanalyzable);
        }
        counter!("diagnoses_total", "outcome" => "ok").increment(1);
        histogram!("diagnosis_predictions").record(predictions.len() as f64);
        histogram!("diagnosis_top_confidence").record(predictions[0].confidence);
        tracing::info!(top = %predictions[0].disease, confidence = predictions[0].confidence, "diagnosis ranked");

        let chat_response = ctx.explainer.chat_response(&req.symptoms, &predictions, req.follow_up_question.as_deref()).await;
        let record = ctx.store.create(req.symptoms, predictions, chat_response).await;
        gauge!("diagnoses_stored").set(ctx.store.len().await as f64);
        Ok(Json(DiagnosisResponse { chat_response: record.chat_response, predictions: record.predictions, follow_up_available: true, diagnosis_id: record.id }))
    }.instrument(span).await
}

async fn follow_up(State(ctx): Ctx, body: Result<Json<FollowUpRequest>, JsonRejection>) -> Result<Json<FollowUpResponse>, ApiError> {
    let Json(req) = body?;
    let (Some(symptoms), Some(predictions), Some(question)) = (req.symptoms, req.predictions, req.question.filter(|q| !q.trim().is_empty())) else {
        return Err(ApiError::BadRequest("Missing required fields: symptoms, predictions, and question".into()));
    };
    let chat_response = ctx.explainer.chat_response(&symptoms, &predictions, Some(question.as_str()))
        .instrument(tracing::info_span!("follow_up", symptoms = symptoms.len())).await;
    Ok(Json(FollowUpResponse { chat_response }))
}

async fn list_diseases(State(ctx): Ctx) -> Json<Vec<DiseaseCatalogEntry>> { Json(ctx.engine.diseases().to_vec()) }

async fn disease_detail(State(ctx): Ctx, Path(name): Path<String>) -> Result<Json<DiseaseCatalogEntry>, ApiError> {
    ctx.engine.disease_by_name(&name).cloned().map(Json).ok_or_else(|| ApiError::NotFound(format!("No disease named {name}")))
}

async fn diagnosis_detail(State(ctx): Ctx, Path(id): Path<String>) -> Result<Json<DiagnosisRecord>, ApiError> {
    let not_found = || ApiError::NotFound(format!("No diagnosis {id}"));
    let uuid = Uuid::parse_str(&id).map_err(|_| not_found())?;
    ctx.store.get(&uuid).await.map(Json).ok_or_else(not_found)
}
