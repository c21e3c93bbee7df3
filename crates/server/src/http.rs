//! HTTP Endpoints
//!
//! REST API wiring the pipeline and Annotation Store to the routes in §6.

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::error::ServerError;
use crate::metrics::{record_degraded_activation, record_request, record_stage_latency};
use crate::state::AppState;
use net_est_core::{AuditEntry, Span, StrategyCode, StrategyPrediction};
use net_est_store::ExportFormat;

pub fn create_router(state: AppState) -> Router {
    let cors_layer = build_cors_layer(&state.settings.server.cors_origins);

    Router::new()
        .route("/sessions", post(submit_session))
        .route("/sessions/:id/annotations", get(list_annotations).post(create_annotation))
        .route("/sessions/:id/annotations/:sid/accept", post(accept_annotation))
        .route("/sessions/:id/annotations/:sid/reject", post(reject_annotation))
        .route("/sessions/:id/annotations/:sid/code", post(modify_code))
        .route("/sessions/:id/annotations/:sid/span", post(modify_span))
        .route("/sessions/:id/annotations/:sid/audit", get(annotation_audit))
        .route("/sessions/:id/export", get(export_session))
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics_handler))
        .layer(middleware::from_fn(record_request_metrics))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}

async fn record_request_metrics(request: Request, next: Next) -> axum::response::Response {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let response = next.run(request).await;
    record_request(&method, &path, response.status().as_u16());
    response
}

fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        tracing::info!("no CORS origins configured, restricting to localhost");
        return CorsLayer::new()
            .allow_origin("http://localhost:3000".parse::<HeaderValue>().unwrap())
            .allow_methods([Method::GET, Method::POST])
            .allow_headers(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!(origin, "invalid CORS origin, skipping");
                None
            })
        })
        .collect();

    CorsLayer::new()
        .allow_origin(parsed)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
}

#[derive(Debug, Deserialize)]
struct SubmitRequest {
    source_text: String,
    target_text: String,
}

async fn submit_session(State(state): State<AppState>, Json(request): Json<SubmitRequest>) -> Result<Json<serde_json::Value>, ServerError> {
    let session_id = Uuid::new_v4().to_string();
    let outcome = state.orchestrator.run(&session_id, &request.source_text, &request.target_text).await?;

    for step in &outcome.steps {
        record_stage_latency(stage_metric_name(&step.name), step.duration_ms);
    }
    if outcome.degraded {
        record_degraded_activation();
    }

    Ok(Json(serde_json::to_value(outcome).expect("PipelineOutcome always serializes")))
}

fn stage_metric_name(name: &str) -> &'static str {
    match name {
        "preprocess_source" => "preprocess_source",
        "preprocess_target" => "preprocess_target",
        "align" => "align",
        "classify" => "classify",
        _ => "unknown",
    }
}

async fn list_annotations(State(state): State<AppState>, Path(session_id): Path<String>) -> Result<Json<Vec<StrategyPrediction>>, ServerError> {
    Ok(Json(state.store.list_visible(&session_id).await?))
}

#[derive(Debug, Deserialize)]
struct CreateAnnotationRequest {
    code: StrategyCode,
    target_offsets: Vec<Span>,
    comment: Option<String>,
}

async fn create_annotation(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<CreateAnnotationRequest>,
) -> Result<Json<StrategyPrediction>, ServerError> {
    let prediction = state.store.create(&session_id, request.code, request.target_offsets, request.comment).await?;
    Ok(Json(prediction))
}

async fn accept_annotation(State(state): State<AppState>, Path((session_id, strategy_id)): Path<(String, Uuid)>) -> Result<Json<AuditEntry>, ServerError> {
    Ok(Json(state.store.accept(&session_id, strategy_id).await?))
}

async fn reject_annotation(State(state): State<AppState>, Path((session_id, strategy_id)): Path<(String, Uuid)>) -> Result<Json<AuditEntry>, ServerError> {
    Ok(Json(state.store.reject(&session_id, strategy_id).await?))
}

#[derive(Debug, Deserialize)]
struct ModifyCodeRequest {
    code: StrategyCode,
}

async fn modify_code(
    State(state): State<AppState>,
    Path((session_id, strategy_id)): Path<(String, Uuid)>,
    Json(request): Json<ModifyCodeRequest>,
) -> Result<Json<AuditEntry>, ServerError> {
    Ok(Json(state.store.modify_code(&session_id, strategy_id, request.code).await?))
}

#[derive(Debug, Deserialize)]
struct ModifySpanRequest {
    target_offsets: Vec<Span>,
}

async fn modify_span(
    State(state): State<AppState>,
    Path((session_id, strategy_id)): Path<(String, Uuid)>,
    Json(request): Json<ModifySpanRequest>,
) -> Result<Json<AuditEntry>, ServerError> {
    Ok(Json(state.store.modify_span(&session_id, strategy_id, request.target_offsets).await?))
}

async fn annotation_audit(State(state): State<AppState>, Path((session_id, strategy_id)): Path<(String, Uuid)>) -> Result<Json<Vec<AuditEntry>>, ServerError> {
    Ok(Json(state.store.audit(&session_id, strategy_id).await?))
}

#[derive(Debug, Deserialize)]
struct ExportQuery {
    format: String,
}

async fn export_session(State(state): State<AppState>, Path(session_id): Path<String>, Query(query): Query<ExportQuery>) -> Result<impl IntoResponse, ServerError> {
    let format = match query.format.as_str() {
        "jsonl" => ExportFormat::Jsonl,
        "csv" => ExportFormat::Csv,
        other => return Err(ServerError::InvalidQuery(format!("unknown export format '{other}'"))),
    };
    let content_type = match format {
        ExportFormat::Jsonl => "application/x-ndjson",
        ExportFormat::Csv => "text/csv",
    };

    let body = state.store.export(&session_id, format).await?;
    Ok(([(header::CONTENT_TYPE, content_type)], body))
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    embedder_mode: &'static str,
    persistence_backend: String,
}

async fn healthz(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let embedder_mode = if state.embedding.is_degraded() { "degraded" } else { "onnx" };
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok",
            embedder_mode,
            persistence_backend: format!("{:?}", state.settings.persistence.backend),
        }),
    )
}

async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], state.metrics_handle.render())
}

#[cfg(test)]
mod tests {
    use super::*;
    use net_est_config::Settings;
    use net_est_embedding::EmbeddingService;
    use net_est_store::FilesystemStore;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn net_est_store::AnnotationStore> = Arc::new(FilesystemStore::new(dir.path()).unwrap());
        let embedding = Arc::new(EmbeddingService::degraded(16));
        let handle = metrics_exporter_prometheus::PrometheusBuilder::new().build_recorder().handle();
        AppState::new(Settings::default(), embedding, store, handle)
    }

    #[tokio::test]
    async fn healthz_reports_degraded_embedder() {
        let app = create_router(test_state());
        let response = app
            .oneshot(axum::http::Request::builder().uri("/healthz").body(axum::body::Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn submit_then_list_round_trips() {
        let app = create_router(test_state());
        let body = serde_json::json!({
            "source_text": "A administracao publica estabeleceu criterios rigorosos para a concessao de beneficios.",
            "target_text": "O governo fez regras rigidas para dar beneficios.",
        });
        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .method("POST")
                    .uri("/sessions")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(axum::body::Body::from(serde_json::to_vec(&body).unwrap()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn export_rejects_unknown_format() {
        let app = create_router(test_state());
        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .uri("/sessions/missing/export?format=xml")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
