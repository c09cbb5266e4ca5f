use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use sterling_convert::{to_csv, to_qif, Converter};
use sterling_core::{ParseTier, ParsedStatement};
use sterling_extract::RawDocument;

use crate::auth::Authenticator;
use crate::config::ServerConfig;
use crate::jobs::JobTracker;
use crate::usage::UsageGate;

pub struct AppState {
    pub converter: Arc<Converter>,
    pub auth: Arc<dyn Authenticator>,
    pub gate: Arc<dyn UsageGate>,
    pub jobs: Arc<dyn JobTracker>,
    pub config: ServerConfig,
}

pub fn router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.max_upload_bytes;
    Router::new()
        .route("/convert", post(convert))
        .route("/healthz", get(|| async { "ok" }))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConvertResponse {
    success: bool,
    job_id: Uuid,
    statement: ParsedStatement,
    tier: ParseTier,
    confidence: f32,
    warnings: Vec<String>,
    csv: String,
    qif: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorResponse {
    success: bool,
    error_kind: String,
    message: String,
}

fn error_response(status: StatusCode, kind: &str, message: &str) -> Response {
    let body = ErrorResponse {
        success: false,
        error_kind: kind.to_string(),
        message: message.to_string(),
    };
    (status, Json(body)).into_response()
}

async fn convert(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    let caller = match state.auth.authenticate(bearer) {
        Ok(caller) => caller,
        Err(e) => return error_response(StatusCode::UNAUTHORIZED, "unauthorized", &e.to_string()),
    };
    if let Err(e) = state.gate.check_and_count(&caller) {
        return error_response(StatusCode::TOO_MANY_REQUESTS, "limit-exceeded", &e.to_string());
    }

    let filename = headers
        .get("x-filename")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("upload.pdf")
        .to_string();
    let mime = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();

    let job_id = Uuid::new_v4();
    state.jobs.mark_processing(job_id);

    let doc = RawDocument::new(body.to_vec(), filename, mime);
    let converter = state.converter.clone();
    let work = tokio::task::spawn_blocking(move || converter.convert(&doc));
    let timeout = Duration::from_secs(state.config.convert_timeout_secs);

    match tokio::time::timeout(timeout, work).await {
        Err(_) => {
            // Treated the same as an unreadable document: no partial output.
            state.jobs.mark_failed(job_id, "conversion timed out");
            error_response(
                StatusCode::UNPROCESSABLE_ENTITY,
                "extraction-failed",
                "conversion timed out",
            )
        }
        Ok(Err(join_err)) => {
            state.jobs.mark_failed(job_id, "conversion task aborted");
            tracing::error!("conversion task aborted: {join_err}");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal",
                "conversion task aborted",
            )
        }
        Ok(Ok(Err(e))) => {
            state.jobs.mark_failed(job_id, &e.to_string());
            error_response(StatusCode::UNPROCESSABLE_ENTITY, e.kind(), &e.to_string())
        }
        Ok(Ok(Ok(conversion))) => {
            let transactions = conversion.statement.total_transactions();
            state.jobs.mark_completed(job_id, transactions);
            let body = ConvertResponse {
                success: true,
                job_id,
                csv: to_csv(&conversion.statement.transactions),
                qif: to_qif(&conversion.statement.transactions),
                tier: conversion.tier,
                confidence: conversion.confidence,
                warnings: conversion.warnings,
                statement: conversion.statement,
            };
            (StatusCode::OK, Json(body)).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticTokens;
    use crate::jobs::InMemoryJobs;
    use crate::usage::DailyQuota;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn test_state(tokens: Vec<String>) -> Arc<AppState> {
        Arc::new(AppState {
            converter: Arc::new(Converter::default()),
            auth: Arc::new(StaticTokens::new(tokens)),
            gate: Arc::new(DailyQuota::new(100)),
            jobs: Arc::new(InMemoryJobs::new()),
            config: ServerConfig::default(),
        })
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn healthz_responds() {
        let app = router(test_state(Vec::new()));
        let response = app
            .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn missing_token_is_unauthorized_when_tokens_configured() {
        let app = router(test_state(vec!["tok-1".to_string()]));
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/convert")
                    .body(Body::from("01/03/2024,TESCO,-12.50\n"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let json = body_json(response).await;
        assert_eq!(json["success"], false);
    }

    #[tokio::test]
    async fn csv_upload_converts_end_to_end() {
        let app = router(test_state(Vec::new()));
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/convert")
                    .header("content-type", "text/csv")
                    .header("x-filename", "statement.csv")
                    .body(Body::from("01/03/2024,TESCO STORE,-12.50\n"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["tier"], "universal");
        assert_eq!(json["statement"]["transactions"][0]["description"], "TESCO STORE");
        assert!(json["csv"].as_str().unwrap().starts_with("Date,Description"));
        assert!(json["qif"].as_str().unwrap().starts_with("!Type:Bank"));
    }

    #[tokio::test]
    async fn prose_upload_reports_no_transactions() {
        let app = router(test_state(Vec::new()));
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/convert")
                    .header("content-type", "text/plain")
                    .body(Body::from("nothing statement-shaped in here"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json = body_json(response).await;
        assert_eq!(json["errorKind"], "no-transactions-found");
    }

    #[tokio::test]
    async fn quota_exhaustion_is_rate_limited() {
        let state = Arc::new(AppState {
            converter: Arc::new(Converter::default()),
            auth: Arc::new(StaticTokens::new(Vec::new())),
            gate: Arc::new(DailyQuota::new(1)),
            jobs: Arc::new(InMemoryJobs::new()),
            config: ServerConfig::default(),
        });
        let request = || {
            Request::builder()
                .method("POST")
                .uri("/convert")
                .header("content-type", "text/csv")
                .body(Body::from("01/03/2024,TESCO,-12.50\n"))
                .unwrap()
        };
        let first = router(state.clone()).oneshot(request()).await.unwrap();
        assert_eq!(first.status(), StatusCode::OK);
        let second = router(state).oneshot(request()).await.unwrap();
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    }
}
