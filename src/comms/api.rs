//! Axum handlers for the `/api/*` routes.
//!
//! Each handler receives [`HttpState`] via [`axum::extract::State`] and
//! returns an axum [`Response`]. Model-facing work is wrapped in a
//! per-request timeout; mutating requests hold the per-garden lock across
//! their load → mutate → save span.

use std::time::Duration;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use crate::advisor::GardenAdvisor;
use crate::error::AppError;
use crate::llm::{LlmClient, ProviderError, providers};
use crate::memory::{Anchor, GardenMemory};

use super::HttpState;

/// Upper bound for one model-facing request, end to end.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Fixed plant-health prompt for image analysis requests.
const ANALYSIS_PROMPT: &str = "You are Indigo, an expert gardening AI. Analyze this plant image and provide:\n\
1. Plant identification (if possible)\n\
2. Health assessment (healthy, stressed, diseased, pest damage, etc.)\n\
3. Specific observations (leaf color, spots, wilting, etc.)\n\
4. Recommended actions (if any issues detected)\n\
\n\
Be concise but thorough.";

// ── Request types ─────────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ChatRequest {
    message: String,
    garden_name: String,
    provider: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct AnalyzeRequest {
    /// Base64-encoded JPEG bytes.
    image: String,
    garden_name: String,
    provider: Option<String>,
    description: Option<String>,
}

#[derive(Deserialize)]
pub(super) struct CreateGardenRequest {
    name: String,
    anchor: Anchor,
}

#[derive(Deserialize)]
pub(super) struct ReviewRequest {
    period: String,
    provider: Option<String>,
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Build a JSON error response body.
fn json_error(code: &str, msg: impl std::fmt::Display) -> Json<serde_json::Value> {
    Json(json!({ "error": code, "message": format!("{msg}") }))
}

/// Map an [`AppError`] onto a status code and JSON error body. All handler
/// failures funnel through here; only timeouts are mapped separately.
fn error_response(e: AppError) -> Response {
    let (status, code) = match &e {
        AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
        AppError::Provider(ProviderError::UnknownProvider(_) | ProviderError::MissingKey(_)) => {
            (StatusCode::BAD_REQUEST, "configuration")
        }
        AppError::Provider(_) => (StatusCode::BAD_GATEWAY, "provider"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "storage"),
    };
    if status.is_server_error() {
        warn!("request failed: {e}");
    }
    (status, json_error(code, e)).into_response()
}

/// Construct the model client for a request, defaulting to the configured
/// provider. Configuration failures are the client's fault: 400.
fn build_client(state: &HttpState, provider: Option<&str>) -> Result<LlmClient, Response> {
    let provider_id = provider.unwrap_or(&state.llm.default_provider);
    providers::build(provider_id, &state.keys, state.llm.timeout_seconds)
        .map_err(|e| error_response(e.into()))
}

fn timeout_error() -> Response {
    (
        StatusCode::GATEWAY_TIMEOUT,
        json_error("timeout", "model request timed out"),
    )
        .into_response()
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// GET /api
pub(super) async fn root() -> Response {
    (StatusCode::OK, Json(json!({ "message": "Indigo API is running" }))).into_response()
}

/// GET /api/gardens
pub(super) async fn list_gardens(State(state): State<HttpState>) -> Response {
    match state.store.list() {
        Ok(gardens) => (StatusCode::OK, Json(json!({ "gardens": gardens }))).into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /api/gardens/{name}
pub(super) async fn fetch_garden(
    State(state): State<HttpState>,
    Path(name): Path<String>,
) -> Response {
    match state.store.load(&name) {
        Ok(Some(memory)) => (StatusCode::OK, Json(memory)).into_response(),
        Ok(None) => error_response(AppError::NotFound(name)),
        Err(e) => error_response(e),
    }
}

/// POST /api/gardens
pub(super) async fn create_garden(
    State(state): State<HttpState>,
    Json(req): Json<CreateGardenRequest>,
) -> Response {
    if req.name.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            json_error("bad_request", "Missing required field: name"),
        )
            .into_response();
    }

    let lock = state.garden_lock(&req.name).await;
    let _guard = lock.lock().await;

    match state.store.load(&req.name) {
        Ok(Some(_)) => {
            return (
                StatusCode::CONFLICT,
                json_error("conflict", format!("garden '{}' already exists", req.name)),
            )
                .into_response();
        }
        Ok(None) => {}
        Err(e) => return error_response(e),
    }

    let memory = GardenMemory::new(req.name.clone(), req.anchor);
    match state.store.save(&req.name, &memory) {
        Ok(()) => (StatusCode::CREATED, Json(memory)).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /api/chat — journal the message, persist, then ask for advice.
pub(super) async fn chat(
    State(state): State<HttpState>,
    Json(req): Json<ChatRequest>,
) -> Response {
    if req.message.trim().is_empty() || req.garden_name.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            json_error("bad_request", "Missing required fields: message, gardenName"),
        )
            .into_response();
    }

    let llm = match build_client(&state, req.provider.as_deref()) {
        Ok(llm) => llm,
        Err(resp) => return resp,
    };

    let lock = state.garden_lock(&req.garden_name).await;
    let _guard = lock.lock().await;

    let mut memory = match state.store.load(&req.garden_name) {
        Ok(Some(memory)) => memory,
        Ok(None) => return error_response(AppError::NotFound(req.garden_name)),
        Err(e) => return error_response(e),
    };

    let appended = tokio::time::timeout(REQUEST_TIMEOUT, async {
        GardenAdvisor::new(&mut memory, &llm)
            .append_log_entry(&req.message)
            .await
    })
    .await;
    match appended {
        Ok(Ok(())) => {}
        Ok(Err(e)) => return error_response(e.into()),
        Err(_) => return timeout_error(),
    }

    // Persist the journal before asking for advice: a failed or timed-out
    // completion still leaves the entry recorded.
    if let Err(e) = state.store.save(&req.garden_name, &memory) {
        return error_response(e);
    }

    let advice = match tokio::time::timeout(
        REQUEST_TIMEOUT,
        GardenAdvisor::new(&mut memory, &llm).ask_advice(&req.message),
    )
    .await
    {
        Ok(Ok(advice)) => advice,
        Ok(Err(e)) => return error_response(e.into()),
        Err(_) => return timeout_error(),
    };

    (StatusCode::OK, Json(json!({ "response": advice }))).into_response()
}

/// POST /api/analyze — run the plant-health prompt over the image, journal
/// the analysis with fixed tags, persist, and return the analysis text.
pub(super) async fn analyze(
    State(state): State<HttpState>,
    Json(req): Json<AnalyzeRequest>,
) -> Response {
    if req.image.is_empty() || req.garden_name.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            json_error("bad_request", "Missing required fields: image, gardenName"),
        )
            .into_response();
    }

    let llm = match build_client(&state, req.provider.as_deref()) {
        Ok(llm) => llm,
        Err(resp) => return resp,
    };

    let lock = state.garden_lock(&req.garden_name).await;
    let _guard = lock.lock().await;

    let mut memory = match state.store.load(&req.garden_name) {
        Ok(Some(memory)) => memory,
        Ok(None) => return error_response(AppError::NotFound(req.garden_name)),
        Err(e) => return error_response(e),
    };

    let analysis = match tokio::time::timeout(
        REQUEST_TIMEOUT,
        llm.analyze_image(&req.image, ANALYSIS_PROMPT),
    )
    .await
    {
        Ok(Ok(analysis)) => analysis,
        Ok(Err(e)) => return error_response(e.into()),
        Err(_) => return timeout_error(),
    };

    // A blank description is treated as absent, not journalled as "".
    let description = req
        .description
        .as_deref()
        .filter(|d| !d.trim().is_empty());
    let mut advisor = GardenAdvisor::new(&mut memory, &llm);
    advisor.append_image_analysis(&analysis, description);

    if let Err(e) = state.store.save(&req.garden_name, &memory) {
        return error_response(e);
    }

    (StatusCode::OK, Json(json!({ "analysis": analysis }))).into_response()
}

/// POST /api/gardens/{name}/review — summarize the journal into one new
/// review record. An empty journal produces no record; the response then
/// carries `"review": null`.
pub(super) async fn review(
    State(state): State<HttpState>,
    Path(name): Path<String>,
    Json(req): Json<ReviewRequest>,
) -> Response {
    if req.period.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            json_error("bad_request", "Missing required field: period"),
        )
            .into_response();
    }

    let llm = match build_client(&state, req.provider.as_deref()) {
        Ok(llm) => llm,
        Err(resp) => return resp,
    };

    let lock = state.garden_lock(&name).await;
    let _guard = lock.lock().await;

    let mut memory = match state.store.load(&name) {
        Ok(Some(memory)) => memory,
        Ok(None) => return error_response(AppError::NotFound(name)),
        Err(e) => return error_response(e),
    };

    let reviews_before = memory.review.len();
    let result = tokio::time::timeout(REQUEST_TIMEOUT, async {
        let mut advisor = GardenAdvisor::new(&mut memory, &llm);
        advisor.seasonal_review(&req.period).await
    })
    .await;

    match result {
        Ok(Ok(())) => {}
        Ok(Err(e)) => return error_response(e.into()),
        Err(_) => return timeout_error(),
    }

    // An empty journal appends nothing; only a produced record is persisted.
    let produced = memory.review.len() > reviews_before;
    if produced && let Err(e) = state.store.save(&name, &memory) {
        return error_response(e);
    }

    let body = if produced {
        json!({ "review": memory.review.last() })
    } else {
        json!({ "review": null })
    };
    (StatusCode::OK, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_garden_maps_to_not_found() {
        let resp = error_response(AppError::NotFound("backyard".into()));
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn provider_configuration_failures_are_client_errors() {
        let unknown: AppError = ProviderError::UnknownProvider("mistral".into()).into();
        assert_eq!(error_response(unknown).status(), StatusCode::BAD_REQUEST);

        let keyless: AppError = ProviderError::MissingKey("GROQ_API_KEY").into();
        assert_eq!(error_response(keyless).status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn provider_request_failures_are_bad_gateway() {
        let failed: AppError = ProviderError::Request("connection refused".into()).into();
        assert_eq!(error_response(failed).status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn storage_failures_are_server_errors() {
        let resp = error_response(AppError::Storage("disk full".into()));
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
