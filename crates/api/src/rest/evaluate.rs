//! `POST /evaluate` (§4.1, §6.1): the service's single evaluation entry point.

use std::time::Instant;

use axum::{extract::State, routing::post, Json, Router};
use ceval_core::{ScaleInfo, SchemeId, Scope};
use ceval_engine::RequestContext;

use super::types::{EvaluateRequest, EvaluateResponse, EvaluateResponseMetadata};
use super::AppState;
use crate::config::limits::MAX_SCHEMES_PER_REQUEST;
use crate::error::{ApiError, ApiResult};

async fn evaluate(
    State(state): State<AppState>,
    Json(request): Json<EvaluateRequest>,
) -> ApiResult<Json<EvaluateResponse>> {
    if request.text.trim().is_empty() {
        return Err(ApiError::bad_request("text must not be empty"));
    }
    if request.schemes.is_empty() {
        return Err(ApiError::bad_request("schemes must not be empty"));
    }
    if request.schemes.len() > MAX_SCHEMES_PER_REQUEST {
        return Err(ApiError::bad_request(format!(
            "at most {MAX_SCHEMES_PER_REQUEST} schemes may be requested at once"
        )));
    }

    let mut ids = Vec::with_capacity(request.schemes.len());
    for raw in &request.schemes {
        let id = SchemeId::new(raw.as_str());
        if state.registry.get(&id).is_none() {
            return Err(ApiError::bad_request(format!("unknown scheme id '{raw}'")));
        }
        ids.push(id);
    }

    let context_type = request.context_type.unwrap_or(Scope::Content);
    let include_reasoning = request.include_reasoning.unwrap_or(true);
    let ctx = RequestContext::new(request.text, context_type, include_reasoning);

    let started = Instant::now();
    let results = state.evaluator.clone().evaluate(&ids, &ctx).await;
    let processing_time_ms = started.elapsed().as_millis();

    let gates_passed = results
        .iter()
        .filter(|r| matches!(r.scale_info, ScaleInfo::BinaryGate { .. }))
        .all(|r| r.value.is_truthy());

    let numeric: Vec<f64> = results
        .iter()
        .filter(|r| !matches!(r.scale_info, ScaleInfo::BinaryGate { .. }))
        .map(|r| r.value.as_f64())
        .collect();
    let overall_score = if numeric.is_empty() { None } else { Some(numeric.iter().sum::<f64>() / numeric.len() as f64) };

    let results = results
        .into_iter()
        .map(|r| {
            let r = (*r).clone();
            if include_reasoning { r } else { r.without_reasoning() }
        })
        .collect();

    Ok(Json(EvaluateResponse {
        results,
        gates_passed,
        overall_score,
        overall_label: None,
        metadata: EvaluateResponseMetadata { processing_time_ms, model_used: state.model_name.to_string() },
    }))
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/evaluate", post(evaluate))
}
