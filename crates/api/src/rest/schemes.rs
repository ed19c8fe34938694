//! `GET /schemes` (§4.2, §6.1).

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use ceval_engine::ListFilter;

use super::types::{ListSchemesQuery, SchemeSummaryDto};
use super::AppState;
use crate::error::{ApiError, ApiResult};

async fn list_schemes(
    State(state): State<AppState>,
    Query(query): Query<ListSchemesQuery>,
) -> ApiResult<Json<Vec<SchemeSummaryDto>>> {
    let kind = match query.kind.as_deref() {
        None => None,
        Some("ordinal") => Some("ordinal"),
        Some("checklist") => Some("checklist"),
        Some("binary_gate") => Some("binary_gate"),
        Some("derived") => Some("derived"),
        Some(other) => return Err(ApiError::bad_request(format!("unknown kind '{other}'"))),
    };

    let filter = ListFilter { kind, include_parts: query.include_parts, context_type: query.context_type };

    let dtos = state
        .registry
        .list(&filter)
        .into_iter()
        .map(|s| SchemeSummaryDto {
            id: s.id.as_str().to_string(),
            name: s.name.to_string(),
            kind: s.kind,
            dimension: s.dimension.to_string(),
            output_range: s.output_range.clone(),
            dependencies: s.dependencies.iter().map(|d| d.as_str().to_string()).collect(),
        })
        .collect();

    Ok(Json(dtos))
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/schemes", get(list_schemes))
}
