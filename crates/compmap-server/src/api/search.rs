//! Search submission boundary: validate, hand off to the collaborator, render.

use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use compmap_core::{render, MapFrame, MapViewModel, SearchError, SearchRequest};
use serde::Serialize;
use serde_json::Value;

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct SearchResponse {
    pub request: SearchRequest,
    pub view: MapViewModel,
    pub frame: MapFrame,
}

fn parse_request(
    req_id: &str,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<SearchRequest, ApiError> {
    let Json(raw) = payload.map_err(|e| ApiError::new(req_id, "bad_request", e.body_text()))?;
    compmap_core::validate(&raw).map_err(|e| {
        tracing::debug!(error = %e, "search request rejected");
        ApiError::validation(req_id, &e)
    })
}

/// `POST /api/v1/search/validate`
pub(super) async fn validate_search(
    Extension(req_id): Extension<RequestId>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ApiResponse<SearchRequest>>, ApiError> {
    let request = parse_request(&req_id.0, payload)?;
    Ok(Json(ApiResponse {
        data: request,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// `POST /api/v1/search`
pub(super) async fn run_search(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ApiResponse<SearchResponse>>, ApiError> {
    let request = parse_request(&req_id.0, payload)?;

    let Some(search) = state.search.as_ref() else {
        return Err(ApiError::new(
            req_id.0,
            "search_unavailable",
            "competitor search is not configured",
        ));
    };

    let result = search.search(&request).await.map_err(|e| {
        tracing::warn!(error = %e, "competitor search failed");
        match e {
            SearchError::Geocoding(_) => ApiError::new(
                req_id.0.clone(),
                "address_not_found",
                "address could not be located",
            ),
            SearchError::Upstream(_) => ApiError::new(
                req_id.0.clone(),
                "upstream_error",
                "competitor search failed",
            ),
        }
    })?;

    let view = result.into_view(&request);
    let frame = render(&view).with_zoom(state.map_zoom);
    tracing::info!(
        competitors = view.competitors.len(),
        radius = request.radius(),
        "search rendered"
    );

    Ok(Json(ApiResponse {
        data: SearchResponse {
            request,
            view,
            frame,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
