use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Extension, Json,
};
use compmap_core::{render, GeoJsonSink, MapSink, MapViewModel};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct RenderQuery {
    pub format: Option<String>,
}

/// `POST /api/v1/map/render`: lay out markers for a caller-supplied view.
///
/// `?format=geojson` returns a bare `FeatureCollection` instead of the
/// enveloped frame.
pub(super) async fn render_map(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<RenderQuery>,
    payload: Result<Json<MapViewModel>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(view) =
        payload.map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.body_text()))?;
    let frame = render(&view).with_zoom(state.map_zoom);

    match query.format.as_deref() {
        None | Some("frame") => Ok(Json(ApiResponse {
            data: frame,
            meta: ResponseMeta::new(req_id.0),
        })
        .into_response()),
        Some("geojson") => {
            let collection = GeoJsonSink.draw(&frame).map_err(|e| {
                tracing::error!(error = %e, "geojson rendering failed");
                ApiError::new(req_id.0.clone(), "internal_error", "map rendering failed")
            })?;
            Ok((
                [(header::CONTENT_TYPE, "application/geo+json")],
                Json(collection),
            )
                .into_response())
        }
        Some(other) => Err(ApiError::new(
            req_id.0,
            "bad_request",
            format!("unsupported format '{other}'; expected 'frame' or 'geojson'"),
        )),
    }
}
