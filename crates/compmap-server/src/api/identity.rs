use axum::{Extension, Json};
use serde::Serialize;

use crate::{auth::Principal, middleware::RequestId};

use super::ResponseMeta;

const ME_MESSAGE: &str = "User retrieved successfully";

#[derive(Debug, Serialize)]
pub(super) struct MessageResponse<T: Serialize> {
    pub data: T,
    pub message: &'static str,
    pub meta: ResponseMeta,
}

/// `GET /api/v1/auth/me`. Only reachable behind `require_principal`.
pub(super) async fn get_me(
    Extension(req_id): Extension<RequestId>,
    Extension(principal): Extension<Principal>,
) -> Json<MessageResponse<Principal>> {
    Json(MessageResponse {
        data: principal,
        message: ME_MESSAGE,
        meta: ResponseMeta::new(req_id.0),
    })
}
