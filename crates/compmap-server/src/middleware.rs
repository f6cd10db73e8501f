use std::{sync::Arc, time::Duration};

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::{
    api::ApiError,
    auth::{AuthError, Principal, PrincipalResolver},
};

/// Newtype wrapping a request ID string, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Settings for [`require_principal`].
#[derive(Clone)]
pub struct AuthGate {
    resolver: Arc<dyn PrincipalResolver>,
    timeout: Duration,
}

impl AuthGate {
    pub fn new(resolver: impl PrincipalResolver + 'static, timeout: Duration) -> Self {
        Self {
            resolver: Arc::new(resolver),
            timeout,
        }
    }

    /// Resolve the principal for a raw `Authorization` header value, bounded
    /// by the gate's timeout.
    async fn authenticate(&self, header: Option<&HeaderValue>) -> Result<Principal, AuthError> {
        let token = extract_bearer_token(header).ok_or(AuthError::MissingCredentials)?;
        tokio::time::timeout(self.timeout, self.resolver.resolve(token))
            .await
            .unwrap_or_else(|_| {
                Err(AuthError::Unavailable(
                    "principal resolution timed out".to_string(),
                ))
            })
    }
}

/// Axum middleware that extracts or generates a request ID.
///
/// If the incoming request has an `x-request-id` header, that value is used.
/// Otherwise a new `UUIDv4` is generated. The ID is:
/// - Inserted into request extensions as [`RequestId`]
/// - Set on the response as the `x-request-id` header
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;

    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert("x-request-id", val);
    }

    res
}

/// Middleware that resolves a [`Principal`] and hands
/// it to the wrapped handler as a request extension.
///
/// The handler runs at most once, and only with a principal attached. Every
/// credential problem gets the same 401 body so callers cannot probe which
/// part was wrong; resolver failures and timeouts become a 500.
pub async fn require_principal(
    State(gate): State<AuthGate>,
    mut req: Request,
    next: Next,
) -> Response {
    let request_id = req
        .extensions()
        .get::<RequestId>()
        .map_or_else(String::new, |id| id.0.clone());

    match gate.authenticate(req.headers().get(AUTHORIZATION)).await {
        Ok(principal) => {
            req.extensions_mut().insert(principal);
            next.run(req).await
        }
        Err(AuthError::Unavailable(reason)) => {
            tracing::error!(%reason, "principal resolution failed");
            ApiError::new(
                request_id,
                "auth_unavailable",
                "authentication service unavailable",
            )
            .into_response()
        }
        Err(e) => {
            tracing::debug!(reason = %e, "rejected unauthenticated request");
            ApiError::new(request_id, "unauthorized", "authentication required").into_response()
        }
    }
}

fn extract_bearer_token(value: Option<&HeaderValue>) -> Option<&str> {
    value
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}
