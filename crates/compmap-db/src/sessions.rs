//! Session lookup backing bearer-token authentication.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

/// A live session joined with its (active) user.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SessionPrincipalRow {
    pub user_id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
    pub expires_at: DateTime<Utc>,
}

/// Hex-encoded SHA-256 of `salt || token`. Only this digest is stored.
#[must_use]
pub fn hash_session_token(salt: &str, token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Look up the non-revoked session for `token_hash`.
///
/// Expiry is returned rather than filtered so the caller can tell an expired
/// session from an unknown one in its logs.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn find_session_principal(
    pool: &PgPool,
    token_hash: &str,
) -> Result<Option<SessionPrincipalRow>, sqlx::Error> {
    sqlx::query_as::<_, SessionPrincipalRow>(
        "SELECT u.id AS user_id, u.email, u.display_name, s.expires_at \
         FROM sessions s \
         JOIN users u ON u.id = s.user_id \
         WHERE s.token_hash = $1 AND s.revoked_at IS NULL AND u.is_active",
    )
    .bind(token_hash)
    .fetch_optional(pool)
    .await
}
