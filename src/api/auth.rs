//! Admin token check for the editing endpoints.

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use sha2::{Digest, Sha256};

use super::state::AppState;
use super::ApiError;

/// Marker extractor: present in a handler's arguments means the request
/// carried the admin token, either as `Authorization: Bearer <token>` or
/// as `X-Admin-Token: <token>`.
#[derive(Debug, Clone, Copy)]
pub struct AdminAuth;

fn presented_token(headers: &HeaderMap) -> Option<&str> {
    let bearer = headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| {
            let (scheme, rest) = v.trim_start().split_once(' ')?;
            scheme.eq_ignore_ascii_case("bearer").then_some(rest)
        })
        .map(str::trim)
        .filter(|t| !t.is_empty());

    bearer.or_else(|| {
        headers
            .get("X-Admin-Token")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|t| !t.is_empty())
    })
}

/// Compare fixed-size digests so the check takes the same time however
/// much of the token matches.
fn tokens_match(presented: &str, expected: &str) -> bool {
    Sha256::digest(presented.as_bytes()) == Sha256::digest(expected.as_bytes())
}

#[async_trait]
impl FromRequestParts<AppState> for AdminAuth {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match presented_token(&parts.headers) {
            Some(token) if tokens_match(token, &state.admin_token) => Ok(AdminAuth),
            _ => {
                tracing::warn!("Rejected admin request to {}", parts.uri.path());
                Err(ApiError::Unauthorized)
            }
        }
    }
}
