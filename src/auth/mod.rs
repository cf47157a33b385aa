use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};

use crate::error::AppError;
use crate::models::user::User;
use crate::state::AppState;

const TOKEN_LEN: usize = 40;

/// Opaque bearer token, held only in the in-memory token registry.
pub fn issue_token() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect()
}

/// Authenticated caller, resolved from the `Authorization: Bearer` header.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AppError::Unauthenticated)?;

        let user_id = state
            .tokens
            .get(token)
            .map(|entry| *entry.value())
            .ok_or(AppError::Unauthenticated)?;

        let user = state
            .users
            .get(&user_id)
            .map(|entry| entry.value().clone())
            .ok_or(AppError::Unauthenticated)?;

        Ok(CurrentUser(user))
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    value.strip_prefix("Bearer ").map(str::trim)
}
