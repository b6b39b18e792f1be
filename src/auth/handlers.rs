use crate::error::{AppError, Result};
use crate::models::UserProfile;
use crate::AppState;
use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::Json,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
pub struct MagicLinkRequest {
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MagicLinkResponse {
    pub magic_link: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct VerifyRequest {
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub token: String,
    pub user: UserProfile,
}

/// Extract the credential from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?.trim();
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// POST /auth/magic-link
pub async fn request_magic_link_handler(
    State(state): State<AppState>,
    Json(payload): Json<MagicLinkRequest>,
) -> Result<Json<MagicLinkResponse>> {
    let email = payload.email.unwrap_or_default();
    let issued = state.magic_link_service.issue(&email).await?;

    Ok(Json(MagicLinkResponse {
        magic_link: issued.link,
    }))
}

/// POST /auth/verify
pub async fn verify_magic_link_handler(
    State(state): State<AppState>,
    Json(payload): Json<VerifyRequest>,
) -> Result<Json<VerifyResponse>> {
    let token = payload.token.unwrap_or_default();
    let redemption = state.magic_link_service.redeem(&token).await?;

    tracing::info!("User {} signed in via magic link", redemption.user.id);

    Ok(Json(VerifyResponse {
        token: redemption.session_token,
        user: UserProfile::from(redemption.user),
    }))
}

/// GET /auth/me
pub async fn me_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UserProfile>> {
    let credential = bearer_token(&headers).ok_or(AppError::Unauthenticated(
        "Invalid or expired session",
    ))?;

    let profile = state.auth_service.whoami(credential).await?;

    Ok(Json(profile))
}
