//! Session lookup and sign-out, delegated to the auth provider.

use crate::auth::{AuthError, AuthState, clear_session_cookies, extract_access_token};
use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq)]
pub struct ProfileResponse {
    #[schema(value_type = Option<Object>)]
    pub user: Option<Value>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct LogoutResponse {
    pub success: bool,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
}

#[utoipa::path(
    get,
    path = "/api/auth/profile",
    responses(
        (status = 200, description = "Current user, or null without a valid session", body = ProfileResponse)
    ),
    tag = "auth"
)]
pub async fn profile(headers: HeaderMap, auth: Extension<Arc<AuthState>>) -> impl IntoResponse {
    let user = match extract_access_token(&headers, auth.session_cookie()) {
        Some(token) => match auth.provider().current_user(&token).await {
            Ok(user) => user,
            Err(err) => {
                error!("Failed to get current user: {err}");
                None
            }
        },
        None => None,
    };

    (StatusCode::OK, Json(ProfileResponse { user }))
}

#[utoipa::path(
    delete,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Session ended", body = LogoutResponse),
        (status = 400, description = "Auth provider refused to end the session", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn logout(headers: HeaderMap, auth: Extension<Arc<AuthState>>) -> impl IntoResponse {
    if let Some(token) = extract_access_token(&headers, auth.session_cookie()) {
        if let Err(err) = auth.provider().sign_out(&token).await {
            error!("Failed to sign out: {err}");
            let message = match err {
                AuthError::Provider { message, .. } => message,
                transport @ AuthError::Transport(_) => transport.to_string(),
            };
            return (StatusCode::BAD_REQUEST, Json(ErrorResponse { error: message }))
                .into_response();
        }
    } else {
        debug!("Sign-out without a session token");
    }

    let mut response_headers = HeaderMap::new();
    for cookie in clear_session_cookies(&headers, auth.session_cookie()) {
        response_headers.append(SET_COOKIE, cookie);
    }

    (
        StatusCode::OK,
        response_headers,
        Json(LogoutResponse { success: true }),
    )
        .into_response()
}
