//! JWT auth: registration, login, and the bearer-token middleware.
//!
//! Tokens carry the user id as `sub` and expire after the configured
//! lifetime. The middleware re-loads the user on every request, so a
//! deleted or deactivated user loses access as soon as their next call.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{ConnectInfo, Extension, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use tracing::info;

use super::error::ApiError;
use super::routes::AppState;
use crate::models::{LoginResponse, User, UserCreate, UserLogin, UserResponse};
use crate::security;

#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct Claims {
    /// Subject: the user id
    sub: String,
    /// User email at issue time (informational)
    email: String,
    /// Issued-at unix seconds
    iat: i64,
    /// Expiration unix seconds
    exp: i64,
}

/// The authenticated user, inserted into request extensions by
/// [`require_auth`].
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

fn issue_jwt(secret: &str, ttl_minutes: i64, user: &User) -> Result<String, ApiError> {
    let now = Utc::now();
    let exp = now + Duration::minutes(ttl_minutes.max(1));
    let claims = Claims {
        sub: user.id.to_string(),
        email: user.email.clone(),
        iat: now.timestamp(),
        exp: exp.timestamp(),
    };
    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(e.to_string()))
}

fn verify_jwt(token: &str, secret: &str) -> Option<Claims> {
    jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .ok()
}

/// `POST /api/auth/register`
pub async fn register(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(req): Json<UserCreate>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.auth_limiter.check(&addr.ip().to_string()) {
        return Err(ApiError::TooManyRequests);
    }

    let (name, email) = req.validated()?;
    if state.db.find_user_by_email(email.clone()).await?.is_some() {
        return Err(ApiError::BadRequest("Email already registered".to_string()));
    }

    let password_hash = security::hash_password(&req.password);
    let user = state.db.create_user(name, email, password_hash).await?;
    info!(user_id = user.id, "user registered");

    let token = issue_jwt(
        &state.config.jwt_secret,
        state.config.access_token_expire_minutes,
        &user,
    )?;
    let body = LoginResponse::new(token, UserResponse::from(user));
    Ok((StatusCode::CREATED, Json(body)))
}

/// `POST /api/auth/login`
pub async fn login(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(req): Json<UserLogin>,
) -> Result<Json<LoginResponse>, ApiError> {
    if !state.auth_limiter.check(&addr.ip().to_string()) {
        return Err(ApiError::TooManyRequests);
    }

    let email = req.email.trim().to_lowercase();
    let user = state.db.find_user_by_email(email).await?;

    // Same error for unknown email and wrong password.
    let invalid = || ApiError::Unauthorized("Invalid email or password".to_string());
    let user = user.ok_or_else(invalid)?;
    if !security::verify_password(&req.password, &user.password_hash) {
        return Err(invalid());
    }
    if !user.active {
        return Err(ApiError::Forbidden("Account is deactivated".to_string()));
    }

    let token = issue_jwt(
        &state.config.jwt_secret,
        state.config.access_token_expire_minutes,
        &user,
    )?;
    Ok(Json(LoginResponse::new(token, UserResponse::from(user))))
}

/// `GET /api/auth/me`
pub async fn me(Extension(current): Extension<CurrentUser>) -> Json<UserResponse> {
    Json(UserResponse::from(current.0))
}

/// Middleware guarding all non-auth API routes.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("");
    let token = auth_header
        .strip_prefix("Bearer ")
        .or_else(|| auth_header.strip_prefix("bearer "))
        .unwrap_or("");

    if token.is_empty() {
        return ApiError::Unauthorized("Missing Authorization header".to_string()).into_response();
    }

    let Some(claims) = verify_jwt(token, &state.config.jwt_secret) else {
        return ApiError::Unauthorized("Invalid or expired token".to_string()).into_response();
    };
    let Ok(user_id) = claims.sub.parse::<i64>() else {
        return ApiError::Unauthorized("Invalid token subject".to_string()).into_response();
    };

    let user = match state.db.get_user(user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return ApiError::Unauthorized("User no longer exists".to_string()).into_response()
        }
        Err(e) => return ApiError::from(e).into_response(),
    };
    if !user.active {
        return ApiError::Forbidden("Account is deactivated".to_string()).into_response();
    }

    if !state.api_limiter.check(&user.id.to_string()) {
        return ApiError::TooManyRequests.into_response();
    }

    req.extensions_mut().insert(CurrentUser(user));
    next.run(req).await
}
