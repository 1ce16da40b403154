//! Account endpoints.
//!
//! `POST /api/register` and `POST /api/login` are unprotected;
//! `POST /api/logout` revokes the token it was called with.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use super::required_text;
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, UserContext};
use crate::auth::{generate_token, hash_password, hash_token, verify_password};
use crate::db;
use crate::models::{format_timestamp, now_timestamp};

#[derive(Deserialize)]
pub struct Credentials {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub id: i64,
    pub username: String,
    pub message: &'static str,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_at: String,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// `POST /api/register` — create an account.
pub async fn register(
    State(ctx): State<ApiContext>,
    Json(body): Json<Credentials>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let (username, password) = match (
        required_text(body.username, "username"),
        body.password.filter(|p| !p.is_empty()),
    ) {
        (Ok(username), Some(password)) => (username, password),
        _ => return Err(ApiError::BadRequest("Username and password are required".into())),
    };

    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password)).await?;

    let conn = ctx.open_db()?;
    let user = db::insert_user(&conn, &username, &password_hash).map_err(|e| {
        if e.is_unique_violation() {
            ApiError::Conflict("Username already exists".into())
        } else {
            e.into()
        }
    })?;

    tracing::info!(user_id = user.id, username = %user.username, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            id: user.id,
            username: user.username,
            message: "Registration successful",
        }),
    ))
}

/// `POST /api/login` — exchange credentials for a bearer token.
pub async fn login(
    State(ctx): State<ApiContext>,
    Json(body): Json<Credentials>,
) -> Result<Json<LoginResponse>, ApiError> {
    let invalid = || ApiError::Unauthorized;
    let username = body.username.unwrap_or_default();
    let password = body.password.unwrap_or_default();

    let user = {
        let conn = ctx.open_db()?;
        db::get_user_by_username(&conn, username.trim())?
    }
    .ok_or_else(invalid)?;

    let stored = user.password_hash.clone();
    let valid = tokio::task::spawn_blocking(move || verify_password(&password, &stored)).await??;
    if !valid {
        tracing::info!(username = %user.username, "login rejected");
        return Err(invalid());
    }

    let token = generate_token();
    let now = now_timestamp();
    let expires_at = now + ctx.config.token_ttl;
    {
        let conn = ctx.open_db()?;
        db::purge_expired_sessions(&conn, &now)?;
        db::insert_session(&conn, &hash_token(&token), user.id, &expires_at)?;
    }

    Ok(Json(LoginResponse {
        access_token: token,
        token_type: "Bearer",
        expires_at: format_timestamp(&expires_at),
    }))
}

/// `POST /api/logout` — revoke the presented token.
pub async fn logout(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
) -> Result<Json<MessageResponse>, ApiError> {
    let conn = ctx.open_db()?;
    db::delete_session(&conn, &user.token_hash)?;
    Ok(Json(MessageResponse {
        message: "Logged out",
    }))
}
