use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument, warn};

use crate::{
    error::ApiError,
    state::AppState,
    users::{
        dto::{LoginRequest, RegisterRequest, RegisterResponse},
        password::MAX_PASSWORD_BYTES,
        repo_types::{NewUser, UserRecord},
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/api/users/register", post(register))
        .route("/api/users/login", post(login))
        .route("/api/users/:id", get(get_user))
}

#[instrument(skip(state, payload), fields(username = %payload.username))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    if let Some(field) = payload.first_blank_field() {
        warn!(field, "registration rejected: blank field");
        return Err(ApiError::Validation(format!("{field} is required")));
    }
    if payload.password.len() > MAX_PASSWORD_BYTES {
        warn!("registration rejected: password too long");
        return Err(ApiError::Validation(format!(
            "password must be at most {MAX_PASSWORD_BYTES} bytes"
        )));
    }

    let password_hash = state.hasher.hash(&payload.password).await?;
    let full_name = payload.full_name();
    let new_user = NewUser {
        username: payload.username,
        email: payload.email,
        password_hash,
        full_name,
        created_at: OffsetDateTime::now_utc(),
    };

    let id = state.users.insert(new_user).await.map_err(|e| {
        warn!(error = %e, "registration failed");
        ApiError::from(e)
    })?;

    info!(user_id = id, "user registered");
    Ok((StatusCode::CREATED, Json(RegisterResponse { id })))
}

#[instrument(skip(state, payload), fields(username = %payload.username))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<UserRecord>, ApiError> {
    if payload.username.trim().is_empty() || payload.password.is_empty() {
        warn!("login with blank credentials");
        return Err(ApiError::InvalidCredentials);
    }

    let Some(user) = state.users.find_by_username(&payload.username).await? else {
        state.hasher.verify_dummy(&payload.password).await?;
        warn!("login unknown username");
        return Err(ApiError::InvalidCredentials);
    };

    if !state.hasher.verify(&payload.password, &user.password_hash).await? {
        warn!(user_id = user.id, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    info!(user_id = user.id, "user logged in");
    Ok(Json(user.into()))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<UserRecord>, ApiError> {
    let id: i64 = raw_id
        .parse()
        .map_err(|_| ApiError::Validation("invalid user id".into()))?;

    state
        .users
        .find_by_id(id)
        .await?
        .map(|u| Json(u.into()))
        .ok_or(ApiError::NotFound("user not found"))
}
