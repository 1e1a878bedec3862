//! User route handlers.

use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
};
use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use tracing::instrument;

use comercio_core::Email;

use crate::error::{AppError, Result};
use crate::extract::ApiJson;
use crate::models::{NewUser, UserView};
use crate::state::AppState;

/// Signup request body.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// List all users.
#[instrument(skip(state))]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<UserView>>> {
    let users = state.store().list_users().await?;
    Ok(Json(users.iter().map(UserView::from).collect()))
}

/// Sign up a new user.
///
/// The email must be unique; the password is stored only as an argon2
/// hash and never echoed back.
#[instrument(skip(state, req))]
pub async fn create(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserView>)> {
    if req.name.trim().is_empty() || req.password.is_empty() {
        return Err(AppError::BadRequest(
            "name and password are required".to_owned(),
        ));
    }
    let email = Email::parse(&req.email)?;

    if state.store().user_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict("email already exists".to_owned()));
    }

    let password_hash = hash_password(&req.password)?;
    let user = state
        .store()
        .insert_user(NewUser {
            name: req.name,
            email,
            password_hash,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(UserView::from(&user))))
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AppError::Internal("failed to hash password".to_owned()))
}
