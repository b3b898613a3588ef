use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use time::Duration;
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::api::validation;
use crate::core::security;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::User;
use crate::repositories;
use crate::schemas::auth::TokenResponse;
use crate::schemas::user::{UserCreate, UserLogin, UserResponse};
use crate::schemas::MessageResponse;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/verify-email/:token", get(verify_email))
        .route("/me", get(me))
}

async fn register(
    State(state): State<AppState>,
    Json(payload): Json<UserCreate>,
) -> Result<(StatusCode, Json<TokenResponse>), ApiError> {
    let email = validation::normalize_email(&payload.email);
    validation::validate_email(&email)?;
    validation::validate_password(&payload.password)?;

    if payload.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Name must not be empty".to_string()));
    }

    let existing = repositories::users::exists_by_email(state.db(), &email)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to check existing user"))?;

    if existing.is_some() {
        return Err(ApiError::BadRequest("User with this email already exists".to_string()));
    }

    let hashed_password = security::hash_password(&payload.password)
        .map_err(|e| ApiError::internal(e, "Failed to hash password"))?;

    let now = primitive_now_utc();

    // Verification only applies when the email collaborator is configured;
    // without it accounts are created pre-verified.
    let verification = state.email().map(|_| {
        let token = security::generate_verification_token();
        let hash = security::hash_verification_token(&token);
        let expires =
            now + Duration::hours(state.settings().email().verification_expire_hours as i64);
        (token, hash, expires)
    });

    let user = repositories::users::create(
        state.db(),
        repositories::users::CreateUser {
            id: &Uuid::new_v4().to_string(),
            email: &email,
            hashed_password,
            name: payload.name.trim(),
            role: payload.role,
            is_email_verified: verification.is_none(),
            email_verification_token_hash: verification.as_ref().map(|(_, hash, _)| hash.clone()),
            email_verification_expires: verification.as_ref().map(|(_, _, expires)| *expires),
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create user"))?;

    let message = if let (Some(email_service), Some((token, _, _))) = (state.email(), &verification)
    {
        if let Err(err) = email_service.send_verification(&user.email, &user.name, token).await {
            // The account exists either way; the user can ask for a resend.
            tracing::error!(error = %err, email = %user.email, "Failed to send verification email");
        }
        "Registration successful. Please check your email to verify your account.".to_string()
    } else {
        "Registration successful.".to_string()
    };

    let token = security::create_access_token(
        &user.id,
        &user.email,
        user.role,
        state.settings(),
        None,
    )
    .map_err(|e| ApiError::internal(e, "Failed to create access token"))?;

    let response = TokenResponse {
        message,
        access_token: token,
        token_type: "bearer".to_string(),
        user: UserResponse::from_db(user),
    };

    Ok((StatusCode::CREATED, Json(response)))
}

async fn verify_email(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let token_hash = security::hash_verification_token(&token);

    let user = repositories::users::find_by_verification_token_hash(state.db(), &token_hash)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to look up verification token"))?
        .ok_or_else(|| {
            ApiError::BadRequest("Invalid or expired verification token".to_string())
        })?;

    if user.is_email_verified {
        return Ok(Json(MessageResponse { message: "Email already verified".to_string() }));
    }

    let now = primitive_now_utc();
    if user.email_verification_expires.is_some_and(|expires| expires < now) {
        return Err(ApiError::BadRequest("Invalid or expired verification token".to_string()));
    }

    repositories::users::mark_email_verified(state.db(), &user.id, now)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to mark email verified"))?;

    Ok(Json(MessageResponse { message: "Email verified successfully".to_string() }))
}

async fn login(
    State(state): State<AppState>,
    Json(payload): Json<UserLogin>,
) -> Result<Json<TokenResponse>, ApiError> {
    let email = validation::normalize_email(&payload.email);

    let user = fetch_user_by_email(&state, &email).await?;

    let verified = security::verify_password(&payload.password, &user.hashed_password)
        .map_err(|_| ApiError::Unauthorized("Incorrect email or password"))?;

    if !verified {
        return Err(ApiError::Unauthorized("Incorrect email or password"));
    }

    if state.email().is_some() && !user.is_email_verified {
        return Err(ApiError::BadRequest(
            "Please verify your email before logging in".to_string(),
        ));
    }

    let token = security::create_access_token(
        &user.id,
        &user.email,
        user.role,
        state.settings(),
        None,
    )
    .map_err(|e| ApiError::internal(e, "Failed to create access token"))?;

    Ok(Json(TokenResponse {
        message: "Login successful".to_string(),
        access_token: token,
        token_type: "bearer".to_string(),
        user: UserResponse::from_db(user),
    }))
}

async fn me(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(UserResponse::from_db(user))
}

async fn fetch_user_by_email(state: &AppState, email: &str) -> Result<User, ApiError> {
    repositories::users::find_by_email(state.db(), email)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load user"))?
        .ok_or(ApiError::Unauthorized("Incorrect email or password"))
}

#[cfg(test)]
mod tests;
