use async_trait::async_trait;
use axum::extract::{FromRequestParts, State};
use axum::http::{header, request::Parts};

use crate::api::errors::ApiError;
use crate::core::{security, state::AppState};
use crate::db::models::{Test, User};
use crate::db::types::UserRole;
use crate::repositories;

pub(crate) struct CurrentUser(pub(crate) User);
pub(crate) struct CurrentTeacher(pub(crate) User);
pub(crate) struct CurrentStudent(pub(crate) User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let State(app_state) = State::<AppState>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to access application state"))?;

        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError::Unauthorized("Invalid authentication credentials"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::Unauthorized("Invalid authentication credentials"))?;

        // A missing or malformed header is 401; a token that fails
        // verification is 403.
        let claims = security::verify_token(token, app_state.settings())
            .map_err(|_| ApiError::Forbidden("Invalid or expired token"))?;

        let user = repositories::users::find_by_id(app_state.db(), &claims.sub)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to load user"))?;

        let Some(user) = user else {
            return Err(ApiError::Unauthorized("User not found"));
        };

        Ok(CurrentUser(user))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentTeacher {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;

        if user.role == UserRole::Teacher {
            Ok(CurrentTeacher(user))
        } else {
            Err(ApiError::Forbidden("Teacher access required"))
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentStudent {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;

        if user.role == UserRole::Student {
            Ok(CurrentStudent(user))
        } else {
            Err(ApiError::Forbidden("Student access required"))
        }
    }
}

/// Loads a test and checks the caller owns it. Every teacher-side mutation
/// of a test or its questions goes through this one predicate.
pub(crate) async fn require_test_owner(
    state: &AppState,
    user: &User,
    test_id: &str,
) -> Result<Test, ApiError> {
    let test = repositories::tests::find_by_id(state.db(), test_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load test"))?
        .ok_or_else(|| ApiError::NotFound("Test not found".to_string()))?;

    if test.created_by != user.id {
        return Err(ApiError::Forbidden("You do not own this test"));
    }

    Ok(test)
}
