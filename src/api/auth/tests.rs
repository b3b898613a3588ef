use axum::http::{Method, StatusCode};
use serde_json::json;
use time::Duration;
use tower::ServiceExt;
use uuid::Uuid;

use crate::core::{security, time::primitive_now_utc};
use crate::db::models::User;
use crate::db::types::UserRole;
use crate::repositories;
use crate::test_support;

async fn insert_user_with_token(
    pool: &sqlx::PgPool,
    email: &str,
    token: &str,
    expires_in: Duration,
    verified: bool,
) -> User {
    let now = primitive_now_utc();
    repositories::users::create(
        pool,
        repositories::users::CreateUser {
            id: &Uuid::new_v4().to_string(),
            email,
            hashed_password: security::hash_password("pending-password").expect("hash"),
            name: "Pending User",
            role: UserRole::Student,
            is_email_verified: verified,
            email_verification_token_hash: Some(security::hash_verification_token(token)),
            email_verification_expires: Some(now + expires_in),
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .expect("insert user with token")
}

#[tokio::test]
async fn register_login_me_roundtrip() {
    let ctx = test_support::setup_test_context().await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/auth/register",
            None,
            Some(json!({
                "email": "Priya@Example.com",
                "name": "Priya Sharma",
                "password": "priya-secret",
                "role": "teacher"
            })),
        ))
        .await
        .expect("register");

    let status = response.status();
    let created = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "response: {created}");
    assert_eq!(created["token_type"], "bearer");
    // Without an email collaborator, verification is skipped entirely.
    assert_eq!(created["user"]["is_email_verified"], true);
    assert_eq!(created["user"]["email"], "priya@example.com");
    assert_eq!(created["user"]["role"], "teacher");
    assert!(created["user"].get("hashed_password").is_none());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({"email": "priya@example.com", "password": "priya-secret"})),
        ))
        .await
        .expect("login");

    let status = response.status();
    let logged_in = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {logged_in}");
    let token = logged_in["access_token"].as_str().expect("token").to_string();

    let response = ctx
        .app
        .oneshot(test_support::json_request(Method::GET, "/api/v1/auth/me", Some(&token), None))
        .await
        .expect("me");

    let status = response.status();
    let me = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {me}");
    assert_eq!(me["email"], "priya@example.com");
    assert_eq!(me["name"], "Priya Sharma");
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let ctx = test_support::setup_test_context().await;

    let payload = json!({
        "email": "dup@example.com",
        "name": "First",
        "password": "first-secret",
        "role": "student"
    });

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/auth/register",
            None,
            Some(payload.clone()),
        ))
        .await
        .expect("first register");
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/auth/register",
            None,
            Some(payload),
        ))
        .await
        .expect("second register");

    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "response: {body}");
    assert_eq!(body["detail"], "User with this email already exists");
}

#[tokio::test]
async fn register_rejects_short_password_and_bad_email() {
    let ctx = test_support::setup_test_context().await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/auth/register",
            None,
            Some(json!({
                "email": "ok@example.com",
                "name": "Short",
                "password": "short",
                "role": "student"
            })),
        ))
        .await
        .expect("short password");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/auth/register",
            None,
            Some(json!({
                "email": "not-an-email",
                "name": "Bad Email",
                "password": "long-enough-password",
                "role": "student"
            })),
        ))
        .await
        .expect("bad email");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn verify_email_marks_account_verified() {
    let ctx = test_support::setup_test_context().await;

    let token = security::generate_verification_token();
    let user = insert_user_with_token(
        ctx.state.db(),
        "pending@example.com",
        &token,
        Duration::hours(24),
        false,
    )
    .await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/auth/verify-email/{token}"),
            None,
            None,
        ))
        .await
        .expect("verify");

    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {body}");
    assert_eq!(body["message"], "Email verified successfully");

    let stored = repositories::users::find_by_id(ctx.state.db(), &user.id)
        .await
        .expect("load user")
        .expect("user exists");
    assert!(stored.is_email_verified);
    assert!(stored.email_verification_token_hash.is_none());
    assert!(stored.email_verification_expires.is_none());

    // The hash is cleared on success, so the token is single use.
    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/auth/verify-email/{token}"),
            None,
            None,
        ))
        .await
        .expect("second verify");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn expired_verification_token_is_rejected() {
    let ctx = test_support::setup_test_context().await;

    let token = security::generate_verification_token();
    let user = insert_user_with_token(
        ctx.state.db(),
        "expired@example.com",
        &token,
        Duration::hours(-1),
        false,
    )
    .await;

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/auth/verify-email/{token}"),
            None,
            None,
        ))
        .await
        .expect("verify");

    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "response: {body}");
    assert_eq!(body["detail"], "Invalid or expired verification token");

    let stored = repositories::users::find_by_id(ctx.state.db(), &user.id)
        .await
        .expect("load user")
        .expect("user exists");
    assert!(!stored.is_email_verified);
}

#[tokio::test]
async fn verifying_an_already_verified_account_is_a_no_op() {
    let ctx = test_support::setup_test_context().await;

    let token = security::generate_verification_token();
    insert_user_with_token(
        ctx.state.db(),
        "done@example.com",
        &token,
        Duration::hours(24),
        true,
    )
    .await;

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/auth/verify-email/{token}"),
            None,
            None,
        ))
        .await
        .expect("verify");

    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {body}");
    assert_eq!(body["message"], "Email already verified");
}

#[tokio::test]
async fn unknown_verification_token_is_rejected() {
    let ctx = test_support::setup_test_context().await;

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/v1/auth/verify-email/no-such-token",
            None,
            None,
        ))
        .await
        .expect("verify");

    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "response: {body}");
    assert_eq!(body["detail"], "Invalid or expired verification token");
}

#[tokio::test]
async fn login_failures_use_one_generic_message() {
    let ctx = test_support::setup_test_context().await;

    test_support::insert_user(
        ctx.state.db(),
        "known@example.com",
        "Known User",
        "right-password",
        crate::db::types::UserRole::Student,
    )
    .await;

    let wrong_password = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({"email": "known@example.com", "password": "wrong-password"})),
        ))
        .await
        .expect("wrong password");

    let unknown_user = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({"email": "nobody@example.com", "password": "whatever-long"})),
        ))
        .await
        .expect("unknown user");

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);
    let first = test_support::read_json(wrong_password).await;
    let second = test_support::read_json(unknown_user).await;
    assert_eq!(first["detail"], second["detail"]);
}
