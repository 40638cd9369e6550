//! Integration tests for the session lifecycle
//!
//! These tests drive the auth client against an in-process axum backend and
//! verify that the session store persists what the backend returned through a
//! simulated restart.

use std::sync::Arc;
use std::time::Duration;

use auth::models::{LoginCredentials, OtpRequest, OtpVerification};
use auth::{AuthClient, Role, SessionStore, SessionUser};
use axum::{Json, Router, http::StatusCode, response::IntoResponse, routing::post};
use common::{ApiClient, ApiError, FileStorage};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio_test::assert_ok;

async fn login(Json(body): Json<Value>) -> impl IntoResponse {
    if body["email"] == "a@b.com" && body["password"] == "x" {
        (
            StatusCode::OK,
            Json(json!({
                "token": "t1",
                "userId": 7,
                "role": "CUSTOMER",
                "name": "A",
                "message": "Login successful!"
            })),
        )
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Invalid email or password" })),
        )
    }
}

async fn verify_otp(Json(body): Json<Value>) -> impl IntoResponse {
    if body["otpCode"] == "123456" && body["userId"] == 7 {
        (StatusCode::OK, Json(json!({ "message": "Mobile number verified successfully!" })))
    } else {
        (StatusCode::BAD_REQUEST, Json(json!({ "error": "Invalid OTP" })))
    }
}

async fn spawn_backend() -> AuthClient {
    let app = Router::new()
        .route("/api/auth/login", post(login))
        .route(
            "/api/auth/public/otp/request",
            post(|| async { Json(json!({ "message": "OTP sent successfully!" })) }),
        )
        .route("/api/auth/public/otp/verify", post(verify_otp));

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock backend");
    let addr = listener.local_addr().expect("Mock backend has no address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Mock backend failed");
    });

    let client = ApiClient::with_timeout(&format!("http://{}", addr), Duration::from_secs(5), 1)
        .expect("Failed to build client");
    AuthClient::new(client)
}

#[tokio::test]
async fn test_login_then_update_user_end_to_end() -> Result<(), Box<dyn std::error::Error>> {
    let auth = spawn_backend().await;
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("session.json");

    let store = SessionStore::restore(Arc::new(FileStorage::new(&path)));
    assert!(store.is_ready());
    assert!(!store.is_authenticated());

    let outcome = auth
        .login(&LoginCredentials {
            email: "a@b.com".to_string(),
            password: "x".to_string(),
        })
        .await?;
    assert_eq!(outcome.message.as_deref(), Some("Login successful!"));
    assert_ok!(store.login(outcome.token, outcome.user));

    let session = store.state();
    assert!(session.is_authenticated());
    assert_eq!(session.role(), Some(Role::Customer));
    assert_eq!(session.token.as_deref(), Some("t1"));

    let updated = store.update_user(&SessionUser::new().with("name", "B"))?;
    assert_eq!(updated.name(), Some("B"));
    assert_eq!(updated.user_id(), Some(7));

    // A fresh store over the same file sees the merged record
    let reloaded = SessionStore::restore(Arc::new(FileStorage::new(&path)));
    assert!(reloaded.is_authenticated());
    assert_eq!(reloaded.token().as_deref(), Some("t1"));
    assert_eq!(reloaded.user(), Some(updated));

    reloaded.logout();
    let after_logout = SessionStore::restore(Arc::new(FileStorage::new(&path)));
    assert!(!after_logout.is_authenticated());
    Ok(())
}

#[tokio::test]
async fn test_rejected_login_leaves_session_untouched() {
    let auth = spawn_backend().await;
    let store = SessionStore::restore(Arc::new(common::MemoryStorage::new()));

    let err = auth
        .login(&LoginCredentials {
            email: "a@b.com".to_string(),
            password: "wrong".to_string(),
        })
        .await
        .expect_err("bad password");

    assert_eq!(err, ApiError::Unauthorized("Invalid email or password".to_string()));
    assert!(!store.is_authenticated());
}

#[tokio::test]
async fn test_otp_request_and_verify() -> Result<(), ApiError> {
    let auth = spawn_backend().await;

    let sent = auth
        .request_otp(&OtpRequest {
            user_id: 7,
            mobile_number: "9876543210".to_string(),
        })
        .await?;
    assert_eq!(sent.message_or("OTP sent"), "OTP sent successfully!");

    let verified = auth
        .verify_otp(&OtpVerification {
            user_id: 7,
            mobile_number: "9876543210".to_string(),
            otp_code: "123456".to_string(),
        })
        .await?;
    assert_eq!(
        verified.message.as_deref(),
        Some("Mobile number verified successfully!")
    );

    let err = auth
        .verify_otp(&OtpVerification {
            user_id: 7,
            mobile_number: "9876543210".to_string(),
            otp_code: "000000".to_string(),
        })
        .await
        .expect_err("wrong code");
    assert_eq!(err.user_message(), "Invalid OTP");
    Ok(())
}
