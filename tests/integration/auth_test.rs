//! Integration tests for the login and session flow.

mod helpers;

use chrono::Duration;
use warden_auth::{Authentication, RegisterRequest};
use warden_core::error::ErrorKind;
use warden_core::traits::Clock;

#[tokio::test]
async fn test_login_success() {
    let app = helpers::TestApp::new();
    let principal = app.create_test_user("ann@example.com", "Password1!").await;

    let result = app
        .state
        .sessions
        .login("  Ann@Example.com ", "Password1!")
        .await
        .unwrap();

    assert_eq!(result.principal.id, principal.id);
    assert!(!result.access_token.is_empty());
    assert_eq!(
        result.expires_at,
        app.clock.now() + Duration::minutes(15)
    );
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = helpers::TestApp::new();
    app.create_test_user("ann@example.com", "Password1!").await;

    let wrong_password = app
        .state
        .sessions
        .login("ann@example.com", "Password2!")
        .await
        .unwrap_err();
    let unknown_email = app
        .state
        .sessions
        .login("nobody@example.com", "Password1!")
        .await
        .unwrap_err();

    assert!(wrong_password.is(ErrorKind::Unauthorized));
    assert!(unknown_email.is(ErrorKind::Unauthorized));
    assert_eq!(wrong_password.message, unknown_email.message);
}

#[tokio::test]
async fn test_authenticate_round_trip() {
    let app = helpers::TestApp::new();
    let principal = app.create_test_user("ann@example.com", "Password1!").await;
    let login = app
        .state
        .sessions
        .login("ann@example.com", "Password1!")
        .await
        .unwrap();

    let auth = app
        .state
        .sessions
        .authenticate(Some(&login.access_token))
        .await;
    assert_eq!(auth.principal().map(|p| p.id), Some(principal.id));
    assert_eq!(
        app.state.sessions.token_roles(&login.access_token),
        Some(vec!["USER".to_string()])
    );
}

#[tokio::test]
async fn test_token_expires_after_ttl_and_skew() {
    let app = helpers::TestApp::new();
    app.create_test_user("ann@example.com", "Password1!").await;
    let login = app
        .state
        .sessions
        .login("ann@example.com", "Password1!")
        .await
        .unwrap();

    app.clock.advance(Duration::minutes(15) + Duration::seconds(30));
    assert!(
        app.state
            .sessions
            .authenticate(Some(&login.access_token))
            .await
            .is_authenticated()
    );

    app.clock.advance(Duration::seconds(1));
    assert!(matches!(
        app.state
            .sessions
            .authenticate(Some(&login.access_token))
            .await,
        Authentication::Anonymous
    ));
}

#[tokio::test]
async fn test_garbage_and_missing_tokens_are_anonymous() {
    let app = helpers::TestApp::new();
    for token in [None, Some(""), Some("   "), Some("not.a.jwt"), Some("abc")] {
        assert!(!app.state.sessions.authenticate(token).await.is_authenticated());
    }
}

#[tokio::test]
async fn test_token_from_other_deployment_is_rejected() {
    let app = helpers::TestApp::new();
    app.create_test_user("ann@example.com", "Password1!").await;

    let mut other_config = helpers::test_config();
    other_config.auth.jwt_secret = "a-completely-different-signing-key-of-sufficient-length".into();
    let other = helpers::TestApp::with_config(other_config);
    other.create_test_user("ann@example.com", "Password1!").await;
    let foreign = other
        .state
        .sessions
        .login("ann@example.com", "Password1!")
        .await
        .unwrap();

    assert!(
        !app.state
            .sessions
            .authenticate(Some(&foreign.access_token))
            .await
            .is_authenticated()
    );
}

#[tokio::test]
async fn test_cookie_login_and_logout() {
    let app = helpers::TestApp::new();
    app.create_test_user("ann@example.com", "Password1!").await;
    let login = app
        .state
        .sessions
        .login("ann@example.com", "Password1!")
        .await
        .unwrap();

    let cookie = app.state.sessions.login_cookie(&login);
    assert_eq!(cookie.name(), "access_token");
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.secure(), Some(true));

    let header = format!("theme=dark; {}={}", cookie.name(), cookie.value());
    let auth = app
        .state
        .sessions
        .authenticate_cookie_header(Some(&header))
        .await;
    assert!(auth.is_authenticated());

    let removal = app.state.sessions.logout();
    assert_eq!(removal.name(), "access_token");
    assert_eq!(removal.value(), "");
    assert_eq!(removal.max_age().map(|d| d.whole_seconds()), Some(0));
}

#[tokio::test]
async fn test_register_rejects_duplicates_and_weak_passwords() {
    let app = helpers::TestApp::new();
    app.create_test_user("ann@example.com", "Password1!").await;

    let duplicate = app
        .state
        .sessions
        .register(RegisterRequest {
            email: "ANN@example.com".to_string(),
            password: "Password1!".to_string(),
            first_name: None,
            last_name: None,
        })
        .await
        .unwrap_err();
    assert!(duplicate.is(ErrorKind::Conflict));

    let weak = app
        .state
        .sessions
        .register(RegisterRequest {
            email: "bob@example.com".to_string(),
            password: "password".to_string(),
            first_name: None,
            last_name: None,
        })
        .await
        .unwrap_err();
    assert!(weak.is(ErrorKind::Validation));
    assert!(weak.message.contains("uppercase"));
}

#[test]
fn test_missing_signing_key_fails_fast() {
    let mut config = helpers::test_config();
    config.auth.jwt_secret = String::new();
    let db = warden_database::MemoryDatabase::new();
    let result = warden_service::AppState::build(
        config,
        std::sync::Arc::new(db.clone()),
        std::sync::Arc::new(db),
        std::sync::Arc::new(helpers::RecordingMailer::default()),
        std::sync::Arc::new(warden_core::traits::SystemClock),
    );
    assert!(result.unwrap_err().is(ErrorKind::Configuration));
}
