//! Integration tests for the forgot-password and reset-password flow.

mod helpers;

use chrono::Duration;
use http::StatusCode;
use warden_auth::PolicyViolation;
use warden_core::error::ErrorKind;
use warden_entity::ConsumeOutcome;
use warden_service::{ForgotPasswordOutcome, ResetPasswordOutcome};

#[tokio::test]
async fn test_full_reset_flow() {
    let app = helpers::TestApp::new();
    app.create_test_user("ann@example.com", "Original1!").await;

    let token = app
        .request_reset("ann@example.com", "10.0.0.1")
        .await
        .expect("reset mail sent");
    assert!(token.len() >= 43);
    assert!(app.state.password_reset.token_is_valid(&token).await);

    let outcome = app
        .state
        .password_reset
        .reset_password(&token, "Replaced2@")
        .await;
    assert_eq!(outcome, ResetPasswordOutcome::Completed);
    assert_eq!(outcome.status_code(), StatusCode::OK);

    let old = app
        .state
        .sessions
        .login("ann@example.com", "Original1!")
        .await
        .unwrap_err();
    assert!(old.is(ErrorKind::Unauthorized));
    assert!(
        app.state
            .sessions
            .login("ann@example.com", "Replaced2@")
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn test_forgot_password_outcome_does_not_reveal_accounts() {
    let mut config = helpers::test_config();
    config.limiter.max_per_email = 1;
    let app = helpers::TestApp::with_config(config);
    app.create_test_user("ann@example.com", "Original1!").await;

    let service = &app.state.password_reset;
    let known = service.forgot_password("ann@example.com", "ip-a", None).await;
    let limited = service.forgot_password("ann@example.com", "ip-b", None).await;
    let unknown = service
        .forgot_password("nobody@example.com", "ip-c", None)
        .await;
    let blank = service.forgot_password("   ", "ip-d", None).await;
    service.drain().await;

    for outcome in [known, limited, unknown, blank] {
        assert_eq!(outcome, ForgotPasswordOutcome::Accepted);
        assert_eq!(outcome.status_code(), StatusCode::OK);
        assert_eq!(outcome.message(), ForgotPasswordOutcome::Accepted.message());
    }

    let sent = app.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "ann@example.com");
    assert_eq!(app.db.token_count().await, 1);
}

#[tokio::test]
async fn test_per_email_limit_and_window_reset() {
    let app = helpers::TestApp::new();
    app.create_test_user("ann@example.com", "Original1!").await;

    for i in 0..5 {
        app.request_reset("ann@example.com", &format!("10.0.0.{i}"))
            .await;
    }
    assert_eq!(app.mailer.sent_to("ann@example.com").len(), 3);

    app.clock.advance(Duration::seconds(901));
    app.request_reset("ann@example.com", "10.0.0.9").await;
    assert_eq!(app.mailer.sent_to("ann@example.com").len(), 4);
}

#[tokio::test]
async fn test_per_ip_limit_spans_emails() {
    let app = helpers::TestApp::new();
    for i in 0..12 {
        app.create_test_user(&format!("user{i}@example.com"), "Original1!")
            .await;
    }

    for i in 0..12 {
        app.request_reset(&format!("user{i}@example.com"), "203.0.113.7")
            .await;
    }
    assert_eq!(app.mailer.sent().len(), 10);
}

#[tokio::test]
async fn test_email_is_normalized_for_lookup_and_limit() {
    let app = helpers::TestApp::new();
    app.create_test_user("ann@example.com", "Original1!").await;

    for variant in ["ANN@example.com", " ann@EXAMPLE.com ", "Ann@Example.Com", "ann@example.com"] {
        app.state
            .password_reset
            .forgot_password(variant, &format!("ip-{variant}"), Some("de"))
            .await;
    }
    app.state.password_reset.drain().await;

    let sent = app.mailer.sent_to("ann@example.com");
    assert_eq!(sent.len(), 3);
    assert!(sent.iter().all(|m| m.locale == "de"));
}

#[tokio::test]
async fn test_token_is_single_use() {
    let app = helpers::TestApp::new();
    app.create_test_user("ann@example.com", "Original1!").await;
    let token = app.request_reset("ann@example.com", "ip").await.unwrap();

    let service = &app.state.password_reset;
    assert!(service.reset_password(&token, "Replaced2@").await.is_completed());

    let second = service.reset_password(&token, "Another3#").await;
    assert_eq!(second, ResetPasswordOutcome::InvalidToken);
    assert_eq!(second.status_code(), StatusCode::BAD_REQUEST);
    assert!(
        app.state
            .sessions
            .login("ann@example.com", "Replaced2@")
            .await
            .is_ok()
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_resets_have_one_winner() {
    let app = helpers::TestApp::new();
    app.create_test_user("ann@example.com", "Original1!").await;
    let token = app.request_reset("ann@example.com", "ip").await.unwrap();

    let mut handles = Vec::new();
    for i in 0..8 {
        let service = app.state.password_reset.clone();
        let token = token.clone();
        handles.push(tokio::spawn(async move {
            service
                .reset_password(&token, &format!("Concurrent{i}!"))
                .await
        }));
    }

    let mut completed = 0;
    for handle in handles {
        match handle.await.unwrap() {
            ResetPasswordOutcome::Completed => completed += 1,
            ResetPasswordOutcome::InvalidToken => {}
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
    assert_eq!(completed, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_consumes_report_already_used() {
    let app = helpers::TestApp::new();
    app.create_test_user("ann@example.com", "Original1!").await;
    let token = app.request_reset("ann@example.com", "ip").await.unwrap();

    let mut handles = Vec::new();
    for i in 0..8 {
        let tokens = app.state.reset_tokens.clone();
        let token = token.clone();
        handles.push(tokio::spawn(async move {
            tokens.consume(&token, &format!("hash-{i}")).await
        }));
    }

    let mut consumed = 0;
    let mut already_used = 0;
    for handle in handles {
        match handle.await.unwrap().unwrap() {
            ConsumeOutcome::Consumed { .. } => consumed += 1,
            ConsumeOutcome::AlreadyUsed => already_used += 1,
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
    assert_eq!(consumed, 1);
    assert_eq!(already_used, 7);
}

#[tokio::test]
async fn test_expired_token_is_refused() {
    let app = helpers::TestApp::new();
    app.create_test_user("ann@example.com", "Original1!").await;
    let token = app.request_reset("ann@example.com", "ip").await.unwrap();

    app.clock.advance(Duration::minutes(29));
    assert!(app.state.password_reset.token_is_valid(&token).await);

    app.clock.advance(Duration::minutes(1));
    assert!(!app.state.password_reset.token_is_valid(&token).await);
    assert_eq!(
        app.state
            .password_reset
            .reset_password(&token, "Replaced2@")
            .await,
        ResetPasswordOutcome::InvalidToken
    );
    assert!(
        app.state
            .sessions
            .login("ann@example.com", "Original1!")
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn test_unknown_and_blank_tokens_are_invalid() {
    let app = helpers::TestApp::new();
    for token in ["", "   ", "does-not-exist"] {
        assert_eq!(
            app.state
                .password_reset
                .reset_password(token, "Replaced2@")
                .await,
            ResetPasswordOutcome::InvalidToken
        );
        assert!(!app.state.password_reset.token_is_valid(token).await);
    }
}

#[tokio::test]
async fn test_policy_rejection_keeps_token_usable() {
    let app = helpers::TestApp::new();
    app.create_test_user("ann@example.com", "Original1!").await;
    let token = app.request_reset("ann@example.com", "ip").await.unwrap();

    let rejected = app
        .state
        .password_reset
        .reset_password(&token, "short")
        .await;
    let ResetPasswordOutcome::Rejected(violations) = &rejected else {
        panic!("expected policy rejection, got {rejected:?}");
    };
    assert!(violations.contains(&PolicyViolation::TooShort { min: 8 }));
    assert!(violations.contains(&PolicyViolation::MissingUppercase));
    assert!(violations.contains(&PolicyViolation::MissingDigit));
    assert!(violations.contains(&PolicyViolation::MissingSymbol));
    assert_eq!(rejected.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(rejected.messages().len(), violations.len());

    assert!(app.state.password_reset.token_is_valid(&token).await);
    assert!(
        app.state
            .password_reset
            .reset_password(&token, "Replaced2@")
            .await
            .is_completed()
    );
}

#[tokio::test]
async fn test_each_request_issues_a_distinct_token() {
    let app = helpers::TestApp::new();
    app.create_test_user("ann@example.com", "Original1!").await;

    let first = app.request_reset("ann@example.com", "ip").await.unwrap();
    let second = app.request_reset("ann@example.com", "ip").await.unwrap();
    assert_ne!(first, second);
    assert_eq!(app.db.token_count().await, 2);
}
