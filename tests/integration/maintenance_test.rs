//! Integration tests for reset-token and rate-limiter maintenance.

mod helpers;

use std::sync::Arc;

use chrono::Duration;
use warden_core::error::ErrorKind;
use warden_worker::{CleanupJob, CleanupReport, CronScheduler};

fn cleanup_job(app: &helpers::TestApp) -> Arc<CleanupJob> {
    Arc::new(CleanupJob::new(
        &helpers::test_config().reset,
        app.state.reset_tokens.clone(),
        Arc::clone(&app.state.limiter),
    )
    .unwrap())
}

#[tokio::test]
async fn test_sweep_removes_expired_and_old_used_tokens() {
    let app = helpers::TestApp::new();
    app.create_test_user("ann@example.com", "Original1!").await;
    app.create_test_user("bob@example.com", "Original1!").await;
    let job = cleanup_job(&app);

    let used = app.request_reset("ann@example.com", "ip-a").await.unwrap();
    app.request_reset("bob@example.com", "ip-b").await.unwrap();
    assert!(
        app.state
            .password_reset
            .reset_password(&used, "Replaced2@")
            .await
            .is_completed()
    );

    // Nothing is due yet.
    assert_eq!(
        job.run_once().await.unwrap(),
        Some(CleanupReport::default())
    );
    assert_eq!(app.db.token_count().await, 2);

    // Both tokens are past their TTL; the limiter window has also passed.
    app.clock.advance(Duration::minutes(31));
    let report = job.run_once().await.unwrap().unwrap();
    assert_eq!(report.expired, 2);
    assert_eq!(report.used, 0);
    assert_eq!(report.evicted_keys, 4);
    assert_eq!(app.db.token_count().await, 0);
    assert_eq!(app.state.limiter.tracked_keys(), 0);
}

#[tokio::test]
async fn test_used_token_kept_through_retention() {
    let mut config = helpers::test_config();
    config.reset.token_ttl_minutes = 60 * 24 * 30;
    let app = helpers::TestApp::with_config(config.clone());
    app.create_test_user("ann@example.com", "Original1!").await;
    let job = Arc::new(CleanupJob::new(
        &config.reset,
        app.state.reset_tokens.clone(),
        Arc::clone(&app.state.limiter),
    )
    .unwrap());

    let token = app.request_reset("ann@example.com", "ip").await.unwrap();
    assert!(
        app.state
            .password_reset
            .reset_password(&token, "Replaced2@")
            .await
            .is_completed()
    );

    app.clock.advance(Duration::days(6));
    assert_eq!(job.run_once().await.unwrap().unwrap().used, 0);
    assert_eq!(app.db.token_count().await, 1);

    app.clock.advance(Duration::days(1) + Duration::seconds(1));
    assert_eq!(job.run_once().await.unwrap().unwrap().used, 1);
    assert_eq!(app.db.token_count().await, 0);
}

#[tokio::test]
async fn test_sweep_is_idempotent() {
    let app = helpers::TestApp::new();
    app.create_test_user("ann@example.com", "Original1!").await;
    app.request_reset("ann@example.com", "ip").await.unwrap();
    let job = cleanup_job(&app);

    app.clock.advance(Duration::hours(2));
    let first = job.run_once().await.unwrap().unwrap();
    assert_eq!(first.expired, 1);

    let second = job.run_once().await.unwrap().unwrap();
    assert_eq!(second, CleanupReport::default());
}

#[tokio::test]
async fn test_live_tokens_survive_sweep() {
    let app = helpers::TestApp::new();
    app.create_test_user("ann@example.com", "Original1!").await;
    let token = app.request_reset("ann@example.com", "ip").await.unwrap();
    let job = cleanup_job(&app);

    app.clock.advance(Duration::minutes(10));
    job.run_once().await.unwrap();

    assert!(app.state.password_reset.token_is_valid(&token).await);
}

#[tokio::test]
async fn test_scheduler_rejects_invalid_cron() {
    let app = helpers::TestApp::new();
    let scheduler = CronScheduler::new().await.unwrap();
    let err = scheduler
        .register_cleanup(cleanup_job(&app), "not a cron")
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::Configuration));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_scheduler_runs_cleanup() {
    let app = helpers::TestApp::new();
    app.create_test_user("ann@example.com", "Original1!").await;
    app.request_reset("ann@example.com", "ip").await.unwrap();
    app.clock.advance(Duration::hours(1));

    let mut scheduler = CronScheduler::new().await.unwrap();
    scheduler
        .register_cleanup(cleanup_job(&app), "* * * * * *")
        .await
        .unwrap();
    scheduler.start().await.unwrap();

    let swept = tokio::time::timeout(std::time::Duration::from_secs(10), async {
        while app.db.token_count().await > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        }
    })
    .await;

    scheduler.shutdown().await.unwrap();
    assert!(swept.is_ok(), "scheduled cleanup did not run");
}
