//! Warden server: authentication and credential recovery.
//!
//! Main entry point that wires all crates together and runs until a
//! shutdown signal arrives.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use warden_core::config::AppConfig;
use warden_core::error::AppError;
use warden_core::traits::{Clock, SystemClock};
use warden_database::{
    DatabasePool, MemoryDatabase, PgPrincipalRepository, PgResetTokenRepository,
    PrincipalRepository, ResetTokenRepository,
};
use warden_service::{AppState, LogMailDispatcher};
use warden_worker::{CleanupJob, CronScheduler};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Load configuration from files and environment.
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("WARDEN_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging.
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function.
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Warden v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Persistence ──────────────────────────────────────
    let (db_pool, principals, reset_tokens) = open_store(&config).await?;

    // ── Step 2: Services ─────────────────────────────────────────
    tracing::info!("Initializing services...");
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let state = AppState::build(
        config.clone(),
        principals,
        reset_tokens,
        Arc::new(LogMailDispatcher),
        clock,
    )?;
    tracing::info!("Services initialized");

    // ── Step 3: Maintenance scheduler ────────────────────────────
    let mut scheduler = if config.worker.enabled {
        tracing::info!(cron = %config.worker.cleanup_cron, "Starting maintenance scheduler...");
        let job = Arc::new(CleanupJob::new(
            &config.reset,
            state.reset_tokens.clone(),
            Arc::clone(&state.limiter),
        )?);
        let scheduler = CronScheduler::new().await?;
        scheduler
            .register_cleanup(job, &config.worker.cleanup_cron)
            .await?;
        scheduler.start().await?;
        Some(scheduler)
    } else {
        tracing::info!("Maintenance scheduler disabled");
        None
    };

    tracing::info!("Warden ready");

    // ── Step 4: Graceful shutdown ────────────────────────────────
    shutdown_signal().await;
    tracing::info!("Shutdown signal received, starting graceful shutdown...");

    state.password_reset.drain().await;

    if let Some(scheduler) = scheduler.as_mut() {
        if let Err(e) = scheduler.shutdown().await {
            tracing::warn!(error = %e, "Scheduler shutdown failed");
        }
    }

    if let Some(pool) = db_pool {
        pool.close().await;
    }

    tracing::info!("Warden shut down gracefully");
    Ok(())
}

type Store = (
    Option<DatabasePool>,
    Arc<dyn PrincipalRepository>,
    Arc<dyn ResetTokenRepository>,
);

/// Connect to PostgreSQL when a URL is configured, otherwise fall back to
/// the in-memory store.
async fn open_store(config: &AppConfig) -> Result<Store, AppError> {
    if config.database.url.is_none() {
        tracing::warn!("No database URL configured, using in-memory store");
        let memory = MemoryDatabase::new();
        let principals: Arc<dyn PrincipalRepository> = Arc::new(memory.clone());
        let reset_tokens: Arc<dyn ResetTokenRepository> = Arc::new(memory);
        return Ok((None, principals, reset_tokens));
    }

    tracing::info!("Connecting to database...");
    let pool = DatabasePool::connect(&config.database).await?;

    tracing::info!("Running database migrations...");
    warden_database::migration::run_migrations(pool.pool()).await?;
    tracing::info!("Database migrations complete");

    let principals: Arc<dyn PrincipalRepository> =
        Arc::new(PgPrincipalRepository::new(pool.pool().clone()));
    let reset_tokens: Arc<dyn ResetTokenRepository> =
        Arc::new(PgResetTokenRepository::new(pool.pool().clone()));
    Ok((Some(pool), principals, reset_tokens))
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
