use actix_web::{web, HttpServer};
use anyhow::Context;
use std::{sync::Arc, time::Duration};
use tracing::info;

use sw_api::{create_app, routes::health::HealthProbe, telemetry, AppState};
use sw_core::{
    CleanupService, Clock, InMemoryLockoutRepository, InMemoryRateLimitStore,
    InMemoryVerificationCodeRepository, LockoutRepository, RateLimitStore, SystemClock,
    VerificationCodeRepository, VerificationComponents, VerificationService,
};
use sw_infra::{
    ConfiguredDelivery, DatabasePool, MySqlLockoutRepository, MySqlVerificationCodeRepository,
    NoopConfirmation, RedisClient, RedisRateLimitStore,
};
use sw_shared::{AppConfig, Environment, StorageBackend};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Environment-specific file first; dotenvy never overrides a variable already set
    dotenvy::from_filename(Environment::from_env().env_file()).ok();
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("failed to load configuration")?;
    telemetry::init_tracing(&config.logging)?;

    info!(
        environment = ?config.environment,
        storage = ?config.storage.backend,
        delivery = ?config.delivery.provider,
        "Starting Slotwise API server"
    );

    match config.storage.backend {
        StorageBackend::Memory => {
            run(
                config,
                Arc::new(InMemoryVerificationCodeRepository::new()),
                Arc::new(InMemoryLockoutRepository::new()),
                Arc::new(InMemoryRateLimitStore::new()),
                Vec::new(),
            )
            .await
        }
        StorageBackend::Durable => {
            let pool = DatabasePool::new(&config.database)
                .await
                .context("failed to connect to MySQL")?;
            if config.database.run_migrations {
                pool.run_migrations()
                    .await
                    .context("failed to run database migrations")?;
            }
            let redis = Arc::new(
                RedisClient::new(config.cache.clone())
                    .await
                    .context("failed to connect to Redis")?,
            );

            let codes = Arc::new(MySqlVerificationCodeRepository::new(pool.get_pool().clone()));
            let lockouts = Arc::new(MySqlLockoutRepository::new(pool.get_pool().clone()));
            let counters = Arc::new(RedisRateLimitStore::new(redis.clone()));
            let probes: Vec<Arc<dyn HealthProbe>> = vec![
                Arc::new(pool.clone()) as Arc<dyn HealthProbe>,
                redis as Arc<dyn HealthProbe>,
            ];

            let result = run(config, codes, lockouts, counters, probes).await;
            pool.close().await;
            result
        }
    }
}

/// Wire the services over the chosen stores and serve until shutdown
async fn run<C, L, S>(
    config: AppConfig,
    codes: Arc<C>,
    lockouts: Arc<L>,
    counters: Arc<S>,
    probes: Vec<Arc<dyn HealthProbe>>,
) -> anyhow::Result<()>
where
    C: VerificationCodeRepository + 'static,
    L: LockoutRepository + 'static,
    S: RateLimitStore + 'static,
{
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let components =
        VerificationComponents::assemble(codes.clone(), lockouts, counters, clock.clone(), &config);

    let delivery = Arc::new(
        ConfiguredDelivery::from_config(&config.delivery)
            .context("failed to configure code delivery")?,
    );
    let verification = Arc::new(VerificationService::new(
        components.issuer.clone(),
        components.verifier.clone(),
        delivery,
        Arc::new(NoopConfirmation),
    ));

    let cleanup = Arc::new(CleanupService::new(
        codes,
        components.tracker.clone(),
        components.limiter.clone(),
        clock.clone(),
        config.cleanup.clone(),
    ));
    let cleanup_task = cleanup.start_background_task();

    let state = web::Data::new(AppState::new(
        verification,
        components.limiter.clone(),
        clock,
        probes,
    ));

    let server_config = config.server.clone();
    let bind_address = server_config.bind_address();
    info!(address = %bind_address, "HTTP server listening");

    let mut server = HttpServer::new(move || create_app(state.clone(), &server_config))
        .keep_alive(Duration::from_secs(config.server.keep_alive));
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server
        .bind(&bind_address)
        .with_context(|| format!("failed to bind {}", bind_address))?
        .run()
        .await?;

    if let Some(handle) = cleanup_task {
        handle.abort();
    }
    info!("Server stopped");
    Ok(())
}
