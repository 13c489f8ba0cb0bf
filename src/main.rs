use std::net::SocketAddr;
use strength_journal::config::AppConfig;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    tracing::info!("Storage backend: {:?}", config.backend);

    let shared = strength_journal::build_state(&config).await?;

    let scheduler = JobScheduler::new().await?;

    // Login limiter cleanup - hourly
    let shared_for_cleanup = shared.clone();
    scheduler
        .add(Job::new_async("0 0 * * * *", move |_uuid, _l| {
            let state = shared_for_cleanup.clone();
            Box::pin(async move {
                let remaining = state.login_limiter.cleanup().await;
                tracing::info!("Login limiter cleaned up, {} clients still tracked", remaining);
            })
        })?)
        .await?;

    scheduler.start().await?;
    tracing::info!("Scheduler started: login limiter cleanup hourly");

    let app = strength_journal::app(shared, &config.static_dir);

    tracing::info!("Listening on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}
