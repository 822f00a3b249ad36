use crate::cli::ServeArgs;
use crate::infra::{AppState, Backends, Services};
use crate::routes::with_marketplace_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use dari::config::AppConfig;
use dari::error::AppError;
use dari::marketplace::accounts::UserId;
use dari::marketplace::assistant::DisabledCompletionClient;
use dari::marketplace::media::{ArchiveVideoStore, PublicImageStore};
use dari::marketplace::{MemoryStore, SystemClock};
use dari::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry, config.environment)?;
    let appeal_cooldown = config.moderation.appeal_cooldown()?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(MemoryStore::new());
    let services = Services::new(
        store,
        Backends {
            clock: Arc::new(SystemClock),
            images: Arc::new(PublicImageStore::new(config.media.image_base_url.clone())),
            videos: Arc::new(ArchiveVideoStore::new(
                config.media.video_archive_url.clone(),
            )),
            completions: Arc::new(DisabledCompletionClient),
            appeal_cooldown,
        },
    );

    match &config.moderation.bootstrap_admin {
        Some(admin) => {
            services
                .accounts
                .bootstrap_admin(&UserId(admin.clone()))
                .map_err(|err| AppError::Bootstrap(err.to_string()))?;
        }
        None => warn!("APP_BOOTSTRAP_ADMIN unset; admin routes have no operator"),
    }

    let app = with_marketplace_routes(services)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        cooldown_hours = config.moderation.appeal_cooldown_hours,
        "dari marketplace api ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
