use crate::cli::ServeArgs;
use crate::infra::{seed_service, AppState};
use crate::routes::with_transfer_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use doctor_transfer::config::AppConfig;
use doctor_transfer::error::AppError;
use doctor_transfer::telemetry;
use doctor_transfer::workflows::transfer::{InMemoryTransferRepository, TransferService};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let repository = Arc::new(InMemoryTransferRepository::default());
    let transfer_service = Arc::new(TransferService::new(repository, config.admin.clone()));
    seed_service(&transfer_service, &config.seed)?;

    let app = with_transfer_routes(transfer_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "doctor transfer service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
