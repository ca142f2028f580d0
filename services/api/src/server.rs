use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryLeadNotifier, InMemoryLeadRepository};
use crate::routes::build_router;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use brokerage::config::AppConfig;
use brokerage::error::AppError;
use brokerage::integrations::IntegrationState;
use brokerage::leads::LeadService;
use brokerage::telemetry;
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

    let integrations = IntegrationState::from_config(&config.integrations)?;
    info!(?integrations, "outbound integrations resolved");

    let repository = Arc::new(InMemoryLeadRepository::default());
    let notifier = Arc::new(InMemoryLeadNotifier::default());
    let lead_service = Arc::new(LeadService::new(repository, notifier));

    let app = build_router(lead_service, integrations)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "brokerage lead service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
