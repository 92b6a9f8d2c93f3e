use crate::cli::ServeArgs;
use crate::infra::{load_signal_table, AppState};
use crate::routes::with_grant_routes;
use agrifair::config::AppConfig;
use agrifair::error::AppError;
use agrifair::telemetry;
use agrifair::workflows::grants::GrantPrioritizationService;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
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

    let signals = Arc::new(load_signal_table(config.signals.signals_csv.as_deref())?);
    let grant_service = Arc::new(GrantPrioritizationService::new(
        signals.clone(),
        signals,
    ));

    let app = with_grant_routes(grant_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "grant prioritization service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
