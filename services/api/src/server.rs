use crate::cli::ServeArgs;
use crate::infra::{load_catalog, AppState, InMemoryProfileStore, InMemorySessionStore};
use crate::routes::{with_intake_routes, IntakeDeps};
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;
use visa_intake::config::AppConfig;
use visa_intake::error::AppError;
use visa_intake::telemetry;
use visa_intake::workflows::intake::{EligibilityTable, IntakeService};

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

    let catalog = Arc::new(load_catalog(&config.catalog)?);
    info!(entries = catalog.len(), "visa catalog loaded");

    let profiles = Arc::new(InMemoryProfileStore::default());
    let sessions = Arc::new(InMemorySessionStore::default());
    let service = Arc::new(IntakeService::new(
        catalog,
        profiles.clone(),
        EligibilityTable::standard(),
    ));

    let app = with_intake_routes(IntakeDeps {
        service,
        profiles,
        sessions,
    })
    .layer(Extension(app_state))
    .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "visa intake service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
