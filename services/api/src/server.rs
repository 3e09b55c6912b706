use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryAuditLog};
use crate::routes::with_boundary_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use boundary_gate::config::AppConfig;
use boundary_gate::error::AppError;
use boundary_gate::policy::{BoundaryService, RuleStore};
use boundary_gate::telemetry;
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
    if let Some(rules) = args.rules.take() {
        config.rules.path = Some(rules);
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(RuleStore::open(config.rules.source())?);
    let version = store.snapshot().version().to_string();
    let rules_source = store.source().describe();
    let audit = Arc::new(InMemoryAuditLog::with_capacity(config.rules.audit_capacity));
    let boundary_service = Arc::new(BoundaryService::new(store, audit));

    let app = with_boundary_routes(boundary_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        ruleset_version = %version,
        rules_source = %rules_source,
        "boundary gate ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
