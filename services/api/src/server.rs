use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryAssessmentRepository};
use crate::routes::with_risk_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use loan_risk::config::AppConfig;
use loan_risk::error::AppError;
use loan_risk::telemetry;
use loan_risk::workflows::assessment::{RiskAssessmentService, RiskClassifier, RiskEngine};
use std::sync::atomic::Ordering;
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

    telemetry::init(&config.telemetry)?;

    let engine = Arc::new(RiskEngine::new(config.risk.policy()?)?);
    let classifier = match &config.risk.model_path {
        Some(path) => {
            let classifier = RiskClassifier::from_path(path)?;
            info!(
                model = %path.display(),
                features = classifier.artifact().features.len(),
                "loaded risk classifier"
            );
            Some(Arc::new(classifier))
        }
        None => {
            warn!("RISK_MODEL_PATH not set; prediction endpoint disabled");
            None
        }
    };

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        engine: engine.clone(),
        classifier,
    };

    let repository = Arc::new(InMemoryAssessmentRepository::default());
    let assessment_service = Arc::new(RiskAssessmentService::new(repository, engine));

    let app = with_risk_routes(assessment_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "loan risk service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
