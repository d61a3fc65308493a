use crate::config::ServerConfig;
use beanclass_classifiers::{Classifier, LoadedModel, MemoizedPredictor, ModelMetadata};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Memoized predictor over the read-only model
    pub predictor: Arc<MemoizedPredictor>,

    /// Description of the loaded model
    pub model: Arc<ModelMetadata>,

    /// Client for batch URL sources
    pub http: reqwest::Client,

    /// Prometheus exporter handle for `/metrics`
    pub metrics: PrometheusHandle,
}

impl AppState {
    /// Load the configured model artifact and build the state around it
    pub fn new(config: ServerConfig, metrics: PrometheusHandle) -> anyhow::Result<Self> {
        let model = LoadedModel::load(config.classifier.to_model_config())?;
        let metadata = model.metadata().clone();
        Self::with_classifier(config, Arc::new(model), metadata, metrics)
    }

    /// Build the state around an already-constructed classifier
    pub fn with_classifier(
        config: ServerConfig,
        classifier: Arc<dyn Classifier>,
        metadata: ModelMetadata,
        metrics: PrometheusHandle,
    ) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.fetch_timeout())
            .user_agent(concat!("beanclass/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let predictor = MemoizedPredictor::new(
            classifier,
            config.classifier.confidence,
            config.classifier.cache_capacity,
        );

        Ok(Self {
            config: Arc::new(config),
            predictor: Arc::new(predictor),
            model: Arc::new(metadata),
            http,
            metrics,
        })
    }
}
