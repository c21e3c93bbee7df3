//! Application State
//!
//! Shared state across all handlers.

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;
use net_est_config::Settings;
use net_est_embedding::EmbeddingService;
use net_est_pipeline::Orchestrator;
use net_est_store::AnnotationStore;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub orchestrator: Arc<Orchestrator>,
    pub store: Arc<dyn AnnotationStore>,
    pub embedding: Arc<EmbeddingService>,
    pub metrics_handle: PrometheusHandle,
}

impl AppState {
    pub fn new(
        settings: Settings,
        embedding: Arc<EmbeddingService>,
        store: Arc<dyn AnnotationStore>,
        metrics_handle: PrometheusHandle,
    ) -> Self {
        let settings = Arc::new(settings);
        let orchestrator = Arc::new(Orchestrator::new(&settings, embedding.clone(), store.clone()));
        Self {
            settings,
            orchestrator,
            store,
            embedding,
            metrics_handle,
        }
    }
}
