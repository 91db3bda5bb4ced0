//! Process-wide shared state: the one Backend Session, the Embedding
//! Client, the three engines built on top of them, and the Context
//! Detector (spec §5 "Shared resources" — one session, shared across every
//! handler).

use std::sync::Arc;

use memory_backend::BackendSession;
use memory_core::config::Config;
use memory_core::context::ContextDetector;
use memory_embed::EmbeddingClient;
use memory_engine::{GraphEngine, MaintenanceEngine, RetrievalEngine};

pub struct AppState {
    pub session: Arc<BackendSession>,
    pub embed_client: Arc<dyn EmbeddingClient>,
    pub retrieval: RetrievalEngine,
    pub graph: GraphEngine,
    pub maintenance: MaintenanceEngine,
    pub context_detector: ContextDetector,
}

impl AppState {
    #[must_use]
    pub fn new(
        config: &Config,
        session: Arc<BackendSession>,
        embed_client: Arc<dyn EmbeddingClient>,
    ) -> Self {
        let retrieval = RetrievalEngine::new(Arc::clone(&session), Arc::clone(&embed_client));
        let graph = GraphEngine::new(Arc::clone(&session));
        let maintenance = MaintenanceEngine::new(Arc::clone(&session));
        let context_detector = ContextDetector::new(config);

        Self {
            session,
            embed_client,
            retrieval,
            graph,
            maintenance,
            context_detector,
        }
    }
}
