//! HTTP server implementation using Axum.

use axum::{
    Router,
    routing::{get, post},
};
use medigate_core::config::MedigateConfig;
use medigate_engine::MatchingEngine;
use medigate_knowledge::{ConditionEntry, KnowledgeStore};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared state for the gateway server.
pub struct AppState {
    pub config: MedigateConfig,
    /// Patient + history persistence.
    pub db: Arc<super::db::PatientDb>,
    /// Stateless matching engine; safe to call concurrently.
    pub engine: MatchingEngine,
    /// Where the knowledge JSON lives, for reloads.
    pub knowledge_path: PathBuf,
    /// Current immutable knowledge snapshot. Reload swaps the inner Arc;
    /// handlers clone it out so every analysis sees one consistent view.
    knowledge: Mutex<Arc<Vec<ConditionEntry>>>,
}

impl AppState {
    pub fn new(
        config: MedigateConfig,
        db: super::db::PatientDb,
        store: &KnowledgeStore,
        knowledge_path: PathBuf,
    ) -> Self {
        let engine = MatchingEngine::new(config.engine.clone());
        Self {
            config,
            db: Arc::new(db),
            engine,
            knowledge_path,
            knowledge: Mutex::new(store.snapshot()),
        }
    }

    /// Clone out the current knowledge snapshot.
    pub fn knowledge_snapshot(&self) -> Arc<Vec<ConditionEntry>> {
        self.knowledge.lock().expect("knowledge lock poisoned").clone()
    }

    /// Reload the knowledge base from disk and atomically publish the new
    /// snapshot. Returns the number of conditions now loaded.
    pub fn reload_knowledge(&self) -> usize {
        let store = KnowledgeStore::load(&self.knowledge_path);
        let count = store.len();
        *self.knowledge.lock().expect("knowledge lock poisoned") = store.snapshot();
        count
    }
}

/// Build the Axum router with all routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(super::routes::root))
        .route("/health", get(super::routes::health_check))
        .route("/api/patients", post(super::routes::create_patient))
        .route("/api/patients", get(super::routes::list_patients))
        .route("/api/patients/stats", get(super::routes::patient_stats))
        .route("/api/patients/{patient_id}", get(super::routes::get_patient_details))
        .route("/api/knowledge/reload", post(super::routes::reload_knowledge))
        .layer(
            CorsLayer::new()
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers(Any)
                .allow_origin(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server. Blocks until shutdown.
pub async fn start(config: MedigateConfig) -> anyhow::Result<()> {
    let kb_path = PathBuf::from(shellexpand::tilde(&config.knowledge.path).to_string());
    let store = KnowledgeStore::load(&kb_path);
    if store.is_empty() {
        tracing::warn!("Knowledge base is empty — all analyses will use the default response");
    }

    let db_path = shellexpand::tilde(&config.database.path).to_string();
    if let Some(parent) = Path::new(&db_path).parent() {
        std::fs::create_dir_all(parent)?;
    }
    let db = super::db::PatientDb::open(Path::new(&db_path))
        .map_err(|e| anyhow::anyhow!("Patient DB: {e}"))?;
    tracing::info!("Patient DB ready at {db_path}");

    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let state = Arc::new(AppState::new(config, db, &store, kb_path));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Gateway server listening on http://{addr}");

    axum::serve(listener, app).await?;
    Ok(())
}
