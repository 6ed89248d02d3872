//! API route handlers for the gateway.

use axum::extract::{Path, Query, State};
use axum::Json;
use medigate_core::types::NewPatient;
use serde::Deserialize;
use std::sync::Arc;

use super::db::ListQuery;
use super::server::AppState;

/// Welcome message at the root.
pub async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "Welcome to Medigate API" }))
}

/// Health check endpoint.
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "medigate-gateway",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Register a patient, run the analysis, and persist both.
pub async fn create_patient(
    State(state): State<Arc<AppState>>,
    Json(body): Json<serde_json::Value>,
) -> Json<serde_json::Value> {
    let new: NewPatient = match serde_json::from_value(body) {
        Ok(p) => p,
        Err(e) => {
            return Json(serde_json::json!({
                "ok": false,
                "error": format!("Invalid patient payload: {e}"),
            }));
        }
    };
    if new.name.trim().is_empty() {
        return Json(serde_json::json!({"ok": false, "error": "Patient name is required"}));
    }

    let patient = match state.db.insert_patient(&new) {
        Ok(p) => p,
        Err(e) => return Json(serde_json::json!({"ok": false, "error": e})),
    };

    // Analyze against the current knowledge snapshot. The snapshot Arc is
    // cloned out of the lock so a concurrent reload cannot change the view
    // mid-analysis.
    let knowledge = state.knowledge_snapshot();
    let recommendation = state.engine.analyze(&patient.symptoms, &knowledge);

    if let Err(e) = state.db.insert_history(&patient.id, &patient.name, &recommendation) {
        tracing::warn!("Failed to persist analysis for patient {}: {e}", patient.id);
    }
    tracing::info!(
        "Patient '{}' registered → {}",
        patient.name,
        recommendation.possible_condition
    );

    Json(serde_json::json!({
        "patient_id": patient.id,
        "ai_recommendation": recommendation,
    }))
}

/// Query parameters for the patient listing.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub critical: bool,
}

fn default_page() -> u32 { 1 }
fn default_limit() -> u32 { 10 }

/// List patients with pagination, name search, and gender/critical filters.
pub async fn list_patients(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Json<serde_json::Value> {
    let query = ListQuery {
        page: params.page,
        limit: params.limit,
        search: params.search,
        gender: params.gender,
        critical: params.critical,
    };
    match state.db.list_patients(&query) {
        Ok((patients, total)) => {
            let limit = query.limit.clamp(1, 100) as u64;
            Json(serde_json::json!({
                "patients": patients,
                "total": total,
                "page": query.page.max(1),
                "limit": limit,
                "total_pages": total.div_ceil(limit),
            }))
        }
        Err(e) => Json(serde_json::json!({"ok": false, "error": e})),
    }
}

/// Aggregate patient statistics.
pub async fn patient_stats(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    match state.db.stats() {
        Ok(stats) => Json(serde_json::json!(stats)),
        Err(e) => Json(serde_json::json!({"ok": false, "error": e})),
    }
}

/// One patient plus the latest stored recommendation.
pub async fn get_patient_details(
    State(state): State<Arc<AppState>>,
    Path(patient_id): Path<String>,
) -> Json<serde_json::Value> {
    let patient = match state.db.get_patient(&patient_id) {
        Ok(Some(p)) => p,
        Ok(None) => {
            return Json(serde_json::json!({"ok": false, "error": "Patient not found"}));
        }
        Err(e) => return Json(serde_json::json!({"ok": false, "error": e})),
    };
    let recommendation = match state.db.history_for(&patient_id) {
        Ok(rec) => rec,
        Err(e) => {
            tracing::warn!("Failed to load history for patient {patient_id}: {e}");
            None
        }
    };
    Json(serde_json::json!({
        "patient": patient,
        "recommendation": recommendation,
    }))
}

/// Reload the knowledge base from disk and publish a fresh snapshot.
/// In-flight analyses keep the snapshot they already cloned.
pub async fn reload_knowledge(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let count = state.reload_knowledge();
    tracing::info!("Knowledge base reloaded: {count} condition(s)");
    Json(serde_json::json!({"ok": true, "conditions": count}))
}
