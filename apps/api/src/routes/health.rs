use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service status plus whether a text generator is configured.
/// An unconfigured generator still serves requests; tailoring then yields the
/// fallback document.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "tailor-api",
        "generator": {
            "configured": state.config.groq_api_key.is_some(),
            "model": state.config.groq_model,
        }
    }))
}
