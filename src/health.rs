//! Liveness and diagnostic endpoints.

use crate::error::{AppError, AppResult};
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::{json, Value};

/// `GET /health`
///
/// Always `ok: true` while the process is serving. `provider_configured`
/// tells whether STT/TTS calls can succeed at all.
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "ok": true,
        "provider_configured": state.provider_configured(),
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_seconds": state.get_uptime_seconds(),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

#[derive(Debug, Deserialize)]
pub struct PingRequest {
    pub message: Option<Value>,
}

/// `POST /ping` echoes the message back: `{"reply": "got: <message>"}`.
///
/// Non-string messages are echoed in their JSON form (`5` → `"got: 5"`).
pub async fn ping(body: web::Json<PingRequest>) -> AppResult<HttpResponse> {
    let message = match body.into_inner().message {
        Some(Value::String(text)) => text,
        Some(other) => other.to_string(),
        None => return Err(AppError::InvalidInput("message missing".to_string())),
    };

    Ok(HttpResponse::Ok().json(json!({ "reply": format!("got: {}", message) })))
}
