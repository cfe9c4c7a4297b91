//! HTTP handlers and route table.

pub mod speech;
pub mod upload;

use crate::error::AppError;
use crate::health;
use actix_web::error::JsonPayloadError;
use actix_web::web;
use tracing::{error, warn};

/// Log a failed request and attach the operation name to its error.
pub(crate) fn fail(operation: &str, err: AppError) -> AppError {
    let err = err.in_operation(operation);
    if err.status_code().is_server_error() {
        error!(operation, error = %err, "Request failed");
    } else {
        warn!(operation, error = %err, "Request rejected");
    }
    err
}

/// JSON extractor settings: body size limit and `{"error": ...}` rejections.
pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(move |err, _req| {
            let app_error = match &err {
                JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
                    AppError::PayloadTooLarge(format!("request body too large (max {} bytes)", limit))
                }
                _ => AppError::InvalidInput(format!("invalid JSON body: {}", err)),
            };
            warn!(error = %app_error, "Rejected JSON body");
            app_error.into()
        })
}

/// Register every relay endpoint.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health_check))
        .route("/ping", web::post().to(health::ping))
        .route("/stt_raw", web::post().to(speech::stt_raw))
        .route("/tts_raw", web::post().to(speech::tts_raw))
        .route("/stt", web::post().to(upload::stt))
        .route("/tts", web::post().to(upload::tts));
}
