//! # Speech Relay - Main Application Entry Point
//!
//! HTTP relay between small voice devices and a hosted speech provider.
//! Devices exchange raw PCM as base64 JSON; the relay wraps/unwraps the WAV
//! container and forwards the audio upstream.
//!
//! ## Key Rust Concepts Used:
//! - **async/await**: every handler awaits the provider without blocking a worker
//! - **modules**: one module per concern (audio, provider, gateways, HTTP)
//! - **Result<T, E>**: startup errors propagate with `?` through `anyhow`
//! - **static**: the shutdown flag lives for the whole process
//!
//! ## Application Architecture:
//! - **config**: defaults, `config.toml` and environment variables
//! - **audio**: WAV container and PCM profile rules
//! - **provider**: the hosted speech service behind a trait
//! - **transcription / synthesis**: request validation and provider calls
//! - **handlers / health**: HTTP endpoints
//! - **middleware**: request logging
//! - **error**: `{"error": ...}` responses with the right status codes

mod audio;
mod config;
mod error;
mod handlers;
mod health;
mod middleware;
mod provider;
mod state;
mod synthesis;
mod transcription;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use anyhow::Result;
use config::AppConfig;
use state::AppState;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, info, warn};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Set once SIGTERM or SIGINT arrives.
static SHUTDOWN_SIGNAL: AtomicBool = AtomicBool::new(false);

/// ## Startup sequence:
/// 1. **Load `.env`** and set up tracing
/// 2. **Load and validate configuration**
/// 3. **Build shared state** (provider client only when a key is present)
/// 4. **Serve** until the process is signalled, then stop gracefully
#[actix_web::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    init_tracing()?;

    let config = AppConfig::load()?;
    config.validate()?;

    info!("Starting speech-relay v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration loaded: {}:{}", config.server.host, config.server.port);

    if config.provider.is_configured() {
        info!(
            base_url = %config.provider.base_url,
            stt_model = %config.provider.stt_model,
            tts_model = %config.provider.tts_model,
            "Speech provider configured"
        );
    } else {
        // The server still starts; STT/TTS requests answer 500 until a key is set.
        warn!("OPENAI_API_KEY is not set, speech endpoints will fail");
    }

    let json_limit = config.limits.max_json_body_bytes;
    let app_state = AppState::new(config.clone());
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);

    setup_signal_handlers();

    info!("Starting HTTP server on {}", bind_addr);

    let server = HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(handlers::json_config(json_limit))
            // Middleware runs in reverse registration order for responses
            .wrap(cors)
            .wrap(TracingLogger::default())
            .wrap(middleware::RequestLogging)
            .configure(handlers::configure)
    })
    .bind(&bind_addr)?
    .run();

    let server_handle = server.handle();
    let server_task = tokio::spawn(server);

    tokio::select! {
        result = server_task => {
            match result {
                Ok(server_result) => {
                    if let Err(e) = server_result {
                        error!("Server error: {}", e);
                    }
                }
                Err(e) => {
                    error!("Server task error: {}", e);
                }
            }
        }
        _ = wait_for_shutdown() => {
            info!("Shutdown signal received, stopping server...");
            server_handle.stop(true).await;
        }
    }

    info!("Server stopped gracefully");
    Ok(())
}

/// Console logging filtered by `RUST_LOG`
/// (default `speech_relay=debug,actix_web=info`).
fn init_tracing() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "speech_relay=debug,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    Ok(())
}

/// Flip [`SHUTDOWN_SIGNAL`] on SIGTERM or SIGINT.
fn setup_signal_handlers() {
    tokio::spawn(async {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler");
        let mut sigint = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())
            .expect("Failed to install SIGINT handler");

        tokio::select! {
            _ = sigterm.recv() => {
                info!("Received SIGTERM");
            }
            _ = sigint.recv() => {
                info!("Received SIGINT");
            }
        }

        SHUTDOWN_SIGNAL.store(true, Ordering::SeqCst);
    });
}

async fn wait_for_shutdown() {
    while !SHUTDOWN_SIGNAL.load(Ordering::SeqCst) {
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
    }
}
