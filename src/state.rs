//! # Application State
//!
//! State shared by every HTTP request handler.
//!
//! ## Key Rust Concepts:
//!
//! ### Arc (Atomically Reference Counted)
//! - **Purpose**: lets every worker thread hold the same configuration and gateways
//! - **Cheap clones**: cloning `AppState` only bumps reference counts
//!
//! ### No locks
//! Everything in here is read-only after startup. Per-request data (PCM
//! buffers, WAV containers) is owned by the handler that created it and
//! dropped with the response, so there is nothing to synchronize.
//!
//! ## Credentials:
//! The provider client is only built when a credential is configured. Gateways
//! hold `Option<Arc<dyn SpeechProvider>>` and report the missing credential per
//! request.

use crate::config::AppConfig;
use crate::provider::{OpenAiProvider, SpeechProvider};
use crate::synthesis::SynthesisGateway;
use crate::transcription::TranscriptionGateway;
use std::sync::Arc;
use std::time::Instant;

#[derive(Clone)]
pub struct AppState {
    /// Configuration loaded at startup
    pub config: Arc<AppConfig>,

    /// Speech-to-text gateway
    pub transcription: Arc<TranscriptionGateway>,

    /// Text-to-speech gateway
    pub synthesis: Arc<SynthesisGateway>,

    /// When the server started
    pub start_time: Instant,
}

impl AppState {
    /// Build state from configuration, creating the OpenAI client when a
    /// credential is present.
    pub fn new(config: AppConfig) -> Self {
        let provider = config.provider.api_key().map(|key| {
            Arc::new(OpenAiProvider::new(&config.provider.base_url, key)) as Arc<dyn SpeechProvider>
        });
        Self::with_provider(config, provider)
    }

    /// Build state around an explicit provider (or none).
    pub fn with_provider(config: AppConfig, provider: Option<Arc<dyn SpeechProvider>>) -> Self {
        let transcription = TranscriptionGateway::new(provider.clone(), config.provider.stt_model.clone());
        let synthesis = SynthesisGateway::new(
            provider,
            config.provider.tts_model.clone(),
            config.provider.tts_voice.clone(),
        );

        Self {
            config: Arc::new(config),
            transcription: Arc::new(transcription),
            synthesis: Arc::new(synthesis),
            start_time: Instant::now(),
        }
    }

    /// Whether provider calls can be made at all.
    pub fn provider_configured(&self) -> bool {
        self.transcription.is_configured() && self.synthesis.is_configured()
    }

    pub fn get_uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
