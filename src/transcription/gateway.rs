//! # Transcription Gateway
//!
//! Turns client audio into text through the hosted provider.
//!
//! ## Raw PCM Pipeline:
//! 1. **Validate** the declared profile and sample rate
//! 2. **Decode** the base64 payload and check it holds whole frames
//! 3. **Check** that a provider credential is configured
//! 4. **Encode** the PCM into a WAV container
//! 5. **Submit** it as `audio.wav` (`audio/wav`) with the configured model
//! 6. **Extract** the `text` field, falling back to the whole response
//!
//! Provider failures are logged here with full detail and surfaced as an
//! opaque upstream error. There is no retry.

use super::text::clean_text;
use crate::audio::profile::{validate_profile, validate_sample_rate};
use crate::audio::{encode_wav, AudioProfile};
use crate::error::{AppError, AppResult};
use crate::provider::{AudioFile, SpeechProvider};
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info};

/// Standard alphabet; padding is optional on input.
const PCM_B64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// A raw PCM transcription request as declared by the client.
#[derive(Debug, Clone)]
pub struct RawPcmRequest {
    pub pcm_b64: String,
    pub sample_rate: i64,
    pub channels: i64,
    pub sample_width: i64,
    pub format: String,
    pub lang_hint: Option<String>,
}

/// Recognized text plus the language hint it was produced with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscriptionResult {
    pub text: String,
    pub lang: Option<String>,
}

pub struct TranscriptionGateway {
    /// `None` when no credential is configured.
    provider: Option<Arc<dyn SpeechProvider>>,
    model: String,
}

impl TranscriptionGateway {
    pub fn new(provider: Option<Arc<dyn SpeechProvider>>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    /// Transcribe base64 raw PCM in the supported profile.
    pub async fn transcribe_pcm(&self, request: RawPcmRequest) -> AppResult<TranscriptionResult> {
        validate_profile(&request.format, request.channels, request.sample_width)?;
        let sample_rate = validate_sample_rate(request.sample_rate)?;

        let pcm = decode_pcm_b64(&request.pcm_b64)?;

        let profile = AudioProfile::mono_s16le(sample_rate);
        profile.check_alignment(&pcm)?;

        let provider = self.provider()?;
        let wav = encode_wav(&pcm, profile.sample_rate, profile.channels);

        info!(
            sample_rate,
            pcm_bytes = pcm.len(),
            wav_bytes = wav.len(),
            lang_hint = request.lang_hint.as_deref().unwrap_or("auto"),
            "Transcribing raw PCM"
        );

        let language = normalize_hint(request.lang_hint);
        let text = self
            .submit(&**provider, AudioFile::wav(wav), language.as_deref())
            .await?;

        Ok(TranscriptionResult { text, lang: language })
    }

    /// Transcribe an uploaded audio file without re-encoding it.
    pub async fn transcribe_file(
        &self,
        file: AudioFile,
        lang_hint: Option<String>,
    ) -> AppResult<TranscriptionResult> {
        if file.bytes.is_empty() {
            return Err(AppError::InvalidInput("file is empty".to_string()));
        }

        let provider = self.provider()?;
        info!(file = %file.file_name, mime = %file.mime_type, bytes = file.bytes.len(), "Transcribing uploaded file");

        let language = normalize_hint(lang_hint);
        let text = self
            .submit(&**provider, file, language.as_deref())
            .await?;

        Ok(TranscriptionResult { text, lang: language })
    }

    fn provider(&self) -> AppResult<&Arc<dyn SpeechProvider>> {
        self.provider
            .as_ref()
            .ok_or_else(AppError::missing_credential)
    }

    async fn submit(
        &self,
        provider: &dyn SpeechProvider,
        file: AudioFile,
        language: Option<&str>,
    ) -> AppResult<String> {
        let body = provider
            .transcribe(file, &self.model, language)
            .await
            .map_err(|e| {
                error!(provider = provider.name(), model = %self.model, error = %e, "Transcription request failed");
                AppError::from(e)
            })?;

        Ok(clean_text(&extract_text(&body)))
    }
}

/// Decode base64 PCM, ignoring line breaks and other ASCII whitespace.
fn decode_pcm_b64(pcm_b64: &str) -> AppResult<Vec<u8>> {
    let compact: String = pcm_b64.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    PCM_B64
        .decode(compact)
        .map_err(|_| AppError::InvalidInput("pcm_b64 is not valid base64".to_string()))
}

/// Blank hints mean "let the provider detect the language".
fn normalize_hint(hint: Option<String>) -> Option<String> {
    hint.map(|h| h.trim().to_string()).filter(|h| !h.is_empty())
}

/// The `text` field when present, otherwise the whole response as a string.
fn extract_text(body: &Value) -> String {
    match body.get("text").and_then(Value::as_str) {
        Some(text) => text.to_string(),
        None => match body {
            Value::String(raw) => raw.clone(),
            other => other.to_string(),
        },
    }
}
