//! # Synthesis Gateway
//!
//! Requests speech from the hosted provider.
//!
//! ## Raw PCM Pipeline:
//! 1. **Validate** that text is present and the requested profile is supported
//! 2. **Check** that a provider credential is configured
//! 3. **Request** WAV output with the configured model and voice
//! 4. **Strip** the 44-byte header to get the PCM payload
//!
//! The payload is reported as 16kHz mono 16-bit. The provider's own header is
//! only inspected to log a warning when it says otherwise.

use crate::audio::profile::validate_profile;
use crate::audio::wav::BITS_PER_SAMPLE;
use crate::audio::{decode_wav, AudioProfile, WavHeader};
use crate::error::{AppError, AppResult};
use crate::provider::{SpeechFormat, SpeechProvider};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Message returned when the provider's WAV has no payload.
pub const INVALID_WAV: &str = "invalid wav returned from TTS";

/// A raw PCM synthesis request as declared by the client.
#[derive(Debug, Clone)]
pub struct RawSynthesisRequest {
    pub text: String,
    /// Informational only; echoed back to the client.
    pub lang: String,
    pub format: String,
    pub channels: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisResult {
    pub pcm: Vec<u8>,
    pub profile: AudioProfile,
    pub lang: String,
}

pub struct SynthesisGateway {
    /// `None` when no credential is configured.
    provider: Option<Arc<dyn SpeechProvider>>,
    model: String,
    voice: String,
}

impl SynthesisGateway {
    pub fn new(
        provider: Option<Arc<dyn SpeechProvider>>,
        model: impl Into<String>,
        voice: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            voice: voice.into(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    /// Synthesize `text` and return the raw PCM payload.
    pub async fn synthesize_pcm(&self, request: RawSynthesisRequest) -> AppResult<SynthesisResult> {
        if request.text.is_empty() {
            return Err(AppError::InvalidInput("text missing".to_string()));
        }
        validate_profile(&request.format, request.channels, 2)?;

        let provider = self.provider()?;
        let wav = self
            .request_audio(&**provider, &request.text, &self.voice, SpeechFormat::Wav)
            .await?;

        let profile = AudioProfile::synthesis();
        report_header_mismatch(&wav, &profile);

        let pcm = decode_wav(&wav).map_err(|e| {
            error!(provider = provider.name(), error = %e, "Provider returned unusable WAV");
            AppError::Upstream {
                message: Some(INVALID_WAV.to_string()),
                detail: e.to_string(),
            }
        })?;

        info!(
            chars = request.text.chars().count(),
            wav_bytes = wav.len(),
            pcm_bytes = pcm.len(),
            lang = %request.lang,
            "Synthesized raw PCM"
        );

        Ok(SynthesisResult {
            pcm: pcm.to_vec(),
            profile,
            lang: request.lang,
        })
    }

    /// Synthesize `text` and return the provider's container bytes unchanged.
    pub async fn synthesize_audio(
        &self,
        text: &str,
        voice: Option<&str>,
        format: SpeechFormat,
    ) -> AppResult<Vec<u8>> {
        if text.trim().is_empty() {
            return Err(AppError::InvalidInput("text missing".to_string()));
        }

        let provider = self.provider()?;
        let voice = voice
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(self.voice.as_str());

        let audio = self.request_audio(&**provider, text, voice, format).await?;
        info!(voice, format = format.as_str(), bytes = audio.len(), "Synthesized audio");

        Ok(audio)
    }

    fn provider(&self) -> AppResult<&Arc<dyn SpeechProvider>> {
        self.provider
            .as_ref()
            .ok_or_else(AppError::missing_credential)
    }

    async fn request_audio(
        &self,
        provider: &dyn SpeechProvider,
        text: &str,
        voice: &str,
        format: SpeechFormat,
    ) -> AppResult<Vec<u8>> {
        provider
            .synthesize(text, &self.model, voice, format)
            .await
            .map_err(|e| {
                error!(provider = provider.name(), model = %self.model, voice, error = %e, "Synthesis request failed");
                AppError::from(e)
            })
    }
}

fn report_header_mismatch(wav: &[u8], expected: &AudioProfile) {
    let Ok(header) = WavHeader::parse(wav) else {
        return;
    };

    if !header.has_riff_magic() {
        warn!("Synthesized audio does not start with a RIFF/WAVE header");
    } else if !header.matches(expected.sample_rate, expected.channels, BITS_PER_SAMPLE) {
        warn!(
            sample_rate = header.sample_rate,
            channels = header.channels,
            bits_per_sample = header.bits_per_sample,
            "Synthesized audio header differs from the reported profile"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::encode_wav;
    use crate::provider::fake::FakeProvider;
    use serde_json::Value;

    fn request(text: &str) -> RawSynthesisRequest {
        RawSynthesisRequest {
            text: text.to_string(),
            lang: "en".to_string(),
            format: "pcm_s16le".to_string(),
            channels: 1,
        }
    }

    fn gateway(provider: &Arc<FakeProvider>) -> SynthesisGateway {
        let provider: Arc<dyn SpeechProvider> = provider.clone();
        SynthesisGateway::new(Some(provider), "gpt-4o-mini-tts", "alloy")
    }

    #[tokio::test]
    async fn test_header_is_stripped() {
        let pcm: Vec<u8> = (1..=10).collect();
        let fake = Arc::new(FakeProvider::new(Value::Null, encode_wav(&pcm, 16000, 1)));

        let result = gateway(&fake).synthesize_pcm(request("hello")).await.unwrap();
        assert_eq!(result.pcm, pcm);
        assert_eq!(result.profile, AudioProfile::synthesis());
        assert_eq!(result.lang, "en");

        let calls = fake.syntheses.lock().unwrap();
        assert_eq!(
            calls[0],
            (
                "hello".to_string(),
                "gpt-4o-mini-tts".to_string(),
                "alloy".to_string(),
                SpeechFormat::Wav
            )
        );
    }

    #[tokio::test]
    async fn test_mismatched_header_still_decodes() {
        let fake = Arc::new(FakeProvider::new(Value::Null, encode_wav(&[5, 6], 24000, 1)));
        let result = gateway(&fake).synthesize_pcm(request("hi")).await.unwrap();
        assert_eq!(result.pcm, vec![5, 6]);
        assert_eq!(result.profile.sample_rate, 16000);
    }

    #[tokio::test]
    async fn test_short_wav_is_upstream_failure() {
        let fake = Arc::new(FakeProvider::new(Value::Null, vec![0u8; 44]));
        let err = gateway(&fake).synthesize_pcm(request("hi")).await.unwrap_err();
        match err {
            AppError::Upstream { message, .. } => assert_eq!(message.as_deref(), Some(INVALID_WAV)),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_input_checks_precede_provider() {
        let fake = Arc::new(FakeProvider::new(Value::Null, vec![]));

        let err = gateway(&fake).synthesize_pcm(request("")).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(ref m) if m == "text missing"));

        let mut req = request("hi");
        req.channels = 2;
        let err = gateway(&fake).synthesize_pcm(req).await.unwrap_err();
        assert!(matches!(err, AppError::UnsupportedProfile(_)));

        let mut req = request("hi");
        req.format = "mp3".to_string();
        let err = gateway(&fake).synthesize_pcm(req).await.unwrap_err();
        assert!(matches!(err, AppError::UnsupportedProfile(_)));

        assert!(fake.syntheses.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_credential() {
        let gateway = SynthesisGateway::new(None, "gpt-4o-mini-tts", "alloy");
        let err = gateway.synthesize_pcm(request("hi")).await.unwrap_err();
        assert!(matches!(err, AppError::ConfigurationMissing(_)));
    }

    #[tokio::test]
    async fn test_provider_failure() {
        let fake = Arc::new(FakeProvider::failing());
        let err = gateway(&fake).synthesize_pcm(request("hi")).await.unwrap_err();
        assert!(matches!(err, AppError::Upstream { message: None, .. }));
    }

    #[tokio::test]
    async fn test_audio_passthrough_uses_voice_override() {
        let fake = Arc::new(FakeProvider::new(Value::Null, vec![0xFF, 0xFB, 0x90]));

        let audio = gateway(&fake)
            .synthesize_audio("hello", Some("marin"), SpeechFormat::Mp3)
            .await
            .unwrap();
        assert_eq!(audio, vec![0xFF, 0xFB, 0x90]);

        gateway(&fake)
            .synthesize_audio("hello", None, SpeechFormat::Wav)
            .await
            .unwrap();

        let calls = fake.syntheses.lock().unwrap();
        assert_eq!(calls[0].2, "marin");
        assert_eq!(calls[0].3, SpeechFormat::Mp3);
        assert_eq!(calls[1].2, "alloy");
    }
}
