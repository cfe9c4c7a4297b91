//! OpenAI audio API client.
//!
//! - Transcription: `POST {base_url}/audio/transcriptions` (multipart)
//! - Synthesis: `POST {base_url}/audio/speech` (JSON)
//!
//! No retries and no request timeout: a failed call is reported once and the
//! caller's connection is the only deadline.

use super::{AudioFile, ProviderError, SpeechFormat, SpeechProvider};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde_json::json;
use tracing::{debug, info};

pub struct OpenAiProvider {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenAiProvider {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

#[async_trait]
impl SpeechProvider for OpenAiProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn transcribe(
        &self,
        file: AudioFile,
        model: &str,
        language: Option<&str>,
    ) -> Result<serde_json::Value, ProviderError> {
        let size = file.bytes.len();
        let file_part = Part::bytes(file.bytes)
            .file_name(file.file_name.clone())
            .mime_str(&file.mime_type)?;

        let mut form = Form::new()
            .part("file", file_part)
            .text("model", model.to_string())
            .text("response_format", "json");

        if let Some(lang) = language {
            form = form.text("language", lang.to_string());
        }

        debug!(model, file = %file.file_name, bytes = size, "Sending transcription request");

        let response = self
            .http_client
            .post(self.endpoint("audio/transcriptions"))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ProviderError::status(status.as_u16(), &body));
        }

        info!(model, bytes = size, "Transcription response received");

        Ok(serde_json::from_str(&body).unwrap_or_else(|_| serde_json::Value::String(body)))
    }

    async fn synthesize(
        &self,
        text: &str,
        model: &str,
        voice: &str,
        format: SpeechFormat,
    ) -> Result<Vec<u8>, ProviderError> {
        debug!(model, voice, format = format.as_str(), chars = text.chars().count(), "Sending synthesis request");

        let response = self
            .http_client
            .post(self.endpoint("audio/speech"))
            .bearer_auth(&self.api_key)
            .json(&json!({
                "model": model,
                "voice": voice,
                "input": text,
                "response_format": format.as_str(),
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::status(status.as_u16(), &body));
        }

        let audio = response.bytes().await?;
        info!(model, voice, bytes = audio.len(), "Synthesis response received");

        Ok(audio.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        let provider = OpenAiProvider::new("https://api.openai.com/v1/", "sk-test");
        assert_eq!(
            provider.endpoint("audio/speech"),
            "https://api.openai.com/v1/audio/speech"
        );
    }

    #[tokio::test]
    async fn test_transcribe_returns_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/audio/transcriptions"))
            .and(header("authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"text": "salem"})))
            .expect(1)
            .mount(&server)
            .await;

        let provider = OpenAiProvider::new(&server.uri(), "sk-test");
        let body = provider
            .transcribe(AudioFile::wav(vec![0u8; 48]), "gpt-4o-mini-transcribe", Some("kk"))
            .await
            .unwrap();

        assert_eq!(body, json!({"text": "salem"}));
    }

    #[tokio::test]
    async fn test_transcribe_plain_text_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/audio/transcriptions"))
            .respond_with(ResponseTemplate::new(200).set_body_string("hello there"))
            .mount(&server)
            .await;

        let provider = OpenAiProvider::new(&server.uri(), "sk-test");
        let body = provider
            .transcribe(AudioFile::wav(vec![0u8; 48]), "whisper-1", None)
            .await
            .unwrap();

        assert_eq!(body, serde_json::Value::String("hello there".into()));
    }

    #[tokio::test]
    async fn test_transcribe_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/audio/transcriptions"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
            .mount(&server)
            .await;

        let provider = OpenAiProvider::new(&server.uri(), "sk-bad");
        let err = provider
            .transcribe(AudioFile::wav(vec![0u8; 48]), "whisper-1", None)
            .await
            .unwrap_err();

        match err {
            ProviderError::Status { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body, "invalid api key");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_synthesize_returns_audio_bytes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/audio/speech"))
            .and(body_partial_json(json!({
                "model": "gpt-4o-mini-tts",
                "voice": "alloy",
                "input": "hello",
                "response_format": "wav"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![7u8; 50]))
            .expect(1)
            .mount(&server)
            .await;

        let provider = OpenAiProvider::new(&server.uri(), "sk-test");
        let audio = provider
            .synthesize("hello", "gpt-4o-mini-tts", "alloy", SpeechFormat::Wav)
            .await
            .unwrap();

        assert_eq!(audio, vec![7u8; 50]);
    }

    #[tokio::test]
    async fn test_synthesize_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/audio/speech"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let provider = OpenAiProvider::new(&server.uri(), "sk-test");
        let err = provider
            .synthesize("hello", "gpt-4o-mini-tts", "alloy", SpeechFormat::Mp3)
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::Status { status: 429, .. }));
    }
}
