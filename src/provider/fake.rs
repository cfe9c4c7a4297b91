//! In-memory provider used by tests across the crate.

use super::{AudioFile, ProviderError, SpeechFormat, SpeechProvider};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Mutex;

/// In-memory provider recording what it was asked to do.
pub struct FakeProvider {
    pub transcript: Value,
    pub speech: Vec<u8>,
    pub fail: bool,
    pub uploads: Mutex<Vec<(AudioFile, String, Option<String>)>>,
    pub syntheses: Mutex<Vec<(String, String, String, SpeechFormat)>>,
}

impl FakeProvider {
    pub fn new(transcript: Value, speech: Vec<u8>) -> Self {
        Self {
            transcript,
            speech,
            fail: false,
            uploads: Mutex::new(Vec::new()),
            syntheses: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(Value::Null, Vec::new())
        }
    }
}

#[async_trait]
impl SpeechProvider for FakeProvider {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn transcribe(
        &self,
        file: AudioFile,
        model: &str,
        language: Option<&str>,
    ) -> Result<Value, ProviderError> {
        self.uploads
            .lock()
            .unwrap()
            .push((file, model.to_string(), language.map(str::to_string)));
        if self.fail {
            return Err(ProviderError::Status { status: 503, body: "unavailable".into() });
        }
        Ok(self.transcript.clone())
    }

    async fn synthesize(
        &self,
        text: &str,
        model: &str,
        voice: &str,
        format: SpeechFormat,
    ) -> Result<Vec<u8>, ProviderError> {
        self.syntheses.lock().unwrap().push((
            text.to_string(),
            model.to_string(),
            voice.to_string(),
            format,
        ));
        if self.fail {
            return Err(ProviderError::Status { status: 503, body: "unavailable".into() });
        }
        Ok(self.speech.clone())
    }
}
