//! # Raw PCM Speech Endpoints
//!
//! JSON endpoints used by the device firmware. Audio travels as base64 raw
//! PCM in the single supported profile (`pcm_s16le`, mono, 16-bit).
//!
//! ## `POST /stt_raw`
//! ```json
//! { "pcm_b64": "...", "sample_rate": 16000, "channels": 1,
//!   "sample_width": 2, "format": "pcm_s16le", "lang_hint": "ru" }
//! ```
//! → `{ "text": "...", "lang": "ru" | null }`
//!
//! ## `POST /tts_raw`
//! ```json
//! { "text": "Hello", "lang": "en", "format": "pcm_s16le", "channels": 1 }
//! ```
//! → `{ "pcm_b64": "...", "sample_rate": 16000, "channels": 1,
//!      "sample_width": 2, "format": "pcm_s16le", "lang": "en" }`

use super::fail;
use crate::audio::SampleEncoding;
use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::synthesis::RawSynthesisRequest;
use crate::transcription::RawPcmRequest;
use actix_web::{web, HttpResponse};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize};

fn default_sample_rate() -> i64 {
    16000
}

fn default_channels() -> i64 {
    1
}

fn default_sample_width() -> i64 {
    2
}

fn default_format() -> String {
    SampleEncoding::PcmS16Le.as_str().to_string()
}

fn default_lang() -> String {
    "en".to_string()
}

/// Integer field that also accepts whole-valued floats such as `16000.0`.
fn integral<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let number = serde_json::Number::deserialize(deserializer)?;
    if let Some(value) = number.as_i64() {
        return Ok(value);
    }
    match number.as_f64() {
        Some(value) if value.fract() == 0.0 && value.abs() <= i64::MAX as f64 => Ok(value as i64),
        _ => Err(serde::de::Error::custom(format!("expected an integer, got {}", number))),
    }
}

#[derive(Debug, Deserialize)]
pub struct SttRawRequest {
    pub pcm_b64: Option<String>,
    #[serde(default = "default_sample_rate", deserialize_with = "integral")]
    pub sample_rate: i64,
    #[serde(default = "default_channels", deserialize_with = "integral")]
    pub channels: i64,
    #[serde(default = "default_sample_width", deserialize_with = "integral")]
    pub sample_width: i64,
    #[serde(default = "default_format")]
    pub format: String,
    pub lang_hint: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TtsRawRequest {
    pub text: Option<String>,
    #[serde(default = "default_lang")]
    pub lang: String,
    #[serde(default = "default_format")]
    pub format: String,
    #[serde(default = "default_channels", deserialize_with = "integral")]
    pub channels: i64,
}

#[derive(Debug, Serialize)]
pub struct TtsRawResponse {
    pub pcm_b64: String,
    pub sample_rate: u32,
    pub channels: u16,
    pub sample_width: u16,
    pub format: SampleEncoding,
    pub lang: String,
}

pub async fn stt_raw(
    state: web::Data<AppState>,
    body: web::Json<SttRawRequest>,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();

    let pcm_b64 = body
        .pcm_b64
        .filter(|b64| !b64.is_empty())
        .ok_or_else(|| fail("stt_raw", AppError::InvalidInput("pcm_b64 missing".to_string())))?;

    let request = RawPcmRequest {
        pcm_b64,
        sample_rate: body.sample_rate,
        channels: body.channels,
        sample_width: body.sample_width,
        format: body.format,
        lang_hint: body.lang_hint,
    };

    let result = state
        .transcription
        .transcribe_pcm(request)
        .await
        .map_err(|e| fail("stt_raw", e))?;

    Ok(HttpResponse::Ok().json(result))
}

pub async fn tts_raw(
    state: web::Data<AppState>,
    body: web::Json<TtsRawRequest>,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();

    let text = body
        .text
        .filter(|text| !text.is_empty())
        .ok_or_else(|| fail("tts_raw", AppError::InvalidInput("text missing".to_string())))?;

    let request = RawSynthesisRequest {
        text,
        lang: body.lang,
        format: body.format,
        channels: body.channels,
    };

    let result = state
        .synthesis
        .synthesize_pcm(request)
        .await
        .map_err(|e| fail("tts_raw", e))?;

    Ok(HttpResponse::Ok().json(TtsRawResponse {
        pcm_b64: STANDARD.encode(&result.pcm),
        sample_rate: result.profile.sample_rate,
        channels: result.profile.channels,
        sample_width: result.profile.sample_width(),
        format: result.profile.encoding,
        lang: result.lang,
    }))
}
