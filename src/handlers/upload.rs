//! # Container Audio Endpoints
//!
//! Browser and desktop clients send whole audio files and want playable audio
//! back, so these endpoints skip the raw PCM profile entirely.
//!
//! ## Available Endpoints:
//! - `POST /stt` - multipart upload (`file`, optional `lang_hint`) → `{ "text": "..." }`
//! - `POST /tts` - `{ "text", "voice"?, "format"? }` → audio bytes (mp3 or wav)

use super::fail;
use crate::error::{AppError, AppResult};
use crate::provider::{AudioFile, SpeechFormat};
use crate::state::AppState;
use actix_multipart::{Field, Multipart};
use actix_web::{web, HttpResponse};
use futures_util::StreamExt;
use serde::Deserialize;
use serde_json::json;

const MAX_HINT_BYTES: usize = 64;

#[derive(Debug, Deserialize)]
pub struct TtsRequest {
    pub text: Option<String>,
    pub voice: Option<String>,
    #[serde(default)]
    pub format: SpeechFormat,
}

/// Transcribe an uploaded audio file.
///
/// The file is buffered in memory and rejected with 413 as soon as it grows
/// past the configured upload limit.
pub async fn stt(state: web::Data<AppState>, mut payload: Multipart) -> AppResult<HttpResponse> {
    let max_bytes = state.config.limits.max_upload_bytes;

    let mut file: Option<AudioFile> = None;
    let mut lang_hint: Option<String> = None;

    while let Some(item) = payload.next().await {
        let mut field: Field = item.map_err(|e| {
            fail("stt", AppError::InvalidInput(format!("multipart error: {}", e)))
        })?;

        let Some(content_disposition) = field.content_disposition() else {
            continue;
        };
        let field_name = content_disposition.get_name().unwrap_or_default().to_string();
        let file_name = content_disposition.get_filename().map(|s| s.to_string());

        match field_name.as_str() {
            "file" => {
                let bytes = read_field(&mut field, "file", max_bytes).await.map_err(|e| fail("stt", e))?;
                file = Some(AudioFile::upload(file_name.as_deref(), bytes));
            }
            "lang_hint" => {
                let bytes = read_field(&mut field, "lang_hint", MAX_HINT_BYTES).await.map_err(|e| fail("stt", e))?;
                lang_hint = Some(String::from_utf8_lossy(&bytes).into_owned());
            }
            _ => {
                // Drain unknown fields so the stream can advance.
                while let Some(chunk) = field.next().await {
                    chunk.map_err(|e| {
                        fail("stt", AppError::InvalidInput(format!("chunk error: {}", e)))
                    })?;
                }
            }
        }
    }

    let file = file
        .ok_or_else(|| fail("stt", AppError::InvalidInput("file missing".to_string())))?;

    let result = state
        .transcription
        .transcribe_file(file, lang_hint)
        .await
        .map_err(|e| fail("stt", e))?;

    Ok(HttpResponse::Ok().json(json!({ "text": result.text })))
}

/// Synthesize speech and return the audio container as-is.
pub async fn tts(
    state: web::Data<AppState>,
    body: web::Json<TtsRequest>,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();
    let max_chars = state.config.limits.max_tts_text_chars;

    let text = body
        .text
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .ok_or_else(|| fail("tts", AppError::InvalidInput("text missing".to_string())))?;

    if text.chars().count() > max_chars {
        return Err(fail(
            "tts",
            AppError::InvalidInput(format!("text too long (max {} characters)", max_chars)),
        ));
    }

    let audio = state
        .synthesis
        .synthesize_audio(&text, body.voice.as_deref(), body.format)
        .await
        .map_err(|e| fail("tts", e))?;

    Ok(HttpResponse::Ok()
        .content_type(body.format.content_type())
        .body(audio))
}

async fn read_field(field: &mut Field, name: &str, max_bytes: usize) -> AppResult<Vec<u8>> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(|e| AppError::InvalidInput(format!("chunk error: {}", e)))?;
        if bytes.len() + chunk.len() > max_bytes {
            return Err(AppError::PayloadTooLarge(format!(
                "{} too large (max {} bytes)",
                name, max_bytes
            )));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}
