//! # Configuration Management
//!
//! This module loads the relay's configuration from multiple sources:
//! - Default values (built into the code)
//! - TOML configuration file (config.toml, optional)
//! - Environment variables with the APP__ prefix (`__` separates nesting levels)
//! - Platform and provider variables (HOST, PORT, OPENAI_*)
//!
//! ## Key Rust Concepts Used:
//! - **Serde**: converting between Rust structs and config sources
//! - **Option<String>**: the provider credential may legitimately be absent
//! - **Custom Debug**: the credential never ends up in log output
//!
//! ## Configuration Priority (highest to lowest):
//! 1. HOST / PORT / OPENAI_* environment variables
//! 2. APP__* environment variables (e.g. APP__SERVER__PORT, APP__LIMITS__MAX_UPLOAD_BYTES)
//! 3. Configuration file (config.toml)
//! 4. Default values (defined in the Default impl)
//!
//! ## Credentials:
//! A missing `OPENAI_API_KEY` does not stop the server from starting. The
//! STT/TTS endpoints report it per request instead.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;

/// Environment variables mapped onto provider settings.
const PROVIDER_ENV_OVERRIDES: [(&str, &str); 5] = [
    ("OPENAI_API_KEY", "provider.api_key"),
    ("OPENAI_BASE_URL", "provider.base_url"),
    ("OPENAI_STT_MODEL", "provider.stt_model"),
    ("OPENAI_TTS_MODEL", "provider.tts_model"),
    ("OPENAI_TTS_VOICE", "provider.tts_voice"),
];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub provider: ProviderConfig,
    pub limits: LimitsConfig,
}

/// Where the HTTP server listens.
///
/// ## Common values:
/// - `host = "0.0.0.0"`: reachable from devices on the local network
/// - `host = "127.0.0.1"`: localhost only
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Settings for the hosted speech provider.
///
/// ## Fields:
/// - `api_key`: bearer credential; never serialized and redacted from Debug
/// - `base_url`: API root, e.g. `https://api.openai.com/v1`
/// - `stt_model`: model used for every transcription
/// - `tts_model` / `tts_voice`: model and voice used for every synthesis
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    pub base_url: String,
    pub stt_model: String,
    pub tts_model: String,
    pub tts_voice: String,
}

impl ProviderConfig {
    /// The credential, if one is configured and non-blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    pub fn is_configured(&self) -> bool {
        self.api_key().is_some()
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &self.api_key().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("stt_model", &self.stt_model)
            .field("tts_model", &self.tts_model)
            .field("tts_voice", &self.tts_voice)
            .finish()
    }
}

/// Request size limits.
///
/// ## Fields:
/// - `max_json_body_bytes`: largest JSON body accepted (base64 audio inflates by 4/3)
/// - `max_upload_bytes`: largest multipart file accepted by `/stt`
/// - `max_tts_text_chars`: longest text accepted by `/tts`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    pub max_json_body_bytes: usize,
    pub max_upload_bytes: usize,
    pub max_tts_text_chars: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
            },
            provider: ProviderConfig {
                api_key: None,
                base_url: "https://api.openai.com/v1".to_string(),
                stt_model: "gpt-4o-mini-transcribe".to_string(),
                tts_model: "gpt-4o-mini-tts".to_string(),
                tts_voice: "alloy".to_string(),
            },
            limits: LimitsConfig {
                max_json_body_bytes: 10 * 1024 * 1024,
                max_upload_bytes: 25 * 1024 * 1024,
                max_tts_text_chars: 2000,
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from every source in priority order.
    ///
    /// ## Environment Variable Examples:
    /// - `APP__SERVER__PORT=9000`: override server port
    /// - `APP__PROVIDER__TTS_VOICE=marin`: override synthesis voice
    /// - `PORT=3000`: special case for deployment platforms
    /// - `OPENAI_API_KEY=sk-...`: provider credential
    pub fn load() -> Result<Self> {
        let mut settings = config::Config::builder()
            .add_source(config::Config::try_from(&AppConfig::default())?)
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"));

        if let Ok(host) = env::var("HOST") {
            settings = settings.set_override("server.host", host)?;
        }

        if let Ok(port) = env::var("PORT") {
            settings = settings.set_override("server.port", port)?;
        }

        for (var, key) in PROVIDER_ENV_OVERRIDES {
            if let Ok(value) = env::var(var) {
                let value = value.trim().to_string();
                if !value.is_empty() {
                    settings = settings.set_override(key, value)?;
                }
            }
        }

        let config = settings.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Validate that the configuration values make sense.
    ///
    /// The credential is deliberately not checked here.
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(anyhow::anyhow!("Server port cannot be 0"));
        }

        if self.provider.base_url.trim().is_empty() {
            return Err(anyhow::anyhow!("Provider base URL cannot be empty"));
        }

        if !self.provider.base_url.starts_with("http://") && !self.provider.base_url.starts_with("https://") {
            return Err(anyhow::anyhow!(
                "Provider base URL must start with http:// or https://, got {}",
                self.provider.base_url
            ));
        }

        for (name, value) in [
            ("stt_model", &self.provider.stt_model),
            ("tts_model", &self.provider.tts_model),
            ("tts_voice", &self.provider.tts_voice),
        ] {
            if value.trim().is_empty() {
                return Err(anyhow::anyhow!("Provider {} cannot be empty", name));
            }
        }

        if self.limits.max_json_body_bytes == 0 || self.limits.max_upload_bytes == 0 {
            return Err(anyhow::anyhow!("Body size limits must be greater than 0"));
        }

        if self.limits.max_tts_text_chars == 0 {
            return Err(anyhow::anyhow!("TTS text limit must be greater than 0"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.limits.max_json_body_bytes, 10 * 1024 * 1024);
        assert!(!config.provider.is_configured());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.provider.base_url = "api.openai.com".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.provider.stt_model = " ".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.limits.max_upload_bytes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_blank_api_key_is_not_configured() {
        let mut config = AppConfig::default();
        config.provider.api_key = Some("   ".to_string());
        assert!(!config.provider.is_configured());

        config.provider.api_key = Some(" sk-test ".to_string());
        assert_eq!(config.provider.api_key(), Some("sk-test"));
    }

    #[test]
    fn test_api_key_never_leaks() {
        let mut config = AppConfig::default();
        config.provider.api_key = Some("sk-secret".to_string());

        let debug = format!("{:?}", config);
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("<redacted>"));

        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("sk-secret"));
    }

    #[test]
    fn test_defaults_round_trip_through_config_crate() {
        let loaded: AppConfig = config::Config::builder()
            .add_source(config::Config::try_from(&AppConfig::default()).unwrap())
            .set_override("provider.api_key", "sk-test")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(loaded.provider.api_key(), Some("sk-test"));
        assert_eq!(loaded.provider.stt_model, "gpt-4o-mini-transcribe");
        assert_eq!(loaded.limits.max_upload_bytes, 25 * 1024 * 1024);
    }
}
