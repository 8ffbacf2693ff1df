use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use watermark_core::{Lang, LogoPreference, PollPolicy, ProcessOptions, Quality};
use watermark_engine::ServiceSettings;
use watermark_logging::wm_info;

pub const DEFAULT_CONFIG_FILE: &str = "wmclient.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot parse config {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("invalid {field}: {value:?}")]
    Invalid { field: &'static str, value: String },
}

/// On-disk client settings. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub server_url: String,
    pub output_dir: PathBuf,
    pub watermark_style: Option<u8>,
    pub quality: String,
    pub burn_after_read: bool,
    pub logo_preference: Option<String>,
    pub lang: String,
    pub zip: bool,
    pub initial_poll_delay_ms: u64,
    pub poll_interval_ms: u64,
    pub max_polls: u32,
    pub max_consecutive_poll_errors: u32,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub max_upload_mb: u64,
    pub max_download_mb: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        let service = ServiceSettings::default();
        let policy = PollPolicy::default();
        Self {
            server_url: service.base_url,
            output_dir: PathBuf::from("watermarked"),
            watermark_style: None,
            quality: Quality::default().as_str().to_string(),
            burn_after_read: false,
            logo_preference: None,
            lang: Lang::default().code().to_string(),
            zip: false,
            initial_poll_delay_ms: policy.initial_delay.as_millis() as u64,
            poll_interval_ms: policy.interval.as_millis() as u64,
            max_polls: policy.max_polls,
            max_consecutive_poll_errors: policy.max_consecutive_errors,
            connect_timeout_secs: service.connect_timeout.as_secs(),
            request_timeout_secs: service.request_timeout.as_secs(),
            max_upload_mb: service.max_upload_bytes / (1024 * 1024),
            max_download_mb: service.max_download_bytes / (1024 * 1024),
        }
    }
}

/// Settings split by the component that consumes them.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub service: ServiceSettings,
    pub policy: PollPolicy,
    pub options: ProcessOptions,
    pub output_dir: PathBuf,
    pub zip: bool,
}

/// Loads `path`, or the default file when `path` is `None`.
///
/// A missing default file yields defaults; a missing explicit file is an error.
pub fn load_config(path: Option<&Path>) -> Result<ClientConfig, ConfigError> {
    let (path, explicit) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };
    let content = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound && !explicit => {
            return Ok(ClientConfig::default());
        }
        Err(source) => return Err(ConfigError::Read { path, source }),
    };
    let config = ron::from_str(&content).map_err(|err| ConfigError::Parse {
        path: path.clone(),
        message: err.to_string(),
    })?;
    wm_info!("Loaded config from {:?}", path);
    Ok(config)
}

impl ClientConfig {
    pub fn resolve(self) -> Result<ResolvedConfig, ConfigError> {
        let quality = Quality::parse(&self.quality).ok_or(ConfigError::Invalid {
            field: "quality",
            value: self.quality.clone(),
        })?;
        let lang = Lang::parse(&self.lang).ok_or(ConfigError::Invalid {
            field: "lang",
            value: self.lang.clone(),
        })?;
        let logo_preference = match &self.logo_preference {
            Some(raw) => Some(LogoPreference::parse(raw).ok_or(ConfigError::Invalid {
                field: "logo_preference",
                value: raw.clone(),
            })?),
            None => None,
        };
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "poll_interval_ms",
                value: "0".to_string(),
            });
        }

        Ok(ResolvedConfig {
            service: ServiceSettings {
                base_url: self.server_url,
                connect_timeout: Duration::from_secs(self.connect_timeout_secs),
                request_timeout: Duration::from_secs(self.request_timeout_secs),
                max_upload_bytes: self.max_upload_mb.saturating_mul(1024 * 1024),
                max_download_bytes: self.max_download_mb.saturating_mul(1024 * 1024),
            },
            policy: PollPolicy {
                initial_delay: Duration::from_millis(self.initial_poll_delay_ms),
                interval: Duration::from_millis(self.poll_interval_ms),
                max_polls: self.max_polls.max(1),
                max_consecutive_errors: self.max_consecutive_poll_errors.max(1),
            },
            options: ProcessOptions {
                watermark_style: self.watermark_style,
                quality,
                burn_after_read: self.burn_after_read,
                logo_preference,
                lang,
            },
            output_dir: self.output_dir,
            zip: self.zip,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn partial_file_keeps_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("wmclient.ron");
        fs::write(
            &path,
            r#"(server_url: "http://wm.local:8080", watermark_style: Some(2), lang: "en")"#,
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.server_url, "http://wm.local:8080");
        assert_eq!(config.watermark_style, Some(2));
        assert_eq!(config.poll_interval_ms, ClientConfig::default().poll_interval_ms);

        let resolved = config.resolve().unwrap();
        assert_eq!(resolved.options.lang, Lang::En);
        assert_eq!(resolved.options.quality, Quality::High);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let err = load_config(Some(&temp.path().join("nope.ron"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let config = ClientConfig {
            quality: "ultra".to_string(),
            ..ClientConfig::default()
        };
        assert!(matches!(
            config.resolve(),
            Err(ConfigError::Invalid { field: "quality", .. })
        ));

        let config = ClientConfig {
            logo_preference: Some("canon".to_string()),
            ..ClientConfig::default()
        };
        assert!(matches!(
            config.resolve(),
            Err(ConfigError::Invalid {
                field: "logo_preference",
                ..
            })
        ));
    }
}
