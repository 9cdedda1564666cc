//! Environment-driven configuration.
//!
//! Values are read once at startup. `from_lookup` takes the variable source as a
//! closure so tests can build a configuration without touching the process env.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// How long a single PDF conversion may run before the converter is killed.
pub const DEFAULT_CONVERTER_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} has an invalid value '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
    #[error("{0} must be set")]
    Missing(&'static str),
}

/// Letterhead details printed on every document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrganizationProfile {
    pub name: String,
    pub address: String,
    pub contact: String,
    pub email: String,
    /// Prefix for the logo and signature images, e.g. `https://example.org`.
    pub asset_base_url: String,
}

/// The fixed set of people allowed to receive donations.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceivedByOptions(Vec<String>);

impl ReceivedByOptions {
    pub fn new<I, S>(names: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names
            .into_iter()
            .map(|name| {
                let name: String = name.into();
                name.trim().to_string()
            })
            .filter(|name| !name.is_empty())
            .collect();

        if names.is_empty() {
            return Err(ConfigError::Missing("RECEIVED_BY_OPTIONS"));
        }
        Ok(Self(names))
    }

    /// Parse a comma separated list.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        Self::new(raw.split(','))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|allowed| allowed == name)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

/// External HTML to PDF converter flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdfEngineKind {
    Wkhtmltopdf,
    Chromium,
}

impl PdfEngineKind {
    pub fn default_binary(&self) -> &'static str {
        match self {
            Self::Wkhtmltopdf => "wkhtmltopdf",
            Self::Chromium => "chromium",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PdfEngineConfig {
    pub kind: PdfEngineKind,
    pub binary: String,
    pub timeout: Duration,
}

/// Where and how generation events are reported.
#[derive(Debug, Clone, PartialEq)]
pub struct NotifyConfig {
    /// HTTP mail relay; `None` means events are only logged.
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub to: Option<String>,
    pub from: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    pub pdf_engine: PdfEngineConfig,
    pub organization: OrganizationProfile,
    pub received_by: ReceivedByOptions,
    pub notify: NotifyConfig,
    /// Origins allowed to call the API from a browser.
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    /// Load `.env` (if present) and read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let port = match get("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| ConfigError::Invalid {
                name: "PORT",
                value: raw.clone(),
                reason: e.to_string(),
            })?,
            None => 8080,
        };

        let kind = match get("PDF_ENGINE").as_deref().map(str::trim) {
            None | Some("wkhtmltopdf") => PdfEngineKind::Wkhtmltopdf,
            Some("chromium") | Some("chrome") => PdfEngineKind::Chromium,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "PDF_ENGINE",
                    value: other.to_string(),
                    reason: "expected 'wkhtmltopdf' or 'chromium'".to_string(),
                })
            }
        };
        let binary = get("PDF_ENGINE_BIN").unwrap_or_else(|| kind.default_binary().to_string());
        let timeout = match get("PDF_ENGINE_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                Ok(_) => {
                    return Err(ConfigError::Invalid {
                        name: "PDF_ENGINE_TIMEOUT_SECS",
                        value: raw.clone(),
                        reason: "must be at least 1".to_string(),
                    })
                }
                Err(e) => {
                    return Err(ConfigError::Invalid {
                        name: "PDF_ENGINE_TIMEOUT_SECS",
                        value: raw.clone(),
                        reason: e.to_string(),
                    })
                }
            },
            None => DEFAULT_CONVERTER_TIMEOUT,
        };

        let received_by = ReceivedByOptions::parse(
            &get("RECEIVED_BY_OPTIONS").ok_or(ConfigError::Missing("RECEIVED_BY_OPTIONS"))?,
        )?;

        let notify = NotifyConfig {
            endpoint: get("NOTIFY_ENDPOINT"),
            api_key: get("NOTIFY_API_KEY"),
            to: get("NOTIFICATION_EMAIL"),
            from: get("NOTIFY_FROM").or_else(|| get("NOTIFICATION_EMAIL")),
        };
        if notify.endpoint.is_some() && notify.to.is_none() {
            return Err(ConfigError::Missing("NOTIFICATION_EMAIL"));
        }

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            data_dir: PathBuf::from(get("DATA_DIR").unwrap_or_else(|| "./data".to_string())),
            output_dir: PathBuf::from(
                get("OUTPUT_DIR").unwrap_or_else(|| "./generated".to_string()),
            ),
            pdf_engine: PdfEngineConfig {
                kind,
                binary,
                timeout,
            },
            organization: OrganizationProfile {
                name: get("ORG_NAME").unwrap_or_default(),
                address: get("ORG_ADDRESS").unwrap_or_default(),
                contact: get("ORG_CONTACT").unwrap_or_default(),
                email: get("ORG_EMAIL").unwrap_or_default(),
                asset_base_url: get("ASSET_BASE_URL")
                    .map(|url| url.trim_end_matches('/').to_string())
                    .unwrap_or_default(),
            },
            received_by,
            notify,
            cors_origins: get("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|| "http://localhost:3000".to_string())
                .split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_with_only_receivers() {
        let config =
            AppConfig::from_lookup(lookup(&[("RECEIVED_BY_OPTIONS", "President, Treasurer")]))
                .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.pdf_engine.kind, PdfEngineKind::Wkhtmltopdf);
        assert_eq!(config.pdf_engine.binary, "wkhtmltopdf");
        assert_eq!(config.pdf_engine.timeout, DEFAULT_CONVERTER_TIMEOUT);
        assert_eq!(
            config.received_by.as_slice(),
            &["President".to_string(), "Treasurer".to_string()]
        );
        assert!(config.notify.endpoint.is_none());
        assert_eq!(config.cors_origins, vec!["http://localhost:3000".to_string()]);
    }

    #[test]
    fn test_receivers_are_required() {
        let err = AppConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("RECEIVED_BY_OPTIONS")));

        let err = AppConfig::from_lookup(lookup(&[("RECEIVED_BY_OPTIONS", " , ,")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("RECEIVED_BY_OPTIONS")));
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let err = AppConfig::from_lookup(lookup(&[
            ("RECEIVED_BY_OPTIONS", "Treasurer"),
            ("PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_chromium_engine_and_relay() {
        let config = AppConfig::from_lookup(lookup(&[
            ("RECEIVED_BY_OPTIONS", "Treasurer"),
            ("PDF_ENGINE", "chromium"),
            ("PDF_ENGINE_BIN", "/usr/bin/chromium-browser"),
            ("PDF_ENGINE_TIMEOUT_SECS", "20"),
            ("NOTIFY_ENDPOINT", "https://relay.example.org/send"),
            ("NOTIFICATION_EMAIL", "alerts@example.org"),
            ("ASSET_BASE_URL", "https://example.org/"),
        ]))
        .unwrap();

        assert_eq!(config.pdf_engine.kind, PdfEngineKind::Chromium);
        assert_eq!(config.pdf_engine.binary, "/usr/bin/chromium-browser");
        assert_eq!(config.pdf_engine.timeout, Duration::from_secs(20));
        assert_eq!(config.notify.from.as_deref(), Some("alerts@example.org"));
        assert_eq!(config.organization.asset_base_url, "https://example.org");
    }

    #[test]
    fn test_zero_converter_timeout_is_rejected() {
        let err = AppConfig::from_lookup(lookup(&[
            ("RECEIVED_BY_OPTIONS", "Treasurer"),
            ("PDF_ENGINE_TIMEOUT_SECS", "0"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("PDF_ENGINE_TIMEOUT_SECS"));
    }

    #[test]
    fn test_relay_without_destination_is_rejected() {
        let err = AppConfig::from_lookup(lookup(&[
            ("RECEIVED_BY_OPTIONS", "Treasurer"),
            ("NOTIFY_ENDPOINT", "https://relay.example.org/send"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Missing("NOTIFICATION_EMAIL")));
    }
}
