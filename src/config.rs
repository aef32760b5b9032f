//! Environment configuration, loaded once at startup.
//!
//! | Variable | Required | Default |
//! |---|---|---|
//! | `SMTP_USER` | yes | — (mailbox address; also the recipient) |
//! | `SMTP_PASS` | yes | — |
//! | `SMTP_HOST` | no | `smtp.umbler.com` |
//! | `SMTP_PORT` | no | `587` |
//! | `SMTP_ACCEPT_INVALID_CERTS` | no | `false` |
//! | `APP_URL` | no | `http://localhost:{PORT}` |
//! | `ALLOWED_ORIGINS` | no | empty, every origin allowed |
//! | `PORT` | no | `3000` |
//! | `PUBLIC_DIR` | no | `public` |
//! | `SITE_NAME` | no | `KiSite` |
//! | `SITE_URL` | no | `https://www.kisite.com.br` |
//! | `RATE_LIMIT_ENABLED` | no | `true` |
//! | `TRUST_PROXY` | no | `false` |

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use lettre::Address;
use thiserror::Error;

use crate::middleware::Quota;

pub const DEFAULT_SMTP_HOST: &str = "smtp.umbler.com";
pub const DEFAULT_SMTP_PORT: u16 = 587;
pub const DEFAULT_PORT: u16 = 3000;

const RATE_WINDOW: Duration = Duration::from_secs(15 * 60);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// SMTP account and relay settings.
#[derive(Clone, Debug)]
pub struct SmtpConfig {
    pub user: Address,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub accept_invalid_certs: bool,
}

/// Values embedded in the outgoing email.
#[derive(Clone, Debug)]
pub struct Branding {
    pub site_name: String,
    pub site_url: String,
    /// Public base URL of this service; the logo is served from `{app_url}/logo.png`.
    pub app_url: String,
}

/// Request-count limits applied per client.
#[derive(Clone, Debug)]
pub struct RateLimits {
    pub enabled: bool,
    pub trust_proxy: bool,
    pub global: Quota,
    pub send_email: Quota,
}

impl Default for RateLimits {
    fn default() -> Self {
        Self {
            enabled: true,
            trust_proxy: false,
            global: Quota::new(100, RATE_WINDOW),
            send_email: Quota::new(20, RATE_WINDOW),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub smtp: SmtpConfig,
    pub branding: Branding,
    pub allowed_origins: Vec<String>,
    pub port: u16,
    pub public_dir: PathBuf,
    pub rate_limits: RateLimits,
}

impl Config {
    /// Configuration with every optional setting at its default.
    pub fn new(user: Address, password: impl Into<String>) -> Self {
        Self {
            smtp: SmtpConfig {
                user,
                password: password.into(),
                host: DEFAULT_SMTP_HOST.to_owned(),
                port: DEFAULT_SMTP_PORT,
                accept_invalid_certs: false,
            },
            branding: Branding {
                site_name: "KiSite".to_owned(),
                site_url: "https://www.kisite.com.br".to_owned(),
                app_url: format!("http://localhost:{DEFAULT_PORT}"),
            },
            allowed_origins: Vec::new(),
            port: DEFAULT_PORT,
            public_dir: PathBuf::from("public"),
            rate_limits: RateLimits::default(),
        }
    }

    /// Reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any variable source. Empty values count
    /// as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let user = get("SMTP_USER").ok_or(ConfigError::Missing("SMTP_USER"))?;
        let user: Address = user.trim().parse().map_err(|e| ConfigError::Invalid {
            var: "SMTP_USER",
            reason: format!("{e}"),
        })?;
        let password = get("SMTP_PASS").ok_or(ConfigError::Missing("SMTP_PASS"))?;

        let mut config = Self::new(user, password);

        if let Some(host) = get("SMTP_HOST") {
            config.smtp.host = host.trim().to_owned();
        }
        config.smtp.port = parse_or(&get, "SMTP_PORT", DEFAULT_SMTP_PORT)?;
        config.smtp.accept_invalid_certs = parse_bool(&get, "SMTP_ACCEPT_INVALID_CERTS", false)?;

        config.port = parse_or(&get, "PORT", DEFAULT_PORT)?;
        config.branding.app_url = get("APP_URL")
            .map(|url| url.trim().trim_end_matches('/').to_owned())
            .unwrap_or_else(|| format!("http://localhost:{}", config.port));
        if let Some(name) = get("SITE_NAME") {
            config.branding.site_name = name;
        }
        if let Some(url) = get("SITE_URL") {
            config.branding.site_url = url.trim().to_owned();
        }

        config.allowed_origins = get("ALLOWED_ORIGINS")
            .map(|list| parse_origins(&list))
            .unwrap_or_default();

        if let Some(dir) = get("PUBLIC_DIR") {
            config.public_dir = PathBuf::from(dir);
        }

        config.rate_limits.enabled = parse_bool(&get, "RATE_LIMIT_ENABLED", true)?;
        config.rate_limits.trust_proxy = parse_bool(&get, "TRUST_PROXY", false)?;

        Ok(config)
    }
}

/// Splits a comma-separated origin list, dropping blanks.
pub fn parse_origins(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_owned)
        .collect()
}

fn parse_or<T, G>(get: &G, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(var) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            reason: e.to_string(),
        }),
    }
}

fn parse_bool<G>(get: &G, var: &'static str, default: bool) -> Result<bool, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    match get(var).map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(default),
        Some(v) => match v.as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::Invalid {
                var,
                reason: format!("expected a boolean, got `{v}`"),
            }),
        },
    }
}
