use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use crate::marketplace::moderation::cooldown::{
    AppealCooldown, DEFAULT_APPEAL_COOLDOWN_HOURS, MAX_APPEAL_COOLDOWN_HOURS,
};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub moderation: ModerationConfig,
    pub media: MediaConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let cooldown_hours = match env::var("APP_APPEAL_COOLDOWN_HOURS") {
            Ok(raw) => raw
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|hours| AppealCooldown::from_hours(*hours).is_some())
                .ok_or(ConfigError::InvalidCooldown)?,
            Err(_) => DEFAULT_APPEAL_COOLDOWN_HOURS,
        };

        let bootstrap_admin = env::var("APP_BOOTSTRAP_ADMIN")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        let image_base_url = env::var("APP_MEDIA_BASE_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:3000/media".to_string());
        let video_archive_url = env::var("APP_VIDEO_ARCHIVE_URL")
            .unwrap_or_else(|_| "https://archive.org".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            moderation: ModerationConfig {
                appeal_cooldown_hours: cooldown_hours,
                bootstrap_admin,
            },
            media: MediaConfig {
                image_base_url: trim_trailing_slash(image_base_url),
                video_archive_url: trim_trailing_slash(video_archive_url),
            },
        })
    }
}

fn trim_trailing_slash(mut value: String) -> String {
    while value.ends_with('/') {
        value.pop();
    }
    value
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Moderation dials: appeal throttling and the seeded administrator.
#[derive(Debug, Clone)]
pub struct ModerationConfig {
    pub appeal_cooldown_hours: i64,
    pub bootstrap_admin: Option<String>,
}

impl ModerationConfig {
    pub fn appeal_cooldown(&self) -> Result<AppealCooldown, ConfigError> {
        AppealCooldown::from_hours(self.appeal_cooldown_hours).ok_or(ConfigError::InvalidCooldown)
    }
}

/// Public locations for uploaded listing media.
#[derive(Debug, Clone)]
pub struct MediaConfig {
    pub image_base_url: String,
    pub video_archive_url: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidCooldown,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidCooldown => write!(
                f,
                "APP_APPEAL_COOLDOWN_HOURS must be a whole number of hours between 0 and {}",
                MAX_APPEAL_COOLDOWN_HOURS
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidCooldown => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
