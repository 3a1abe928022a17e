use crate::workflows::assessment::{PolicyError, RiskPolicy};
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

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
    pub risk: RiskConfig,
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

        let defaults = RiskPolicy::default();
        let high_threshold = threshold_from_env("RISK_HIGH_THRESHOLD", defaults.high_threshold)?;
        let medium_threshold =
            threshold_from_env("RISK_MEDIUM_THRESHOLD", defaults.medium_threshold)?;
        let model_path = env::var("RISK_MODEL_PATH")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        let risk = RiskConfig {
            high_threshold,
            medium_threshold,
            model_path,
        };
        risk.policy()?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            risk,
        })
    }
}

fn threshold_from_env(name: &'static str, default: f64) -> Result<f64, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<f64>()
            .map_err(|_| ConfigError::InvalidThreshold { name, value: raw }),
        Err(_) => Ok(default),
    }
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

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Scoring thresholds and the optional pre-trained classifier location.
#[derive(Debug, Clone)]
pub struct RiskConfig {
    pub high_threshold: f64,
    pub medium_threshold: f64,
    pub model_path: Option<PathBuf>,
}

impl RiskConfig {
    pub fn policy(&self) -> Result<RiskPolicy, ConfigError> {
        let policy = RiskPolicy {
            high_threshold: self.high_threshold,
            medium_threshold: self.medium_threshold,
            ..RiskPolicy::default()
        };
        policy.validate().map_err(ConfigError::Policy)?;
        Ok(policy)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidThreshold { name: &'static str, value: String },
    Policy(PolicyError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidThreshold { name, value } => {
                write!(f, "{name} must be a number, got '{value}'")
            }
            ConfigError::Policy(err) => write!(f, "invalid risk thresholds: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidThreshold { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::Policy(err) => Some(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("APP_ENV");
        env::remove_var("APP_HOST");
        env::remove_var("APP_PORT");
        env::remove_var("APP_LOG_LEVEL");
        env::remove_var("RISK_HIGH_THRESHOLD");
        env::remove_var("RISK_MEDIUM_THRESHOLD");
        env::remove_var("RISK_MODEL_PATH");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.risk.high_threshold, 0.7);
        assert_eq!(config.risk.medium_threshold, 0.4);
        assert!(config.risk.model_path.is_none());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn threshold_overrides_flow_into_policy() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("RISK_HIGH_THRESHOLD", "0.8");
        env::set_var("RISK_MEDIUM_THRESHOLD", "0.5");
        env::set_var("RISK_MODEL_PATH", "models/risk_model.json");
        let config = AppConfig::load().expect("config loads");
        let policy = config.risk.policy().expect("valid policy");
        assert_eq!(policy.high_threshold, 0.8);
        assert_eq!(policy.medium_threshold, 0.5);
        assert_eq!(
            config.risk.model_path,
            Some(PathBuf::from("models/risk_model.json"))
        );
        reset_env();
    }

    #[test]
    fn rejects_unparseable_and_inverted_thresholds() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("RISK_HIGH_THRESHOLD", "high");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidThreshold {
                name: "RISK_HIGH_THRESHOLD",
                ..
            })
        ));

        env::set_var("RISK_HIGH_THRESHOLD", "0.3");
        assert!(matches!(AppConfig::load(), Err(ConfigError::Policy(_))));
        reset_env();
    }
}
