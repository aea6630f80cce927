use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

use crate::auth::{JwtOptions, TokenError, MIN_KEY_LENGTH};

/// Application-level constants
pub const APP_NAME: &str = "Hospital";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_JWT_ISSUER: &str = "hospital-api";
pub const DEFAULT_JWT_AUDIENCE: &str = "hospital-clients";

pub const ENV_DB_PATH: &str = "HOSPITAL_DB_PATH";
pub const ENV_BIND_ADDR: &str = "HOSPITAL_BIND_ADDR";
pub const ENV_JWT_KEY: &str = "HOSPITAL_JWT_KEY";
pub const ENV_JWT_ISSUER: &str = "HOSPITAL_JWT_ISSUER";
pub const ENV_JWT_AUDIENCE: &str = "HOSPITAL_JWT_AUDIENCE";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },

    #[error("Cannot determine a data directory; set {0}")]
    NoDataDir(&'static str),
}

/// Get the application data directory
pub fn app_data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join(APP_NAME))
}

/// Default log filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "hospital_lib=info,tower_http=info"
}

/// Process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub bind_addr: SocketAddr,
    pub jwt: JwtOptions,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from any variable source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let db_path = match get(ENV_DB_PATH) {
            Some(path) => PathBuf::from(path),
            None => app_data_dir()
                .ok_or(ConfigError::NoDataDir(ENV_DB_PATH))?
                .join("hospital.db"),
        };

        let bind_addr = get(ENV_BIND_ADDR)
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                var: ENV_BIND_ADDR,
                reason: e.to_string(),
            })?;

        let key = get(ENV_JWT_KEY).ok_or(ConfigError::Missing(ENV_JWT_KEY))?;
        let issuer = get(ENV_JWT_ISSUER).unwrap_or_else(|| DEFAULT_JWT_ISSUER.to_string());
        let audience = get(ENV_JWT_AUDIENCE).unwrap_or_else(|| DEFAULT_JWT_AUDIENCE.to_string());
        let jwt = JwtOptions::new(key, issuer, audience).map_err(|e| match e {
            TokenError::KeyTooShort { actual, .. } => ConfigError::Invalid {
                var: ENV_JWT_KEY,
                reason: format!("must be at least {MIN_KEY_LENGTH} bytes, got {actual}"),
            },
            other => ConfigError::Invalid {
                var: ENV_JWT_KEY,
                reason: other.to_string(),
            },
        })?;

        Ok(Self {
            db_path,
            bind_addr,
            jwt,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    const KEY: &str = "0123456789abcdef0123456789abcdef";

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|var| vars.get(var).cloned())
    }

    #[test]
    fn defaults_apply_with_only_a_key() {
        let config = config(&[(ENV_JWT_KEY, KEY), (ENV_DB_PATH, "/tmp/h.db")]).unwrap();
        assert_eq!(config.db_path, PathBuf::from("/tmp/h.db"));
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(config.jwt.issuer, DEFAULT_JWT_ISSUER);
        assert_eq!(config.jwt.audience, DEFAULT_JWT_AUDIENCE);
        assert_eq!(config.jwt.lifetime, chrono::Duration::days(30));
    }

    #[test]
    fn overrides_are_read() {
        let config = config(&[
            (ENV_JWT_KEY, KEY),
            (ENV_DB_PATH, "/data/hospital.db"),
            (ENV_BIND_ADDR, "0.0.0.0:9000"),
            (ENV_JWT_ISSUER, "issuer-x"),
            (ENV_JWT_AUDIENCE, "aud-y"),
        ])
        .unwrap();
        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.jwt.issuer, "issuer-x");
        assert_eq!(config.jwt.audience, "aud-y");
    }

    #[test]
    fn missing_key_is_an_error() {
        let err = config(&[(ENV_DB_PATH, "/tmp/h.db")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(ENV_JWT_KEY)));
        let err = config(&[(ENV_DB_PATH, "/tmp/h.db"), (ENV_JWT_KEY, "  ")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(ENV_JWT_KEY)));
    }

    #[test]
    fn short_key_is_invalid() {
        let err = config(&[(ENV_JWT_KEY, "short"), (ENV_DB_PATH, "/tmp/h.db")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: ENV_JWT_KEY, .. }));
    }

    #[test]
    fn bad_bind_addr_is_invalid() {
        let err = config(&[
            (ENV_JWT_KEY, KEY),
            (ENV_DB_PATH, "/tmp/h.db"),
            (ENV_BIND_ADDR, "not-an-addr"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: ENV_BIND_ADDR, .. }));
    }

    #[test]
    fn default_db_path_lives_in_data_dir() {
        if let Some(data) = dirs::data_dir() {
            let config = config(&[(ENV_JWT_KEY, KEY)]).unwrap();
            assert!(config.db_path.starts_with(data));
            assert!(config.db_path.ends_with("Hospital/hospital.db"));
        }
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }
}
