//! Startup configuration, read once from the environment.

use std::path::PathBuf;

use chrono::Duration;
use thiserror::Error;

use pvara_auth::SigningContext;
use pvara_auth::directory::SeedUser;
use pvara_auth::signing::{DEFAULT_ACCESS_TTL_SECS, DEFAULT_RENEWAL_TTL_SECS};

pub mod env {
    pub const JWT_SECRET: &str = "JWT_SECRET";
    pub const ACCESS_TTL_SECONDS: &str = "ACCESS_TTL_SECONDS";
    pub const REFRESH_TTL_SECONDS: &str = "REFRESH_TTL_SECONDS";
    pub const BIND_ADDR: &str = "BIND_ADDR";
    pub const PORT: &str = "PORT";
    pub const USER_SEED_FILE: &str = "USER_SEED_FILE";
}

const DEFAULT_BIND_ADDR: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8001;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing env var {0}")]
    Missing(&'static str),
    #[error("invalid env var {0}")]
    Invalid(&'static str),
    #[error("signing configuration rejected: {0}")]
    Signing(#[from] pvara_auth::SigningError),
    #[error("cannot load user seed file {path}: {reason}")]
    Seed { path: PathBuf, reason: String },
}

#[derive(Clone)]
pub struct AppConfig {
    jwt_secret: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
    bind_addr: String,
    port: u16,
    user_seed_file: Option<PathBuf>,
}

impl AppConfig {
    /// Load `.env` (if present) and read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let jwt_secret = lookup(env::JWT_SECRET)
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing(env::JWT_SECRET))?;

        let access_ttl = lifetime(
            env::ACCESS_TTL_SECONDS,
            parse_or(&lookup, env::ACCESS_TTL_SECONDS, DEFAULT_ACCESS_TTL_SECS)?,
        )?;
        let refresh_ttl = lifetime(
            env::REFRESH_TTL_SECONDS,
            parse_or(&lookup, env::REFRESH_TTL_SECONDS, DEFAULT_RENEWAL_TTL_SECS)?,
        )?;
        let port = parse_or(&lookup, env::PORT, DEFAULT_PORT)?;

        let bind_addr = lookup(env::BIND_ADDR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let user_seed_file = lookup(env::USER_SEED_FILE)
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            jwt_secret,
            access_ttl,
            refresh_ttl,
            bind_addr,
            port,
            user_seed_file,
        })
    }

    /// Build the immutable signing context; lifetime bounds and order are checked here.
    pub fn signing_context(&self) -> Result<SigningContext, ConfigError> {
        Ok(SigningContext::new(
            self.jwt_secret.as_bytes(),
            self.access_ttl,
            self.refresh_ttl,
        )?)
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    pub fn user_seed_file(&self) -> Option<&PathBuf> {
        self.user_seed_file.as_ref()
    }

    /// Seed users for the in-memory directory; empty when no file is set.
    pub fn load_seed_users(&self) -> Result<Vec<SeedUser>, ConfigError> {
        let Some(path) = &self.user_seed_file else {
            return Ok(Vec::new());
        };
        let seed_error = |reason: String| ConfigError::Seed {
            path: path.clone(),
            reason,
        };

        let raw = std::fs::read_to_string(path).map_err(|e| seed_error(e.to_string()))?;
        serde_json::from_str(&raw).map_err(|e| seed_error(e.to_string()))
    }
}

impl core::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AppConfig")
            .field("jwt_secret", &"<redacted>")
            .field("access_ttl_seconds", &self.access_ttl.num_seconds())
            .field("refresh_ttl_seconds", &self.refresh_ttl.num_seconds())
            .field("bind_addr", &self.bind_addr)
            .field("port", &self.port)
            .field("user_seed_file", &self.user_seed_file)
            .finish()
    }
}

fn parse_or<T: core::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        Some(v) => v.trim().parse::<T>().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}

fn lifetime(key: &'static str, seconds: i64) -> Result<Duration, ConfigError> {
    Duration::try_seconds(seconds).ok_or(ConfigError::Invalid(key))
}
