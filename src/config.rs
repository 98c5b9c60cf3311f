//! Service Configuration
//!
//! Read once from the process environment at startup. Missing required
//! variables abort startup; the service never falls back to implicit
//! credentials.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string.
    pub database_url: String,
    /// Public base URL this service is reachable at (no trailing slash).
    /// Used to derive public URLs for uploaded media.
    pub public_base_url: String,
    /// HS256 signing secret for session tokens. At least 32 bytes.
    pub jwt_secret: String,
    /// Privileged key for admin-only operations, matched against the
    /// `x-service-key` request header.
    pub service_api_key: String,
    /// Directory uploaded media is stored under.
    pub media_root: PathBuf,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::load(|key| std::env::var(key).ok())
    }

    fn load(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let require = |key: &str| {
            get(key).with_context(|| format!("missing required environment variable {key}"))
        };

        let jwt_secret = require("JWT_SECRET")?;
        if jwt_secret.len() < 32 {
            bail!("JWT_SECRET must be at least 32 bytes long");
        }

        let public_base_url = require("PUBLIC_BASE_URL")?
            .trim_end_matches('/')
            .to_string();

        let port = match get("PORT") {
            Some(raw) => raw.parse().context("PORT is not a valid port number")?,
            None => 8080,
        };

        Ok(Self {
            database_url: require("DATABASE_URL")?,
            public_base_url,
            jwt_secret,
            service_api_key: require("SERVICE_API_KEY")?,
            media_root: get("MEDIA_ROOT").unwrap_or_else(|| "media".into()).into(),
            port,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base_vars() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("DATABASE_URL", "postgres://localhost/solestore"),
            ("PUBLIC_BASE_URL", "https://shop.example.com/"),
            ("JWT_SECRET", "0123456789abcdef0123456789abcdef"),
            ("SERVICE_API_KEY", "svc-key"),
        ])
    }

    fn load(vars: &HashMap<&str, &str>) -> Result<Config> {
        Config::load(|k| vars.get(k).map(|v| v.to_string()))
    }

    #[test]
    fn test_defaults_applied() {
        let config = load(&base_vars()).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.media_root, PathBuf::from("media"));
        // Trailing slash is stripped so URL joins stay clean.
        assert_eq!(config.public_base_url, "https://shop.example.com");
    }

    #[test]
    fn test_missing_required_var_fails() {
        let mut vars = base_vars();
        vars.remove("DATABASE_URL");
        assert!(load(&vars).is_err());
    }

    #[test]
    fn test_short_jwt_secret_rejected() {
        let mut vars = base_vars();
        vars.insert("JWT_SECRET", "too-short");
        assert!(load(&vars).is_err());
    }

    #[test]
    fn test_port_override() {
        let mut vars = base_vars();
        vars.insert("PORT", "9001");
        assert_eq!(load(&vars).unwrap().port, 9001);
    }
}
