/*
 * Responsibility
 * - 環境変数や設定の読み込み (PORT, APP_ENV, JWT secrets, token TTL)
 * - 設定値のバリデーション (不足なら起動失敗)
 * - TokenService に渡す不変の TokenSettings を組み立てる
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use crate::services::auth::token_service::{
    DEFAULT_ACCESS_TTL_SECONDS, DEFAULT_REFRESH_TTL_SECONDS, TokenSettings,
};

/// Minimum secret length accepted in production.
const MIN_PRODUCTION_SECRET_LEN: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(value: Option<&str>) -> Self {
        match value
            .unwrap_or("development")
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    // HMAC secrets, one per token kind
    pub jwt_access_secret: String,
    pub jwt_refresh_secret: String,

    // Token lifetimes (seconds)
    pub access_token_ttl_seconds: u64,
    pub refresh_token_ttl_seconds: u64,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("app_env", &self.app_env)
            .field("access_token_ttl_seconds", &self.access_token_ttl_seconds)
            .field("refresh_token_ttl_seconds", &self.refresh_token_ttl_seconds)
            .finish_non_exhaustive()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup (the process environment
    /// in production, a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = match lookup("PORT") {
            Some(s) => s.parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 8080,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(lookup("APP_ENV").as_deref());

        let jwt_access_secret = secret(&lookup, "JWT_ACCESS_SECRET", app_env)?;
        let jwt_refresh_secret = secret(&lookup, "JWT_REFRESH_SECRET", app_env)?;

        if jwt_access_secret == jwt_refresh_secret {
            if app_env.is_production() {
                return Err(ConfigError::Invalid("JWT_REFRESH_SECRET"));
            }
            tracing::warn!("JWT_ACCESS_SECRET and JWT_REFRESH_SECRET are identical");
        }

        let access_token_ttl_seconds =
            ttl(&lookup, "ACCESS_TOKEN_TTL_SECONDS", DEFAULT_ACCESS_TTL_SECONDS)?; // 1 hour
        let refresh_token_ttl_seconds =
            ttl(&lookup, "REFRESH_TOKEN_TTL_SECONDS", DEFAULT_REFRESH_TTL_SECONDS)?; // 7 days

        Ok(Self {
            addr,
            app_env,
            jwt_access_secret,
            jwt_refresh_secret,
            access_token_ttl_seconds,
            refresh_token_ttl_seconds,
        })
    }

    pub fn token_settings(&self) -> TokenSettings {
        TokenSettings::new(
            self.jwt_access_secret.as_bytes(),
            self.jwt_refresh_secret.as_bytes(),
        )
        .with_ttls(self.access_token_ttl_seconds, self.refresh_token_ttl_seconds)
    }
}

fn secret<F>(lookup: &F, key: &'static str, app_env: AppEnv) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = lookup(key).ok_or(ConfigError::Missing(key))?;

    if value.is_empty() {
        return Err(ConfigError::Invalid(key));
    }
    if app_env.is_production() && value.len() < MIN_PRODUCTION_SECRET_LEN {
        return Err(ConfigError::Invalid(key));
    }

    Ok(value)
}

fn ttl<F>(lookup: &F, key: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(s) => match s.trim().parse::<u64>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(ConfigError::Invalid(key)),
        },
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    const LONG_A: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
    const LONG_B: &str = "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_only_secrets_are_set() {
        let config = load(&[("JWT_ACCESS_SECRET", "a"), ("JWT_REFRESH_SECRET", "b")]).unwrap();

        assert_eq!(config.addr.port(), 8080);
        assert_eq!(config.app_env, AppEnv::Development);
        assert_eq!(config.access_token_ttl_seconds, 3600);
        assert_eq!(config.refresh_token_ttl_seconds, 604_800);
    }

    #[test]
    fn secrets_are_required() {
        assert_eq!(
            load(&[("JWT_REFRESH_SECRET", "b")]).unwrap_err(),
            ConfigError::Missing("JWT_ACCESS_SECRET")
        );
        assert_eq!(
            load(&[("JWT_ACCESS_SECRET", "a"), ("JWT_REFRESH_SECRET", "")]).unwrap_err(),
            ConfigError::Invalid("JWT_REFRESH_SECRET")
        );
    }

    #[test]
    fn production_requires_long_distinct_secrets() {
        assert_eq!(
            load(&[
                ("APP_ENV", "production"),
                ("JWT_ACCESS_SECRET", "short"),
                ("JWT_REFRESH_SECRET", LONG_B),
            ])
            .unwrap_err(),
            ConfigError::Invalid("JWT_ACCESS_SECRET")
        );
        assert_eq!(
            load(&[
                ("APP_ENV", "prod"),
                ("JWT_ACCESS_SECRET", LONG_A),
                ("JWT_REFRESH_SECRET", LONG_A),
            ])
            .unwrap_err(),
            ConfigError::Invalid("JWT_REFRESH_SECRET")
        );

        let config = load(&[
            ("APP_ENV", "Production"),
            ("JWT_ACCESS_SECRET", LONG_A),
            ("JWT_REFRESH_SECRET", LONG_B),
        ])
        .unwrap();
        assert!(config.app_env.is_production());
    }

    #[test]
    fn zero_or_garbage_ttl_is_rejected() {
        let base = [("JWT_ACCESS_SECRET", "a"), ("JWT_REFRESH_SECRET", "b")];

        let mut vars = base.to_vec();
        vars.push(("ACCESS_TOKEN_TTL_SECONDS", "0"));
        assert_eq!(
            load(&vars).unwrap_err(),
            ConfigError::Invalid("ACCESS_TOKEN_TTL_SECONDS")
        );

        let mut vars = base.to_vec();
        vars.push(("REFRESH_TOKEN_TTL_SECONDS", "a week"));
        assert_eq!(
            load(&vars).unwrap_err(),
            ConfigError::Invalid("REFRESH_TOKEN_TTL_SECONDS")
        );
    }

    #[test]
    fn debug_output_hides_secrets() {
        let config = load(&[("JWT_ACCESS_SECRET", LONG_A), ("JWT_REFRESH_SECRET", LONG_B)]).unwrap();
        let printed = format!("{config:?}");

        assert!(!printed.contains(LONG_A));
        assert!(!printed.contains(LONG_B));
    }

    #[test]
    fn token_settings_carry_ttls() {
        let config = load(&[
            ("JWT_ACCESS_SECRET", "a"),
            ("JWT_REFRESH_SECRET", "b"),
            ("ACCESS_TOKEN_TTL_SECONDS", "900"),
        ])
        .unwrap();
        let settings = config.token_settings();

        assert_eq!(settings.access_secret, b"a");
        assert_eq!(settings.access_ttl_seconds, 900);
        assert_eq!(settings.refresh_ttl_seconds, 604_800);
    }
}
