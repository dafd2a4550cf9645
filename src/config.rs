use anyhow::{bail, Context, Result};
use std::env;
use std::time::Duration;
use tracing::warn;

pub const SERVICE_NAME: &str = "SoundCloud Proxy Server";
pub const DEFAULT_API_BASE_URL: &str = "https://api-v2.soundcloud.com";
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Client id baked in at build time, used when neither credential variable is set at runtime.
const BUILD_TIME_CLIENT_ID: Option<&str> = option_env!("SOUNDCLOUD_CLIENT_ID");

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub soundcloud: SoundCloudConfig,
    pub cors: CorsConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub environment: String,
    pub name: String,
    pub version: String,
}

#[derive(Clone)]
pub struct SoundCloudConfig {
    pub client_id: String,
    pub api_base_url: String,
    pub default_limit: u32,
    pub max_limit: u32,
    pub request_timeout: Option<Duration>,
    pub user_agent: String,
}

#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub enabled: bool,
    /// Empty means any origin.
    pub allowed_origins: Vec<String>,
}

// Keep the credential out of startup logs.
impl std::fmt::Debug for SoundCloudConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoundCloudConfig")
            .field("client_id", &mask_secret(&self.client_id))
            .field("api_base_url", &self.api_base_url)
            .field("default_limit", &self.default_limit)
            .field("max_limit", &self.max_limit)
            .field("request_timeout", &self.request_timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl Config {
    /// Load configuration from the process environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup. Values are trimmed and empty ones count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let first = |keys: &[&str]| keys.iter().find_map(|key| get(*key));

        let port = match first(&["PORT", "PROXY_PORT"]) {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("Invalid listen port: {raw}"))?,
            None => 8080,
        };

        let client_id = first(&["SOUNDCLOUD_CLIENT_ID", "VITE_SOUNDCLOUD_CLIENT_ID"])
            .or_else(|| BUILD_TIME_CLIENT_ID.map(String::from))
            .unwrap_or_default();

        let default_limit: u32 = parse_or(get("SOUNDCLOUD_DEFAULT_LIMIT"), 10)?;
        let max_limit: u32 = parse_or(get("SOUNDCLOUD_MAX_LIMIT"), 50)?;
        if default_limit == 0 || default_limit > max_limit {
            bail!(
                "SOUNDCLOUD_DEFAULT_LIMIT must be between 1 and SOUNDCLOUD_MAX_LIMIT ({}), got {}",
                max_limit,
                default_limit
            );
        }

        let timeout_secs: u64 = parse_or(get("SOUNDCLOUD_TIMEOUT_SECS"), 0)?;

        Ok(Self {
            server: ServerConfig {
                port,
                host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                environment: first(&["NODE_ENV", "APP_ENV"])
                    .unwrap_or_else(|| "production".to_string()),
                name: SERVICE_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            soundcloud: SoundCloudConfig {
                client_id,
                api_base_url: get("SOUNDCLOUD_API_BASE_URL")
                    .map(|url| url.trim_end_matches('/').to_string())
                    .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
                default_limit,
                max_limit,
                request_timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
                user_agent: get("SOUNDCLOUD_USER_AGENT")
                    .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            },
            cors: CorsConfig {
                enabled: parse_or(get("CORS_ENABLED"), true)?,
                allowed_origins: get("ALLOWED_ORIGINS")
                    .map(|origins| {
                        origins
                            .split(',')
                            .map(|s| s.trim().to_string())
                            .filter(|s| !s.is_empty())
                            .collect()
                    })
                    .unwrap_or_default(),
            },
        })
    }

    pub fn is_production(&self) -> bool {
        self.server.environment.eq_ignore_ascii_case("production")
    }

    /// Warn (without failing) when production runs with no credential configured.
    ///
    /// Returns `true` if the warning was emitted. Requests can still supply `client_id`.
    pub fn warn_if_unconfigured(&self) -> bool {
        if self.soundcloud.client_id.is_empty() && self.is_production() {
            warn!("SOUNDCLOUD_CLIENT_ID is not set. API calls will fail unless client_id is passed per request.");
            warn!("Set it via the SOUNDCLOUD_CLIENT_ID environment variable");
            return true;
        }
        false
    }
}

fn parse_or<T>(raw: Option<String>, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .with_context(|| format!("Invalid configuration value: {value}")),
        None => Ok(default),
    }
}

/// Show at most the first 8 characters of a secret.
pub fn mask_secret(secret: &str) -> String {
    if secret.is_empty() {
        return "<not set>".to_string();
    }
    let prefix: String = secret.chars().take(8).collect();
    format!("{prefix}...")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_with(vars: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_with(&[]).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.environment, "production");
        assert_eq!(config.server.name, SERVICE_NAME);
        assert_eq!(config.soundcloud.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.soundcloud.default_limit, 10);
        assert_eq!(config.soundcloud.max_limit, 50);
        assert!(config.soundcloud.request_timeout.is_none());
        assert!(config.cors.enabled);
        assert!(config.cors.allowed_origins.is_empty());
    }

    #[test]
    fn test_port_prefers_port_over_proxy_port() {
        let config = config_with(&[("PORT", "3000"), ("PROXY_PORT", "4000")]).unwrap();
        assert_eq!(config.server.port, 3000);

        let config = config_with(&[("PROXY_PORT", "4000")]).unwrap();
        assert_eq!(config.server.port, 4000);

        assert!(config_with(&[("PORT", "not-a-port")]).is_err());
    }

    #[test]
    fn test_client_id_resolution_order() {
        let config = config_with(&[
            ("SOUNDCLOUD_CLIENT_ID", "primary"),
            ("VITE_SOUNDCLOUD_CLIENT_ID", "secondary"),
        ])
        .unwrap();
        assert_eq!(config.soundcloud.client_id, "primary");

        let config = config_with(&[
            ("SOUNDCLOUD_CLIENT_ID", ""),
            ("VITE_SOUNDCLOUD_CLIENT_ID", "secondary"),
        ])
        .unwrap();
        assert_eq!(config.soundcloud.client_id, "secondary");

        let config = config_with(&[]).unwrap();
        assert_eq!(
            config.soundcloud.client_id,
            BUILD_TIME_CLIENT_ID.unwrap_or_default()
        );
    }

    #[test]
    fn test_limits_are_validated() {
        let config = config_with(&[
            ("SOUNDCLOUD_DEFAULT_LIMIT", "20"),
            ("SOUNDCLOUD_MAX_LIMIT", "100"),
        ])
        .unwrap();
        assert_eq!(config.soundcloud.default_limit, 20);
        assert_eq!(config.soundcloud.max_limit, 100);

        assert!(config_with(&[("SOUNDCLOUD_DEFAULT_LIMIT", "0")]).is_err());
        assert!(config_with(&[("SOUNDCLOUD_DEFAULT_LIMIT", "80")]).is_err());
        assert!(config_with(&[("SOUNDCLOUD_MAX_LIMIT", "abc")]).is_err());
    }

    #[test]
    fn test_timeout_and_cors() {
        let config = config_with(&[
            ("SOUNDCLOUD_TIMEOUT_SECS", "15"),
            ("CORS_ENABLED", "false"),
            ("ALLOWED_ORIGINS", "https://a.example, https://b.example,"),
            ("SOUNDCLOUD_API_BASE_URL", "http://localhost:9000/"),
        ])
        .unwrap();
        assert_eq!(
            config.soundcloud.request_timeout,
            Some(Duration::from_secs(15))
        );
        assert!(!config.cors.enabled);
        assert_eq!(
            config.cors.allowed_origins,
            vec!["https://a.example", "https://b.example"]
        );
        assert_eq!(config.soundcloud.api_base_url, "http://localhost:9000");
    }

    #[test]
    fn test_values_are_trimmed() {
        let config = config_with(&[
            ("HOST", " 127.0.0.1 "),
            ("SOUNDCLOUD_USER_AGENT", "  test-agent/1.0\t"),
            ("SOUNDCLOUD_API_BASE_URL", " http://localhost:9000/ "),
            ("NODE_ENV", " development "),
            ("SOUNDCLOUD_CLIENT_ID", " abc "),
        ])
        .unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert!(config.server.host.parse::<std::net::IpAddr>().is_ok());
        assert_eq!(config.soundcloud.user_agent, "test-agent/1.0");
        assert_eq!(config.soundcloud.api_base_url, "http://localhost:9000");
        assert_eq!(config.server.environment, "development");
        assert_eq!(config.soundcloud.client_id, "abc");
    }

    #[test]
    fn test_warn_if_unconfigured() {
        let mut config = config_with(&[("NODE_ENV", "production")]).unwrap();
        config.soundcloud.client_id.clear();
        assert!(config.warn_if_unconfigured());

        config.server.environment = "development".to_string();
        assert!(!config.warn_if_unconfigured());

        config.server.environment = "production".to_string();
        config.soundcloud.client_id = "abc".to_string();
        assert!(!config.warn_if_unconfigured());
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret(""), "<not set>");
        assert_eq!(mask_secret("abc"), "abc...");
        assert_eq!(mask_secret("KKzJxmw11tYpCs6T"), "KKzJxmw1...");
    }
}
