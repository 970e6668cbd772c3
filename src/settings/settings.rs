use crate::application_impl::DEFAULT_MIN_PASSWORD_LEN;
use anyhow::{Result, anyhow, bail};
use config::{Config, Environment as EnvSource, File};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub environment: Environment,
    pub auth: Auth,
    pub http: Http,
    pub log: Log,
    #[serde(default)]
    pub user: User,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Test,
    Production,
}

#[derive(Clone, Deserialize)]
pub struct Auth {
    pub issuer: String,
    pub audience: String,
    #[serde(default = "default_access_ttl_minutes")]
    pub access_ttl_minutes: i64,
    #[serde(default = "default_refresh_ttl_days")]
    pub refresh_ttl_days: i64,
    pub access_secret: String,
    pub refresh_secret: String,
    #[serde(default)]
    pub leeway_secs: u64,
}

// Secrets stay out of logs.
impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Auth")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("access_ttl_minutes", &self.access_ttl_minutes)
            .field("refresh_ttl_days", &self.refresh_ttl_days)
            .field("leeway_secs", &self.leeway_secs)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Http {
    pub address: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Log {
    pub filter: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    #[serde(default = "default_min_password_len")]
    pub min_password_len: usize,
}

impl Default for User {
    fn default() -> Self {
        Self {
            min_password_len: default_min_password_len(),
        }
    }
}

pub const MAX_ACCESS_TTL_MINUTES: i64 = 24 * 60;
pub const MAX_REFRESH_TTL_DAYS: i64 = 365;

fn default_access_ttl_minutes() -> i64 {
    15
}

fn default_refresh_ttl_days() -> i64 {
    7
}

fn default_min_password_len() -> usize {
    DEFAULT_MIN_PASSWORD_LEN
}

impl Settings {
    /// Audience and issuer checks are only relaxed in the test environment.
    pub fn relax_audience(&self) -> bool {
        self.environment == Environment::Test
    }

    pub fn validate(&self) -> Result<()> {
        if self.auth.access_secret.is_empty() || self.auth.refresh_secret.is_empty() {
            bail!("auth.access_secret and auth.refresh_secret must be set");
        }
        if self.auth.access_secret == self.auth.refresh_secret {
            bail!("access and refresh tokens must be signed with different secrets");
        }
        if self.auth.access_ttl_minutes <= 0 || self.auth.refresh_ttl_days <= 0 {
            bail!("token TTLs must be positive");
        }
        if self.auth.access_ttl_minutes > MAX_ACCESS_TTL_MINUTES {
            bail!("auth.access_ttl_minutes must be at most {MAX_ACCESS_TTL_MINUTES}");
        }
        if self.auth.refresh_ttl_days > MAX_REFRESH_TTL_DAYS {
            bail!("auth.refresh_ttl_days must be at most {MAX_REFRESH_TTL_DAYS}");
        }
        if self.auth.issuer.is_empty() || self.auth.audience.is_empty() {
            bail!("auth.issuer and auth.audience must be set");
        }
        Ok(())
    }
}

#[cfg(debug_assertions)]
const SETTINGS_PATH: &str = "settings/dev.toml";
#[cfg(not(debug_assertions))]
const SETTINGS_PATH: &str = "settings/release.toml";

/// Prefix for environment overrides, e.g. `TOKENGATE__AUTH__ACCESS_SECRET`.
pub const ENV_PREFIX: &str = "TOKENGATE";

pub fn parse_settings(path: Option<&str>) -> Result<Settings> {
    let path = path.unwrap_or(SETTINGS_PATH);

    let settings: Settings = Config::builder()
        .add_source(File::with_name(path))
        .add_source(EnvSource::with_prefix(ENV_PREFIX).separator("__"))
        .build()
        .map_err(|e| anyhow!(e))?
        .try_deserialize()
        .map_err(|e| anyhow!(e))?;

    settings.validate()?;
    Ok(settings)
}
