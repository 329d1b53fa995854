//! Configuration loading
//!
//! Settings come from an optional TOML file and are overridden by
//! `SALESFORCE_*` environment variables. Credentials are optional at load
//! time: the server starts without them and reports an authentication error
//! on the first tool call instead.

use anyhow::{bail, Context, Result};
use reqwest::Url;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default config file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "salesforce-mcp.toml";

/// Environment variable pointing at an alternative config file
pub const CONFIG_PATH_ENV: &str = "SALESFORCE_MCP_CONFIG";

pub const DEFAULT_API_VERSION: &str = "v63.0";
pub const DEFAULT_LOGIN_URL: &str = "https://login.salesforce.com";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Raw configuration as written in the TOML file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub salesforce: SalesforceSection,
}

/// `[salesforce]` table
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SalesforceSection {
    pub domain_url: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub security_token: Option<String>,
    pub api_version: Option<String>,
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub insecure_ssl: bool,
}

/// Validated configuration used at runtime
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub domain_url: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub security_token: Option<String>,
    pub api_version: String,
    pub timeout_secs: u64,
    pub insecure_ssl: bool,
}

impl Config {
    /// Parse configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("Invalid configuration file")
    }

    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&text)
    }

    /// Load the default config file (if any) and apply environment overrides
    pub fn load_default() -> Result<Self> {
        let explicit = std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from);
        let mut config = match explicit {
            Some(path) => Self::load(&path)?,
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::load(path)?
                } else {
                    tracing::debug!("No {} found, using environment only", DEFAULT_CONFIG_FILE);
                    Self::default()
                }
            }
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Override file values with environment variables
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let sf = &mut self.salesforce;

        if let Some(v) = get("SALESFORCE_DOMAIN_URL") {
            sf.domain_url = Some(v);
        }
        if let Some(v) = get("SALESFORCE_CLIENT_ID") {
            sf.client_id = Some(v);
        }
        if let Some(v) = get("SALESFORCE_CLIENT_SECRET") {
            sf.client_secret = Some(v);
        }
        if let Some(v) = get("SALESFORCE_USERNAME") {
            sf.username = Some(v);
        }
        if let Some(v) = get("SALESFORCE_PASSWORD") {
            sf.password = Some(v);
        }
        if let Some(v) = get("SALESFORCE_SECURITY_TOKEN") {
            sf.security_token = Some(v);
        }
        if let Some(v) = get("SALESFORCE_API_VERSION") {
            sf.api_version = Some(v);
        }
        if let Some(v) = get("SALESFORCE_TIMEOUT_SECS") {
            match v.parse() {
                Ok(secs) => sf.timeout_secs = Some(secs),
                Err(_) => tracing::warn!("Ignoring invalid SALESFORCE_TIMEOUT_SECS: {}", v),
            }
        }
        if let Some(v) = get("SALESFORCE_INSECURE_SSL") {
            sf.insecure_ssl = matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }
    }

    /// Validate and convert to runtime configuration
    pub fn to_runtime(&self) -> Result<RuntimeConfig> {
        let sf = &self.salesforce;

        let domain_url = match sf.domain_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => {
                Url::parse(url).with_context(|| format!("Invalid domain_url: {}", url))?;
                Some(url.trim_end_matches('/').to_string())
            }
            _ => None,
        };

        let api_version = normalize_api_version(
            sf.api_version.as_deref().unwrap_or(DEFAULT_API_VERSION),
        )?;

        let timeout_secs = sf.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            bail!("timeout_secs must be greater than zero");
        }

        Ok(RuntimeConfig {
            domain_url,
            client_id: sf.client_id.clone(),
            client_secret: sf.client_secret.clone(),
            username: sf.username.clone(),
            password: sf.password.clone(),
            security_token: sf.security_token.clone(),
            api_version,
            timeout_secs,
            insecure_ssl: sf.insecure_ssl,
        })
    }
}

impl RuntimeConfig {
    /// Which OAuth2 flow the configured credentials select
    pub fn auth_flow(&self) -> &'static str {
        if self.username.is_some() && self.password.is_some() {
            "password"
        } else {
            "client_credentials"
        }
    }
}

/// Accepts `63.0`, `v63.0` or `v63` and returns `v63.0`
fn normalize_api_version(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_start_matches(['v', 'V']);
    let number = if trimmed.contains('.') {
        trimmed.to_string()
    } else {
        format!("{}.0", trimmed)
    };
    if number.parse::<f32>().is_err() {
        bail!("Invalid api_version: {}", raw);
    }
    Ok(format!("v{}", number))
}
