//! Salesforce authentication module
//!
//! Implements the OAuth2 token exchange against `/services/oauth2/token`
//! using either the client-credentials flow (connected app acting as its
//! integration user) or the username/password flow.

use crate::config::{RuntimeConfig, DEFAULT_LOGIN_URL};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Authentication errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Token request failed: {0}")]
    TokenRequestFailed(String),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Token parse error: {0}")]
    ParseError(String),

    #[error("Missing credentials: {0}")]
    MissingCredentials(String),
}

/// OAuth2 grant used to obtain the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    ClientCredentials {
        client_id: String,
        client_secret: String,
    },
    Password {
        client_id: String,
        client_secret: String,
        username: String,
        /// Password with the security token already appended
        password: String,
    },
}

impl Credentials {
    /// Pick the grant from configuration.
    ///
    /// Username and password select the password flow; otherwise client
    /// credentials are used, which require a My Domain URL.
    pub fn from_config(config: &RuntimeConfig) -> Result<(Self, String), AuthError> {
        let client_id = non_empty(&config.client_id)
            .ok_or_else(|| AuthError::MissingCredentials("SALESFORCE_CLIENT_ID".to_string()))?;
        let client_secret = non_empty(&config.client_secret).ok_or_else(|| {
            AuthError::MissingCredentials("SALESFORCE_CLIENT_SECRET".to_string())
        })?;

        match (non_empty(&config.username), non_empty(&config.password)) {
            (Some(username), Some(password)) => {
                let token = non_empty(&config.security_token).unwrap_or_default();
                let domain = config
                    .domain_url
                    .clone()
                    .unwrap_or_else(|| DEFAULT_LOGIN_URL.to_string());
                Ok((
                    Credentials::Password {
                        client_id,
                        client_secret,
                        username,
                        password: format!("{}{}", password, token),
                    },
                    domain,
                ))
            }
            (Some(_), None) => Err(AuthError::MissingCredentials(
                "SALESFORCE_PASSWORD (required with SALESFORCE_USERNAME)".to_string(),
            )),
            _ => {
                let domain = config.domain_url.clone().ok_or_else(|| {
                    AuthError::MissingCredentials(
                        "SALESFORCE_DOMAIN_URL (required for client credentials)".to_string(),
                    )
                })?;
                Ok((
                    Credentials::ClientCredentials {
                        client_id,
                        client_secret,
                    },
                    domain,
                ))
            }
        }
    }

    fn grant_type(&self) -> &'static str {
        match self {
            Credentials::ClientCredentials { .. } => "client_credentials",
            Credentials::Password { .. } => "password",
        }
    }

    fn form_params(&self) -> Vec<(&'static str, &str)> {
        match self {
            Credentials::ClientCredentials {
                client_id,
                client_secret,
            } => vec![
                ("grant_type", self.grant_type()),
                ("client_id", client_id),
                ("client_secret", client_secret),
            ],
            Credentials::Password {
                client_id,
                client_secret,
                username,
                password,
            } => vec![
                ("grant_type", self.grant_type()),
                ("client_id", client_id),
                ("client_secret", client_secret),
                ("username", username),
                ("password", password),
            ],
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

/// Token response from Salesforce
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    instance_url: String,
    #[allow(dead_code)]
    #[serde(default)]
    token_type: Option<String>,
}

/// Error body returned by the token endpoint
#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Authenticated session handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub instance_url: String,
    pub access_token: String,
    pub api_version: String,
}

impl Session {
    /// Base URL for versioned REST calls, e.g. `https://acme.my.salesforce.com/services/data/v63.0`
    pub fn base_url(&self) -> String {
        format!(
            "{}/services/data/{}",
            self.instance_url.trim_end_matches('/'),
            self.api_version
        )
    }
}

/// Salesforce OAuth2 helper
#[derive(Debug)]
pub struct SalesforceAuth {
    credentials: Credentials,
    domain_url: String,
    api_version: String,
    timeout: Duration,
    http_client: Client,
}

impl SalesforceAuth {
    /// Create a new auth helper
    pub fn new(
        credentials: Credentials,
        domain_url: String,
        api_version: String,
        timeout_secs: u64,
        insecure_ssl: bool,
    ) -> Result<Self, AuthError> {
        let http_client = Client::builder()
            .danger_accept_invalid_certs(insecure_ssl)
            .build()?;

        Ok(Self {
            credentials,
            domain_url: domain_url.trim_end_matches('/').to_string(),
            api_version,
            timeout: Duration::from_secs(timeout_secs),
            http_client,
        })
    }

    /// Build from runtime configuration, failing if credentials are incomplete
    pub fn from_config(config: &RuntimeConfig) -> Result<Self, AuthError> {
        let (credentials, domain_url) = Credentials::from_config(config)?;
        Self::new(
            credentials,
            domain_url,
            config.api_version.clone(),
            config.timeout_secs,
            config.insecure_ssl,
        )
    }

    /// Token request timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Get the token endpoint URL
    fn token_endpoint(&self) -> String {
        format!("{}/services/oauth2/token", self.domain_url)
    }

    /// Exchange credentials for a session
    pub async fn login(&self) -> Result<Session, AuthError> {
        tracing::info!(
            "Authenticating with Salesforce at {} using {} flow",
            self.domain_url,
            self.credentials.grant_type()
        );

        let response = self
            .http_client
            .post(self.token_endpoint())
            .timeout(self.timeout)
            .form(&self.credentials.form_params())
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Token request failed: {} - {}", status, body);
            let detail = match serde_json::from_str::<TokenErrorResponse>(&body) {
                Ok(err) => match err.error_description {
                    Some(desc) => format!("{}: {}", err.error, desc),
                    None => err.error,
                },
                Err(_) => body,
            };
            return Err(AuthError::TokenRequestFailed(format!(
                "Status: {}, {}",
                status, detail
            )));
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            AuthError::ParseError(format!("Failed to parse token response: {}", e))
        })?;

        tracing::info!("Authenticated, instance URL: {}", token.instance_url);

        Ok(Session {
            instance_url: token.instance_url.trim_end_matches('/').to_string(),
            access_token: token.access_token,
            api_version: self.api_version.clone(),
        })
    }
}
