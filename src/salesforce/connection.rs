//! Lazily-initialized Salesforce connection
//!
//! The provider authenticates on first use and hands out the same
//! connection until it is invalidated.

use crate::auth::{AuthError, SalesforceAuth};
use crate::config::RuntimeConfig;
use crate::salesforce::client::{SalesforceApi, SalesforceClient};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared handle handed to tool handlers
pub type Connection = Arc<dyn SalesforceApi>;

/// Produces an authenticated connection
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self) -> Result<Connection, AuthError>;
}

/// Connector performing the OAuth2 login described by the runtime config
#[derive(Debug)]
pub struct OAuthConnector {
    config: Arc<RuntimeConfig>,
}

impl OAuthConnector {
    pub fn new(config: Arc<RuntimeConfig>) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Connector for OAuthConnector {
    async fn connect(&self) -> Result<Connection, AuthError> {
        let auth = SalesforceAuth::from_config(&self.config)?;
        let session = auth.login().await?;
        let client =
            SalesforceClient::new(session, self.config.timeout_secs, self.config.insecure_ssl)
                .map_err(|e| AuthError::TokenRequestFailed(format!("Client setup failed: {}", e)))?;
        Ok(Arc::new(client))
    }
}

/// Caches the connection produced by a `Connector`
pub struct ConnectionProvider {
    connector: Box<dyn Connector>,
    cache: RwLock<Option<Connection>>,
}

impl ConnectionProvider {
    pub fn new(connector: Box<dyn Connector>) -> Self {
        Self {
            connector,
            cache: RwLock::new(None),
        }
    }

    /// Provider that logs in with the configured credentials
    pub fn from_config(config: Arc<RuntimeConfig>) -> Self {
        Self::new(Box::new(OAuthConnector::new(config)))
    }

    /// Return the cached connection, authenticating on first use.
    ///
    /// A failed login leaves the cache empty so the next call tries again.
    pub async fn get_connection(&self) -> Result<Connection, AuthError> {
        {
            let cache = self.cache.read().await;
            if let Some(ref connection) = *cache {
                tracing::debug!("Using cached Salesforce connection");
                return Ok(Arc::clone(connection));
            }
        }

        let connection = self.connector.connect().await?;

        {
            let mut cache = self.cache.write().await;
            *cache = Some(Arc::clone(&connection));
        }

        tracing::info!("Connected to Salesforce at {}", connection.instance_url());
        Ok(connection)
    }

    /// Drop the cached connection so the next call re-authenticates
    pub async fn invalidate(&self) {
        let mut cache = self.cache.write().await;
        if cache.take().is_some() {
            tracing::info!("Cached Salesforce connection invalidated");
        }
    }

    pub async fn is_connected(&self) -> bool {
        self.cache.read().await.is_some()
    }
}

impl std::fmt::Debug for ConnectionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionProvider").finish_non_exhaustive()
    }
}
