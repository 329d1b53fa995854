//! Salesforce REST client
//!
//! HTTP client for the Salesforce REST, SOQL and Tooling APIs bound to one
//! authenticated session.

use crate::auth::Session;
use crate::salesforce::models::{DescribeGlobal, QueryResult};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Salesforce API errors
#[derive(Error, Debug)]
pub enum SalesforceError {
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Session expired or invalid: {0}")]
    SessionExpired(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Salesforce API error ({status}) {code}: {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Operations the tools need from Salesforce
#[async_trait]
pub trait SalesforceApi: Send + Sync + std::fmt::Debug {
    /// Instance URL of the connected org
    fn instance_url(&self) -> &str;

    /// List every sObject visible to the session
    async fn describe_global(&self) -> Result<DescribeGlobal, SalesforceError>;

    /// Full describe of one sObject, as returned by the API
    async fn describe_sobject(&self, object_name: &str) -> Result<Value, SalesforceError>;

    /// Run a SOQL query against the data API
    async fn query(&self, soql: &str) -> Result<QueryResult, SalesforceError>;

    /// Run a SOQL query against the Tooling API
    async fn tooling_query(&self, soql: &str) -> Result<QueryResult, SalesforceError>;

    /// Create a Tooling API record, returning its id
    async fn tooling_create(&self, sobject: &str, body: &Value) -> Result<String, SalesforceError>;

    async fn tooling_update(
        &self,
        sobject: &str,
        id: &str,
        body: &Value,
    ) -> Result<(), SalesforceError>;

    async fn tooling_delete(&self, sobject: &str, id: &str) -> Result<(), SalesforceError>;

    /// Raw text of an Apex debug log
    async fn apex_log_body(&self, log_id: &str) -> Result<String, SalesforceError>;
}

/// Error entry in a Salesforce error response body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiErrorBody {
    #[serde(default)]
    error_code: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct CreateResponse {
    id: String,
}

/// REST client for one Salesforce session
#[derive(Debug)]
pub struct SalesforceClient {
    session: Session,
    base_url: String,
    http_client: Client,
}

impl SalesforceClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `session` - Authenticated session
    /// * `timeout_secs` - Request timeout
    /// * `insecure_ssl` - Skip SSL certificate verification
    pub fn new(session: Session, timeout_secs: u64, insecure_ssl: bool) -> Result<Self, SalesforceError> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .danger_accept_invalid_certs(insecure_ssl)
            .build()?;

        Ok(Self {
            base_url: session.base_url(),
            session,
            http_client,
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        tracing::debug!("{} {}", method, url);
        self.http_client
            .request(method, url)
            .bearer_auth(&self.session.access_token)
    }

    /// Send a request and map non-success statuses to errors
    async fn send(&self, builder: RequestBuilder) -> Result<Response, SalesforceError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(error_from_response(status, &body))
    }

    async fn fetch_json<T: for<'de> Deserialize<'de>>(
        &self,
        builder: RequestBuilder,
        what: &str,
    ) -> Result<T, SalesforceError> {
        let response = self.send(builder.header(ACCEPT, "application/json")).await?;
        response
            .json()
            .await
            .map_err(|e| SalesforceError::ParseError(format!("Failed to parse {}: {}", what, e)))
    }
}

/// Translate an error status and Salesforce error body into `SalesforceError`
fn error_from_response(status: StatusCode, body: &str) -> SalesforceError {
    let parsed = serde_json::from_str::<Vec<ApiErrorBody>>(body)
        .ok()
        .and_then(|errors| errors.into_iter().next());

    let message = parsed
        .as_ref()
        .map(|e| e.message.clone())
        .unwrap_or_else(|| body.to_string());

    match status {
        StatusCode::UNAUTHORIZED => SalesforceError::SessionExpired(message),
        StatusCode::NOT_FOUND => SalesforceError::NotFound(message),
        _ => SalesforceError::Api {
            status: status.as_u16(),
            code: parsed
                .map(|e| e.error_code)
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| "UNKNOWN".to_string()),
            message,
        },
    }
}

#[async_trait]
impl SalesforceApi for SalesforceClient {
    fn instance_url(&self) -> &str {
        &self.session.instance_url
    }

    async fn describe_global(&self) -> Result<DescribeGlobal, SalesforceError> {
        self.fetch_json(self.request(Method::GET, "sobjects/"), "global describe")
            .await
    }

    async fn describe_sobject(&self, object_name: &str) -> Result<Value, SalesforceError> {
        let path = format!("sobjects/{}/describe/", object_name);
        self.fetch_json(self.request(Method::GET, &path), "object describe")
            .await
    }

    async fn query(&self, soql: &str) -> Result<QueryResult, SalesforceError> {
        tracing::debug!("SOQL: {}", soql);
        let builder = self.request(Method::GET, "query/").query(&[("q", soql)]);
        self.fetch_json(builder, "query result").await
    }

    async fn tooling_query(&self, soql: &str) -> Result<QueryResult, SalesforceError> {
        tracing::debug!("Tooling SOQL: {}", soql);
        let builder = self
            .request(Method::GET, "tooling/query/")
            .query(&[("q", soql)]);
        self.fetch_json(builder, "tooling query result").await
    }

    async fn tooling_create(&self, sobject: &str, body: &Value) -> Result<String, SalesforceError> {
        let path = format!("tooling/sobjects/{}", sobject);
        let created: CreateResponse = self
            .fetch_json(self.request(Method::POST, &path).json(body), "create response")
            .await?;
        Ok(created.id)
    }

    async fn tooling_update(
        &self,
        sobject: &str,
        id: &str,
        body: &Value,
    ) -> Result<(), SalesforceError> {
        let path = format!("tooling/sobjects/{}/{}", sobject, id);
        self.send(self.request(Method::PATCH, &path).json(body))
            .await?;
        Ok(())
    }

    async fn tooling_delete(&self, sobject: &str, id: &str) -> Result<(), SalesforceError> {
        let path = format!("tooling/sobjects/{}/{}", sobject, id);
        self.send(self.request(Method::DELETE, &path)).await?;
        Ok(())
    }

    async fn apex_log_body(&self, log_id: &str) -> Result<String, SalesforceError> {
        let path = format!("tooling/sobjects/ApexLog/{}/Body", log_id);
        let response = self
            .send(
                self.request(Method::GET, &path)
                    .header(ACCEPT, "text/plain"),
            )
            .await?;
        response
            .text()
            .await
            .map_err(|e| SalesforceError::ParseError(format!("Failed to read log body: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_from_salesforce_body() {
        let body = r#"[{"message":"sObject type 'Acount' is not supported.","errorCode":"INVALID_TYPE"}]"#;
        match error_from_response(StatusCode::BAD_REQUEST, body) {
            SalesforceError::Api {
                status,
                code,
                message,
            } => {
                assert_eq!(status, 400);
                assert_eq!(code, "INVALID_TYPE");
                assert!(message.contains("Acount"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_unauthorized_maps_to_session_expired() {
        let body = r#"[{"message":"Session expired or invalid","errorCode":"INVALID_SESSION_ID"}]"#;
        assert!(matches!(
            error_from_response(StatusCode::UNAUTHORIZED, body),
            SalesforceError::SessionExpired(_)
        ));
    }

    #[test]
    fn test_non_json_error_body() {
        let err = error_from_response(StatusCode::INTERNAL_SERVER_ERROR, "upstream timeout");
        assert_eq!(
            err.to_string(),
            "Salesforce API error (500) UNKNOWN: upstream timeout"
        );
    }

    #[test]
    fn test_client_base_url() {
        let client = SalesforceClient::new(
            Session {
                instance_url: "https://acme.my.salesforce.com".to_string(),
                access_token: "token".to_string(),
                api_version: "v63.0".to_string(),
            },
            30,
            false,
        )
        .unwrap();
        assert_eq!(client.base_url, "https://acme.my.salesforce.com/services/data/v63.0");
        assert_eq!(client.instance_url(), "https://acme.my.salesforce.com");
    }
}
