//! In-memory Salesforce org for unit tests

use crate::auth::AuthError;
use crate::salesforce::{
    Connection, ConnectionProvider, Connector, DescribeGlobal, QueryResult, SObjectSummary,
    SalesforceApi, SalesforceError,
};
use crate::tools::ToolDispatcher;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Shared call counter
#[derive(Debug, Clone, Default)]
pub struct Counter(Arc<AtomicUsize>);

impl Counter {
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    fn incr(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// Canned responses keyed by a substring of the SOQL text
#[derive(Debug, Default)]
struct CannedQueries(Vec<(String, Vec<Value>)>);

impl CannedQueries {
    fn find(&self, soql: &str) -> QueryResult {
        let records = self
            .0
            .iter()
            .find(|(needle, _)| soql.contains(needle.as_str()))
            .map(|(_, records)| records.clone())
            .unwrap_or_default();
        QueryResult {
            total_size: records.len() as u64,
            records,
        }
    }
}

#[derive(Debug, Default)]
pub struct FakeOrg {
    objects: Vec<SObjectSummary>,
    describes: HashMap<String, Value>,
    queries: CannedQueries,
    tooling_queries: CannedQueries,
    log_bodies: HashMap<String, String>,
    failing_creates: Vec<String>,
    session_expired: bool,
    calls: Mutex<Vec<String>>,
    next_id: AtomicUsize,
}

impl FakeOrg {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object(mut self, name: &str, label: &str, custom: bool) -> Self {
        self.objects.push(SObjectSummary {
            name: name.to_string(),
            label: label.to_string(),
            custom,
        });
        self
    }

    pub fn with_describe(mut self, name: &str, describe: Value) -> Self {
        self.describes.insert(name.to_string(), describe);
        self
    }

    pub fn on_query(mut self, needle: &str, records: Vec<Value>) -> Self {
        self.queries.0.push((needle.to_string(), records));
        self
    }

    pub fn on_tooling_query(mut self, needle: &str, records: Vec<Value>) -> Self {
        self.tooling_queries.0.push((needle.to_string(), records));
        self
    }

    pub fn with_log_body(mut self, id: &str, body: &str) -> Self {
        self.log_bodies.insert(id.to_string(), body.to_string());
        self
    }

    pub fn failing_create(mut self, sobject: &str) -> Self {
        self.failing_creates.push(sobject.to_string());
        self
    }

    /// Every call answers 401
    pub fn expired(mut self) -> Self {
        self.session_expired = true;
        self
    }

    /// Calls received so far, e.g. `query: SELECT ...`
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_matching(&self, prefix: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with(prefix))
            .collect()
    }

    fn record(&self, call: String) -> Result<(), SalesforceError> {
        self.calls.lock().unwrap().push(call);
        if self.session_expired {
            return Err(SalesforceError::SessionExpired(
                "Session expired or invalid".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl SalesforceApi for FakeOrg {
    fn instance_url(&self) -> &str {
        "https://acme.my.salesforce.com"
    }

    async fn describe_global(&self) -> Result<DescribeGlobal, SalesforceError> {
        self.record("describe_global".to_string())?;
        Ok(DescribeGlobal {
            sobjects: self.objects.clone(),
        })
    }

    async fn describe_sobject(&self, object_name: &str) -> Result<Value, SalesforceError> {
        self.record(format!("describe: {}", object_name))?;
        self.describes.get(object_name).cloned().ok_or_else(|| {
            SalesforceError::NotFound(format!("The requested resource does not exist: {}", object_name))
        })
    }

    async fn query(&self, soql: &str) -> Result<QueryResult, SalesforceError> {
        self.record(format!("query: {}", soql))?;
        Ok(self.queries.find(soql))
    }

    async fn tooling_query(&self, soql: &str) -> Result<QueryResult, SalesforceError> {
        self.record(format!("tooling_query: {}", soql))?;
        Ok(self.tooling_queries.find(soql))
    }

    async fn tooling_create(&self, sobject: &str, body: &Value) -> Result<String, SalesforceError> {
        self.record(format!("tooling_create: {} {}", sobject, body))?;
        if self.failing_creates.iter().any(|s| s == sobject) {
            return Err(SalesforceError::Api {
                status: 400,
                code: "FIELD_INTEGRITY_EXCEPTION".to_string(),
                message: format!("Cannot create {}", sobject),
            });
        }
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("{}{:012}", &sobject[..3.min(sobject.len())], n))
    }

    async fn tooling_update(
        &self,
        sobject: &str,
        id: &str,
        body: &Value,
    ) -> Result<(), SalesforceError> {
        self.record(format!("tooling_update: {} {} {}", sobject, id, body))
    }

    async fn tooling_delete(&self, sobject: &str, id: &str) -> Result<(), SalesforceError> {
        self.record(format!("tooling_delete: {} {}", sobject, id))
    }

    async fn apex_log_body(&self, log_id: &str) -> Result<String, SalesforceError> {
        self.record(format!("apex_log_body: {}", log_id))?;
        self.log_bodies
            .get(log_id)
            .cloned()
            .ok_or_else(|| SalesforceError::NotFound(log_id.to_string()))
    }
}

/// Connector handing out a shared `FakeOrg`
pub struct FakeConnector {
    org: Option<Arc<FakeOrg>>,
    failure: Option<String>,
    connects: Counter,
}

impl FakeConnector {
    pub fn new(org: FakeOrg) -> Self {
        Self::shared(Arc::new(org))
    }

    pub fn shared(org: Arc<FakeOrg>) -> Self {
        Self {
            org: Some(org),
            failure: None,
            connects: Counter::default(),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            org: None,
            failure: Some(reason.to_string()),
            connects: Counter::default(),
        }
    }

    pub fn connect_count(&self) -> Counter {
        self.connects.clone()
    }
}

#[async_trait]
impl Connector for FakeConnector {
    async fn connect(&self) -> Result<Connection, AuthError> {
        self.connects.incr();
        match (&self.org, &self.failure) {
            (Some(org), None) => Ok(Arc::clone(org) as Connection),
            (_, Some(reason)) => Err(AuthError::TokenRequestFailed(format!(
                "Status: 400 Bad Request, {}",
                reason
            ))),
            (None, None) => Err(AuthError::MissingCredentials("fake".to_string())),
        }
    }
}

/// Dispatcher over a fake org, plus handles to inspect it
pub fn dispatcher(org: FakeOrg) -> (ToolDispatcher, Arc<FakeOrg>, Counter) {
    let org = Arc::new(org);
    let connector = FakeConnector::shared(Arc::clone(&org));
    let connects = connector.connect_count();
    let provider = Arc::new(ConnectionProvider::new(Box::new(connector)));
    (ToolDispatcher::new(provider), org, connects)
}

/// Dispatcher whose logins always fail
pub fn failing_dispatcher() -> (ToolDispatcher, Counter) {
    let connector = FakeConnector::failing("invalid_client_id");
    let connects = connector.connect_count();
    let provider = Arc::new(ConnectionProvider::new(Box::new(connector)));
    (ToolDispatcher::new(provider), connects)
}

/// Build an argument map from a JSON object literal
pub fn args(value: Value) -> HashMap<String, Value> {
    match value {
        Value::Object(map) => map.into_iter().collect(),
        _ => HashMap::new(),
    }
}

/// Describe of a Case-like object used across tests
pub fn case_describe() -> Value {
    json!({
        "name": "Case",
        "label": "Case",
        "labelPlural": "Cases",
        "keyPrefix": "500",
        "custom": false,
        "createable": true,
        "updateable": true,
        "deletable": true,
        "queryable": true,
        "searchable": true,
        "fields": [
            {"name": "Id", "label": "Case ID", "type": "id", "nillable": false,
             "unique": false, "externalId": false, "updateable": false, "custom": false},
            {"name": "Status", "label": "Status", "type": "picklist", "nillable": true,
             "updateable": true, "custom": false,
             "inlineHelpText": "Current | stage\nof the case",
             "picklistValues": [
                {"value": "New", "label": "New", "defaultValue": true, "active": true},
                {"value": "Working", "label": "Working", "defaultValue": false, "active": true},
                {"value": "Escalated", "label": "Escalated", "defaultValue": false, "active": false},
                {"value": "Closed", "label": "Closed", "defaultValue": false, "active": true}
             ]},
            {"name": "AccountId", "label": "Account ID", "type": "reference", "nillable": true,
             "updateable": true, "custom": false,
             "referenceTo": ["Account"], "relationshipName": "Account"},
            {"name": "Parent__c", "label": "Parent Ticket", "type": "reference", "nillable": false,
             "updateable": true, "custom": true,
             "referenceTo": ["Ticket__c"], "relationshipName": "Parent__r"},
            {"name": "Subject", "label": "Subject", "type": "string", "nillable": true,
             "updateable": true, "custom": false, "unique": false},
            {"name": "External_Key__c", "label": "External Key", "type": "string", "nillable": true,
             "updateable": true, "custom": true, "unique": true, "externalId": true}
        ],
        "childRelationships": [
            {"childSObject": "CaseComment", "relationshipName": "CaseComments",
             "field": "ParentId", "cascadeDelete": true},
            {"childSObject": "CaseHistory", "relationshipName": null,
             "field": "CaseId", "cascadeDelete": true}
        ],
        "recordTypeInfos": [
            {"recordTypeId": "012000000000000AAA", "name": "Master", "developerName": "Master",
             "defaultRecordTypeMapping": true, "available": true}
        ]
    })
}
