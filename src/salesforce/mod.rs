//! Salesforce module
//!
//! REST client, payload models and the shared connection provider

pub mod client;
pub mod connection;
pub mod models;
pub mod soql;

pub use client::{SalesforceApi, SalesforceClient, SalesforceError};
pub use connection::{Connection, ConnectionProvider, Connector, OAuthConnector};
pub use models::{
    ChildRelationship, DescribeGlobal, FieldDescribe, PicklistEntry, QueryResult,
    RecordTypeInfo, SObjectDescribe, SObjectSummary,
};
