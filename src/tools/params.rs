//! Typed tool parameters
//!
//! Raw argument maps are parsed into one `ToolCall` variant per tool and
//! validated before any network call. Integers and booleans are accepted
//! either as JSON values or as strings ("5", "true"), and string lists as
//! arrays or comma-separated strings.

use crate::salesforce::soql::{is_api_name, is_field_path};
use crate::tools::catalog::find_tool;
use crate::tools::error::ToolError;
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_QUERY_LIMIT: usize = 10;
pub const MAX_QUERY_LIMIT: usize = 100;
pub const DEFAULT_LOG_LIMIT: usize = 10;
pub const MAX_LOG_LIMIT: usize = 100;
pub const DEFAULT_EXPIRATION_MINUTES: i64 = 30;
pub const MAX_EXPIRATION_MINUTES: i64 = 24 * 60;

/// A parsed, validated tool invocation
#[derive(Debug, Clone, PartialEq)]
pub enum ToolCall {
    SearchObjects(SearchObjectsParams),
    DescribeObject(DescribeObjectParams),
    DescribeObjectWithApi(DescribeObjectWithApiParams),
    DescribeRelationshipFields(ObjectParams),
    QueryRecords(QueryRecordsParams),
    GetFieldsByType(FieldsByTypeParams),
    GetPicklistValues(PicklistParams),
    GetValidationRules(ObjectParams),
    ManageDebugLogs(DebugLogParams),
}

impl ToolCall {
    /// Parse the arguments of tool `name`.
    ///
    /// Fails with `UnknownTool` or `InvalidParameter`; never touches the network.
    pub fn parse(name: &str, args: &HashMap<String, Value>) -> Result<Self, ToolError> {
        let tool = find_tool(name).ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        let args: Map<String, Value> = args
            .iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        let call = match tool.name {
            "search_objects" => ToolCall::SearchObjects(parse_params(name, args)?),
            "describe_object" => ToolCall::DescribeObject(parse_params(name, args)?),
            "describe_object_with_api" => ToolCall::DescribeObjectWithApi(parse_params(name, args)?),
            "describe_relationship_fields" => {
                ToolCall::DescribeRelationshipFields(parse_params(name, args)?)
            }
            "query_records" => ToolCall::QueryRecords(parse_params(name, args)?),
            "get_fields_by_type" => ToolCall::GetFieldsByType(parse_params(name, args)?),
            "get_picklist_values" => ToolCall::GetPicklistValues(parse_params(name, args)?),
            "get_validation_rules" => ToolCall::GetValidationRules(parse_params(name, args)?),
            "manage_debug_logs" => ToolCall::ManageDebugLogs(parse_params(name, args)?),
            _ => return Err(ToolError::UnknownTool(name.to_string())),
        };
        Ok(call)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ToolCall::SearchObjects(_) => "search_objects",
            ToolCall::DescribeObject(_) => "describe_object",
            ToolCall::DescribeObjectWithApi(_) => "describe_object_with_api",
            ToolCall::DescribeRelationshipFields(_) => "describe_relationship_fields",
            ToolCall::QueryRecords(_) => "query_records",
            ToolCall::GetFieldsByType(_) => "get_fields_by_type",
            ToolCall::GetPicklistValues(_) => "get_picklist_values",
            ToolCall::GetValidationRules(_) => "get_validation_rules",
            ToolCall::ManageDebugLogs(_) => "manage_debug_logs",
        }
    }
}

/// Post-deserialization checks and normalization
trait Validate: Sized {
    fn validate(self) -> Result<Self, String>;
}

fn parse_params<T>(tool: &str, args: Map<String, Value>) -> Result<T, ToolError>
where
    T: DeserializeOwned + Validate,
{
    serde_json::from_value::<T>(Value::Object(args))
        .map_err(|e| e.to_string())
        .and_then(Validate::validate)
        .map_err(|e| ToolError::invalid(format!("{}: {}", tool, e)))
}

fn require_text(name: &str, value: String) -> Result<String, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(format!("`{}` must not be empty", name));
    }
    Ok(trimmed.to_string())
}

fn require_api_name(name: &str, value: String) -> Result<String, String> {
    let value = require_text(name, value)?;
    if !is_api_name(&value) {
        return Err(format!("`{}` is not a valid API name: '{}'", name, value));
    }
    Ok(value)
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn clamp_limit(name: &str, value: Option<i64>, default: usize, max: usize) -> usize {
    match value {
        None => default,
        Some(n) if n < 1 => {
            tracing::warn!("Invalid {} {}, using minimum of 1", name, n);
            1
        }
        Some(n) if n as u64 > max as u64 => {
            tracing::warn!("{} {} exceeds maximum, capping at {}", name, n, max);
            max
        }
        Some(n) => n as usize,
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchObjectsParams {
    pub query: String,
}

impl Validate for SearchObjectsParams {
    fn validate(self) -> Result<Self, String> {
        Ok(Self {
            query: require_text("query", self.query)?,
        })
    }
}

/// Parameters of tools that only take an object name
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectParams {
    pub object_name: String,
}

impl Validate for ObjectParams {
    fn validate(self) -> Result<Self, String> {
        Ok(Self {
            object_name: require_api_name("objectName", self.object_name)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescribeObjectParams {
    pub object_name: String,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub include_field_details: Option<bool>,
}

impl DescribeObjectParams {
    pub fn include_field_details(&self) -> bool {
        self.include_field_details.unwrap_or(true)
    }
}

impl Validate for DescribeObjectParams {
    fn validate(self) -> Result<Self, String> {
        Ok(Self {
            object_name: require_api_name("objectName", self.object_name)?,
            ..self
        })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescribeObjectWithApiParams {
    pub object_name: String,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub raw_json: Option<bool>,
}

impl DescribeObjectWithApiParams {
    pub fn raw_json(&self) -> bool {
        self.raw_json.unwrap_or(false)
    }
}

impl Validate for DescribeObjectWithApiParams {
    fn validate(self) -> Result<Self, String> {
        Ok(Self {
            object_name: require_api_name("objectName", self.object_name)?,
            ..self
        })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRecordsParams {
    pub object_name: String,
    #[serde(deserialize_with = "string_list")]
    pub fields: Vec<String>,
    #[serde(default)]
    pub where_clause: Option<String>,
    #[serde(default)]
    pub order_by: Option<String>,
    #[serde(default, deserialize_with = "lenient_int")]
    limit: Option<i64>,
}

impl QueryRecordsParams {
    /// Requested limit clamped to 1..=MAX_QUERY_LIMIT
    pub fn limit(&self) -> usize {
        clamp_limit("limit", self.limit, DEFAULT_QUERY_LIMIT, MAX_QUERY_LIMIT)
    }
}

impl Validate for QueryRecordsParams {
    fn validate(self) -> Result<Self, String> {
        let object_name = require_api_name("objectName", self.object_name)?;
        if self.fields.is_empty() {
            return Err("`fields` must name at least one field".to_string());
        }
        if let Some(bad) = self.fields.iter().find(|f| !is_field_path(f)) {
            return Err(format!("`fields` contains an invalid field name: '{}'", bad));
        }
        Ok(Self {
            object_name,
            where_clause: optional_text(self.where_clause),
            order_by: optional_text(self.order_by),
            ..self
        })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldsByTypeParams {
    pub object_name: String,
    #[serde(default)]
    pub field_type: Option<String>,
}

impl Validate for FieldsByTypeParams {
    fn validate(self) -> Result<Self, String> {
        Ok(Self {
            object_name: require_api_name("objectName", self.object_name)?,
            field_type: optional_text(self.field_type),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PicklistParams {
    pub object_name: String,
    pub field_name: String,
}

impl Validate for PicklistParams {
    fn validate(self) -> Result<Self, String> {
        Ok(Self {
            object_name: require_api_name("objectName", self.object_name)?,
            field_name: require_api_name("fieldName", self.field_name)?,
        })
    }
}

/// What `manage_debug_logs` should do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebugLogAction {
    Enable,
    Disable,
    Retrieve,
}

/// Apex log verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    None,
    Error,
    Warn,
    Info,
    Debug,
    Fine,
    Finer,
    Finest,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::None => "NONE",
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Fine => "FINE",
            LogLevel::Finer => "FINER",
            LogLevel::Finest => "FINEST",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NONE" => Ok(LogLevel::None),
            "ERROR" => Ok(LogLevel::Error),
            "WARN" => Ok(LogLevel::Warn),
            "INFO" => Ok(LogLevel::Info),
            "DEBUG" => Ok(LogLevel::Debug),
            "FINE" => Ok(LogLevel::Fine),
            "FINER" => Ok(LogLevel::Finer),
            "FINEST" => Ok(LogLevel::Finest),
            other => Err(format!(
                "invalid log level '{}', expected one of: NONE, ERROR, WARN, INFO, DEBUG, FINE, FINER, FINEST",
                other
            )),
        }
    }
}

impl<'de> Deserialize<'de> for LogLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(D::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugLogParams {
    pub action: DebugLogAction,
    pub user_id: String,
    #[serde(default)]
    pub log_level: Option<LogLevel>,
    #[serde(default, deserialize_with = "lenient_int")]
    expiration_time: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int")]
    limit: Option<i64>,
    #[serde(default)]
    pub log_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub include_body: Option<bool>,
}

impl DebugLogParams {
    pub fn expiration_minutes(&self) -> i64 {
        clamp_limit(
            "expirationTime",
            self.expiration_time,
            DEFAULT_EXPIRATION_MINUTES as usize,
            MAX_EXPIRATION_MINUTES as usize,
        ) as i64
    }

    pub fn limit(&self) -> usize {
        clamp_limit("limit", self.limit, DEFAULT_LOG_LIMIT, MAX_LOG_LIMIT)
    }

    pub fn include_body(&self) -> bool {
        self.include_body.unwrap_or(false)
    }
}

impl Validate for DebugLogParams {
    fn validate(self) -> Result<Self, String> {
        let user_id = require_text("userId", self.user_id)?;

        if self.action == DebugLogAction::Enable && self.log_level.is_none() {
            return Err(
                "`logLevel` is required for 'enable'. Valid options: NONE, ERROR, WARN, INFO, DEBUG, FINE, FINER, FINEST"
                    .to_string(),
            );
        }

        let log_id = optional_text(self.log_id);
        if let Some(ref id) = log_id {
            if !id.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(format!("`logId` is not a valid record id: '{}'", id));
            }
        }

        Ok(Self {
            user_id,
            log_id,
            ..self
        })
    }
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(b)),
        Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(Some(true)),
            "false" | "0" | "no" => Ok(Some(false)),
            _ => Err(D::Error::custom(format!("expected boolean, got '{}'", s))),
        },
        Some(other) => Err(D::Error::custom(format!("expected boolean, got {}", other))),
    }
}

fn lenient_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("expected integer, got {}", n))),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("expected integer, got '{}'", s))),
        Some(other) => Err(D::Error::custom(format!("expected integer, got {}", other))),
    }
}

fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s
            .split(',')
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .collect()),
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::String(s) => Ok(s.trim().to_string()),
                other => Err(D::Error::custom(format!(
                    "expected string at index {}, got {}",
                    i, other
                ))),
            })
            .collect(),
        other => Err(D::Error::custom(format!(
            "expected array of strings, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::args;
    use crate::tools::catalog::TOOLS;
    use serde_json::json;

    fn sample_args(tool: &str) -> Value {
        match tool {
            "search_objects" => json!({"query": "Acc"}),
            "query_records" => json!({"objectName": "Account", "fields": ["Id"]}),
            "get_picklist_values" => json!({"objectName": "Case", "fieldName": "Status"}),
            "manage_debug_logs" => json!({"action": "retrieve", "userId": "admin@acme.com"}),
            _ => json!({"objectName": "Account"}),
        }
    }

    #[test]
    fn test_minimal_args_parse_for_every_tool() {
        for tool in TOOLS {
            let call = ToolCall::parse(tool.name, &args(sample_args(tool.name)));
            assert!(call.is_ok(), "{} failed: {:?}", tool.name, call);
            assert_eq!(call.unwrap().name(), tool.name);
        }
    }

    #[test]
    fn test_each_required_param_is_enforced() {
        for tool in TOOLS {
            for required in tool.required_params() {
                let mut map = args(sample_args(tool.name));
                map.remove(required.name);
                let err = ToolCall::parse(tool.name, &map).unwrap_err();
                assert!(
                    matches!(err, ToolError::InvalidParameter(ref m) if m.contains(required.name)),
                    "{} without {}: {:?}",
                    tool.name,
                    required.name,
                    err
                );
            }
        }
    }

    #[test]
    fn test_unknown_tool() {
        let err = ToolCall::parse("drop_database", &HashMap::new()).unwrap_err();
        assert!(matches!(err, ToolError::UnknownTool(ref n) if n == "drop_database"));
    }

    #[test]
    fn test_lenient_types() {
        let call = ToolCall::parse(
            "query_records",
            &args(json!({
                "objectName": " Contact ",
                "fields": "Name, Email,Account.Name",
                "limit": "5",
                "whereClause": "  "
            })),
        )
        .unwrap();
        match call {
            ToolCall::QueryRecords(p) => {
                assert_eq!(p.object_name, "Contact");
                assert_eq!(p.fields, vec!["Name", "Email", "Account.Name"]);
                assert_eq!(p.limit(), 5);
                assert!(p.where_clause.is_none());
            }
            other => panic!("unexpected call: {:?}", other),
        }

        let call = ToolCall::parse(
            "describe_object",
            &args(json!({"objectName": "Account", "includeFieldDetails": "false"})),
        )
        .unwrap();
        assert!(matches!(call, ToolCall::DescribeObject(ref p) if !p.include_field_details()));
    }

    #[test]
    fn test_limit_is_clamped() {
        let parse_limit = |limit: Value| match ToolCall::parse(
            "query_records",
            &args(json!({"objectName": "Account", "fields": ["Id"], "limit": limit})),
        )
        .unwrap()
        {
            ToolCall::QueryRecords(p) => p.limit(),
            _ => unreachable!(),
        };
        assert_eq!(parse_limit(json!(0)), 1);
        assert_eq!(parse_limit(json!(5000)), MAX_QUERY_LIMIT);
        assert_eq!(parse_limit(Value::Null), DEFAULT_QUERY_LIMIT);
    }

    #[test]
    fn test_malformed_values_rejected() {
        let cases = [
            ("describe_object", json!({"objectName": ""})),
            ("describe_object", json!({"objectName": "Account/../../x"})),
            ("describe_object", json!({"objectName": 42})),
            ("query_records", json!({"objectName": "Account", "fields": []})),
            ("query_records", json!({"objectName": "Account", "fields": ["Name", 3]})),
            ("query_records", json!({"objectName": "Account", "fields": ["Id"], "limit": "ten"})),
            ("search_objects", json!({"query": "   "})),
            ("manage_debug_logs", json!({"action": "purge", "userId": "a@b.c"})),
            ("manage_debug_logs", json!({"action": "enable", "userId": "a@b.c"})),
            ("manage_debug_logs", json!({"action": "enable", "userId": "a@b.c", "logLevel": "LOUD"})),
            ("manage_debug_logs", json!({"action": "retrieve", "userId": "a@b.c", "logId": "07L' OR Id != '"})),
        ];
        for (tool, value) in cases {
            let err = ToolCall::parse(tool, &args(value.clone())).unwrap_err();
            assert!(
                matches!(err, ToolError::InvalidParameter(_)),
                "{} {} gave {:?}",
                tool,
                value,
                err
            );
        }
    }

    #[test]
    fn test_debug_log_params() {
        let call = ToolCall::parse(
            "manage_debug_logs",
            &args(json!({
                "action": "enable",
                "userId": "admin@acme.com",
                "logLevel": "finest",
                "expirationTime": 60
            })),
        )
        .unwrap();
        match call {
            ToolCall::ManageDebugLogs(p) => {
                assert_eq!(p.action, DebugLogAction::Enable);
                assert_eq!(p.log_level, Some(LogLevel::Finest));
                assert_eq!(p.expiration_minutes(), 60);
                assert!(!p.include_body());
                assert_eq!(p.limit(), DEFAULT_LOG_LIMIT);
            }
            other => panic!("unexpected call: {:?}", other),
        }
    }

    #[test]
    fn test_expiration_time_is_clamped() {
        let minutes = |value: Value| match ToolCall::parse(
            "manage_debug_logs",
            &args(json!({
                "action": "enable",
                "userId": "admin@acme.com",
                "logLevel": "DEBUG",
                "expirationTime": value
            })),
        )
        .unwrap()
        {
            ToolCall::ManageDebugLogs(p) => p.expiration_minutes(),
            other => panic!("unexpected call: {:?}", other),
        };
        assert_eq!(minutes(json!(0)), 1);
        assert_eq!(minutes(json!(-15)), 1);
        assert_eq!(minutes(json!(5000)), MAX_EXPIRATION_MINUTES);
        assert_eq!(minutes(json!("90")), 90);
    }
}
