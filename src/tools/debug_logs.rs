//! Debug log management
//!
//! Enables, disables and retrieves Apex debug logs for one user through the
//! Tooling API. A log is produced only while the user has an unexpired
//! `TraceFlag` pointing at a `DebugLevel`.

use crate::salesforce::soql::{datetime_literal, like_contains, quote};
use crate::salesforce::SalesforceApi;
use crate::tools::error::ToolError;
use crate::tools::output::{ToolOutput, ToolResult};
use crate::tools::params::{DebugLogAction, DebugLogParams, LogLevel};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Prefix of the debug levels this server creates
const DEBUG_LEVEL_PREFIX: &str = "SFMCP_";
const USER_KEY_PREFIX: &str = "005";
const USER_FIELDS: &str = "SELECT Id, Username, Name, IsActive FROM User";
const LOG_FIELDS: &str =
    "SELECT Id, LogUserId, Operation, Application, Status, LogLength, LastModifiedDate, Request FROM ApexLog";
const CANDIDATE_LIMIT: usize = 5;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all(serialize = "camelCase", deserialize = "PascalCase"))]
struct UserRecord {
    id: String,
    #[serde(default)]
    username: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    is_active: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct IdRecord {
    id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all(serialize = "camelCase", deserialize = "PascalCase"))]
struct ApexLog {
    id: String,
    #[serde(default)]
    log_user_id: Option<String>,
    #[serde(default)]
    operation: Option<String>,
    #[serde(default)]
    application: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    log_length: Option<u64>,
    #[serde(default)]
    last_modified_date: Option<String>,
    #[serde(default)]
    request: Option<String>,
}

impl ApexLog {
    fn render(&self, heading: &str) -> String {
        let na = |v: &Option<String>| v.clone().unwrap_or_else(|| "N/A".to_string());
        format!(
            "{}\n\
             - **ID:** {}\n\
             - **Operation:** {}\n\
             - **Application:** {}\n\
             - **Status:** {}\n\
             - **Size:** {} bytes\n\
             - **Date:** {}\n",
            heading,
            self.id,
            na(&self.operation),
            na(&self.application),
            na(&self.status),
            self.log_length
                .map(|n| n.to_string())
                .unwrap_or_else(|| "N/A".to_string()),
            self.last_modified_date
                .as_deref()
                .map(display_date)
                .unwrap_or_else(|| "N/A".to_string()),
        )
    }
}

/// Salesforce datetimes look like `2025-03-01T09:30:00.000+0000`
fn display_date(raw: &str) -> String {
    DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z")
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .map(|dt| dt.with_timezone(&Utc).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

fn records<T: for<'de> Deserialize<'de>>(values: &[Value]) -> Result<Vec<T>, ToolError> {
    values
        .iter()
        .map(|v| T::deserialize(v).map_err(ToolError::from))
        .collect()
}

fn is_user_id(value: &str) -> bool {
    matches!(value.len(), 15 | 18)
        && value.starts_with(USER_KEY_PREFIX)
        && value.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Resolve a user id, username or full name to exactly one active user
async fn resolve_user(api: &dyn SalesforceApi, user: &str) -> Result<UserRecord, ToolError> {
    let primary = if is_user_id(user) {
        format!("{} WHERE Id = {}", USER_FIELDS, quote(user))
    } else if user.contains('@') || !user.contains(' ') {
        format!("{} WHERE Username = {}", USER_FIELDS, quote(user))
    } else {
        format!(
            "{} WHERE Name LIKE {} ORDER BY LastModifiedDate DESC LIMIT {}",
            USER_FIELDS,
            like_contains(user),
            CANDIDATE_LIMIT
        )
    };

    let mut users: Vec<UserRecord> = records(&api.query(&primary).await?.records)?;

    if users.is_empty() {
        tracing::debug!("No exact user match for '{}', broadening search", user);
        let pattern = like_contains(user);
        let broad = format!(
            "{} WHERE Name LIKE {} OR Username LIKE {} ORDER BY LastModifiedDate DESC LIMIT {}",
            USER_FIELDS, pattern, pattern, CANDIDATE_LIMIT
        );
        users = records(&api.query(&broad).await?.records)?;
    }

    match users.len() {
        0 => Err(ToolError::unresolved(format!(
            "No user found matching '{}'. Please verify the username or full name and try again.",
            user
        ))),
        1 => {
            let found = users.remove(0);
            if !found.is_active {
                return Err(ToolError::unresolved(format!(
                    "User '{}' exists but is inactive. Debug logs are not generated for inactive users.",
                    user
                )));
            }
            tracing::debug!("Resolved '{}' to user {}", user, found.id);
            Ok(found)
        }
        _ => {
            let candidates: Vec<String> = users
                .iter()
                .map(|u| format!("- {} ({})", u.name, u.username))
                .collect();
            Err(ToolError::unresolved(format!(
                "Multiple users found matching '{}'. Please specify which user by providing the exact username:\n\n{}",
                user,
                candidates.join("\n")
            )))
        }
    }
}

/// Entry point for `manage_debug_logs`
pub async fn manage_debug_logs(api: &dyn SalesforceApi, params: &DebugLogParams) -> ToolResult {
    tracing::info!("Debug logs {:?} for user '{}'", params.action, params.user_id);

    let user = resolve_user(api, &params.user_id).await?;

    match params.action {
        DebugLogAction::Enable => {
            let level = params.log_level.ok_or_else(|| {
                ToolError::invalid("`logLevel` is required for 'enable'")
            })?;
            enable(api, params, &user, level, Utc::now()).await
        }
        DebugLogAction::Disable => disable(api, params, &user, Utc::now()).await,
        DebugLogAction::Retrieve => retrieve(api, params, &user).await,
    }
}

/// Id of the `SFMCP_<LEVEL>` debug level, created on first use
async fn ensure_debug_level(api: &dyn SalesforceApi, level: LogLevel) -> Result<String, ToolError> {
    let developer_name = format!("{}{}", DEBUG_LEVEL_PREFIX, level);
    let soql = format!(
        "SELECT Id FROM DebugLevel WHERE DeveloperName = {}",
        quote(&developer_name)
    );
    let existing: Vec<IdRecord> = records(&api.tooling_query(&soql).await?.records)?;
    if let Some(found) = existing.into_iter().next() {
        tracing::info!("Using existing DebugLevel {}", found.id);
        return Ok(found.id);
    }

    tracing::info!("Creating DebugLevel {}", developer_name);
    let body = json!({
        "DeveloperName": developer_name,
        "MasterLabel": developer_name,
        "ApexCode": level.as_str(),
        "ApexProfiling": "INFO",
        "Callout": "INFO",
        "Database": "INFO",
        "System": "DEBUG",
        "Validation": "INFO",
        "Visualforce": "INFO",
        "Workflow": "INFO",
    });
    Ok(api.tooling_create("DebugLevel", &body).await?)
}

async fn active_trace_flags(
    api: &dyn SalesforceApi,
    user: &UserRecord,
    now: DateTime<Utc>,
) -> Result<Vec<IdRecord>, ToolError> {
    let soql = format!(
        "SELECT Id, DebugLevelId, ExpirationDate FROM TraceFlag WHERE TracedEntityId = {} AND ExpirationDate > {}",
        quote(&user.id),
        datetime_literal(now)
    );
    records(&api.tooling_query(&soql).await?.records)
}

async fn enable(
    api: &dyn SalesforceApi,
    params: &DebugLogParams,
    user: &UserRecord,
    level: LogLevel,
    now: DateTime<Utc>,
) -> ToolResult {
    let minutes = params.expiration_minutes();
    let expiration = now + Duration::minutes(minutes);
    let existing = active_trace_flags(api, user, now).await?;
    let debug_level_id = ensure_debug_level(api, level).await?;

    let (status, trace_flag_id) = match existing.into_iter().next() {
        Some(flag) => {
            let body = json!({
                "ExpirationDate": datetime_literal(expiration),
                "DebugLevelId": debug_level_id,
            });
            tracing::info!("Updating TraceFlag {}", flag.id);
            api.tooling_update("TraceFlag", &flag.id, &body).await?;
            ("updated", flag.id)
        }
        None => {
            let body = json!({
                "TracedEntityId": user.id,
                "DebugLevelId": debug_level_id,
                "LogType": "USER_DEBUG",
                "StartDate": datetime_literal(now),
                "ExpirationDate": datetime_literal(expiration),
            });
            tracing::info!("Creating TraceFlag for user {}", user.id);
            ("enabled", api.tooling_create("TraceFlag", &body).await?)
        }
    };

    let text = format!(
        "Successfully {} debug logs for user '{}'.\n\n\
         **Log Level:** {}\n\
         **Expiration:** {} ({} minutes from now)\n\
         **Trace Flag ID:** {}\n",
        status,
        params.user_id,
        level,
        expiration.format("%Y-%m-%d %H:%M:%S UTC"),
        minutes,
        trace_flag_id
    );

    let payload = json!({
        "action": "enable",
        "status": status,
        "user": user,
        "logLevel": level.as_str(),
        "debugLevelId": debug_level_id,
        "traceFlagId": trace_flag_id,
        "expiration": datetime_literal(expiration),
        "expirationMinutes": minutes,
    });
    ToolOutput::new(&payload, text)
}

async fn disable(
    api: &dyn SalesforceApi,
    params: &DebugLogParams,
    user: &UserRecord,
    now: DateTime<Utc>,
) -> ToolResult {
    let flags = active_trace_flags(api, user, now).await?;

    if flags.is_empty() {
        let payload = json!({
            "action": "disable",
            "status": "none",
            "user": user,
            "deletedTraceFlags": [],
        });
        let text = format!("No active debug logs found for user '{}'.", params.user_id);
        return ToolOutput::new(&payload, text);
    }

    tracing::info!("Deleting {} TraceFlags", flags.len());
    let mut deleted = Vec::with_capacity(flags.len());
    for flag in flags {
        api.tooling_delete("TraceFlag", &flag.id).await?;
        tracing::info!("Deleted TraceFlag {}", flag.id);
        deleted.push(flag.id);
    }

    let text = format!(
        "Successfully disabled {} debug log configuration(s) for user '{}' by removing them.",
        deleted.len(),
        params.user_id
    );
    let payload = json!({
        "action": "disable",
        "status": "disabled",
        "user": user,
        "deletedTraceFlags": deleted,
    });
    ToolOutput::new(&payload, text)
}

async fn retrieve(api: &dyn SalesforceApi, params: &DebugLogParams, user: &UserRecord) -> ToolResult {
    if let Some(ref log_id) = params.log_id {
        return retrieve_one(api, params, user, log_id).await;
    }

    let limit = params.limit();
    tracing::info!("Retrieving up to {} logs for user {}", limit, user.id);
    let soql = format!(
        "{} WHERE LogUserId = {} ORDER BY LastModifiedDate DESC LIMIT {}",
        LOG_FIELDS,
        quote(&user.id),
        limit
    );
    let logs: Vec<ApexLog> = records(&api.tooling_query(&soql).await?.records)?;

    let text = if logs.is_empty() {
        format!("No debug logs found for user '{}'.", params.user_id)
    } else {
        let mut text = format!(
            "Found {} debug logs for user '{}':\n\n",
            logs.len(),
            params.user_id
        );
        for (i, log) in logs.iter().enumerate() {
            text.push_str(&log.render(&format!("**Log {}**", i + 1)));
            text.push('\n');
        }
        text.push_str(
            "To view a specific log with full content, call again with `logId` set and `includeBody: true`.\n",
        );
        text
    };

    let payload = json!({
        "action": "retrieve",
        "user": user,
        "logs": logs,
    });
    ToolOutput::new(&payload, text)
}

async fn retrieve_one(
    api: &dyn SalesforceApi,
    params: &DebugLogParams,
    user: &UserRecord,
    log_id: &str,
) -> ToolResult {
    tracing::info!("Retrieving log {}", log_id);
    let soql = format!(
        "{} WHERE Id = {} AND LogUserId = {}",
        LOG_FIELDS,
        quote(log_id),
        quote(&user.id)
    );
    let log: ApexLog = records(&api.tooling_query(&soql).await?.records)?
        .into_iter()
        .next()
        .ok_or_else(|| {
            ToolError::unresolved(format!(
                "No log found with ID '{}' for user '{}'.",
                log_id, params.user_id
            ))
        })?;

    let body = if params.include_body() {
        Some(api.apex_log_body(&log.id).await?)
    } else {
        None
    };

    let mut text = log.render("**Log Details:**\n");
    match body {
        Some(ref content) => text.push_str(&format!("\n**Log Body:**\n```\n{}\n```\n", content)),
        None => text.push_str("\nTo view the full log content, set `includeBody` to true.\n"),
    }

    let payload = json!({
        "action": "retrieve",
        "user": user,
        "log": log,
        "body": body,
    });
    ToolOutput::new(&payload, text)
}
