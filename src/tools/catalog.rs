//! Tool catalog
//!
//! Static descriptors for the nine tools: names, descriptions and typed
//! parameter specs, rendered into MCP JSON Schemas.

use serde_json::{json, Map, Value};

/// Parameter type for tool inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    String,
    Integer,
    Boolean,
    StringList,
    Enum(&'static [&'static str]),
}

impl ParamType {
    fn json_schema(&self, description: &str) -> Value {
        match self {
            ParamType::String => json!({"type": "string", "description": description}),
            ParamType::Integer => json!({"type": "integer", "description": description}),
            ParamType::Boolean => json!({"type": "boolean", "description": description}),
            ParamType::StringList => json!({
                "type": "array",
                "items": {"type": "string"},
                "description": description
            }),
            ParamType::Enum(values) => json!({
                "type": "string",
                "enum": values,
                "description": description
            }),
        }
    }
}

/// One tool parameter
#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub name: &'static str,
    pub param_type: ParamType,
    pub required: bool,
    pub description: &'static str,
}

const fn param(
    name: &'static str,
    param_type: ParamType,
    required: bool,
    description: &'static str,
) -> ParamSpec {
    ParamSpec {
        name,
        param_type,
        required,
        description,
    }
}

/// Tool definition
#[derive(Debug, Clone, Copy)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub params: &'static [ParamSpec],
}

impl ToolDescriptor {
    /// JSON Schema for the tool's arguments
    pub fn input_schema(&self) -> Value {
        let mut props = Map::new();
        let mut required = Vec::new();

        for p in self.params {
            props.insert(p.name.to_string(), p.param_type.json_schema(p.description));
            if p.required {
                required.push(p.name);
            }
        }

        json!({
            "type": "object",
            "properties": props,
            "required": required
        })
    }

    pub fn required_params(&self) -> impl Iterator<Item = &ParamSpec> {
        self.params.iter().filter(|p| p.required)
    }
}

pub const DEBUG_LOG_ACTIONS: &[&str] = &["enable", "disable", "retrieve"];

pub const LOG_LEVELS: &[&str] = &[
    "NONE", "ERROR", "WARN", "INFO", "DEBUG", "FINE", "FINER", "FINEST",
];

const OBJECT_NAME: ParamSpec = param(
    "objectName",
    ParamType::String,
    true,
    "API name of the object, e.g. 'Account', 'Case', 'Custom_Object__c'",
);

/// Every tool the server exposes
pub const TOOLS: &[ToolDescriptor] = &[
    ToolDescriptor {
        name: "search_objects",
        description: "Search Salesforce standard and custom objects by name or label. \
            Space-separated terms match objects containing ANY term (case-insensitive).",
        params: &[param(
            "query",
            ParamType::String,
            true,
            "Search terms, e.g. 'account', 'order product', '__c'",
        )],
    },
    ToolDescriptor {
        name: "describe_object",
        description: "Describe a Salesforce object: basic properties, CRUD permissions, \
            fields, relationship fields and picklist values.",
        params: &[
            OBJECT_NAME,
            param(
                "includeFieldDetails",
                ParamType::Boolean,
                false,
                "Include field, relationship and picklist details (default: true)",
            ),
        ],
    },
    ToolDescriptor {
        name: "describe_object_with_api",
        description: "Describe a Salesforce object with a direct REST call, including all \
            boolean object properties, child relationships and record types. Optionally \
            returns the raw describe JSON.",
        params: &[
            OBJECT_NAME,
            param(
                "rawJson",
                ParamType::Boolean,
                false,
                "Return the complete unfiltered describe JSON (default: false)",
            ),
        ],
    },
    ToolDescriptor {
        name: "describe_relationship_fields",
        description: "List parent (lookup / master-detail) and child relationships of a \
            Salesforce object.",
        params: &[OBJECT_NAME],
    },
    ToolDescriptor {
        name: "query_records",
        description: "Query Salesforce records with SOQL. Supports field selection, \
            relationship fields (e.g. 'Account.Name'), WHERE filtering, ORDER BY and LIMIT.",
        params: &[
            OBJECT_NAME,
            param(
                "fields",
                ParamType::StringList,
                true,
                "Fields to retrieve, e.g. ['Name', 'Phone', 'Account.Name']",
            ),
            param(
                "whereClause",
                ParamType::String,
                false,
                "SOQL filter without the WHERE keyword, e.g. \"CreatedDate = LAST_MONTH\"",
            ),
            param(
                "orderBy",
                ParamType::String,
                false,
                "Sort order, e.g. 'Name ASC' or 'CreatedDate DESC'",
            ),
            param(
                "limit",
                ParamType::Integer,
                false,
                "Maximum records to return (default: 10, max: 100)",
            ),
        ],
    },
    ToolDescriptor {
        name: "get_fields_by_type",
        description: "List the fields of a Salesforce object, optionally only those of one \
            type (string, boolean, picklist, multipicklist, reference, date, datetime, \
            currency, percent, phone, email, ...).",
        params: &[
            OBJECT_NAME,
            param(
                "fieldType",
                ParamType::String,
                false,
                "Field type to filter by, e.g. 'picklist' or 'reference'. Omit for all fields",
            ),
        ],
    },
    ToolDescriptor {
        name: "get_picklist_values",
        description: "Get the configured values of a picklist or multi-select picklist \
            field, in order, with label, default and active flags.",
        params: &[
            OBJECT_NAME,
            param(
                "fieldName",
                ParamType::String,
                true,
                "API name of the picklist field, e.g. 'Status', 'Industry'",
            ),
        ],
    },
    ToolDescriptor {
        name: "get_validation_rules",
        description: "Get the validation rules of a Salesforce object via the Tooling API: \
            name, active flag, error message, error field and description.",
        params: &[OBJECT_NAME],
    },
    ToolDescriptor {
        name: "manage_debug_logs",
        description: "Enable, disable or retrieve Salesforce debug logs for a user. \
            'enable' needs logLevel; 'retrieve' lists recent logs or fetches one by logId.",
        params: &[
            param(
                "action",
                ParamType::Enum(DEBUG_LOG_ACTIONS),
                true,
                "Operation to perform: enable, disable or retrieve",
            ),
            param(
                "userId",
                ParamType::String,
                true,
                "User Id, username (e.g. 'admin@acme.com') or full name",
            ),
            param(
                "logLevel",
                ParamType::Enum(LOG_LEVELS),
                false,
                "Apex log level, required for 'enable'",
            ),
            param(
                "expirationTime",
                ParamType::Integer,
                false,
                "Minutes until the trace flag expires (default: 30, max: 1440)",
            ),
            param(
                "limit",
                ParamType::Integer,
                false,
                "Maximum logs to retrieve (default: 10, max: 100)",
            ),
            param(
                "logId",
                ParamType::String,
                false,
                "Id of a specific log to retrieve",
            ),
            param(
                "includeBody",
                ParamType::Boolean,
                false,
                "Include the full log content when retrieving by logId (default: false)",
            ),
        ],
    },
];

/// Look up a tool by name
pub fn find_tool(name: &str) -> Option<&'static ToolDescriptor> {
    TOOLS.iter().find(|t| t.name == name)
}
