//! Typed views over Salesforce REST payloads
//!
//! Only the keys the tools read are modelled; everything defaults so that
//! describes from older API versions or partial fakes still deserialize.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `GET /sobjects` response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DescribeGlobal {
    #[serde(default)]
    pub sobjects: Vec<SObjectSummary>,
}

/// One entry of the global describe
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SObjectSummary {
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub custom: bool,
}

/// `GET /sobjects/{name}/describe` response
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SObjectDescribe {
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub label_plural: Option<String>,
    #[serde(default)]
    pub key_prefix: Option<String>,
    #[serde(default)]
    pub custom: bool,
    #[serde(default)]
    pub createable: bool,
    #[serde(default)]
    pub updateable: bool,
    #[serde(default)]
    pub deletable: bool,
    #[serde(default)]
    pub fields: Vec<FieldDescribe>,
    #[serde(default)]
    pub child_relationships: Vec<ChildRelationship>,
    #[serde(default)]
    pub record_type_infos: Vec<RecordTypeInfo>,
}

impl SObjectDescribe {
    pub fn from_value(value: &Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(value)
    }

    /// Field by API name, ignoring case
    pub fn field(&self, name: &str) -> Option<&FieldDescribe> {
        self.fields.iter().find(|f| f.name.eq_ignore_ascii_case(name))
    }

    /// Lookup and master-detail fields with at least one target
    pub fn reference_fields(&self) -> impl Iterator<Item = &FieldDescribe> {
        self.fields
            .iter()
            .filter(|f| f.field_type == "reference" && !f.reference_to.is_empty())
    }

    pub fn picklist_fields(&self) -> impl Iterator<Item = &FieldDescribe> {
        self.fields
            .iter()
            .filter(|f| f.is_picklist() && !f.picklist_values.is_empty())
    }
}

/// Field metadata from a describe
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescribe {
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type", default)]
    pub field_type: String,
    #[serde(default = "default_true")]
    pub nillable: bool,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub external_id: bool,
    #[serde(default)]
    pub updateable: bool,
    #[serde(default)]
    pub custom: bool,
    #[serde(default)]
    pub inline_help_text: Option<String>,
    #[serde(default)]
    pub reference_to: Vec<String>,
    #[serde(default)]
    pub relationship_name: Option<String>,
    #[serde(default)]
    pub picklist_values: Vec<PicklistEntry>,
}

impl FieldDescribe {
    pub fn is_picklist(&self) -> bool {
        self.field_type == "picklist" || self.field_type == "multipicklist"
    }

    /// Required means the field cannot be left empty
    pub fn is_required(&self) -> bool {
        !self.nillable
    }
}

fn default_true() -> bool {
    true
}

/// One configured picklist value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PicklistEntry {
    pub value: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub default_value: bool,
    #[serde(default = "default_true")]
    pub active: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildRelationship {
    #[serde(rename = "childSObject", default)]
    pub child_sobject: String,
    #[serde(default)]
    pub relationship_name: Option<String>,
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub cascade_delete: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordTypeInfo {
    #[serde(default)]
    pub record_type_id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub developer_name: Option<String>,
    #[serde(default)]
    pub default_record_type_mapping: bool,
    #[serde(default)]
    pub available: bool,
}

/// SOQL query response (REST and Tooling)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    #[serde(default)]
    pub total_size: u64,
    #[serde(default)]
    pub records: Vec<Value>,
}
